use crate::api::fugle::{CandleQuery, FugleClient, RawRow};
use crate::models::RunContext;
use crate::utils::FetchError;

/// Anything that can hand back raw candle rows for a symbol
pub trait CandleFetcher {
    async fn fetch(&self, symbol: &str, query: &CandleQuery) -> Result<Vec<RawRow>, FetchError>;
}

impl CandleFetcher for FugleClient {
    async fn fetch(&self, symbol: &str, query: &CandleQuery) -> Result<Vec<RawRow>, FetchError> {
        let response = self.get_historical_candles(symbol, query).await?;
        Ok(response.data)
    }
}

/// Build the candles query for this run.
///
/// Intraday timeframes get no range: the provider only serves its own recent
/// window for those and rejects from/to.
pub fn build_query(ctx: &RunContext) -> CandleQuery {
    let range = if ctx.timeframe.is_intraday() {
        None
    } else {
        Some((ctx.start_date(), ctx.end_date()))
    };

    CandleQuery {
        timeframe: ctx.timeframe.code(),
        range,
    }
}
