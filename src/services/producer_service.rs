use tracing::debug;

use crate::models::{ChartOutcome, RenderSpec, RunContext};
use crate::services::chart_service::ChartRenderer;
use crate::services::fetch_service::{build_query, CandleFetcher};
use crate::services::transform_service;
use crate::utils::PipelineError;

/// Turns one symbol into one chart image (or a reason there is none).
///
/// Implemented by the API pipeline and by the browser snapshot variant; the
/// runner does not care which one it drives.
pub trait ChartProducer {
    /// Short name for logs
    fn name(&self) -> &'static str;

    async fn produce(&self, symbol: &str, ctx: &RunContext) -> Result<ChartOutcome, PipelineError>;
}

/// Fetch, transform and render through the market-data API
pub struct ApiChartProducer<F, R> {
    fetcher: F,
    renderer: R,
}

impl<F: CandleFetcher, R: ChartRenderer> ApiChartProducer<F, R> {
    pub fn new(fetcher: F, renderer: R) -> Self {
        Self { fetcher, renderer }
    }
}

impl<F: CandleFetcher, R: ChartRenderer> ChartProducer for ApiChartProducer<F, R> {
    fn name(&self) -> &'static str {
        "api"
    }

    async fn produce(&self, symbol: &str, ctx: &RunContext) -> Result<ChartOutcome, PipelineError> {
        let query = build_query(ctx);
        let rows = self.fetcher.fetch(symbol, &query).await?;
        if rows.is_empty() {
            return Ok(ChartOutcome::NoData);
        }
        debug!(symbol, rows = rows.len(), "Fetched candles");

        let series = transform_service::to_series(&rows)?;

        let spec = RenderSpec::for_symbol(ctx, symbol);
        self.renderer.render(&series, &spec)?;

        Ok(ChartOutcome::Written(ctx.artifact(symbol, &ctx.timeframe.code())))
    }
}
