//! Candle and series models

use chrono::NaiveDateTime;

/// One OHLCV bar
#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }
}

/// Candles for one symbol, strictly increasing by timestamp
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    candles: Vec<Candle>,
}

impl Series {
    /// Build a series from candles in any order.
    ///
    /// Sorting is stable, so when the provider repeats a timestamp the row it
    /// sent last is the one kept.
    pub fn from_unordered(mut candles: Vec<Candle>) -> Self {
        candles.sort_by_key(|c| c.timestamp);
        let mut deduped: Vec<Candle> = Vec::with_capacity(candles.len());
        for candle in candles {
            match deduped.last_mut() {
                Some(last) if last.timestamp == candle.timestamp => *last = candle,
                _ => deduped.push(candle),
            }
        }
        Self { candles: deduped }
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    /// Lowest low and highest high, `None` for an empty series
    pub fn price_range(&self) -> Option<(f64, f64)> {
        if self.is_empty() {
            return None;
        }
        let low = self.candles.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
        let high = self.candles.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
        Some((low, high))
    }

    pub fn max_volume(&self) -> f64 {
        self.candles.iter().map(|c| c.volume).fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn candle(day: u32, close: f64) -> Candle {
        Candle {
            timestamp: NaiveDate::from_ymd_opt(2025, 3, day)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            open: 100.0,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000.0,
        }
    }

    #[test]
    fn test_sorts_ascending() {
        let series = Series::from_unordered(vec![candle(3, 3.0), candle(1, 1.0), candle(2, 2.0)]);
        assert_eq!(series.closes(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_duplicate_timestamp_keeps_last_row() {
        let series = Series::from_unordered(vec![candle(1, 1.0), candle(2, 2.0), candle(1, 9.0)]);
        assert_eq!(series.len(), 2);
        assert_eq!(series.candles()[0].close, 9.0);
    }

    #[test]
    fn test_price_range_and_volume() {
        let series = Series::from_unordered(vec![candle(1, 10.0), candle(2, 20.0)]);
        assert_eq!(series.price_range(), Some((9.0, 21.0)));
        assert_eq!(series.max_volume(), 1000.0);
        assert_eq!(Series::default().price_range(), None);
    }
}
