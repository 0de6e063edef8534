use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::api::fugle::RawRow;
use crate::models::{Candle, Series};
use crate::utils::MalformedDataError;

/// Provider field holding the bar's date or date-time
const DATE_FIELD: &str = "date";

/// Convert provider rows into a time-ordered series.
///
/// A single bad row fails the whole symbol: a chart missing candles is worse
/// than no chart.
pub fn to_series(rows: &[RawRow]) -> Result<Series, MalformedDataError> {
    let candles = rows
        .iter()
        .enumerate()
        .map(|(index, row)| to_candle(index, row))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Series::from_unordered(candles))
}

fn to_candle(index: usize, row: &RawRow) -> Result<Candle, MalformedDataError> {
    let date = required(index, row, DATE_FIELD)?;
    let timestamp = date
        .as_str()
        .and_then(parse_timestamp)
        .ok_or_else(|| malformed(index, DATE_FIELD, format!("is not a date: {}", date)))?;

    Ok(Candle {
        timestamp,
        open: number(index, row, "open")?,
        high: number(index, row, "high")?,
        low: number(index, row, "low")?,
        close: number(index, row, "close")?,
        volume: number(index, row, "volume")?,
    })
}

/// Accepts `YYYY-MM-DD` (daily and up), RFC 3339 (intraday) and `YYYY-MM-DD HH:MM:SS`.
///
/// Intraday timestamps keep the exchange's local wall-clock time.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").ok()
}

fn required<'a>(index: usize, row: &'a RawRow, field: &str) -> Result<&'a Value, MalformedDataError> {
    match row.get(field) {
        Some(Value::Null) | None => Err(malformed(index, field, "is missing".to_string())),
        Some(value) => Ok(value),
    }
}

fn number(index: usize, row: &RawRow, field: &str) -> Result<f64, MalformedDataError> {
    let value = required(index, row, field)?;
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed
        .filter(|n| n.is_finite())
        .ok_or_else(|| malformed(index, field, format!("is not a number: {}", value)))
}

fn malformed(row: usize, field: &str, reason: String) -> MalformedDataError {
    MalformedDataError {
        row,
        field: field.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(date: &str, close: f64) -> RawRow {
        match json!({
            "date": date,
            "open": close - 1.0,
            "high": close + 2.0,
            "low": close - 2.0,
            "close": close,
            "volume": 1200
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_daily_rows_become_candles() {
        let series = to_series(&[row("2025-06-27", 1060.0)]).unwrap();
        let candle = &series.candles()[0];
        assert_eq!(candle.timestamp, parse_timestamp("2025-06-27").unwrap());
        assert_eq!(candle.open, 1059.0);
        assert_eq!(candle.high, 1062.0);
        assert_eq!(candle.low, 1058.0);
        assert_eq!(candle.close, 1060.0);
        assert_eq!(candle.volume, 1200.0);
    }

    #[test]
    fn test_reverse_sorted_matches_forward_sorted() {
        let forward = vec![row("2025-06-25", 1.0), row("2025-06-26", 2.0), row("2025-06-27", 3.0)];
        let reversed: Vec<RawRow> = forward.iter().rev().cloned().collect();

        let from_forward = to_series(&forward).unwrap();
        let from_reversed = to_series(&reversed).unwrap();
        assert_eq!(from_forward, from_reversed);
        assert_eq!(from_forward.closes(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_sorting_is_idempotent() {
        let rows = vec![row("2025-06-27", 3.0), row("2025-06-25", 1.0), row("2025-06-26", 2.0)];
        let once = to_series(&rows).unwrap();

        let resorted = Series::from_unordered(once.candles().to_vec());
        assert_eq!(once, resorted);
    }

    #[test]
    fn test_intraday_timestamp_keeps_local_time() {
        let ts = parse_timestamp("2025-06-27T09:05:00.000+08:00").unwrap();
        assert_eq!(ts.format("%Y-%m-%d %H:%M").to_string(), "2025-06-27 09:05");
    }

    #[test]
    fn test_numeric_strings_are_accepted() {
        let mut r = row("2025-06-27", 10.0);
        r.insert("close".to_string(), json!("10.5"));
        let series = to_series(&[r]).unwrap();
        assert_eq!(series.candles()[0].close, 10.5);
    }

    #[test]
    fn test_missing_field_fails_whole_series() {
        let mut bad = row("2025-06-26", 2.0);
        bad.remove("volume");
        let err = to_series(&[row("2025-06-25", 1.0), bad]).unwrap_err();
        assert_eq!(err.row, 1);
        assert_eq!(err.field, "volume");
    }

    #[test]
    fn test_unparseable_date_fails() {
        let err = to_series(&[row("27/06/2025", 1.0)]).unwrap_err();
        assert_eq!(err.field, "date");
    }

    #[test]
    fn test_null_value_counts_as_missing() {
        let mut r = row("2025-06-27", 1.0);
        r.insert("open".to_string(), Value::Null);
        let err = to_series(&[r]).unwrap_err();
        assert_eq!(err.field, "open");
        assert_eq!(err.reason, "is missing");
    }

    #[test]
    fn test_empty_rows_give_empty_series() {
        assert!(to_series(&[]).unwrap().is_empty());
    }
}
