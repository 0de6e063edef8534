use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// One candle row exactly as the provider sent it
pub type RawRow = Map<String, Value>;

/// Fields requested from the historical candles endpoint
pub const CANDLE_FIELDS: &str = "open,high,low,close,volume";

/// Query for GET /stock/historical/candles/{symbol}
#[derive(Debug, Clone, PartialEq)]
pub struct CandleQuery {
    pub timeframe: String,
    /// Inclusive date range; `None` for intraday timeframes
    pub range: Option<(NaiveDate, NaiveDate)>,
}

impl CandleQuery {
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("fields", CANDLE_FIELDS.to_string()),
            ("timeframe", self.timeframe.clone()),
        ];
        if let Some((from, to)) = self.range {
            pairs.push(("from", from.format("%Y-%m-%d").to_string()));
            pairs.push(("to", to.format("%Y-%m-%d").to_string()));
        }
        pairs
    }
}

/// Response from the historical candles endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandlesResponse {
    pub symbol: Option<String>,
    #[serde(rename = "type")]
    pub security_type: Option<String>,
    pub exchange: Option<String>,
    pub market: Option<String>,
    pub timeframe: Option<String>,
    #[serde(default)]
    pub data: Vec<RawRow>,
}

/// Error response from the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: Option<String>,
    #[serde(rename = "statusCode")]
    pub status_code: Option<i32>,
}

/// Comprehensive error type for API operations
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// 400 Bad Request
    #[error("Bad Request: {0}")]
    BadRequest(String),
    /// 401 Unauthorized
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    /// 403 Forbidden
    #[error("Forbidden: {0}")]
    Forbidden(String),
    /// 404 Not Found
    #[error("Not Found: {0}")]
    NotFound(String),
    /// 429 Too Many Requests
    #[error("Rate Limited: {0}")]
    RateLimited(String),
    /// 5xx Server Error
    #[error("Server Error ({0}): {1}")]
    ServerError(u16, String),
    /// Other HTTP errors
    #[error("HTTP Error ({0}): {1}")]
    HttpError(u16, String),
    /// Network/request error
    #[error("Request Error: {0}")]
    RequestError(String),
    /// Deserialization error
    #[error("Deserialization Error: {0}")]
    DeserializationError(String),
}
