use reqwest::Client as HttpClient;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use super::models::{ApiError, CandleQuery, CandlesResponse, ErrorResponse};
use tracing::{debug, warn};

/// Fugle MarketData REST client
pub struct FugleClient {
    http_client: HttpClient,
    api_key: String,
    base_url: String,
}

impl FugleClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.fugle.tw/marketdata/v1.0";

    /// Create a new client against `base_url` (the public endpoint, a proxy, or a test server)
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create default headers with the API key
    fn create_headers(&self) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let key_value = HeaderValue::from_str(&self.api_key)
            .map_err(|e| ApiError::RequestError(format!("Failed to create API key header: {}", e)))?;
        headers.insert("x-api-key", key_value);

        Ok(headers)
    }

    fn candles_url(&self, symbol: &str) -> String {
        format!("{}/stock/historical/candles/{}", self.base_url, symbol)
    }

    /// Pull the provider's message out of an error body, falling back to the raw text
    fn error_message(body_text: String) -> String {
        serde_json::from_str::<ErrorResponse>(&body_text)
            .ok()
            .and_then(|err| err.message)
            .unwrap_or(body_text)
    }

    /// Parse error response based on HTTP status code
    async fn handle_error_response(
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> ApiError {
        let status_code = status.as_u16();
        let body_text = response.text().await.unwrap_or_default();
        let message = Self::error_message(body_text);

        match status_code {
            400 => ApiError::BadRequest(message),
            401 => ApiError::Unauthorized(message),
            403 => ApiError::Forbidden(message),
            404 => ApiError::NotFound(message),
            429 => {
                warn!("Rate limited by Fugle: {}", message);
                ApiError::RateLimited(message)
            }
            500..=599 => {
                warn!("Server error {}: {}", status_code, message);
                ApiError::ServerError(status_code, message)
            }
            _ => ApiError::HttpError(status_code, message),
        }
    }

    /// GET /stock/historical/candles/{symbol}
    ///
    /// Retrieves OHLCV candles for one symbol. Daily, weekly and monthly
    /// queries carry an explicit from/to range; intraday queries do not, and
    /// the provider answers with its own recent window instead.
    ///
    /// An empty `data` list is returned as-is, it is not an error.
    pub async fn get_historical_candles(
        &self,
        symbol: &str,
        query: &CandleQuery,
    ) -> Result<CandlesResponse, ApiError> {
        let url = self.candles_url(symbol);
        let headers = self.create_headers()?;

        debug!("GET {} {:?}", url, query);

        let response = self.http_client
            .get(&url)
            .headers(headers)
            .query(&query.to_query_pairs())
            .send()
            .await
            .map_err(|e| ApiError::RequestError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Self::handle_error_response(status, response).await);
        }

        response
            .json::<CandlesResponse>()
            .await
            .map_err(|e| ApiError::DeserializationError(format!("Failed to parse response: {}", e)))
    }
}
