use thiserror::Error;

use crate::api::fugle::ApiError;

/// Startup errors; any of these aborts the run before a symbol is touched
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Environment variable {0} is not set")]
    MissingCredential(&'static str),
    #[error("Invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Failures that stop a run before or while preparing its output directory
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Failed to create output directory: {0}")]
    OutputDir(#[from] std::io::Error),
    #[error(transparent)]
    Browser(#[from] FetchError),
    #[cfg(not(feature = "snapshot"))]
    #[error("Snapshot support was not compiled in (build with --features snapshot)")]
    SnapshotUnavailable,
}

/// Failure to obtain data (or a screenshot) for one symbol
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("API request failed: {0}")]
    Api(#[from] ApiError),
    #[cfg_attr(not(feature = "snapshot"), allow(dead_code))]
    #[error("Browser automation failed: {0}")]
    Browser(String),
}

/// A provider row lacked a field or carried an unusable value
#[derive(Debug, Error)]
#[error("Malformed row {row}: field '{field}' {reason}")]
pub struct MalformedDataError {
    pub row: usize,
    pub field: String,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Insufficient data: {points} points, moving average needs {window}")]
    InsufficientData { points: usize, window: usize },
    #[error("Failed to draw chart: {0}")]
    Drawing(String),
    #[error("Failed to write image: {0}")]
    Io(#[from] std::io::Error),
}

/// Every way a single symbol can fail; never aborts the batch
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Malformed(#[from] MalformedDataError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl PipelineError {
    /// Short stage name used in log fields and the run summary
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Fetch(_) => "fetch",
            PipelineError::Malformed(_) => "transform",
            PipelineError::Render(RenderError::InsufficientData { .. }) => "insufficient-data",
            PipelineError::Render(_) => "render",
        }
    }
}

impl From<ApiError> for PipelineError {
    fn from(err: ApiError) -> Self {
        PipelineError::Fetch(FetchError::Api(err))
    }
}
