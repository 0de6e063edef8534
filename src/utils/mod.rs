pub mod errors;
pub mod ratelimit;

pub use errors::{ConfigError, FetchError, MalformedDataError, PipelineError, RenderError, StartupError};
pub use ratelimit::Pacer;
