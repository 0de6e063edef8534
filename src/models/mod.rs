//! Data models for the chart pipeline
//!
//! Candles and series produced by the transformer, the per-run context, and
//! the artifacts the renderer writes.

pub mod candle;
pub mod chart;
pub mod run_context;
pub mod timeframe;

// Re-export commonly used types for convenience
pub use candle::{Candle, Series};
pub use chart::{ChartOutcome, RenderSpec};
pub use run_context::RunContext;
pub use timeframe::Timeframe;
