pub mod client;
pub mod models;

pub use client::FugleClient;
pub use models::{ApiError, CandleQuery, RawRow};
