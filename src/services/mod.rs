pub mod chart_service;
pub mod fetch_service;
pub mod producer_service;
pub mod runner_service;
#[cfg(feature = "snapshot")]
pub mod snapshot_service;
pub mod transform_service;
