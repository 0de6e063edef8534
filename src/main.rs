use std::process::ExitCode;

use chrono::Local;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod models;
mod services;
mod utils;

use api::fugle::FugleClient;
use config::{ChartSource, Config};
use models::RunContext;
use services::chart_service::CandlestickRenderer;
use services::producer_service::ApiChartProducer;
use services::runner_service::{self, RunReport};
use utils::{ConfigError, Pacer, StartupError};

async fn run(config: &Config, ctx: &RunContext) -> Result<RunReport, StartupError> {
    let mut pacer = Pacer::new(config.request_delay);

    match config.source {
        ChartSource::Api => {
            let api_key = config
                .api_key
                .clone()
                .ok_or(ConfigError::MissingCredential(config::API_KEY_VAR))?;
            let client = FugleClient::with_base_url(api_key, config.base_url.clone());
            let producer = ApiChartProducer::new(client, CandlestickRenderer::default());

            Ok(runner_service::run(ctx, &producer, &mut pacer).await?)
        }
        #[cfg(feature = "snapshot")]
        ChartSource::Snapshot => {
            let producer = services::snapshot_service::SnapshotProducer::launch(config.snapshot.clone())?;

            Ok(runner_service::run(ctx, &producer, &mut pacer).await?)
        }
        #[cfg(not(feature = "snapshot"))]
        ChartSource::Snapshot => Err(StartupError::SnapshotUnavailable),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("fugle_charts=info,warn")),
        )
        .with_target(true)
        .init();

    info!("📈 Starting fugle-charts...");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let ctx = config.run_context(Local::now().date_naive());
    info!(
        "Symbols: {:?} | timeframe {} | {} ~ {} | MA {:?}",
        ctx.symbols,
        ctx.timeframe,
        ctx.start_date(),
        ctx.end_date(),
        ctx.moving_averages
    );

    // Per-symbol failures are already logged; they do not change the exit status
    match run(&config, &ctx).await {
        Ok(report) => {
            info!("Charts are in {}", report.run_dir.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
