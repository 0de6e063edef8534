use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::models::{ChartOutcome, RunContext};
use crate::services::producer_service::ChartProducer;
use crate::utils::{Pacer, PipelineError};

/// Outcome for one symbol
#[derive(Debug)]
pub struct SymbolReport {
    pub symbol: String,
    pub result: Result<ChartOutcome, PipelineError>,
}

/// Per-symbol outcomes of one run, in configured order
#[derive(Debug)]
pub struct RunReport {
    pub run_dir: PathBuf,
    pub symbols: Vec<SymbolReport>,
}

impl RunReport {
    pub fn written(&self) -> Vec<&Path> {
        self.symbols
            .iter()
            .filter_map(|s| match &s.result {
                Ok(ChartOutcome::Written(artifact)) => Some(artifact.path.as_path()),
                _ => None,
            })
            .collect()
    }

    pub fn no_data(&self) -> Vec<&str> {
        self.symbols
            .iter()
            .filter(|s| matches!(s.result, Ok(ChartOutcome::NoData)))
            .map(|s| s.symbol.as_str())
            .collect()
    }

    pub fn failed(&self) -> Vec<(&str, &PipelineError)> {
        self.symbols
            .iter()
            .filter_map(|s| s.result.as_ref().err().map(|e| (s.symbol.as_str(), e)))
            .collect()
    }
}

/// Process every configured symbol, one after another.
///
/// Only failing to create the run directory is returned as an error; anything
/// that goes wrong for a single symbol is logged and recorded in the report.
pub async fn run<P: ChartProducer>(
    ctx: &RunContext,
    producer: &P,
    pacer: &mut Pacer,
) -> std::io::Result<RunReport> {
    let run_dir = ctx.run_dir();
    tokio::fs::create_dir_all(&run_dir).await?;
    info!(
        "📂 Writing {} charts for {} symbol(s) to {}",
        producer.name(),
        ctx.symbols.len(),
        run_dir.display()
    );

    let mut symbols = Vec::with_capacity(ctx.symbols.len());
    for symbol in &ctx.symbols {
        pacer.wait().await;
        let result = producer.produce(symbol, ctx).await;

        match &result {
            Ok(ChartOutcome::Written(artifact)) => {
                info!(symbol = %symbol, "🖼️ Chart written → {}", artifact.path.display());
            }
            Ok(ChartOutcome::NoData) => {
                info!(symbol = %symbol, "No data returned for {}, skipped", symbol);
            }
            Err(e) if e.stage() == "insufficient-data" => {
                warn!(symbol = %symbol, stage = e.stage(), "Skipping {}: {}", symbol, e);
            }
            Err(e) => {
                error!(symbol = %symbol, stage = e.stage(), "Failed {}: {}", symbol, e);
            }
        }

        symbols.push(SymbolReport {
            symbol: symbol.clone(),
            result,
        });
    }

    let report = RunReport { run_dir, symbols };
    info!(
        "✅ Run finished: {} written, {} without data, {} failed",
        report.written().len(),
        report.no_data().len(),
        report.failed().len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fugle::{ApiError, CandleQuery, RawRow};
    use crate::models::{RenderSpec, Series, Timeframe};
    use crate::services::chart_service::{ensure_enough_points, ChartRenderer};
    use crate::services::fetch_service::CandleFetcher;
    use crate::services::producer_service::ApiChartProducer;
    use crate::utils::{FetchError, RenderError};
    use chrono::{Days, NaiveDate};
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::time::Duration;

    enum Reply {
        Rows(Vec<RawRow>),
        Fail,
    }

    /// Provider stand-in keyed by symbol
    struct StubFetcher {
        replies: HashMap<String, Reply>,
    }

    impl CandleFetcher for StubFetcher {
        async fn fetch(&self, symbol: &str, _query: &CandleQuery) -> Result<Vec<RawRow>, FetchError> {
            match self.replies.get(symbol) {
                Some(Reply::Rows(rows)) => Ok(rows.clone()),
                Some(Reply::Fail) | None => Err(ApiError::RateLimited("slow down".to_string()).into()),
            }
        }
    }

    /// Writes the closes as text so reruns can be compared byte for byte
    struct StubRenderer;

    impl ChartRenderer for StubRenderer {
        fn render(&self, series: &Series, spec: &RenderSpec) -> Result<(), RenderError> {
            ensure_enough_points(series, spec)?;
            std::fs::write(&spec.output_path, format!("{:?}", series.closes()))?;
            Ok(())
        }
    }

    fn daily_rows(count: usize) -> Vec<RawRow> {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        (0..count)
            .rev()
            .map(|i| {
                let close = 500.0 + i as f64;
                match json!({
                    "date": (start + Days::new(i as u64)).format("%Y-%m-%d").to_string(),
                    "open": close - 1.0,
                    "high": close + 3.0,
                    "low": close - 3.0,
                    "close": close,
                    "volume": 10_000 + i
                }) {
                    Value::Object(map) => map,
                    _ => unreachable!(),
                }
            })
            .collect()
    }

    fn ctx(root: &Path, moving_averages: Vec<usize>) -> RunContext {
        RunContext {
            symbols: vec!["2330".to_string(), "2317".to_string(), "0050".to_string()],
            days_back: 180,
            moving_averages,
            timeframe: Timeframe::Day,
            output_root: root.join("charts"),
            run_date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
        }
    }

    fn producer(replies: Vec<(&str, Reply)>) -> ApiChartProducer<StubFetcher, StubRenderer> {
        let replies = replies
            .into_iter()
            .map(|(symbol, reply)| (symbol.to_string(), reply))
            .collect();
        ApiChartProducer::new(StubFetcher { replies }, StubRenderer)
    }

    fn png_files(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_every_symbol_gets_one_chart() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = ctx(tmp.path(), vec![20, 60]);
        let producer = producer(vec![
            ("2330", Reply::Rows(daily_rows(180))),
            ("2317", Reply::Rows(daily_rows(180))),
            ("0050", Reply::Rows(daily_rows(180))),
        ]);

        let report = run(&ctx, &producer, &mut Pacer::new(Duration::ZERO)).await.unwrap();

        assert_eq!(report.written().len(), 3);
        assert_eq!(report.run_dir, tmp.path().join("charts").join("2025-07-01"));
        assert_eq!(
            png_files(&report.run_dir),
            vec!["0050_D.png", "2317_D.png", "2330_D.png"]
        );
    }

    #[tokio::test]
    async fn test_empty_symbol_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = ctx(tmp.path(), vec![20, 60]);
        let producer = producer(vec![
            ("2330", Reply::Rows(daily_rows(180))),
            ("2317", Reply::Rows(Vec::new())),
            ("0050", Reply::Rows(daily_rows(180))),
        ]);

        let report = run(&ctx, &producer, &mut Pacer::new(Duration::ZERO)).await.unwrap();

        assert_eq!(report.no_data(), vec!["2317"]);
        assert!(report.failed().is_empty());
        assert_eq!(png_files(&report.run_dir), vec!["0050_D.png", "2330_D.png"]);
    }

    #[tokio::test]
    async fn test_missing_field_is_isolated() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = ctx(tmp.path(), vec![5]);
        let mut broken = daily_rows(30);
        broken[7].remove("close");
        let producer = producer(vec![
            ("2330", Reply::Rows(daily_rows(30))),
            ("2317", Reply::Rows(broken)),
            ("0050", Reply::Rows(daily_rows(30))),
        ]);

        let report = run(&ctx, &producer, &mut Pacer::new(Duration::ZERO)).await.unwrap();

        let failed = report.failed();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].0, "2317");
        assert_eq!(failed[0].1.stage(), "transform");
        assert_eq!(png_files(&report.run_dir), vec!["0050_D.png", "2330_D.png"]);
    }

    #[tokio::test]
    async fn test_short_series_skips_render_only_for_that_symbol() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = ctx(tmp.path(), vec![20, 60]);
        let producer = producer(vec![
            ("2330", Reply::Rows(daily_rows(180))),
            ("2317", Reply::Rows(daily_rows(10))),
            ("0050", Reply::Rows(daily_rows(180))),
        ]);

        let report = run(&ctx, &producer, &mut Pacer::new(Duration::ZERO)).await.unwrap();

        let failed = report.failed();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].0, "2317");
        assert!(matches!(
            failed[0].1,
            PipelineError::Render(RenderError::InsufficientData { points: 10, window: 60 })
        ));
        assert_eq!(png_files(&report.run_dir), vec!["0050_D.png", "2330_D.png"]);
    }

    #[tokio::test]
    async fn test_fetch_failure_does_not_abort_batch() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = ctx(tmp.path(), vec![20]);
        let producer = producer(vec![
            ("2330", Reply::Fail),
            ("2317", Reply::Rows(daily_rows(40))),
            ("0050", Reply::Rows(daily_rows(40))),
        ]);

        let report = run(&ctx, &producer, &mut Pacer::new(Duration::ZERO)).await.unwrap();

        assert_eq!(report.symbols[0].symbol, "2330");
        assert_eq!(report.failed()[0].1.stage(), "fetch");
        assert_eq!(report.written().len(), 2);
    }

    #[tokio::test]
    async fn test_rerun_same_day_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = ctx(tmp.path(), vec![20, 60]);
        let producer = producer(vec![
            ("2330", Reply::Rows(daily_rows(90))),
            ("2317", Reply::Rows(daily_rows(90))),
            ("0050", Reply::Rows(daily_rows(90))),
        ]);

        let first = run(&ctx, &producer, &mut Pacer::new(Duration::ZERO)).await.unwrap();
        let files_before = png_files(&first.run_dir);
        let content_before = std::fs::read(first.run_dir.join("2330_D.png")).unwrap();

        let second = run(&ctx, &producer, &mut Pacer::new(Duration::ZERO)).await.unwrap();
        assert_eq!(png_files(&second.run_dir), files_before);
        assert_eq!(std::fs::read(second.run_dir.join("2330_D.png")).unwrap(), content_before);
    }

    #[tokio::test]
    async fn test_unwritable_root_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("charts");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let ctx = ctx(tmp.path(), vec![20]);
        let producer = producer(vec![]);
        assert!(run(&ctx, &producer, &mut Pacer::new(Duration::ZERO)).await.is_err());
    }
}
