//! Chart rendering models

use std::path::PathBuf;

use chrono::NaiveDate;

use super::run_context::RunContext;
use super::timeframe::Timeframe;

/// A rendered image keyed by symbol, label and run date
#[derive(Debug, Clone, PartialEq)]
pub struct ChartArtifact {
    pub symbol: String,
    pub label: String,
    pub run_date: NaiveDate,
    pub path: PathBuf,
}

/// Everything the renderer needs besides the series itself
#[derive(Debug, Clone)]
pub struct RenderSpec {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub moving_averages: Vec<usize>,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub output_path: PathBuf,
}

impl RenderSpec {
    pub fn for_symbol(ctx: &RunContext, symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            timeframe: ctx.timeframe,
            moving_averages: ctx.moving_averages.clone(),
            from: ctx.start_date(),
            to: ctx.end_date(),
            output_path: ctx.artifact(symbol, &ctx.timeframe.code()).path,
        }
    }

    /// Title shows the requested range, not the range the provider actually returned
    pub fn title(&self) -> String {
        format!("{}  {}  {} ~ {}", self.symbol, self.timeframe, self.from, self.to)
    }

    pub fn largest_window(&self) -> usize {
        self.moving_averages.iter().copied().max().unwrap_or(0)
    }
}

/// What happened to one symbol when nothing went wrong
#[derive(Debug, Clone, PartialEq)]
pub enum ChartOutcome {
    Written(ChartArtifact),
    NoData,
}
