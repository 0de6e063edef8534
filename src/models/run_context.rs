use std::path::PathBuf;

use chrono::{Days, NaiveDate};

use super::chart::ChartArtifact;
use super::timeframe::Timeframe;

/// Parameters of one invocation, built once and read-only afterwards
#[derive(Debug, Clone)]
pub struct RunContext {
    pub symbols: Vec<String>,
    pub days_back: u32,
    pub moving_averages: Vec<usize>,
    pub timeframe: Timeframe,
    pub output_root: PathBuf,
    pub run_date: NaiveDate,
}

impl RunContext {
    /// First day of the requested range (inclusive)
    pub fn start_date(&self) -> NaiveDate {
        self.run_date
            .checked_sub_days(Days::new(u64::from(self.days_back)))
            .unwrap_or(NaiveDate::MIN)
    }

    /// Last day of the requested range (inclusive)
    pub fn end_date(&self) -> NaiveDate {
        self.run_date
    }

    /// `<output-root>/<YYYY-MM-DD>`
    pub fn run_dir(&self) -> PathBuf {
        self.output_root
            .join(self.run_date.format("%Y-%m-%d").to_string())
    }

    /// Deterministic artifact location for a symbol and a file-name label
    pub fn artifact(&self, symbol: &str, label: &str) -> ChartArtifact {
        ChartArtifact {
            symbol: symbol.to_string(),
            label: label.to_string(),
            run_date: self.run_date,
            path: self.run_dir().join(format!("{}_{}.png", symbol, label)),
        }
    }
}
