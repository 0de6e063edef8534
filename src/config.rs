//! Run configuration
//!
//! Every tunable has a built-in default; environment variables (optionally
//! loaded from `.env`) override them. The API credential has no default.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveDate;

use crate::api::fugle::FugleClient;
use crate::models::{RunContext, Timeframe};
use crate::utils::ConfigError;

pub const API_KEY_VAR: &str = "FUGLE_API_KEY";

const DEFAULT_SYMBOLS: &[&str] = &["2330", "2317", "8069"];
const DEFAULT_DAYS_BACK: u32 = 180;
const DEFAULT_MOVING_AVERAGES: &[usize] = &[20, 60];
const DEFAULT_CHART_DIR: &str = "charts";
const DEFAULT_SNAPSHOT_DIR: &str = "snapshots";

/// Where chart images come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartSource {
    /// Fetch candles from the API and draw them ourselves
    Api,
    /// Screenshot the chart widget on the public web page
    Snapshot,
}

impl FromStr for ChartSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "api" => Ok(ChartSource::Api),
            "snapshot" => Ok(ChartSource::Snapshot),
            other => Err(format!("unknown source '{}', expected 'api' or 'snapshot'", other)),
        }
    }
}

/// Browser variant settings
#[derive(Debug, Clone)]
#[cfg_attr(not(feature = "snapshot"), allow(dead_code))]
pub struct SnapshotSettings {
    /// Page URL; `{symbol}` is substituted
    pub url_template: String,
    /// Text identifying the chart card to capture
    pub widget_text: String,
    /// Time-range control clicked before capturing, if present on the page
    pub range_button_text: Option<String>,
    pub viewport: (u32, u32),
}

impl Default for SnapshotSettings {
    fn default() -> Self {
        Self {
            url_template: "https://www.fugle.tw/ai/{symbol}".to_string(),
            widget_text: "股價K線".to_string(),
            range_button_text: Some("1Y".to_string()),
            viewport: (1440, 900),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub source: ChartSource,
    pub api_key: Option<String>,
    pub base_url: String,
    pub symbols: Vec<String>,
    pub days_back: u32,
    pub moving_averages: Vec<usize>,
    pub timeframe: Timeframe,
    pub output_root: PathBuf,
    pub request_delay: Duration,
    #[cfg_attr(not(feature = "snapshot"), allow(dead_code))]
    pub snapshot: SnapshotSettings,
}

impl Config {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build and validate a configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let source = match get("CHART_SOURCE") {
            Some(raw) => raw.parse::<ChartSource>().map_err(|message| ConfigError::Invalid {
                key: "CHART_SOURCE",
                message,
            })?,
            None => ChartSource::Api,
        };
        if source == ChartSource::Snapshot && !cfg!(feature = "snapshot") {
            return Err(ConfigError::Invalid {
                key: "CHART_SOURCE",
                message: "snapshot support was not compiled in (build with --features snapshot)".to_string(),
            });
        }

        let api_key = get(API_KEY_VAR);
        if source == ChartSource::Api && api_key.is_none() {
            return Err(ConfigError::MissingCredential(API_KEY_VAR));
        }

        let symbols = match get("CHART_SYMBOLS") {
            Some(raw) => parse_list(&raw),
            None => DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
        };
        if symbols.is_empty() {
            return Err(ConfigError::Invalid {
                key: "CHART_SYMBOLS",
                message: "at least one symbol is required".to_string(),
            });
        }

        let days_back = match get("CHART_DAYS_BACK") {
            Some(raw) => parse_positive("CHART_DAYS_BACK", &raw)?,
            None => DEFAULT_DAYS_BACK,
        };

        let moving_averages = match get("CHART_MAV") {
            Some(raw) => parse_list(&raw)
                .iter()
                .map(|w| parse_positive::<usize>("CHART_MAV", w))
                .collect::<Result<Vec<_>, _>>()?,
            None => DEFAULT_MOVING_AVERAGES.to_vec(),
        };

        let timeframe = match get("CHART_TIMEFRAME") {
            Some(raw) => raw.parse::<Timeframe>().map_err(|message| ConfigError::Invalid {
                key: "CHART_TIMEFRAME",
                message,
            })?,
            None => Timeframe::Day,
        };

        let output_root = get("CHART_OUT_DIR").map(PathBuf::from).unwrap_or_else(|| {
            PathBuf::from(match source {
                ChartSource::Api => DEFAULT_CHART_DIR,
                ChartSource::Snapshot => DEFAULT_SNAPSHOT_DIR,
            })
        });

        let request_delay = match get("CHART_REQUEST_DELAY_MS") {
            Some(raw) => Duration::from_millis(raw.trim().parse::<u64>().map_err(|e| {
                ConfigError::Invalid {
                    key: "CHART_REQUEST_DELAY_MS",
                    message: e.to_string(),
                }
            })?),
            None => Duration::ZERO,
        };

        let defaults = SnapshotSettings::default();
        let snapshot = SnapshotSettings {
            url_template: get("SNAPSHOT_URL_TEMPLATE").unwrap_or(defaults.url_template),
            widget_text: get("SNAPSHOT_WIDGET_TEXT").unwrap_or(defaults.widget_text),
            range_button_text: match get("SNAPSHOT_RANGE_BUTTON") {
                Some(raw) if raw.trim().eq_ignore_ascii_case("none") => None,
                Some(raw) => Some(raw),
                None => defaults.range_button_text,
            },
            viewport: defaults.viewport,
        };

        Ok(Self {
            source,
            api_key,
            base_url: get("FUGLE_BASE_URL").unwrap_or_else(|| FugleClient::DEFAULT_BASE_URL.to_string()),
            symbols,
            days_back,
            moving_averages,
            timeframe,
            output_root,
            request_delay,
            snapshot,
        })
    }

    /// Freeze the tunables for one invocation on `run_date`
    pub fn run_context(&self, run_date: NaiveDate) -> RunContext {
        RunContext {
            symbols: self.symbols.clone(),
            days_back: self.days_back,
            moving_averages: self.moving_averages.clone(),
            timeframe: self.timeframe,
            output_root: self.output_root.clone(),
            run_date,
        }
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_positive<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + Default,
{
    match raw.trim().parse::<T>() {
        Ok(value) if value > T::default() => Ok(value),
        _ => Err(ConfigError::Invalid {
            key,
            message: format!("expected a positive integer, got '{}'", raw),
        }),
    }
}
