use std::fmt;
use std::str::FromStr;

/// Candle bucketing accepted by the historical candles endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timeframe {
    Day,
    Week,
    Month,
    /// Intraday minute bars (1, 3, 5, 10, 15, 30 or 60)
    Minutes(u8),
}

impl Timeframe {
    const INTRADAY_MINUTES: [u8; 7] = [1, 3, 5, 10, 15, 30, 60];

    /// Code sent as the `timeframe` query parameter and used in file names
    pub fn code(&self) -> String {
        match self {
            Timeframe::Day => "D".to_string(),
            Timeframe::Week => "W".to_string(),
            Timeframe::Month => "M".to_string(),
            Timeframe::Minutes(m) => m.to_string(),
        }
    }

    /// Intraday requests cannot carry a from/to range; the provider picks its own window
    pub fn is_intraday(&self) -> bool {
        matches!(self, Timeframe::Minutes(_))
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "D" | "d" => Ok(Timeframe::Day),
            "W" | "w" => Ok(Timeframe::Week),
            "M" | "m" => Ok(Timeframe::Month),
            other => other
                .parse::<u8>()
                .ok()
                .filter(|m| Self::INTRADAY_MINUTES.contains(m))
                .map(Timeframe::Minutes)
                .ok_or_else(|| {
                    format!(
                        "Unknown timeframe '{}'. Supported: D, W, M, 1, 3, 5, 10, 15, 30, 60",
                        other
                    )
                }),
        }
    }
}
