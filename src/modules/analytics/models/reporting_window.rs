use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Named reporting period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Today,
    Week,
    Month,
    Year,
    Custom,
    All,
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Period::Today => write!(f, "today"),
            Period::Week => write!(f, "week"),
            Period::Month => write!(f, "month"),
            Period::Year => write!(f, "year"),
            Period::Custom => write!(f, "custom"),
            Period::All => write!(f, "all"),
        }
    }
}

impl std::str::FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "today" => Ok(Period::Today),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "year" => Ok(Period::Year),
            "custom" => Ok(Period::Custom),
            "all" => Ok(Period::All),
            _ => Err(format!("Invalid period: {}", s)),
        }
    }
}

/// Resolved query window
#[derive(Debug, Clone, PartialEq)]
pub struct ReportingWindow {
    pub period: Period,
    /// Inclusive lower bound; `None` means no lower bound
    pub start: Option<DateTime<Utc>>,
    /// Inclusive upper bound
    pub end: DateTime<Utc>,
    /// Every EAT calendar day from `start` to `end`, ascending
    pub day_keys: Vec<String>,
}

impl ReportingWindow {
    /// Whether an instant falls inside the window
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| instant >= start) && instant <= self.end
    }
}
