use serde::{Deserialize, Serialize};

/// One `(day index, revenue)` regression input
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendPoint {
    /// Sequential day index starting at 1
    pub x: f64,
    pub y: f64,
}

impl TrendPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Direction of the revenue trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendLabel {
    Growth,
    Decline,
    Stable,
}

impl std::fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendLabel::Growth => write!(f, "growth"),
            TrendLabel::Decline => write!(f, "decline"),
            TrendLabel::Stable => write!(f, "stable"),
        }
    }
}

/// Least-squares revenue forecast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Forecast {
    pub slope: f64,
    pub intercept: f64,
    /// Fitted value at the last day (never negative)
    pub current_period_prediction: f64,
    /// Fitted value one day past the last day (never negative)
    pub next_period_prediction: f64,
    pub trend: TrendLabel,
}

impl Forecast {
    /// Result used when there is not enough data to fit a line
    pub fn flat() -> Self {
        Self {
            slope: 0.0,
            intercept: 0.0,
            current_period_prediction: 0.0,
            next_period_prediction: 0.0,
            trend: TrendLabel::Stable,
        }
    }
}
