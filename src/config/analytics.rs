use crate::core::{AppError, Result};
use serde::Deserialize;
use std::time::Duration;

use super::env_or;

/// Limits and deadlines for the dashboard read paths
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsConfig {
    /// Deadline for one merchant record fetch, both queries included
    pub fetch_timeout_secs: u64,
    pub analytics_default_limit: usize,
    pub ledger_default_limit: usize,
    /// Upper bound for any client-supplied `limit`
    pub max_page_limit: usize,
    /// Longest window, in EAT calendar days, a request may resolve to
    pub max_window_days: u32,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: 15,
            analytics_default_limit: 50,
            ledger_default_limit: 100,
            max_page_limit: 1000,
            max_window_days: 3660,
        }
    }
}

impl AnalyticsConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            fetch_timeout_secs: env_or("ANALYTICS_FETCH_TIMEOUT_SECS", defaults.fetch_timeout_secs)?,
            analytics_default_limit: env_or(
                "ANALYTICS_DEFAULT_LIMIT",
                defaults.analytics_default_limit,
            )?,
            ledger_default_limit: env_or("LEDGER_DEFAULT_LIMIT", defaults.ledger_default_limit)?,
            max_page_limit: env_or("MAX_PAGE_LIMIT", defaults.max_page_limit)?,
            max_window_days: env_or("MAX_WINDOW_DAYS", defaults.max_window_days)?,
        })
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Requested limit, or `default`, capped at `max_page_limit`
    pub fn page_limit(&self, requested: Option<usize>, default: usize) -> Result<usize> {
        match requested {
            Some(0) => Err(AppError::validation("limit must be greater than 0")),
            Some(limit) => Ok(limit.min(self.max_page_limit)),
            None => Ok(default.min(self.max_page_limit)),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.fetch_timeout_secs == 0 {
            return Err(AppError::Configuration(
                "Fetch timeout must be greater than 0".to_string(),
            ));
        }

        if self.analytics_default_limit == 0
            || self.ledger_default_limit == 0
            || self.max_page_limit == 0
        {
            return Err(AppError::Configuration(
                "Page limits must be greater than 0".to_string(),
            ));
        }

        if self.analytics_default_limit > self.max_page_limit
            || self.ledger_default_limit > self.max_page_limit
        {
            return Err(AppError::Configuration(
                "Default page limits cannot exceed MAX_PAGE_LIMIT".to_string(),
            ));
        }

        // A year window spans 366 day keys
        if self.max_window_days < 366 {
            return Err(AppError::Configuration(
                "MAX_WINDOW_DAYS must be at least 366".to_string(),
            ));
        }

        Ok(())
    }
}
