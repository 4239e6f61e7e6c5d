use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-day aggregate of a merchant's transactions (EAT calendar day)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyBucket {
    pub date_key: String,
    /// Sum of successful amounts
    #[serde(with = "rust_decimal::serde::float")]
    pub total_revenue: Decimal,
    pub success_count: u64,
    pub pending_count: u64,
    /// `failed` and `error` records
    pub failed_count: u64,
}

impl DailyBucket {
    /// Zero-valued bucket for a day with no activity
    pub fn empty(date_key: impl Into<String>) -> Self {
        Self {
            date_key: date_key.into(),
            total_revenue: Decimal::ZERO,
            success_count: 0,
            pending_count: 0,
            failed_count: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_revenue.is_zero()
            && self.success_count == 0
            && self.pending_count == 0
            && self.failed_count == 0
    }
}
