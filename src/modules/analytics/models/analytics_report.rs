use rust_decimal::Decimal;

use super::{DailyBucket, Forecast, Period, ReportingWindow};
use crate::modules::transactions::models::TransactionRecord;

/// Window-wide totals
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnalyticsSummary {
    /// Sum of successful amounts in the window
    pub total_revenue: Decimal,
    /// Number of successful records in the window
    pub total_transactions: u64,
    /// Successful QR-initiated revenue
    pub qr_revenue: Decimal,
    /// Number of successful QR-initiated records
    pub qr_count: u64,
    pub pending_count: u64,
    /// `failed` and `error` records
    pub failed_count: u64,
    pub cancelled_count: u64,
    /// Every readable record in the window, any status
    pub record_count: u64,
}

/// Everything the analytics endpoint reports for one merchant and window
#[derive(Debug, Clone)]
pub struct AnalyticsReport {
    pub period: Period,
    pub window: ReportingWindow,
    pub summary: AnalyticsSummary,
    /// EAT hour (0-23) with the most successful records
    pub peak_trading_hour: Option<u32>,
    pub forecast: Forecast,
    /// One bucket per day of the window, ascending
    pub daily_summaries: Vec<DailyBucket>,
    /// Newest-first page of status-filtered records
    pub recent_transactions: Vec<TransactionRecord>,
}

impl AnalyticsReport {
    /// `HH:00` label of the peak hour
    pub fn peak_trading_hour_label(&self) -> Option<String> {
        self.peak_trading_hour.map(|hour| format!("{:02}:00", hour))
    }
}
