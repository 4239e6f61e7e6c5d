use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::core::timezone::{day_key, local_hour, to_local};
use crate::core::Result;
use crate::modules::analytics::models::{AnalyticsReport, AnalyticsSummary, Period};
use crate::modules::analytics::services::{daily_aggregator, trend_forecaster, window_resolver};
use crate::modules::transactions::models::{StatusFilter, TransactionRecord, TransactionStatus};
use crate::modules::transactions::services::RecordFetcher;

/// Parameters of one analytics request
#[derive(Debug, Clone)]
pub struct AnalyticsQuery {
    pub period: Period,
    pub status: StatusFilter,
    pub limit: usize,
    pub custom_start: Option<String>,
    pub custom_end: Option<String>,
    /// Longest window the request may span, in EAT days
    pub max_window_days: u32,
}

/// Builds the merchant analytics report.
///
/// Stateless apart from the store behind the fetcher; `now` is always passed
/// in by the caller.
pub struct AnalyticsService {
    fetcher: Arc<RecordFetcher>,
}

impl AnalyticsService {
    pub fn new(fetcher: Arc<RecordFetcher>) -> Self {
        Self { fetcher }
    }

    /// Resolve the window, fetch, aggregate, forecast and shape the report
    pub async fn build_analytics(
        &self,
        merchant_id: &str,
        query: &AnalyticsQuery,
        now: DateTime<Utc>,
    ) -> Result<AnalyticsReport> {
        let window = window_resolver::resolve(
            query.period,
            now,
            query.custom_start.as_deref(),
            query.custom_end.as_deref(),
            query.max_window_days,
        )?;

        let fetched = self
            .fetcher
            .fetch_by_merchant(merchant_id, window.start)
            .await?;

        // Unreadable timestamps are dropped from every figure, not just the buckets
        let fetched_count = fetched.len();
        let mut records: Vec<(DateTime<Utc>, TransactionRecord)> = fetched
            .into_iter()
            .filter_map(|record| record.created_at_utc().map(|at| (at, record)))
            .collect();
        let malformed = fetched_count - records.len();
        if malformed > 0 {
            warn!(
                merchant_id = %merchant_id,
                skipped = malformed,
                "Skipped transactions with unreadable createdAt"
            );
        }
        records.retain(|(at, _)| window.contains(*at));

        let earliest = records.iter().map(|(at, _)| *at).min();
        let window = window_resolver::anchor_unbounded(window, earliest, query.max_window_days);

        let in_window: Vec<TransactionRecord> =
            records.iter().map(|(_, record)| record.clone()).collect();
        let aggregation = daily_aggregator::aggregate(&in_window, &window.day_keys);

        let points = trend_forecaster::trend_points(
            &aggregation.buckets,
            &day_key(now),
            to_local(now),
        );
        let forecast = trend_forecaster::fit(&points);

        let summary = summarize(&in_window);
        let peak_trading_hour = peak_hour(&records);
        let recent_transactions = recent_page(records, query.status, query.limit);

        info!(
            merchant_id = %merchant_id,
            period = %query.period,
            records = summary.record_count,
            days = aggregation.buckets.len(),
            trend = %forecast.trend,
            "Built transaction analytics"
        );

        Ok(AnalyticsReport {
            period: query.period,
            window,
            summary,
            peak_trading_hour,
            forecast,
            daily_summaries: aggregation.buckets,
            recent_transactions,
        })
    }
}

/// Window-wide totals over records already restricted to the window
pub fn summarize(records: &[TransactionRecord]) -> AnalyticsSummary {
    let mut summary = AnalyticsSummary {
        record_count: records.len() as u64,
        ..AnalyticsSummary::default()
    };

    for record in records {
        match record.status {
            TransactionStatus::Success => {
                summary.total_revenue += record.amount;
                summary.total_transactions += 1;
                if record.is_qr() {
                    summary.qr_revenue += record.amount;
                    summary.qr_count += 1;
                }
            }
            TransactionStatus::Pending => summary.pending_count += 1,
            TransactionStatus::Failed | TransactionStatus::Error => summary.failed_count += 1,
            TransactionStatus::Cancelled => summary.cancelled_count += 1,
        }
    }

    summary
}

/// EAT hour with the most successful records; ties go to the earliest hour
pub fn peak_hour(records: &[(DateTime<Utc>, TransactionRecord)]) -> Option<u32> {
    let mut histogram = [0u64; 24];
    for (at, record) in records {
        if record.status == TransactionStatus::Success {
            histogram[local_hour(*at) as usize] += 1;
        }
    }

    let (hour, count) = histogram
        .iter()
        .enumerate()
        .fold((0usize, 0u64), |best, (hour, count)| {
            if *count > best.1 {
                (hour, *count)
            } else {
                best
            }
        });

    (count > 0).then_some(hour as u32)
}

/// Newest-first page of records matching the status filter
pub fn recent_page(
    mut records: Vec<(DateTime<Utc>, TransactionRecord)>,
    status: StatusFilter,
    limit: usize,
) -> Vec<TransactionRecord> {
    records.retain(|(_, record)| status.matches(record.status));
    records.sort_by(|a, b| b.0.cmp(&a.0));
    records
        .into_iter()
        .take(limit)
        .map(|(_, record)| record)
        .collect()
}
