use std::collections::BTreeMap;

use tracing::warn;

use crate::core::timezone::day_key;
use crate::modules::analytics::models::DailyBucket;
use crate::modules::transactions::models::{TransactionRecord, TransactionStatus};

/// Outcome of folding records into daily buckets
#[derive(Debug, Clone, PartialEq)]
pub struct DailyAggregation {
    /// One bucket per requested day key, ascending
    pub buckets: Vec<DailyBucket>,
    /// Records whose timestamp could not be read
    pub skipped_malformed: usize,
    /// Records whose day key was not among the requested keys
    pub skipped_out_of_window: usize,
}

/// Fold records into one bucket per day key.
///
/// Buckets are seeded for every key so quiet days appear as zeros. Records
/// with unreadable timestamps or a day outside `day_keys` are skipped; the
/// output always has exactly the requested keys. `cancelled` records touch no
/// counter.
pub fn aggregate(records: &[TransactionRecord], day_keys: &[String]) -> DailyAggregation {
    let mut buckets: BTreeMap<String, DailyBucket> = day_keys
        .iter()
        .map(|key| (key.clone(), DailyBucket::empty(key.clone())))
        .collect();

    let mut skipped_malformed = 0;
    let mut skipped_out_of_window = 0;

    for record in records {
        let Some(created_at) = record.created_at_utc() else {
            warn!(transaction_id = %record.id, "Skipping transaction with unreadable createdAt");
            skipped_malformed += 1;
            continue;
        };

        let Some(bucket) = buckets.get_mut(&day_key(created_at)) else {
            skipped_out_of_window += 1;
            continue;
        };

        match record.status {
            TransactionStatus::Success => {
                bucket.total_revenue += record.amount;
                bucket.success_count += 1;
            }
            TransactionStatus::Pending => bucket.pending_count += 1,
            TransactionStatus::Failed | TransactionStatus::Error => bucket.failed_count += 1,
            TransactionStatus::Cancelled => {}
        }
    }

    DailyAggregation {
        // BTreeMap iterates keys in order; zero-padded keys sort chronologically
        buckets: buckets.into_values().collect(),
        skipped_malformed,
        skipped_out_of_window,
    }
}
