use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::core::{AppError, Result};
use crate::modules::transactions::models::TransactionRecord;
use crate::modules::transactions::repositories::TransactionRepository;

/// Retrieves every record a merchant owns, directly or by guest attribution.
///
/// Direct and guest lookups run concurrently. When the ranged lookups fail
/// (e.g. a missing composite index) both are retried as single-condition
/// lookups. Either way the range is re-applied in-process on the normalized
/// timestamp, since ranged lookups also return rows that only carry a raw
/// timestamp. The union is deduplicated by record id, keeping the direct copy.
pub struct RecordFetcher {
    repository: Arc<dyn TransactionRepository>,
    timeout: Duration,
}

impl RecordFetcher {
    pub fn new(repository: Arc<dyn TransactionRepository>, timeout: Duration) -> Self {
        Self { repository, timeout }
    }

    pub fn repository(&self) -> &Arc<dyn TransactionRepository> {
        &self.repository
    }

    /// Fetch all of a merchant's records created at or after `since`
    /// (everything when `since` is `None`), bounded by the fetch timeout.
    pub async fn fetch_by_merchant(
        &self,
        merchant_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<TransactionRecord>> {
        tokio::time::timeout(self.timeout, self.fetch_with_fallback(merchant_id, since))
            .await
            .map_err(|_| {
                AppError::Timeout(format!(
                    "Fetching transactions exceeded {}s",
                    self.timeout.as_secs()
                ))
            })?
    }

    async fn fetch_with_fallback(
        &self,
        merchant_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<TransactionRecord>> {
        let primary = tokio::try_join!(
            self.repository.find_direct(merchant_id, since),
            self.repository.find_guest(merchant_id, since),
        );

        let (direct, guest) = match primary {
            Ok((direct, guest)) => (retain_since(direct, since), retain_since(guest, since)),
            Err(e) if since.is_some() => {
                warn!(
                    merchant_id = %merchant_id,
                    "Ranged transaction query failed, falling back to simple queries: {}",
                    e
                );
                let (direct, guest) = tokio::try_join!(
                    self.repository.find_direct(merchant_id, None),
                    self.repository.find_guest(merchant_id, None),
                )?;
                (
                    retain_since(direct, since),
                    retain_since(guest, since),
                )
            }
            Err(e) => return Err(e),
        };

        let merged = union_by_id(direct, guest);
        debug!(merchant_id = %merchant_id, records = merged.len(), "Fetched merchant transactions");

        Ok(merged)
    }
}

/// Union of two record sets; a record present in both appears once, taken from `direct`
pub fn union_by_id(
    direct: Vec<TransactionRecord>,
    guest: Vec<TransactionRecord>,
) -> Vec<TransactionRecord> {
    let mut seen: HashSet<String> = HashSet::with_capacity(direct.len() + guest.len());
    let mut merged = Vec::with_capacity(direct.len() + guest.len());

    for record in direct.into_iter().chain(guest) {
        if seen.insert(record.id.clone()) {
            merged.push(record);
        }
    }

    merged
}

fn retain_since(
    records: Vec<TransactionRecord>,
    since: Option<DateTime<Utc>>,
) -> Vec<TransactionRecord> {
    match since {
        Some(since) => records
            .into_iter()
            .filter(|record| record.created_at_utc().is_some_and(|at| at >= since))
            .collect(),
        None => records,
    }
}
