use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::transaction_repository::TransactionRepository;
use crate::core::{AppError, RawTimestamp, Result};
use crate::modules::transactions::models::{TransactionRecord, TransactionStatus};

/// In-process transaction store.
///
/// Used by the test suites and local demos. `fail_ranged_queries` makes every
/// ranged lookup fail the way a store with a missing composite index does.
#[derive(Default)]
pub struct InMemoryTransactionRepository {
    records: RwLock<Vec<TransactionRecord>>,
    fail_ranged_queries: AtomicBool,
    ranged_calls: AtomicUsize,
    unranged_calls: AtomicUsize,
}

impl InMemoryTransactionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<TransactionRecord>) -> Self {
        Self {
            records: RwLock::new(records),
            ..Self::default()
        }
    }

    /// Make ranged queries return a database error
    pub fn fail_ranged_queries(&self, fail: bool) {
        self.fail_ranged_queries.store(fail, Ordering::SeqCst);
    }

    /// Number of ranged queries issued so far
    pub fn ranged_calls(&self) -> usize {
        self.ranged_calls.load(Ordering::SeqCst)
    }

    /// Number of unranged queries issued so far
    pub fn unranged_calls(&self) -> usize {
        self.unranged_calls.load(Ordering::SeqCst)
    }

    fn select<F>(&self, since: Option<DateTime<Utc>>, matches: F) -> Result<Vec<TransactionRecord>>
    where
        F: Fn(&TransactionRecord) -> bool,
    {
        match since {
            Some(_) => {
                self.ranged_calls.fetch_add(1, Ordering::SeqCst);
                if self.fail_ranged_queries.load(Ordering::SeqCst) {
                    return Err(AppError::Database(sqlx::Error::Protocol(
                        "The query requires an index".to_string(),
                    )));
                }
            }
            None => {
                self.unranged_calls.fetch_add(1, Ordering::SeqCst);
            }
        }

        let records = self
            .records
            .read()
            .map_err(|_| AppError::internal("Transaction store lock poisoned"))?;

        Ok(records
            .iter()
            .filter(|record| matches(record))
            .filter(|record| match (since, &record.created_at) {
                // Same as the SQL range: only the native column is compared
                (Some(since), RawTimestamp::Native(at)) => *at >= since,
                _ => true,
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TransactionRepository for InMemoryTransactionRepository {
    async fn find_direct(
        &self,
        merchant_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<TransactionRecord>> {
        self.select(since, |record| record.merchant_id == merchant_id)
    }

    async fn find_guest(
        &self,
        merchant_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<TransactionRecord>> {
        self.select(since, |record| record.guest_merchant_id() == Some(merchant_id))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<TransactionRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| AppError::internal("Transaction store lock poisoned"))?;

        Ok(records.iter().find(|record| record.id == id).cloned())
    }

    async fn insert(&self, record: &TransactionRecord) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| AppError::internal("Transaction store lock poisoned"))?;

        if records.iter().any(|existing| existing.id == record.id) {
            return Err(AppError::internal(format!(
                "Transaction '{}' already exists",
                record.id
            )));
        }

        records.push(record.clone());
        Ok(())
    }

    async fn update_status(
        &self,
        id: &str,
        status: TransactionStatus,
        reason: Option<&str>,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| AppError::internal("Transaction store lock poisoned"))?;

        let record = records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or_else(|| AppError::not_found(format!("Transaction with id '{}' not found", id)))?;

        record.status = status;
        record.update_reason = reason.map(str::to_string);
        record.updated_at = Some(RawTimestamp::Native(updated_at));
        Ok(())
    }
}
