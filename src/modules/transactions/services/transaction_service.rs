use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::record_fetcher::RecordFetcher;
use crate::core::{AppError, RawTimestamp, Result};
use crate::modules::analytics::models::Period;
use crate::modules::analytics::services::window_resolver;
use crate::modules::transactions::models::{
    CreateTransactionRequest, StatusFilter, TransactionRecord, TransactionStatus,
    UpdateStatusRequest, SOURCE_API_DIRECT, SOURCE_QR_GENERATED,
};

/// Parameters of a ledger listing
#[derive(Debug, Clone)]
pub struct LedgerQuery {
    pub period: Period,
    pub status: StatusFilter,
    pub limit: usize,
    pub custom_start: Option<String>,
    pub custom_end: Option<String>,
    /// Longest window the request may span, in EAT days
    pub max_window_days: u32,
}

/// QR adoption figures across a merchant's whole history
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QrInsights {
    /// Records carrying a QR marker, any status
    pub qr_count: u64,
    /// Successful QR records
    pub qr_success_count: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub qr_revenue: Decimal,
}

/// Transaction service for the merchant ledger.
///
/// Every operation is scoped to the authenticated merchant, including
/// records attributed to it as a guest.
pub struct TransactionService {
    fetcher: Arc<RecordFetcher>,
}

impl TransactionService {
    pub fn new(fetcher: Arc<RecordFetcher>) -> Self {
        Self { fetcher }
    }

    /// List the merchant's records in the window, newest first
    pub async fn list_transactions(
        &self,
        merchant_id: &str,
        query: &LedgerQuery,
        now: DateTime<Utc>,
    ) -> Result<Vec<TransactionRecord>> {
        let window = window_resolver::resolve(
            query.period,
            now,
            query.custom_start.as_deref(),
            query.custom_end.as_deref(),
            query.max_window_days,
        )?;

        let records = self
            .fetcher
            .fetch_by_merchant(merchant_id, window.start)
            .await?;

        let mut listed: Vec<TransactionRecord> = records
            .into_iter()
            .filter(|record| query.status.matches(record.status))
            .filter(|record| match record.created_at_utc() {
                Some(at) => window.contains(at),
                // Unbounded listings still show records with unreadable timestamps
                None => window.start.is_none(),
            })
            .collect();

        // Newest first; unreadable timestamps sort last
        listed.sort_by(|a, b| b.created_at_utc().cmp(&a.created_at_utc()));
        listed.truncate(query.limit);

        Ok(listed)
    }

    /// Single record, checked against direct and guest ownership
    pub async fn get_transaction(&self, id: &str, merchant_id: &str) -> Result<TransactionRecord> {
        let record = self
            .fetcher
            .repository()
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Transaction '{}' not found", id)))?;

        if !record.is_owned_by(merchant_id) {
            tracing::warn!(
                transaction_id = %id,
                merchant_id = %merchant_id,
                "Merchant denied access to transaction"
            );
            return Err(AppError::forbidden("Denied"));
        }

        Ok(record)
    }

    /// Change a record's status after an ownership check
    pub async fn update_transaction_status(
        &self,
        id: &str,
        merchant_id: &str,
        request: UpdateStatusRequest,
        now: DateTime<Utc>,
    ) -> Result<TransactionRecord> {
        self.get_transaction(id, merchant_id).await?;

        self.fetcher
            .repository()
            .update_status(id, request.status, request.reason.as_deref(), now)
            .await?;

        tracing::info!(
            transaction_id = %id,
            status = %request.status,
            "Transaction status updated"
        );

        self.get_transaction(id, merchant_id).await
    }

    /// Record a merchant-initiated pending transaction
    pub async fn create_transaction(
        &self,
        merchant_id: &str,
        request: CreateTransactionRequest,
        now: DateTime<Utc>,
    ) -> Result<TransactionRecord> {
        let phone_number = request
            .phone_number
            .filter(|phone| !phone.trim().is_empty())
            .ok_or_else(|| AppError::validation("Phone number and amount are required"))?;
        let amount = request
            .amount
            .ok_or_else(|| AppError::validation("Phone number and amount are required"))?;
        if amount <= Decimal::ZERO {
            return Err(AppError::validation("Amount must be greater than zero"));
        }

        let mut record = TransactionRecord::new(
            uuid::Uuid::new_v4().to_string(),
            merchant_id,
            amount,
            TransactionStatus::Pending,
            RawTimestamp::Native(now),
        );
        record.updated_at = Some(RawTimestamp::Native(now));
        record.phone_number = Some(phone_number);
        record.transaction_ref = Some(
            request
                .reference
                .unwrap_or_else(|| format!("Tx_{}", now.timestamp_millis())),
        );

        match request.qr_data {
            Some(qr_data) => {
                record.description = request
                    .description
                    .or_else(|| {
                        qr_data
                            .get("description")
                            .and_then(|d| d.as_str())
                            .map(str::to_string)
                    })
                    .or_else(|| Some("QR Payment".to_string()));
                record.source = Some(SOURCE_QR_GENERATED.to_string());
                record.qr_data = Some(qr_data);
            }
            None => {
                record.description = request.description;
                record.source = Some(SOURCE_API_DIRECT.to_string());
            }
        }

        self.fetcher.repository().insert(&record).await?;

        tracing::info!(
            transaction_id = %record.id,
            merchant_id = %merchant_id,
            source = record.source.as_deref().unwrap_or_default(),
            "Transaction created"
        );

        Ok(record)
    }

    /// QR adoption across all of the merchant's records
    pub async fn qr_insights(&self, merchant_id: &str) -> Result<QrInsights> {
        let records = self.fetcher.fetch_by_merchant(merchant_id, None).await?;

        let mut insights = QrInsights {
            qr_count: 0,
            qr_success_count: 0,
            qr_revenue: Decimal::ZERO,
        };
        for record in records.iter().filter(|record| record.is_qr()) {
            insights.qr_count += 1;
            if record.status == TransactionStatus::Success {
                insights.qr_success_count += 1;
                insights.qr_revenue += record.amount;
            }
        }

        Ok(insights)
    }
}
