use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, MySqlPool};

use crate::core::{AppError, RawTimestamp, Result};
use crate::modules::transactions::models::{
    GuestMerchantInfo, TransactionRecord, TransactionStatus,
};

/// Read/write access to stored transaction records.
///
/// `since = Some(..)` issues the ranged (compound) query; `since = None` issues
/// the single-condition query used as a fallback when the ranged one fails.
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Records whose `merchantId` equals the merchant
    async fn find_direct(
        &self,
        merchant_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<TransactionRecord>>;

    /// Records attributed to the merchant through guest attribution
    async fn find_guest(
        &self,
        merchant_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<TransactionRecord>>;

    /// Single record by id
    async fn find_by_id(&self, id: &str) -> Result<Option<TransactionRecord>>;

    /// Persist a new record
    async fn insert(&self, record: &TransactionRecord) -> Result<()>;

    /// Change a record's status, stamping the update time and reason
    async fn update_status(
        &self,
        id: &str,
        status: TransactionStatus,
        reason: Option<&str>,
        updated_at: DateTime<Utc>,
    ) -> Result<()>;
}

/// Row shape of `merchant_transactions`
#[derive(Debug, FromRow)]
struct TransactionRow {
    id: String,
    merchant_id: String,
    guest_merchant_id: Option<String>,
    guest_shop_name: Option<String>,
    amount: Decimal,
    status: String,
    created_at: Option<DateTime<Utc>>,
    created_at_raw: Option<serde_json::Value>,
    updated_at: Option<DateTime<Utc>>,
    phone_number: Option<String>,
    transaction_ref: Option<String>,
    description: Option<String>,
    source: Option<String>,
    qr_data: Option<serde_json::Value>,
    update_reason: Option<String>,
}

impl TransactionRow {
    fn into_record(self) -> std::result::Result<TransactionRecord, String> {
        let status = self.status.parse::<TransactionStatus>()?;

        // Native column wins; legacy rows only carry the raw stored shape
        let created_at = match (self.created_at, self.created_at_raw) {
            (Some(native), _) => RawTimestamp::Native(native),
            (None, Some(raw)) => RawTimestamp::from_json(&raw),
            (None, None) => RawTimestamp::Unrecognized(serde_json::Value::Null),
        };

        Ok(TransactionRecord {
            id: self.id,
            merchant_id: self.merchant_id,
            guest_merchant_info: self.guest_merchant_id.map(|original_merchant_id| {
                GuestMerchantInfo {
                    original_merchant_id,
                    shop_name: self.guest_shop_name,
                }
            }),
            amount: self.amount,
            status,
            created_at,
            updated_at: self.updated_at.map(RawTimestamp::Native),
            phone_number: self.phone_number,
            transaction_ref: self.transaction_ref,
            description: self.description,
            source: self.source,
            qr_data: self.qr_data,
            update_reason: self.update_reason,
        })
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT
        id, merchant_id, guest_merchant_id, guest_shop_name, amount, status,
        created_at, created_at_raw, updated_at, phone_number, transaction_ref,
        description, source, qr_data, update_reason
    FROM merchant_transactions
"#;

/// MySQL-backed transaction repository
pub struct MySqlTransactionRepository {
    pool: MySqlPool,
}

impl MySqlTransactionRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn find_where(
        &self,
        column: &str,
        merchant_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<TransactionRecord>> {
        let rows = match since {
            Some(since) => {
                // Rows with only `created_at_raw` are range-checked by the caller
                let sql = format!(
                    "{} WHERE {} = ? AND (created_at >= ? OR created_at IS NULL)",
                    SELECT_COLUMNS, column
                );
                sqlx::query_as::<_, TransactionRow>(&sql)
                    .bind(merchant_id)
                    .bind(since)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("{} WHERE {} = ?", SELECT_COLUMNS, column);
                sqlx::query_as::<_, TransactionRow>(&sql)
                    .bind(merchant_id)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(decode_rows(rows))
    }
}

/// Decode rows, dropping any with an unknown status value
fn decode_rows(rows: Vec<TransactionRow>) -> Vec<TransactionRecord> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id.clone();
            match row.into_record() {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(transaction_id = %id, "Skipping undecodable transaction row: {}", e);
                    None
                }
            }
        })
        .collect()
}

#[async_trait]
impl TransactionRepository for MySqlTransactionRepository {
    async fn find_direct(
        &self,
        merchant_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<TransactionRecord>> {
        self.find_where("merchant_id", merchant_id, since).await
    }

    async fn find_guest(
        &self,
        merchant_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<TransactionRecord>> {
        self.find_where("guest_merchant_id", merchant_id, since).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<TransactionRecord>> {
        let sql = format!("{} WHERE id = ?", SELECT_COLUMNS);
        let row = sqlx::query_as::<_, TransactionRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| row.into_record().map_err(AppError::internal))
            .transpose()
    }

    async fn insert(&self, record: &TransactionRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO merchant_transactions (
                id, merchant_id, guest_merchant_id, guest_shop_name, amount, status,
                created_at, created_at_raw, updated_at, phone_number, transaction_ref,
                description, source, qr_data, update_reason
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.merchant_id)
        .bind(record.guest_merchant_id())
        .bind(
            record
                .guest_merchant_info
                .as_ref()
                .and_then(|info| info.shop_name.as_deref()),
        )
        .bind(record.amount)
        .bind(record.status.to_string())
        .bind(record.created_at.normalize())
        .bind(record.created_at.to_json())
        .bind(record.updated_at.as_ref().and_then(RawTimestamp::normalize))
        .bind(&record.phone_number)
        .bind(&record.transaction_ref)
        .bind(&record.description)
        .bind(&record.source)
        .bind(&record.qr_data)
        .bind(&record.update_reason)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to create transaction: {}", e)))?;

        Ok(())
    }

    async fn update_status(
        &self,
        id: &str,
        status: TransactionStatus,
        reason: Option<&str>,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE merchant_transactions
            SET status = ?, update_reason = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(status.to_string())
        .bind(reason)
        .bind(updated_at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to update transaction status: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Transaction with id '{}' not found",
                id
            )));
        }

        Ok(())
    }
}
