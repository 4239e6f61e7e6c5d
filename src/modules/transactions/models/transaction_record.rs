use crate::core::timezone::format_iso8601;
use crate::core::{AppError, RawTimestamp, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Source marker for transactions started from a scanned QR code
pub const SOURCE_QR_GENERATED: &str = "qr_generated";

/// Source marker for transactions started directly through the API
pub const SOURCE_API_DIRECT: &str = "api_direct";

/// Mobile-money transaction status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// STK push sent, awaiting customer confirmation
    Pending,
    /// Payment confirmed by the provider
    Success,
    /// Payment rejected by the provider
    Failed,
    /// Customer cancelled the prompt
    Cancelled,
    /// Provider or callback error
    Error,
}

impl Default for TransactionStatus {
    fn default() -> Self {
        TransactionStatus::Pending
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionStatus::Pending => write!(f, "pending"),
            TransactionStatus::Success => write!(f, "success"),
            TransactionStatus::Failed => write!(f, "failed"),
            TransactionStatus::Cancelled => write!(f, "cancelled"),
            TransactionStatus::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TransactionStatus::Pending),
            "success" => Ok(TransactionStatus::Success),
            "failed" => Ok(TransactionStatus::Failed),
            "cancelled" => Ok(TransactionStatus::Cancelled),
            "error" => Ok(TransactionStatus::Error),
            _ => Err(format!("Invalid transaction status: {}", s)),
        }
    }
}

/// Status filter accepted by the list and analytics endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(TransactionStatus),
}

impl StatusFilter {
    /// Parse `all` or any transaction status
    pub fn parse(value: Option<&str>) -> Result<Self> {
        match value.map(str::trim) {
            None | Some("") | Some("all") => Ok(StatusFilter::All),
            Some(other) => other
                .parse::<TransactionStatus>()
                .map(StatusFilter::Only)
                .map_err(AppError::validation),
        }
    }

    pub fn matches(&self, status: TransactionStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }
}

/// Attribution of a record created under another identity to a merchant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestMerchantInfo {
    pub original_merchant_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shop_name: Option<String>,
}

/// A stored mobile-money transaction.
///
/// Owned by the payment flow; analytics only reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub id: String,
    pub merchant_id: String,
    pub guest_merchant_info: Option<GuestMerchantInfo>,
    pub amount: Decimal,
    pub status: TransactionStatus,
    pub created_at: RawTimestamp,
    pub updated_at: Option<RawTimestamp>,
    pub phone_number: Option<String>,
    pub transaction_ref: Option<String>,
    pub description: Option<String>,
    pub source: Option<String>,
    pub qr_data: Option<Value>,
    pub update_reason: Option<String>,
}

impl TransactionRecord {
    /// Create a record with only the fields analytics needs
    pub fn new(
        id: impl Into<String>,
        merchant_id: impl Into<String>,
        amount: Decimal,
        status: TransactionStatus,
        created_at: RawTimestamp,
    ) -> Self {
        Self {
            id: id.into(),
            merchant_id: merchant_id.into(),
            guest_merchant_info: None,
            amount,
            status,
            created_at,
            updated_at: None,
            phone_number: None,
            transaction_ref: None,
            description: None,
            source: None,
            qr_data: None,
            update_reason: None,
        }
    }

    /// Attribute this record to another merchant as a guest transaction
    pub fn with_guest_owner(mut self, original_merchant_id: impl Into<String>) -> Self {
        self.guest_merchant_info = Some(GuestMerchantInfo {
            original_merchant_id: original_merchant_id.into(),
            shop_name: None,
        });
        self
    }

    /// Mark this record as started from a QR code
    pub fn with_qr_data(mut self, qr_data: Value) -> Self {
        self.qr_data = Some(qr_data);
        self.source = Some(SOURCE_QR_GENERATED.to_string());
        self
    }

    /// Normalized creation instant, `None` for unreadable timestamps
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        self.created_at.normalize()
    }

    /// Merchant id named by guest attribution, if any
    pub fn guest_merchant_id(&self) -> Option<&str> {
        self.guest_merchant_info
            .as_ref()
            .map(|info| info.original_merchant_id.as_str())
    }

    /// Whether the merchant owns this record directly or by guest attribution
    pub fn is_owned_by(&self, merchant_id: &str) -> bool {
        self.merchant_id == merchant_id || self.guest_merchant_id() == Some(merchant_id)
    }

    /// Whether the record originated from a QR-code flow
    pub fn is_qr(&self) -> bool {
        self.qr_data.is_some() || self.source.as_deref() == Some(SOURCE_QR_GENERATED)
    }
}

/// Transaction as returned to the dashboard.
///
/// Timestamps are always ISO-8601 UTC strings, never provider objects.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionView {
    pub id: String,
    pub merchant_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_merchant_info: Option<GuestMerchantInfo>,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub status: TransactionStatus,
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_reason: Option<String>,
}

impl From<&TransactionRecord> for TransactionView {
    fn from(record: &TransactionRecord) -> Self {
        Self {
            id: record.id.clone(),
            merchant_id: record.merchant_id.clone(),
            guest_merchant_info: record.guest_merchant_info.clone(),
            amount: record.amount,
            status: record.status,
            created_at: record.created_at.normalize().map(format_iso8601),
            updated_at: record
                .updated_at
                .as_ref()
                .and_then(RawTimestamp::normalize)
                .map(format_iso8601),
            phone_number: record.phone_number.clone(),
            transaction_ref: record.transaction_ref.clone(),
            description: record.description.clone(),
            source: record.source.clone(),
            qr_data: record.qr_data.clone(),
            update_reason: record.update_reason.clone(),
        }
    }
}

/// Body of `POST /transactions`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    pub phone_number: Option<String>,
    pub amount: Option<Decimal>,
    pub qr_data: Option<Value>,
    pub reference: Option<String>,
    pub description: Option<String>,
}

/// Body of `PATCH /transactions/{id}/status`
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: TransactionStatus,
    pub reason: Option<String>,
}
