use std::sync::Arc;

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::AnalyticsConfig;
use crate::core::error::AppError;
use crate::middleware::MerchantId;
use crate::modules::analytics::models::Period;
use crate::modules::transactions::models::{
    CreateTransactionRequest, StatusFilter, TransactionRecord, TransactionView,
    UpdateStatusRequest,
};
use crate::modules::transactions::services::{LedgerQuery, TransactionService};

/// Query parameters for the ledger listings
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub period: Option<String>,
    pub status: Option<String>,
    pub limit: Option<usize>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl ListParams {
    fn into_query(self, config: &AnalyticsConfig) -> Result<LedgerQuery, AppError> {
        let period = match self.period.as_deref() {
            None | Some("") => Period::All,
            Some(raw) => raw.parse::<Period>().map_err(AppError::validation)?,
        };

        Ok(LedgerQuery {
            period,
            status: StatusFilter::parse(self.status.as_deref())?,
            limit: config.page_limit(self.limit, config.ledger_default_limit)?,
            custom_start: self.start_date,
            custom_end: self.end_date,
            max_window_days: config.max_window_days,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct TransactionListResponse {
    pub status: &'static str,
    pub count: usize,
    pub transactions: Vec<TransactionView>,
}

impl From<Vec<TransactionRecord>> for TransactionListResponse {
    fn from(records: Vec<TransactionRecord>) -> Self {
        Self {
            status: "success",
            count: records.len(),
            transactions: records.iter().map(TransactionView::from).collect(),
        }
    }
}

/// List transactions in a window
/// GET /transactions
pub async fn list_transactions(
    service: web::Data<Arc<TransactionService>>,
    config: web::Data<AnalyticsConfig>,
    merchant: MerchantId,
    params: web::Query<ListParams>,
) -> Result<HttpResponse, AppError> {
    let query = params.into_inner().into_query(&config)?;
    let records = service
        .list_transactions(&merchant.0, &query, Utc::now())
        .await?;

    Ok(HttpResponse::Ok().json(TransactionListResponse::from(records)))
}

/// Full ledger, every status
/// GET /transactions/all
pub async fn list_all_transactions(
    service: web::Data<Arc<TransactionService>>,
    config: web::Data<AnalyticsConfig>,
    merchant: MerchantId,
    params: web::Query<ListParams>,
) -> Result<HttpResponse, AppError> {
    let mut params = params.into_inner();
    params.status = None;
    let query = params.into_query(&config)?;
    let records = service
        .list_transactions(&merchant.0, &query, Utc::now())
        .await?;

    Ok(HttpResponse::Ok().json(TransactionListResponse::from(records)))
}

/// GET /transactions/qr-insights
pub async fn get_qr_insights(
    service: web::Data<Arc<TransactionService>>,
    merchant: MerchantId,
) -> Result<HttpResponse, AppError> {
    let insights = service.qr_insights(&merchant.0).await?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "insights": insights,
    })))
}

/// GET /transactions/{id}
pub async fn get_transaction(
    service: web::Data<Arc<TransactionService>>,
    merchant: MerchantId,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let record = service
        .get_transaction(&path.into_inner(), &merchant.0)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "transaction": TransactionView::from(&record),
    })))
}

/// PATCH /transactions/{id}/status
pub async fn update_transaction_status(
    service: web::Data<Arc<TransactionService>>,
    merchant: MerchantId,
    path: web::Path<String>,
    request: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let record = service
        .update_transaction_status(&path.into_inner(), &merchant.0, request.into_inner(), Utc::now())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "transaction": TransactionView::from(&record),
    })))
}

/// POST /transactions
pub async fn create_transaction(
    service: web::Data<Arc<TransactionService>>,
    merchant: MerchantId,
    request: web::Json<CreateTransactionRequest>,
) -> Result<HttpResponse, AppError> {
    let record = service
        .create_transaction(&merchant.0, request.into_inner(), Utc::now())
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "status": "Transaction successful",
        "data": { "transactionId": record.id },
    })))
}

/// Configure transaction routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/transactions")
            .route("", web::get().to(list_transactions))
            .route("", web::post().to(create_transaction))
            .route("/all", web::get().to(list_all_transactions))
            .route("/qr-insights", web::get().to(get_qr_insights))
            .route("/{id}", web::get().to(get_transaction))
            .route("/{id}/status", web::patch().to(update_transaction_status)),
    );
}
