use std::sync::Arc;

use actix_web::{web, HttpResponse};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::AnalyticsConfig;
use crate::core::{AppError, Result};
use crate::middleware::MerchantId;
use crate::modules::analytics::models::{AnalyticsReport, AnalyticsSummary, DailyBucket, Period};
use crate::modules::analytics::services::{AnalyticsQuery, AnalyticsService};
use crate::modules::transactions::models::{StatusFilter, TransactionView};

/// Query parameters for `GET /transactions/analytics`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsParams {
    /// today | week | month | year | custom | all (default week)
    pub period: Option<String>,
    /// all or a single transaction status
    pub status: Option<String>,
    pub limit: Option<usize>,
    /// Custom window start, `YYYY-MM-DD` or RFC 3339
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl AnalyticsParams {
    fn into_query(self, config: &AnalyticsConfig) -> Result<AnalyticsQuery> {
        let period = match self.period.as_deref() {
            None | Some("") => Period::Week,
            Some(raw) => raw.parse::<Period>().map_err(AppError::validation)?,
        };

        Ok(AnalyticsQuery {
            period,
            status: StatusFilter::parse(self.status.as_deref())?,
            limit: config.page_limit(self.limit, config.analytics_default_limit)?,
            custom_start: self.start_date,
            custom_end: self.end_date,
            max_window_days: config.max_window_days,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub status: &'static str,
    pub analytics: AnalyticsBody,
    pub transactions: Vec<TransactionView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsBody {
    pub period: Period,
    pub summary: SummaryResponse,
    pub insights: InsightsResponse,
    pub daily_summaries: Vec<DailyBucket>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_revenue: Decimal,
    pub total_transactions: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub qr_revenue: Decimal,
    pub qr_count: u64,
    pub pending_count: u64,
    pub failed_count: u64,
    pub cancelled_count: u64,
    pub record_count: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsResponse {
    /// `"HH:00"` in EAT
    pub peak_trading_hour: Option<String>,
    pub prediction: PredictionResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResponse {
    pub trend_direction: String,
    pub today_revenue_forecast: i64,
    pub next_day_revenue: i64,
}

impl From<AnalyticsSummary> for SummaryResponse {
    fn from(summary: AnalyticsSummary) -> Self {
        Self {
            total_revenue: summary.total_revenue,
            total_transactions: summary.total_transactions,
            qr_revenue: summary.qr_revenue,
            qr_count: summary.qr_count,
            pending_count: summary.pending_count,
            failed_count: summary.failed_count,
            cancelled_count: summary.cancelled_count,
            record_count: summary.record_count,
        }
    }
}

impl From<AnalyticsReport> for AnalyticsResponse {
    fn from(report: AnalyticsReport) -> Self {
        let peak_trading_hour = report.peak_trading_hour_label();
        let prediction = PredictionResponse {
            trend_direction: report.forecast.trend.to_string(),
            today_revenue_forecast: report.forecast.current_period_prediction.round() as i64,
            next_day_revenue: report.forecast.next_period_prediction.round() as i64,
        };

        Self {
            status: "success",
            transactions: report
                .recent_transactions
                .iter()
                .map(TransactionView::from)
                .collect(),
            analytics: AnalyticsBody {
                period: report.period,
                summary: report.summary.into(),
                insights: InsightsResponse {
                    peak_trading_hour,
                    prediction,
                },
                daily_summaries: report.daily_summaries,
            },
        }
    }
}

/// GET /transactions/analytics
///
/// Summary, insights and per-day series for the authenticated merchant.
pub async fn get_analytics(
    service: web::Data<Arc<AnalyticsService>>,
    config: web::Data<AnalyticsConfig>,
    merchant: MerchantId,
    params: web::Query<AnalyticsParams>,
) -> std::result::Result<HttpResponse, AppError> {
    let query = params.into_inner().into_query(&config)?;
    let report = service
        .build_analytics(&merchant.0, &query, Utc::now())
        .await?;

    Ok(HttpResponse::Ok().json(AnalyticsResponse::from(report)))
}

/// Configure analytics routes
///
/// Registered ahead of the `/transactions` scope so `/{id}` does not shadow it.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/transactions/analytics", web::get().to(get_analytics));
}
