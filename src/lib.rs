//! M-Pesa merchant dashboard backend
//!
//! Transaction ledger and analytics for merchants taking QR and direct
//! payments, with day buckets and trend forecasts on the EAT clock.

pub mod config;
pub mod core;
pub mod middleware;
pub mod modules;

use std::sync::Arc;

use actix_web::web;

use crate::config::AnalyticsConfig;
use crate::modules::analytics::services::AnalyticsService;
use crate::modules::transactions::repositories::TransactionRepository;
use crate::modules::transactions::services::{RecordFetcher, TransactionService};

// Re-export commonly used types
pub use modules::analytics;
pub use modules::transactions;

/// Services shared by every worker
#[derive(Clone)]
pub struct AppState {
    pub analytics: Arc<AnalyticsService>,
    pub transactions: Arc<TransactionService>,
    pub config: AnalyticsConfig,
}

impl AppState {
    pub fn new(repository: Arc<dyn TransactionRepository>, config: AnalyticsConfig) -> Self {
        let fetcher = Arc::new(RecordFetcher::new(repository, config.fetch_timeout()));

        Self {
            analytics: Arc::new(AnalyticsService::new(fetcher.clone())),
            transactions: Arc::new(TransactionService::new(fetcher)),
            config,
        }
    }

    /// Register app data and every route
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.analytics.clone()))
            .app_data(web::Data::new(self.transactions.clone()))
            .app_data(web::Data::new(self.config.clone()))
            .configure(modules::health::controllers::configure)
            .configure(modules::analytics::controllers::configure)
            .configure(modules::transactions::controllers::configure);
    }
}
