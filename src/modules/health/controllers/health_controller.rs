use std::sync::Arc;

use actix_web::{web, HttpResponse, Responder};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;

use crate::core::timezone::format_iso8601;

/// Health check response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

/// Readiness probe response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub checks: ReadinessChecks,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessChecks {
    pub database: bool,
}

/// Dependency check behind `/ready`
#[async_trait]
pub trait ReadinessProbe: Send + Sync {
    async fn database_ready(&self) -> bool;
}

#[async_trait]
impl ReadinessProbe for MySqlPool {
    async fn database_ready(&self) -> bool {
        match sqlx::query("SELECT 1").fetch_one(self).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!("Database readiness check failed: {}", e);
                false
            }
        }
    }
}

/// GET /health - Liveness probe
/// Does not check dependencies
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: format_iso8601(chrono::Utc::now()),
    })
}

/// GET /ready - Readiness probe
pub async fn readiness_check(probe: web::Data<Arc<dyn ReadinessProbe>>) -> impl Responder {
    let database = probe.database_ready().await;
    let response = ReadinessResponse {
        ready: database,
        checks: ReadinessChecks { database },
    };

    if response.ready {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

/// Configure health check routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/ready", web::get().to(readiness_check));
}
