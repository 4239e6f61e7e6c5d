use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mpesa_dashboard::config::{AppConfig, Config};
use mpesa_dashboard::middleware::{ApiKeyAuth, MerchantKeyStore, MySqlMerchantKeyStore, RequestId};
use mpesa_dashboard::modules::health::controllers::ReadinessProbe;
use mpesa_dashboard::modules::transactions::repositories::{
    MySqlTransactionRepository, TransactionRepository,
};
use mpesa_dashboard::AppState;

fn init_tracing(app: &AppConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("mpesa_dashboard={},actix_web=info", app.log_level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if app.json_logs() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn startup_error(context: &str, e: impl std::fmt::Display) -> io::Error {
    io::Error::other(format!("{}: {}", context, e))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load configuration
    let config = Config::from_env().map_err(|e| startup_error("Failed to load configuration", e))?;
    init_tracing(&config.app);
    config
        .validate()
        .map_err(|e| startup_error("Configuration validation failed", e))?;

    tracing::info!("Starting M-Pesa merchant dashboard");
    tracing::info!("Environment: {}", config.app.env);
    tracing::info!("Server binding to: {}", config.server.bind_address());

    // Create database connection pool
    let db_pool = config
        .database
        .create_pool()
        .await
        .map_err(|e| startup_error("Failed to create database pool", e))?;

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .map_err(|e| startup_error("Failed to run migrations", e))?;

    tracing::info!(
        "Database pool initialized ({} connections)",
        config.database.pool_size
    );

    let repository: Arc<dyn TransactionRepository> =
        Arc::new(MySqlTransactionRepository::new(db_pool.clone()));
    let key_store: Arc<dyn MerchantKeyStore> = Arc::new(MySqlMerchantKeyStore::new(db_pool.clone()));
    let probe: Arc<dyn ReadinessProbe> = Arc::new(db_pool);
    let state = AppState::new(repository, config.analytics.clone());

    // Start HTTP server
    let bind_address = config.server.bind_address();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(probe.clone()))
            .configure(|cfg| state.configure(cfg))
            .wrap(ApiKeyAuth::new(key_store.clone()))
            .wrap(Cors::permissive())
            .wrap(RequestId)
            .wrap(TracingLogger::default())
    })
    .workers(config.server.workers)
    .bind(&bind_address)?
    .run();

    tracing::info!("Server started at http://{}", bind_address);

    server.await
}
