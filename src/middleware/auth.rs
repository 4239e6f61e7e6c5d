use crate::core::AppError;
use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    Error, FromRequest, HttpMessage, HttpRequest,
};
use async_trait::async_trait;
use futures_util::future::LocalBoxFuture;
use sha2::{Digest, Sha256};
use sqlx::MySqlPool;
use std::collections::HashMap;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;

/// Paths served without a merchant identity
const PUBLIC_PATHS: &[&str] = &["/health", "/ready"];

/// Authenticated merchant, injected by [`ApiKeyAuth`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerchantId(pub String);

impl FromRequest for MerchantId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<MerchantId>()
                .cloned()
                .ok_or_else(|| Error::from(AppError::unauthorized("Missing merchant identity"))),
        )
    }
}

/// Resolves a hashed API key to the merchant that owns it
#[async_trait]
pub trait MerchantKeyStore: Send + Sync {
    async fn merchant_for_key_hash(&self, key_hash: &str) -> crate::core::Result<Option<String>>;
}

/// `merchant_api_keys` table lookup
pub struct MySqlMerchantKeyStore {
    pool: MySqlPool,
}

impl MySqlMerchantKeyStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MerchantKeyStore for MySqlMerchantKeyStore {
    async fn merchant_for_key_hash(&self, key_hash: &str) -> crate::core::Result<Option<String>> {
        let merchant_id = sqlx::query_scalar::<_, String>(
            r#"
            SELECT merchant_id
            FROM merchant_api_keys
            WHERE key_hash = ? AND is_active = TRUE
            LIMIT 1
            "#,
        )
        .bind(key_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(merchant_id)
    }
}

/// Fixed key table, for tests and local runs
#[derive(Debug, Default, Clone)]
pub struct StaticMerchantKeyStore {
    keys: HashMap<String, String>,
}

impl StaticMerchantKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plain-text key for a merchant
    pub fn with_key(mut self, api_key: &str, merchant_id: &str) -> Self {
        self.keys.insert(hash_api_key(api_key), merchant_id.to_string());
        self
    }
}

#[async_trait]
impl MerchantKeyStore for StaticMerchantKeyStore {
    async fn merchant_for_key_hash(&self, key_hash: &str) -> crate::core::Result<Option<String>> {
        Ok(self.keys.get(key_hash).cloned())
    }
}

/// SHA-256 hex digest stored in place of the plain key
pub fn hash_api_key(api_key: &str) -> String {
    hex::encode(Sha256::digest(api_key.as_bytes()))
}

/// API key authentication middleware
pub struct ApiKeyAuth {
    store: Arc<dyn MerchantKeyStore>,
}

impl ApiKeyAuth {
    pub fn new(store: Arc<dyn MerchantKeyStore>) -> Self {
        Self { store }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ApiKeyAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = ApiKeyAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ApiKeyAuthMiddleware {
            service: Rc::new(service),
            store: self.store.clone(),
        }))
    }
}

pub struct ApiKeyAuthMiddleware<S> {
    service: Rc<S>,
    store: Arc<dyn MerchantKeyStore>,
}

impl<S, B> Service<ServiceRequest> for ApiKeyAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let svc = self.service.clone();
        let store = self.store.clone();

        Box::pin(async move {
            if PUBLIC_PATHS.contains(&req.path()) {
                return svc.call(req).await;
            }

            let api_key = req
                .headers()
                .get("X-API-Key")
                .and_then(|h| h.to_str().ok())
                .ok_or_else(|| Error::from(AppError::unauthorized("Missing X-API-Key header")))?;

            let merchant_id = store
                .merchant_for_key_hash(&hash_api_key(api_key))
                .await
                .map_err(Error::from)?
                .ok_or_else(|| Error::from(AppError::unauthorized("Invalid API key")))?;

            tracing::debug!(merchant_id = %merchant_id, "Merchant authenticated");
            req.extensions_mut().insert(MerchantId(merchant_id));

            svc.call(req).await
        })
    }
}
