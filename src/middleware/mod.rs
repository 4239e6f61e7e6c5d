pub mod auth;
pub mod request_id;

pub use auth::{
    hash_api_key, ApiKeyAuth, MerchantId, MerchantKeyStore, MySqlMerchantKeyStore,
    StaticMerchantKeyStore,
};
pub use request_id::RequestId;
