pub mod record_fetcher;
pub mod transaction_service;

pub use record_fetcher::RecordFetcher;
pub use transaction_service::{LedgerQuery, QrInsights, TransactionService};
