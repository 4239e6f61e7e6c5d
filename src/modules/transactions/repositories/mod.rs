pub mod in_memory;
pub mod transaction_repository;

pub use in_memory::InMemoryTransactionRepository;
pub use transaction_repository::{MySqlTransactionRepository, TransactionRepository};
