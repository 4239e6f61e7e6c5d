pub mod transaction_record;

pub use transaction_record::{
    CreateTransactionRequest, GuestMerchantInfo, StatusFilter, TransactionRecord,
    TransactionStatus, TransactionView, UpdateStatusRequest, SOURCE_API_DIRECT,
    SOURCE_QR_GENERATED,
};
