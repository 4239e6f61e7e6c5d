pub mod error;
pub mod timestamp;
pub mod timezone;

pub use error::{AppError, Result};
pub use timestamp::RawTimestamp;
