//! Data models.

pub mod config;
pub mod transaction;

pub use config::TreeckoConfig;
pub use transaction::{ParsedTransaction, StoredTransaction, TransactionType};
