//! Receipt field extraction module.

mod locale;
mod parser;
pub mod rules;

pub use locale::ReceiptLocale;
pub use parser::ReceiptParser;

use crate::error::ExtractionError;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;
