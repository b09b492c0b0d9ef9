//! Core library for MercadoPago receipt ingestion.
//!
//! This crate provides:
//! - PDF text acquisition (lopdf with a pdf-extract fallback)
//! - Rule-based extraction of Spanish receipt fields (reference, date,
//!   amount, income/expense, description, merchant)
//! - Transaction storage in SQLite and CSV sheet mirroring
//! - Per-user authorization and rate limiting in front of the pipeline

pub mod access;
pub mod clock;
pub mod error;
pub mod health;
pub mod ingest;
pub mod logging;
pub mod mirror;
pub mod models;
pub mod pdf;
pub mod receipt;
pub mod store;

pub use error::{
    ExtractionError, IngestError, MirrorError, PdfError, Result, StoreError, TreeckoError,
};
pub use models::config::TreeckoConfig;
pub use models::transaction::{ParsedTransaction, StoredTransaction, TransactionType};
pub use pdf::{acquire_text, PageTextSource, PdfExtractor};
pub use receipt::{ReceiptLocale, ReceiptParser};
pub use store::{ReportPeriod, SqliteStore, TransactionStore, TransactionSummary};
pub use mirror::{export_csv, CsvSheetMirror, SheetMirror};
pub use ingest::{IngestOutcome, Ingestor, MirrorStatus};
pub use health::HealthStatus;
pub use clock::{Clock, FixedClock, SystemClock};
