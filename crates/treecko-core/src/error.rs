//! Error types for the treecko-core library.

use thiserror::Error;

/// Main error type for the treecko library.
#[derive(Error, Debug)]
pub enum TreeckoError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Receipt extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Transaction store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Sheet mirror error.
    #[error("mirror error: {0}")]
    Mirror(#[from] MirrorError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Ingestion pipeline error.
    #[error("ingest error: {0}")]
    Ingest(#[from] IngestError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The data does not start with the `%PDF` signature.
    #[error("not a PDF document")]
    NotPdf,

    /// The document exceeds the configured size limit.
    #[error("PDF is {size} bytes, limit is {limit} bytes")]
    TooLarge { size: usize, limit: usize },

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// I/O error while reading the document.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to receipt field extraction.
///
/// Field-level misses are never errors; every extractor has a default.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// No usable text could be obtained from the receipt.
    #[error("could not extract text from receipt")]
    NoText,
}

/// Errors raised by a transaction store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A transaction with the same receipt reference is already stored.
    #[error("transaction {0} has already been processed")]
    Duplicate(String),

    /// A category with the same name already exists.
    #[error("category already exists: {0}")]
    CategoryExists(String),

    /// No stored transaction has the given row id.
    #[error("no transaction with id {0}")]
    NotFound(i64),

    /// A stored value could not be decoded.
    #[error("corrupt value in column {column}: {value}")]
    Corrupt { column: String, value: String },

    /// Underlying SQLite error.
    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),
}

/// Errors raised by a sheet mirror.
#[derive(Error, Debug)]
pub enum MirrorError {
    /// The mirror has no destination configured.
    #[error("sheet mirror is not configured")]
    NotConfigured,

    /// CSV encoding error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the treecko library.
pub type Result<T> = std::result::Result<T, TreeckoError>;

/// Errors raised while ingesting a receipt for a user.
#[derive(Error, Debug)]
pub enum IngestError {
    /// The user may not use the service.
    #[error("{0}")]
    Unauthorized(&'static str),

    /// The user exceeded the request budget.
    #[error("rate limited, retry in {retry_after:.0} seconds")]
    RateLimited { retry_after: f64 },

    /// The receipt was already ingested.
    #[error("transaction {0} has already been processed")]
    Duplicate(String),

    #[error(transparent)]
    Pdf(#[from] PdfError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for IngestError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(id) => IngestError::Duplicate(id),
            other => IngestError::Store(other),
        }
    }
}
