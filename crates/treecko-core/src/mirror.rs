//! Spreadsheet mirroring and CSV export of transactions.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::{error, info};

use crate::clock::{Clock, SystemClock};
use crate::error::MirrorError;
use crate::models::transaction::{ParsedTransaction, StoredTransaction};

/// Result type for mirror operations.
pub type Result<T> = std::result::Result<T, MirrorError>;

pub const SHEET_HEADER: [&str; 8] = [
    "Date",
    "Description",
    "Amount",
    "Type",
    "Merchant",
    "Category",
    "Transaction ID",
    "Created At",
];

pub const EXPORT_HEADER: [&str; 8] = [
    "Date",
    "Description",
    "Amount",
    "Type",
    "Category",
    "Merchant",
    "Transaction ID",
    "Created At",
];

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A secondary copy of processed transactions, kept for humans.
pub trait SheetMirror {
    /// Append one transaction row.
    fn append(&self, transaction: &ParsedTransaction, category: Option<&str>) -> Result<()>;

    fn is_configured(&self) -> bool;

    /// Append, logging instead of failing. Returns whether the row was written.
    fn try_append(&self, transaction: &ParsedTransaction, category: Option<&str>) -> bool {
        match self.append(transaction, category) {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to mirror transaction: {}", e);
                false
            }
        }
    }
}

/// Mirror appending rows to a local CSV file.
pub struct CsvSheetMirror {
    path: PathBuf,
    worksheet: String,
    clock: Arc<dyn Clock>,
}

impl CsvSheetMirror {
    pub fn new(path: impl Into<PathBuf>, worksheet: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            worksheet: worksheet.into(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Clock for the `Created At` column.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn worksheet(&self) -> &str {
        &self.worksheet
    }
}

impl SheetMirror for CsvSheetMirror {
    fn append(&self, transaction: &ParsedTransaction, category: Option<&str>) -> Result<()> {
        if !self.is_configured() {
            return Err(MirrorError::NotConfigured);
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let is_new = file.metadata()?.len() == 0;

        let mut wtr = csv::Writer::from_writer(file);
        if is_new {
            wtr.write_record(SHEET_HEADER)?;
        }

        wtr.write_record([
            format_date(transaction.date()),
            transaction.description().to_string(),
            transaction.amount().to_string(),
            transaction.transaction_type().to_string(),
            transaction.merchant().unwrap_or_default().to_string(),
            category.unwrap_or_default().to_string(),
            transaction.transaction_id().unwrap_or_default().to_string(),
            format_date(self.clock.now()),
        ])?;
        wtr.flush()?;

        info!(
            worksheet = %self.worksheet,
            "Added transaction to sheet: {}",
            transaction.description()
        );
        Ok(())
    }

    fn is_configured(&self) -> bool {
        !self.path.as_os_str().is_empty()
    }
}

/// Write stored transactions in the export layout. Returns the row count.
pub fn export_csv<W: Write>(records: &[StoredTransaction], writer: W) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(EXPORT_HEADER)?;

    for tx in records {
        wtr.write_record([
            format_date(tx.date),
            tx.description.clone(),
            tx.amount.to_string(),
            tx.transaction_type.to_string(),
            tx.category.clone().unwrap_or_default(),
            tx.merchant.clone().unwrap_or_default(),
            tx.transaction_id.clone().unwrap_or_default(),
            format_date(tx.created_at),
        ])?;
    }

    wtr.flush()?;
    Ok(records.len())
}

/// Default export file name for a moment in time.
pub fn export_file_name(now: NaiveDateTime) -> String {
    format!("transactions_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

fn format_date(value: NaiveDateTime) -> String {
    value.format(DATE_FORMAT).to_string()
}
