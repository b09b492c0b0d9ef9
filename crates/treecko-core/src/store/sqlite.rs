//! SQLite-backed transaction store.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use rust_decimal::Decimal;
use tracing::{debug, info};

use super::{Category, Result, TransactionStore, TransactionSummary};
use crate::clock::{Clock, SystemClock};
use crate::error::StoreError;
use crate::models::transaction::{ParsedTransaction, StoredTransaction, TransactionType};

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    transaction_id TEXT UNIQUE,
    date TEXT NOT NULL,
    description TEXT NOT NULL,
    amount TEXT NOT NULL,
    transaction_type TEXT NOT NULL,
    category TEXT,
    merchant TEXT,
    raw_text TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);

CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL
);
";

// Fixed width so text comparison orders like time.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

const TRANSACTION_COLUMNS: &str = "id, transaction_id, date, description, amount, \
     transaction_type, category, merchant, raw_text, created_at";

/// Transaction store in a SQLite database file.
pub struct SqliteStore {
    conn: Connection,
    clock: Arc<dyn Clock>,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        info!("Opened transaction database at {}", path.display());
        Self::init(conn)
    }

    /// Private database that disappears when dropped.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn,
            clock: Arc::new(SystemClock),
        })
    }

    /// Clock used for `created_at` stamps.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    fn query_transactions(
        &self,
        clause: &str,
        values: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<StoredTransaction>> {
        let sql = format!("SELECT {} FROM transactions {}", TRANSACTION_COLUMNS, clause);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(values, RawTransaction::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.into_iter().map(RawTransaction::decode).collect()
    }
}

impl TransactionStore for SqliteStore {
    fn insert(
        &mut self,
        transaction: &ParsedTransaction,
        category: Option<&str>,
    ) -> Result<StoredTransaction> {
        if let Some(id) = transaction.transaction_id() {
            if self.exists(id)? {
                return Err(StoreError::Duplicate(id.to_string()));
            }
        }

        let mut row = StoredTransaction::from_parsed(transaction, category, self.clock.now());
        let inserted = self.conn.execute(
            "INSERT INTO transactions (transaction_id, date, description, amount, \
             transaction_type, category, merchant, raw_text, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                row.transaction_id,
                format_timestamp(row.date),
                row.description,
                row.amount.to_string(),
                row.transaction_type.as_str(),
                row.category,
                row.merchant,
                row.raw_text,
                format_timestamp(row.created_at),
            ],
        );

        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation =>
            {
                return Err(StoreError::Duplicate(
                    row.transaction_id.unwrap_or_default(),
                ));
            }
            Err(e) => return Err(e.into()),
        }

        row.id = self.conn.last_insert_rowid();
        debug!(id = row.id, "Stored transaction");
        Ok(row)
    }

    fn get_by_transaction_id(&self, transaction_id: &str) -> Result<Option<StoredTransaction>> {
        let sql = format!(
            "SELECT {} FROM transactions WHERE transaction_id = ?1",
            TRANSACTION_COLUMNS
        );
        let raw = self
            .conn
            .query_row(&sql, [transaction_id], RawTransaction::from_row)
            .optional()?;
        raw.map(RawTransaction::decode).transpose()
    }

    fn exists(&self, transaction_id: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT count(*) FROM transactions WHERE transaction_id = ?1",
            [transaction_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn all(&self) -> Result<Vec<StoredTransaction>> {
        self.query_transactions("ORDER BY id", &[])
    }

    fn by_date_range(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<StoredTransaction>> {
        let (start, end) = (format_timestamp(start), format_timestamp(end));
        self.query_transactions(
            "WHERE date >= ?1 AND date <= ?2 ORDER BY date DESC, id DESC",
            &[&start, &end],
        )
    }

    fn summary(
        &self,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Result<TransactionSummary> {
        let start = start.map(format_timestamp);
        let end = end.map(format_timestamp);
        let rows = self.query_transactions(
            "WHERE (?1 IS NULL OR date >= ?1) AND (?2 IS NULL OR date <= ?2)",
            &[&start, &end],
        )?;
        Ok(TransactionSummary::from_transactions(&rows))
    }

    fn set_category(&mut self, id: i64, category: Option<&str>) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE transactions SET category = ?1 WHERE id = ?2",
            params![category, id],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    fn add_category(&mut self, name: &str) -> Result<Category> {
        let exists: i64 = self.conn.query_row(
            "SELECT count(*) FROM categories WHERE name = ?1",
            [name],
            |row| row.get(0),
        )?;
        if exists > 0 {
            return Err(StoreError::CategoryExists(name.to_string()));
        }

        let created_at = self.clock.now();
        self.conn.execute(
            "INSERT INTO categories (name, created_at) VALUES (?1, ?2)",
            params![name, format_timestamp(created_at)],
        )?;

        Ok(Category {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
            created_at,
        })
    }

    fn categories(&self) -> Result<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, created_at FROM categories ORDER BY name")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, name, created_at)| {
                Ok(Category {
                    id,
                    name,
                    created_at: parse_timestamp("created_at", &created_at)?,
                })
            })
            .collect()
    }

    fn delete_category(&mut self, name: &str) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM categories WHERE name = ?1", [name])?;
        Ok(deleted > 0)
    }

    fn is_connected(&self) -> bool {
        self.conn
            .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .is_ok()
    }
}

/// A transactions row before its text columns are decoded.
struct RawTransaction {
    id: i64,
    transaction_id: Option<String>,
    date: String,
    description: String,
    amount: String,
    transaction_type: String,
    category: Option<String>,
    merchant: Option<String>,
    raw_text: Option<String>,
    created_at: String,
}

impl RawTransaction {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            transaction_id: row.get(1)?,
            date: row.get(2)?,
            description: row.get(3)?,
            amount: row.get(4)?,
            transaction_type: row.get(5)?,
            category: row.get(6)?,
            merchant: row.get(7)?,
            raw_text: row.get(8)?,
            created_at: row.get(9)?,
        })
    }

    fn decode(self) -> Result<StoredTransaction> {
        let amount = Decimal::from_str(&self.amount).map_err(|_| corrupt("amount", &self.amount))?;
        let transaction_type = TransactionType::from_str(&self.transaction_type)
            .map_err(|_| corrupt("transaction_type", &self.transaction_type))?;

        Ok(StoredTransaction {
            id: self.id,
            transaction_id: self.transaction_id,
            date: parse_timestamp("date", &self.date)?,
            description: self.description,
            amount,
            transaction_type,
            category: self.category,
            merchant: self.merchant,
            raw_text: self.raw_text,
            created_at: parse_timestamp("created_at", &self.created_at)?,
        })
    }
}

fn format_timestamp(value: NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

fn parse_timestamp(column: &str, value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).map_err(|_| corrupt(column, value))
}

fn corrupt(column: &str, value: &str) -> StoreError {
    StoreError::Corrupt {
        column: column.to_string(),
        value: value.to_string(),
    }
}
