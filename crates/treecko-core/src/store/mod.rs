//! Transaction persistence.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use chrono::{NaiveDateTime, TimeDelta};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::StoreError;
use crate::models::transaction::{ParsedTransaction, StoredTransaction, TransactionType};

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// A user-defined category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub created_at: NaiveDateTime,
}

/// Storage of processed receipts and their categories.
pub trait TransactionStore {
    /// Persist a parsed transaction.
    ///
    /// A transaction whose receipt reference is already stored is rejected
    /// with [`StoreError::Duplicate`]. Transactions without a reference are
    /// always accepted.
    fn insert(
        &mut self,
        transaction: &ParsedTransaction,
        category: Option<&str>,
    ) -> Result<StoredTransaction>;

    fn get_by_transaction_id(&self, transaction_id: &str) -> Result<Option<StoredTransaction>>;

    fn exists(&self, transaction_id: &str) -> Result<bool> {
        Ok(self.get_by_transaction_id(transaction_id)?.is_some())
    }

    /// Every stored transaction in insertion order.
    fn all(&self) -> Result<Vec<StoredTransaction>>;

    /// Transactions dated within `start..=end`, newest first.
    fn by_date_range(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<StoredTransaction>>;

    /// Totals over transactions within the optional bounds.
    fn summary(
        &self,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Result<TransactionSummary>;

    /// Set or clear the category of the row with the given id.
    fn set_category(&mut self, id: i64, category: Option<&str>) -> Result<()>;

    fn add_category(&mut self, name: &str) -> Result<Category>;

    /// Categories sorted by name.
    fn categories(&self) -> Result<Vec<Category>>;

    /// Returns `false` when no category had that name.
    fn delete_category(&mut self, name: &str) -> Result<bool>;

    /// Whether the backing storage is reachable.
    fn is_connected(&self) -> bool {
        true
    }
}

/// Income and expense totals over a set of transactions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransactionSummary {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub net_balance: Decimal,
    pub transaction_count: usize,
    pub income_count: usize,
    pub expense_count: usize,
}

impl TransactionSummary {
    pub fn from_transactions<'a, I>(transactions: I) -> Self
    where
        I: IntoIterator<Item = &'a StoredTransaction>,
    {
        let mut summary = Self::default();
        for tx in transactions {
            summary.transaction_count += 1;
            match tx.transaction_type {
                TransactionType::Income => {
                    summary.total_income += tx.amount;
                    summary.income_count += 1;
                }
                TransactionType::Expense => {
                    summary.total_expense += tx.amount;
                    summary.expense_count += 1;
                }
            }
        }
        summary.net_balance = summary.total_income - summary.total_expense;
        summary
    }
}

/// Reporting window ending now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportPeriod {
    Week,
    #[default]
    Month,
    Year,
    All,
}

impl ReportPeriod {
    /// `week`, `month`, `year` or `all`; anything else is the default month.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "week" => ReportPeriod::Week,
            "year" => ReportPeriod::Year,
            "all" => ReportPeriod::All,
            _ => ReportPeriod::Month,
        }
    }

    pub fn days(&self) -> Option<i64> {
        match self {
            ReportPeriod::Week => Some(7),
            ReportPeriod::Month => Some(30),
            ReportPeriod::Year => Some(365),
            ReportPeriod::All => None,
        }
    }

    /// Bounds for a summary query; the start is open for [`ReportPeriod::All`].
    pub fn range(&self, now: NaiveDateTime) -> (Option<NaiveDateTime>, NaiveDateTime) {
        let start = self.days().map(|days| now - TimeDelta::days(days));
        (start, now)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReportPeriod::Week => "last 7 days",
            ReportPeriod::Month => "last 30 days",
            ReportPeriod::Year => "last year",
            ReportPeriod::All => "all time",
        }
    }
}

pub(crate) fn in_range(
    date: NaiveDateTime,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
) -> bool {
    start.is_none_or(|s| date >= s) && end.is_none_or(|e| date <= e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 11, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn stored(amount: &str, kind: TransactionType) -> StoredTransaction {
        StoredTransaction {
            id: 1,
            transaction_id: None,
            date: at(1),
            description: "x".to_string(),
            amount: Decimal::from_str(amount).unwrap(),
            transaction_type: kind,
            category: None,
            merchant: None,
            raw_text: None,
            created_at: at(1),
        }
    }

    #[test]
    fn test_summary_totals() {
        let rows = vec![
            stored("1000", TransactionType::Income),
            stored("250.50", TransactionType::Expense),
            stored("100", TransactionType::Expense),
        ];
        let summary = TransactionSummary::from_transactions(&rows);
        assert_eq!(
            summary,
            TransactionSummary {
                total_income: Decimal::from(1000),
                total_expense: Decimal::from_str("350.50").unwrap(),
                net_balance: Decimal::from_str("649.50").unwrap(),
                transaction_count: 3,
                income_count: 1,
                expense_count: 2,
            }
        );
    }

    #[test]
    fn test_report_period_parse() {
        assert_eq!(ReportPeriod::parse("WEEK"), ReportPeriod::Week);
        assert_eq!(ReportPeriod::parse("all"), ReportPeriod::All);
        assert_eq!(ReportPeriod::parse("fortnight"), ReportPeriod::Month);
    }

    #[test]
    fn test_report_period_range() {
        let now = at(30);
        assert_eq!(ReportPeriod::Week.range(now), (Some(at(23)), now));
        assert_eq!(ReportPeriod::All.range(now), (None, now));
    }

    #[test]
    fn test_in_range_is_inclusive() {
        assert!(in_range(at(5), Some(at(5)), Some(at(5))));
        assert!(!in_range(at(6), None, Some(at(5))));
        assert!(in_range(at(6), None, None));
    }
}
