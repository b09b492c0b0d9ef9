//! In-memory transaction store.

use std::sync::Arc;

use chrono::NaiveDateTime;

use super::{in_range, Category, Result, TransactionStore, TransactionSummary};
use crate::clock::{Clock, SystemClock};
use crate::error::StoreError;
use crate::models::transaction::{ParsedTransaction, StoredTransaction};

/// Store that keeps everything in process memory.
pub struct MemoryStore {
    transactions: Vec<StoredTransaction>,
    categories: Vec<Category>,
    next_id: i64,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            transactions: Vec::new(),
            categories: Vec::new(),
            next_id: 1,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionStore for MemoryStore {
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
        row.id = self.allocate_id();
        self.transactions.push(row.clone());
        Ok(row)
    }

    fn get_by_transaction_id(&self, transaction_id: &str) -> Result<Option<StoredTransaction>> {
        Ok(self
            .transactions
            .iter()
            .find(|t| t.transaction_id.as_deref() == Some(transaction_id))
            .cloned())
    }

    fn all(&self) -> Result<Vec<StoredTransaction>> {
        Ok(self.transactions.clone())
    }

    fn by_date_range(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<StoredTransaction>> {
        let mut rows: Vec<StoredTransaction> = self
            .transactions
            .iter()
            .filter(|t| in_range(t.date, Some(start), Some(end)))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    fn summary(
        &self,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Result<TransactionSummary> {
        Ok(TransactionSummary::from_transactions(
            self.transactions.iter().filter(|t| in_range(t.date, start, end)),
        ))
    }

    fn set_category(&mut self, id: i64, category: Option<&str>) -> Result<()> {
        let row = self
            .transactions
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(StoreError::NotFound(id))?;
        row.category = category.map(str::to_string);
        Ok(())
    }

    fn add_category(&mut self, name: &str) -> Result<Category> {
        if self.categories.iter().any(|c| c.name == name) {
            return Err(StoreError::CategoryExists(name.to_string()));
        }
        let category = Category {
            id: self.categories.iter().map(|c| c.id).max().unwrap_or(0) + 1,
            name: name.to_string(),
            created_at: self.clock.now(),
        };
        self.categories.push(category.clone());
        Ok(category)
    }

    fn categories(&self) -> Result<Vec<Category>> {
        let mut categories = self.categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    fn delete_category(&mut self, name: &str) -> Result<bool> {
        let before = self.categories.len();
        self.categories.retain(|c| c.name != name);
        Ok(self.categories.len() < before)
    }
}
