//! Transaction records produced from payment receipts.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of money flow for a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money received (recibiste, cobraste, depósito...).
    Income,
    /// Money sent or spent. Also the default when nothing is recognized.
    #[default]
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Sign used when displaying an amount of this type.
    pub fn sign(&self) -> char {
        match self {
            Self::Income => '+',
            Self::Expense => '-',
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(format!("unknown transaction type: {}", other)),
        }
    }
}

/// A transaction extracted from receipt text.
///
/// Built once per parse call and handed to the caller; there are no setters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedTransaction {
    pub(crate) transaction_id: Option<String>,
    pub(crate) date: NaiveDateTime,
    pub(crate) description: String,
    pub(crate) amount: Decimal,
    pub(crate) transaction_type: TransactionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) merchant: Option<String>,
    pub(crate) raw_text: String,
}

impl ParsedTransaction {
    /// External receipt reference, if one was found.
    pub fn transaction_id(&self) -> Option<&str> {
        self.transaction_id.as_deref()
    }

    pub fn date(&self) -> NaiveDateTime {
        self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Non-negative amount; zero when no amount could be read.
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    pub fn merchant(&self) -> Option<&str> {
        self.merchant.as_deref()
    }

    /// Full source text the record was extracted from.
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }
}

/// A transaction as persisted by a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTransaction {
    /// Store-assigned row id.
    pub id: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,

    pub date: NaiveDateTime,

    pub description: String,

    pub amount: Decimal,

    pub transaction_type: TransactionType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant: Option<String>,

    #[serde(skip_serializing)]
    pub raw_text: Option<String>,

    /// When the row was written.
    pub created_at: NaiveDateTime,
}

impl StoredTransaction {
    /// Build the row for a parsed transaction before the store assigns an id.
    pub fn from_parsed(
        parsed: &ParsedTransaction,
        category: Option<&str>,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            id: 0,
            transaction_id: parsed.transaction_id.clone(),
            date: parsed.date,
            description: parsed.description.clone(),
            amount: parsed.amount,
            transaction_type: parsed.transaction_type,
            category: category.map(str::to_string),
            merchant: parsed.merchant.clone(),
            raw_text: Some(parsed.raw_text.clone()),
            created_at,
        }
    }
}
