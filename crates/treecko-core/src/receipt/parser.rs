//! Receipt parser assembling extractor outputs into a transaction.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::error::ExtractionError;
use crate::models::transaction::{ParsedTransaction, TransactionType};
use crate::pdf::acquire_text;

use super::rules::FieldExtractor;
use super::{ReceiptLocale, Result};

/// Turns receipt text into a [`ParsedTransaction`].
///
/// Holds no mutable state; one parser can serve any number of callers.
#[derive(Clone)]
pub struct ReceiptParser {
    locale: ReceiptLocale,
    clock: Arc<dyn Clock>,
}

impl ReceiptParser {
    /// Spanish rules and the system clock.
    pub fn new() -> Self {
        Self {
            locale: ReceiptLocale::spanish(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Clock used for the date fallback.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_locale(mut self, locale: ReceiptLocale) -> Self {
        self.locale = locale;
        self
    }

    pub fn locale(&self) -> &ReceiptLocale {
        &self.locale
    }

    /// Parse receipt text.
    ///
    /// Fails only when the text is empty or whitespace. Every field that
    /// cannot be read falls back to its default: now for the date, zero and
    /// expense for the amount, a placeholder for the description.
    pub fn parse(&self, text: &str) -> Result<ParsedTransaction> {
        if text.trim().is_empty() {
            return Err(ExtractionError::NoText);
        }

        debug!("Parsing receipt from {} characters of text", text.len());

        let locale = &self.locale;

        let transaction_id = locale.transaction_id.extract(text).map(|m| m.value);

        let date = match locale.date.extract(text) {
            Some(found) => found.value,
            None => {
                debug!("No valid date in receipt, using current time");
                self.clock.now()
            }
        };

        // The keyword scan only runs once an amount was read.
        let (amount, transaction_type) = match locale.amount.extract(text) {
            Some(found) => (found.value, locale.kind.classify(text)),
            None => {
                debug!("No amount in receipt, defaulting to zero expense");
                (Decimal::ZERO, TransactionType::Expense)
            }
        };

        let description = locale.description.describe(text);
        let merchant = locale.merchant.extract(text).map(|m| m.value);

        debug!(
            transaction_id = transaction_id.as_deref().unwrap_or("-"),
            %amount,
            %transaction_type,
            "Extracted receipt fields"
        );

        Ok(ParsedTransaction {
            transaction_id,
            date,
            description,
            amount,
            transaction_type,
            merchant,
            raw_text: text.to_string(),
        })
    }

    /// Join per-page text the way PDF acquisition does, then parse.
    pub fn parse_pages<I>(&self, pages: I) -> Result<ParsedTransaction>
    where
        I: IntoIterator<Item = Option<String>>,
    {
        let text = acquire_text(pages)?;
        self.parse(&text)
    }
}

impl Default for ReceiptParser {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ReceiptParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReceiptParser")
            .field("locale", &self.locale.code)
            .finish_non_exhaustive()
    }
}
