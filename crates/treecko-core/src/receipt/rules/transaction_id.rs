//! Receipt reference (operation number) extraction.

use regex::Captures;

use super::patterns::{TX_ID_LABELED, TX_ID_OPERATION_NUMBER, TX_ID_RECEIPT};
use super::{ExtractionMatch, FieldExtractor, Rule, RuleSet};

/// Finds the external reference of a receipt.
///
/// Labels are tried in priority order; the first label found anywhere in the
/// text wins, even if a later label carries a longer number.
#[derive(Debug, Clone)]
pub struct TransactionIdExtractor {
    rules: RuleSet<String>,
}

impl TransactionIdExtractor {
    pub fn new(rules: RuleSet<String>) -> Self {
        Self { rules }
    }

    /// Operación/ID/Código, then "Número de operación", then Comprobante/Referencia.
    pub fn spanish() -> Self {
        Self::new(RuleSet::new(vec![
            Rule::new("operation_label", TX_ID_LABELED.clone(), digits),
            Rule::new("operation_number", TX_ID_OPERATION_NUMBER.clone(), digits),
            Rule::new("receipt_reference", TX_ID_RECEIPT.clone(), digits),
        ]))
    }

    pub fn rules(&self) -> &RuleSet<String> {
        &self.rules
    }
}

impl Default for TransactionIdExtractor {
    fn default() -> Self {
        Self::spanish()
    }
}

impl FieldExtractor for TransactionIdExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.rules.first_match(text)
    }
}

fn digits(caps: &Captures<'_>) -> Option<String> {
    caps.get(1).map(|m| m.as_str().to_string())
}
