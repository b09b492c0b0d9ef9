//! Income/expense classification by keyword.

use super::FieldExtractor;
use crate::models::transaction::TransactionType;

/// Classifies receipt text as income or expense.
///
/// The whole list of income keywords is checked before any expense keyword,
/// so a receipt mentioning both is income regardless of word order.
#[derive(Debug, Clone)]
pub struct TypeClassifier {
    income_keywords: Vec<String>,
    expense_keywords: Vec<String>,
}

impl TypeClassifier {
    /// Keywords are matched as lowercase substrings.
    pub fn new<I, E, S>(income_keywords: I, expense_keywords: E) -> Self
    where
        I: IntoIterator<Item = S>,
        E: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lower = |k: S| k.into().to_lowercase();
        Self {
            income_keywords: income_keywords.into_iter().map(lower).collect(),
            expense_keywords: expense_keywords.into_iter().map(lower).collect(),
        }
    }

    pub fn spanish() -> Self {
        Self::new(
            ["recibiste", "cobraste", "ingreso", "depósito", "deposito"],
            ["pagaste", "enviaste", "compra", "pago", "transferencia"],
        )
    }

    /// Classify, defaulting to expense when no keyword is present.
    pub fn classify(&self, text: &str) -> TransactionType {
        self.extract(text).unwrap_or_default()
    }
}

impl Default for TypeClassifier {
    fn default() -> Self {
        Self::spanish()
    }
}

impl FieldExtractor for TypeClassifier {
    type Output = TransactionType;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let text_lower = text.to_lowercase();

        if self.income_keywords.iter().any(|k| text_lower.contains(k.as_str())) {
            return Some(TransactionType::Income);
        }
        if self.expense_keywords.iter().any(|k| text_lower.contains(k.as_str())) {
            return Some(TransactionType::Expense);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_income_keywords() {
        let classifier = TypeClassifier::spanish();
        assert_eq!(classifier.classify("Recibiste $100.00"), TransactionType::Income);
        assert_eq!(classifier.classify("DEPÓSITO en cuenta"), TransactionType::Income);
        assert_eq!(classifier.classify("Cobraste una venta"), TransactionType::Income);
    }

    #[test]
    fn test_expense_keywords() {
        let classifier = TypeClassifier::spanish();
        assert_eq!(classifier.classify("Pagaste $100.00"), TransactionType::Expense);
        assert_eq!(classifier.classify("Transferencia enviada"), TransactionType::Expense);
    }

    #[test]
    fn test_income_checked_before_expense() {
        let classifier = TypeClassifier::spanish();
        let text = "Pagaste la cuota\nRecibiste el reintegro";
        assert_eq!(classifier.classify(text), TransactionType::Income);
    }

    #[test]
    fn test_default_is_expense() {
        let classifier = TypeClassifier::spanish();
        assert_eq!(classifier.extract("Comprobante"), None);
        assert_eq!(classifier.classify("Comprobante"), TransactionType::Expense);
    }
}
