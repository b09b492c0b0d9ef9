//! Locale-specific extractor bundles.

use tracing::warn;

use super::rules::{
    AmountExtractor, DateExtractor, DescriptionExtractor, MerchantExtractor,
    TransactionIdExtractor, TypeClassifier,
};

/// The full set of extractors for one receipt language.
///
/// Only Spanish is built in; other locales can be assembled from custom
/// rule sets and handed to [`ReceiptParser::with_locale`](super::ReceiptParser::with_locale).
#[derive(Debug, Clone)]
pub struct ReceiptLocale {
    pub code: String,
    pub transaction_id: TransactionIdExtractor,
    pub date: DateExtractor,
    pub amount: AmountExtractor,
    pub kind: TypeClassifier,
    pub description: DescriptionExtractor,
    pub merchant: MerchantExtractor,
}

impl ReceiptLocale {
    pub fn spanish() -> Self {
        Self {
            code: "es".to_string(),
            transaction_id: TransactionIdExtractor::spanish(),
            date: DateExtractor::spanish(),
            amount: AmountExtractor::spanish(),
            kind: TypeClassifier::spanish(),
            description: DescriptionExtractor::spanish(),
            merchant: MerchantExtractor::spanish(),
        }
    }

    /// Look up a built-in locale; unknown codes fall back to Spanish.
    pub fn for_code(code: &str) -> Self {
        match code.trim().to_lowercase().as_str() {
            "es" | "es-ar" | "es_ar" | "spanish" => Self::spanish(),
            other => {
                warn!(locale = other, "Unknown receipt locale, using Spanish");
                Self::spanish()
            }
        }
    }
}

impl Default for ReceiptLocale {
    fn default() -> Self {
        Self::spanish()
    }
}
