//! Merchant / counterparty extraction.

use regex::Captures;

use super::patterns::{MERCHANT_RECIPIENT, MERCHANT_SENDER};
use super::{captured_line, ExtractionMatch, FieldExtractor, Rule, RuleSet};

const MAX_MERCHANT_CHARS: usize = 100;

/// Merchant field extractor. No match means the merchant is unknown.
#[derive(Debug, Clone)]
pub struct MerchantExtractor {
    rules: RuleSet<String>,
}

impl MerchantExtractor {
    pub fn new(rules: RuleSet<String>) -> Self {
        Self { rules }
    }

    /// Vendedor/Comercio/Destinatario/Para/A, then De/Remitente.
    pub fn spanish() -> Self {
        Self::new(RuleSet::new(vec![
            Rule::new("recipient_label", MERCHANT_RECIPIENT.clone(), merchant_line),
            Rule::new("sender_label", MERCHANT_SENDER.clone(), merchant_line),
        ]))
    }

    pub fn rules(&self) -> &RuleSet<String> {
        &self.rules
    }
}

impl Default for MerchantExtractor {
    fn default() -> Self {
        Self::spanish()
    }
}

impl FieldExtractor for MerchantExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.rules.first_match(text)
    }
}

fn merchant_line(caps: &Captures<'_>) -> Option<String> {
    captured_line(caps, 2, MAX_MERCHANT_CHARS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> Option<String> {
        MerchantExtractor::spanish().extract(text).map(|m| m.value)
    }

    #[test]
    fn test_seller_label() {
        assert_eq!(extract("Vendedor: Mi Tienda Favorita"), Some("Mi Tienda Favorita".to_string()));
        assert_eq!(extract("Comercio: Café Martínez\nTotal"), Some("Café Martínez".to_string()));
    }

    #[test]
    fn test_sender_label() {
        assert_eq!(extract("Remitente: Juan Pérez"), Some("Juan Pérez".to_string()));
    }

    #[test]
    fn test_short_value_rejected() {
        // "Xy" is too short; the sender rule supplies the value instead.
        assert_eq!(extract("Destinatario: Xy\nDe: Ana Gómez"), Some("Ana Gómez".to_string()));
        assert_eq!(extract("Destinatario: Xy"), None);
    }

    #[test]
    fn test_truncated_to_100_chars() {
        let text = format!("Vendedor: {}", "M".repeat(150));
        assert_eq!(extract(&text).map(|m| m.chars().count()), Some(100));
    }

    #[test]
    fn test_no_label() {
        assert_eq!(extract("Total: $1.500,50\nOperación: 12345678901234"), None);
    }
}
