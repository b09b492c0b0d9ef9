//! Description extraction.

use regex::Captures;

use super::patterns::{DESCRIPTION_LABELED, DESCRIPTION_PREPOSITION};
use super::{captured_line, truncate_chars, ExtractionMatch, FieldExtractor, Rule, RuleSet};

/// Placeholder used when nothing better is found.
pub const DEFAULT_DESCRIPTION: &str = "MercadoPago Transaction";

const MAX_DESCRIPTION_CHARS: usize = 200;

/// Description field extractor.
#[derive(Debug, Clone)]
pub struct DescriptionExtractor {
    rules: RuleSet<String>,
    placeholder: String,
}

impl DescriptionExtractor {
    pub fn new(rules: RuleSet<String>, placeholder: impl Into<String>) -> Self {
        Self {
            rules,
            placeholder: placeholder.into(),
        }
    }

    /// Detalle/Descripción/Concepto labels, then "por"/"para".
    pub fn spanish() -> Self {
        Self::new(
            RuleSet::new(vec![
                Rule::new("detail_label", DESCRIPTION_LABELED.clone(), description_line),
                Rule::new("preposition", DESCRIPTION_PREPOSITION.clone(), description_line),
            ]),
            DEFAULT_DESCRIPTION,
        )
    }

    pub fn rules(&self) -> &RuleSet<String> {
        &self.rules
    }

    /// Always produces a description.
    ///
    /// Labeled text first; otherwise the second non-blank line when the text
    /// has more than two of them; otherwise the placeholder.
    pub fn describe(&self, text: &str) -> String {
        if let Some(found) = self.extract(text) {
            return found.value;
        }

        let lines: Vec<&str> = text
            .split('\n')
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();

        if lines.len() > 2 {
            return truncate_chars(lines[1], MAX_DESCRIPTION_CHARS);
        }

        self.placeholder.clone()
    }
}

impl Default for DescriptionExtractor {
    fn default() -> Self {
        Self::spanish()
    }
}

impl FieldExtractor for DescriptionExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.rules.first_match(text)
    }
}

fn description_line(caps: &Captures<'_>) -> Option<String> {
    captured_line(caps, 3, MAX_DESCRIPTION_CHARS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_label() {
        let extractor = DescriptionExtractor::spanish();
        assert_eq!(
            extractor.describe("Detalle: Compra en tienda online"),
            "Compra en tienda online"
        );
        assert_eq!(
            extractor.describe("Concepto:\n  Alquiler noviembre  \nOtro"),
            "Alquiler noviembre"
        );
    }

    #[test]
    fn test_short_label_value_falls_to_preposition() {
        let extractor = DescriptionExtractor::spanish();
        let text = "Detalle: abc\nPago por servicio de internet";
        assert_eq!(extractor.describe(text), "servicio de internet");
    }

    #[test]
    fn test_second_line_fallback() {
        let extractor = DescriptionExtractor::spanish();
        let long_line = "x".repeat(250);
        let text = format!("Comprobante\n\n  {}  \nfin", long_line);
        let description = extractor.describe(&text);
        assert_eq!(description.chars().count(), 200);
        assert_eq!(description, "x".repeat(200));
    }

    #[test]
    fn test_placeholder() {
        let extractor = DescriptionExtractor::spanish();
        assert_eq!(extractor.describe("Comprobante\nOK"), DEFAULT_DESCRIPTION);
        assert_eq!(extractor.describe("solo"), DEFAULT_DESCRIPTION);
    }

    #[test]
    fn test_truncates_labeled_value() {
        let extractor = DescriptionExtractor::spanish();
        let text = format!("Descripción: {}", "ñ".repeat(300));
        assert_eq!(extractor.describe(&text).chars().count(), 200);
    }
}
