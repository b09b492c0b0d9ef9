//! Amount extraction for Latin-American receipts.

use rust_decimal::Decimal;
use std::str::FromStr;

use regex::Captures;

use super::patterns::{AMOUNT_CURRENCY_PREFIX, AMOUNT_CURRENCY_SUFFIX, AMOUNT_LABELED};
use super::{ExtractionMatch, FieldExtractor, Rule, RuleSet};

/// Amount field extractor.
///
/// Tries a `$`-prefixed number, then a Total/Monto/Importe label, then a
/// number followed by "pesos"/"ARS". A token that does not normalize to a
/// number skips to the next pattern.
#[derive(Debug, Clone)]
pub struct AmountExtractor {
    rules: RuleSet<Decimal>,
}

impl AmountExtractor {
    pub fn new(rules: RuleSet<Decimal>) -> Self {
        Self { rules }
    }

    pub fn spanish() -> Self {
        Self::new(RuleSet::new(vec![
            Rule::new("currency_prefix", AMOUNT_CURRENCY_PREFIX.clone(), amount),
            Rule::new("total_label", AMOUNT_LABELED.clone(), amount),
            Rule::new("currency_suffix", AMOUNT_CURRENCY_SUFFIX.clone(), amount),
        ]))
    }

    pub fn rules(&self) -> &RuleSet<Decimal> {
        &self.rules
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::spanish()
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = ExtractionMatch<Decimal>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.rules.first_match(text)
    }
}

fn amount(caps: &Captures<'_>) -> Option<Decimal> {
    parse_latam_amount(caps.get(1)?.as_str())
}

/// Parse a Latin-American formatted amount (e.g., "1.500,50").
///
/// Every `.` is a thousands separator and is dropped; `,` becomes the decimal
/// point. Tokens left with more than one separator, or no digits, are rejected.
pub fn parse_latam_amount(s: &str) -> Option<Decimal> {
    let normalized = s.replace('.', "").replace(',', ".");

    if !normalized.chars().all(|c| c.is_ascii_digit() || c == '.')
        || normalized.matches('.').count() > 1
        || !normalized.chars().any(|c| c.is_ascii_digit())
    {
        return None;
    }

    // "5," and ",5" are valid amounts
    let normalized = match (normalized.strip_prefix('.'), normalized.strip_suffix('.')) {
        (Some(fraction), _) => format!("0.{}", fraction),
        (None, Some(whole)) => whole.to_string(),
        (None, None) => normalized,
    };

    Decimal::from_str(&normalized).ok()
}

/// Format amount in Latin-American style (1.500,50).
pub fn format_latam_amount(amount: Decimal) -> String {
    let s = format!("{:.2}", amount);
    let (integer_part, decimal_part) = match s.split_once('.') {
        Some(parts) => parts,
        None => return s,
    };

    let (sign, digits) = match integer_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", integer_part),
    };

    // Add thousand separators
    let chars: Vec<char> = digits.chars().collect();
    let mut formatted = String::new();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push('.');
        }
        formatted.push(*c);
    }

    format!("{}{},{}", sign, formatted, decimal_part)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_latam_amount() {
        assert_eq!(parse_latam_amount("1.500,50"), Some(dec("1500.50")));
        assert_eq!(parse_latam_amount("100,00"), Some(dec("100.00")));
        assert_eq!(parse_latam_amount("12.345.678,90"), Some(dec("12345678.90")));
        assert_eq!(parse_latam_amount("2500"), Some(dec("2500")));
        // Dots are always thousands separators.
        assert_eq!(parse_latam_amount("100.00"), Some(dec("10000")));
        assert_eq!(parse_latam_amount("5,"), Some(dec("5")));
        assert_eq!(parse_latam_amount(",5"), Some(dec("0.5")));
    }

    #[test]
    fn test_parse_latam_amount_rejects_garbage() {
        assert_eq!(parse_latam_amount("1,2,3"), None);
        assert_eq!(parse_latam_amount("."), None);
        assert_eq!(parse_latam_amount(","), None);
        assert_eq!(parse_latam_amount(""), None);
    }

    #[test]
    fn test_format_latam_amount() {
        assert_eq!(format_latam_amount(dec("1500.5")), "1.500,50");
        assert_eq!(format_latam_amount(dec("12345678.90")), "12.345.678,90");
        assert_eq!(format_latam_amount(dec("-1234")), "-1.234,00");
        assert_eq!(format_latam_amount(Decimal::ZERO), "0,00");
    }

    #[test]
    fn test_currency_prefix_first() {
        let extractor = AmountExtractor::spanish();
        let found = extractor.extract("Total: $ 1.500,50").unwrap();
        assert_eq!(found.value, dec("1500.50"));
        assert_eq!(found.rule, "currency_prefix");
    }

    #[test]
    fn test_label_and_suffix() {
        let extractor = AmountExtractor::spanish();

        let found = extractor.extract("Monto: 2.300,00").unwrap();
        assert_eq!(found.value, dec("2300.00"));
        assert_eq!(found.rule, "total_label");

        let found = extractor.extract("Le enviaste 750,25 pesos").unwrap();
        assert_eq!(found.value, dec("750.25"));
        assert_eq!(found.rule, "currency_suffix");
    }

    #[test]
    fn test_unparseable_token_skips_to_next_pattern() {
        let extractor = AmountExtractor::spanish();
        let found = extractor.extract("$1,2,3\nImporte: 99,90").unwrap();
        assert_eq!(found.value, dec("99.90"));
        assert_eq!(found.rule, "total_label");
    }

    #[test]
    fn test_no_amount() {
        assert!(AmountExtractor::spanish().extract("Sin importe").is_none());
    }
}
