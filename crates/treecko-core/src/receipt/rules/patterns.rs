//! Regex patterns for Spanish (Latin-American) payment receipts.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Receipt references
    pub static ref TX_ID_LABELED: Regex = Regex::new(
        r"(?i)(?:Operación|Operacion|ID|Código|Codigo)[\s:]*#?(\d{10,})"
    ).unwrap();

    pub static ref TX_ID_OPERATION_NUMBER: Regex = Regex::new(
        r"(?i)N[úu]mero de operaci[óo]n[\s:]*(\d+)"
    ).unwrap();

    pub static ref TX_ID_RECEIPT: Regex = Regex::new(
        r"(?i)(?:Comprobante|Referencia)[\s:]*(\d{8,})"
    ).unwrap();

    // Dates: "15 de noviembre de 2024", 15/11/2024, 15-11-2024, 2024-11-15
    pub static ref DATE_VERBOSE: Regex = Regex::new(
        r"(?i)(\d{1,2})\s+de\s+(\w+)\s+de\s+(\d{4})"
    ).unwrap();

    pub static ref DATE_SLASH: Regex = Regex::new(
        r"(\d{1,2})/(\d{1,2})/(\d{4})"
    ).unwrap();

    pub static ref DATE_DASH: Regex = Regex::new(
        r"(\d{1,2})-(\d{1,2})-(\d{4})"
    ).unwrap();

    pub static ref DATE_ISO: Regex = Regex::new(
        r"(\d{4})-(\d{1,2})-(\d{1,2})"
    ).unwrap();

    // Amounts (Latin-American format: 1.500,50)
    pub static ref AMOUNT_CURRENCY_PREFIX: Regex = Regex::new(
        r"\$\s*([\d.,]+)"
    ).unwrap();

    pub static ref AMOUNT_LABELED: Regex = Regex::new(
        r"(?i)(?:Total|Monto|Importe)[\s:]*\$?\s*([\d.,]+)"
    ).unwrap();

    pub static ref AMOUNT_CURRENCY_SUFFIX: Regex = Regex::new(
        r"(?i)([\d.,]+)\s*(?:pesos|ARS)"
    ).unwrap();

    // Free-text labels capture the rest of the line. Labels are whole words
    // (`\b`), so short ones like "A", "De" or "por" never match inside
    // "Operación", "Detalle" or "Importe".
    pub static ref DESCRIPTION_LABELED: Regex = Regex::new(
        r"(?i)\b(?:Detalle|Descripción|Descripcion|Concepto)\b[\s:]*(.+?)(?:\n|$)"
    ).unwrap();

    pub static ref DESCRIPTION_PREPOSITION: Regex = Regex::new(
        r"(?i)\b(?:por|Para)\b[\s:]*(.+?)(?:\n|$)"
    ).unwrap();

    pub static ref MERCHANT_RECIPIENT: Regex = Regex::new(
        r"(?i)\b(?:Vendedor|Comercio|Destinatario|Para|A)\b[\s:]*(.+?)(?:\n|$)"
    ).unwrap();

    pub static ref MERCHANT_SENDER: Regex = Regex::new(
        r"(?i)\b(?:De|Remitente)\b[\s:]*(.+?)(?:\n|$)"
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_need_word_boundaries() {
        assert!(!MERCHANT_RECIPIENT.is_match("Operación: 12345"));
        assert!(MERCHANT_RECIPIENT.is_match("Pagaste a Juan Pérez"));
        assert!(!DESCRIPTION_PREPOSITION.is_match("Importe: 100"));
        assert!(!MERCHANT_SENDER.is_match("Detalle: Venta"));
        assert_eq!(
            MERCHANT_SENDER.captures("Transferencia de Carlos Ruiz").unwrap()[1].to_string(),
            "Carlos Ruiz"
        );
    }

    #[test]
    fn test_dash_date_does_not_match_iso() {
        assert!(!DATE_DASH.is_match("2024-11-15"));
        assert!(DATE_ISO.is_match("2024-11-15"));
    }
}
