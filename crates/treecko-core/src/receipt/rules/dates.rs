//! Date extraction for Spanish receipts.

use chrono::{NaiveDate, NaiveDateTime};
use regex::Captures;

use super::patterns::{DATE_DASH, DATE_ISO, DATE_SLASH, DATE_VERBOSE};
use super::{ExtractionMatch, FieldExtractor, Rule, RuleSet};

/// Date field extractor.
///
/// Each format family only looks at its first occurrence in the text. When
/// that occurrence is not a real calendar date (month 13, unknown month
/// name...) the next family is tried.
#[derive(Debug, Clone)]
pub struct DateExtractor {
    rules: RuleSet<NaiveDateTime>,
}

impl DateExtractor {
    pub fn new(rules: RuleSet<NaiveDateTime>) -> Self {
        Self { rules }
    }

    pub fn spanish() -> Self {
        Self::new(RuleSet::new(vec![
            Rule::new("verbose", DATE_VERBOSE.clone(), parse_spanish_date),
            Rule::new("slash_dmy", DATE_SLASH.clone(), parse_day_first),
            Rule::new("dash_dmy", DATE_DASH.clone(), parse_day_first),
            Rule::new("iso_ymd", DATE_ISO.clone(), parse_year_first),
        ]))
    }

    pub fn rules(&self) -> &RuleSet<NaiveDateTime> {
        &self.rules
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::spanish()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<NaiveDateTime>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.rules.first_match(text)
    }
}

/// "15 de noviembre de 2024".
fn parse_spanish_date(caps: &Captures<'_>) -> Option<NaiveDateTime> {
    let day: u32 = caps[1].parse().ok()?;
    let month = spanish_month_to_number(&caps[2])?;
    let year: i32 = caps[3].parse().ok()?;
    calendar_date(year, month, day)
}

/// 15/11/2024 and 15-11-2024.
fn parse_day_first(caps: &Captures<'_>) -> Option<NaiveDateTime> {
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    calendar_date(year, month, day)
}

/// 2024-11-15.
fn parse_year_first(caps: &Captures<'_>) -> Option<NaiveDateTime> {
    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;
    calendar_date(year, month, day)
}

/// Midnight of the given date; years before 1 are rejected.
fn calendar_date(year: i32, month: u32, day: u32) -> Option<NaiveDateTime> {
    if year < 1 {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(0, 0, 0)
}

pub fn spanish_month_to_number(month: &str) -> Option<u32> {
    match month.to_lowercase().as_str() {
        "enero" => Some(1),
        "febrero" => Some(2),
        "marzo" => Some(3),
        "abril" => Some(4),
        "mayo" => Some(5),
        "junio" => Some(6),
        "julio" => Some(7),
        "agosto" => Some(8),
        "septiembre" => Some(9),
        "octubre" => Some(10),
        "noviembre" => Some(11),
        "diciembre" => Some(12),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    fn extract(text: &str) -> Option<NaiveDateTime> {
        DateExtractor::spanish().extract(text).map(|m| m.value)
    }

    #[test]
    fn test_verbose_date() {
        assert_eq!(extract("15 de noviembre de 2024"), Some(date(2024, 11, 15)));
        assert_eq!(extract("Lunes 3 de Enero de 2022, 10:15"), Some(date(2022, 1, 3)));
    }

    #[test]
    fn test_numeric_dates() {
        assert_eq!(extract("Fecha: 15/11/2024"), Some(date(2024, 11, 15)));
        assert_eq!(extract("15-11-2024"), Some(date(2024, 11, 15)));
        assert_eq!(extract("2024-11-15"), Some(date(2024, 11, 15)));
    }

    #[test]
    fn test_unknown_month_name_falls_through() {
        let text = "1 de brumario de 2024\n20/02/2024";
        let found = DateExtractor::spanish().extract(text).unwrap();
        assert_eq!(found.value, date(2024, 2, 20));
        assert_eq!(found.rule, "slash_dmy");
    }

    #[test]
    fn test_invalid_calendar_date_falls_through() {
        // Month 13 in the slash family, valid ISO date later on.
        assert_eq!(extract("15/13/2024 2024-01-31"), Some(date(2024, 1, 31)));
        assert_eq!(extract("31/02/2024"), None);
    }

    #[test]
    fn test_only_first_occurrence_per_family() {
        // The first slash date is invalid; the second is never considered.
        assert_eq!(extract("99/99/2024 15/11/2024"), None);
    }

    #[test]
    fn test_family_priority() {
        let text = "2024-01-02\n05/06/2023\n7 de julio de 2021";
        assert_eq!(extract(text), Some(date(2021, 7, 7)));
    }

    #[test]
    fn test_spanish_months() {
        assert_eq!(spanish_month_to_number("Septiembre"), Some(9));
        assert_eq!(spanish_month_to_number("DICIEMBRE"), Some(12));
        assert_eq!(spanish_month_to_number("setiembre"), None);
    }

    #[test]
    fn test_year_zero_rejected() {
        assert_eq!(extract("01/01/0000"), None);
    }
}
