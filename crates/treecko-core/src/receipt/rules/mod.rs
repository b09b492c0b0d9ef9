//! Rule-based field extractors for payment receipts.
//!
//! Each extractor owns an ordered [`RuleSet`]: the rules are tried in
//! sequence against the first match of their pattern, and the first rule
//! whose handler yields a value wins.

pub mod amounts;
pub mod dates;
pub mod description;
pub mod kind;
pub mod merchant;
pub mod patterns;
pub mod transaction_id;

pub use amounts::{parse_latam_amount, format_latam_amount, AmountExtractor};
pub use dates::{spanish_month_to_number, DateExtractor};
pub use description::{DescriptionExtractor, DEFAULT_DESCRIPTION};
pub use kind::TypeClassifier;
pub use merchant::MerchantExtractor;
pub use transaction_id::TransactionIdExtractor;

use regex::{Captures, Regex};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text, `None` when no rule produced a value.
    fn extract(&self, text: &str) -> Option<Self::Output>;
}

/// Turns the captures of a matched pattern into a field value.
///
/// Returning `None` rejects the match and lets the next rule run.
pub type RuleHandler<T> = fn(&Captures<'_>) -> Option<T>;

/// A named pattern paired with the handler that interprets its captures.
#[derive(Clone)]
pub struct Rule<T> {
    name: &'static str,
    pattern: Regex,
    handler: RuleHandler<T>,
}

impl<T> Rule<T> {
    pub fn new(name: &'static str, pattern: Regex, handler: RuleHandler<T>) -> Self {
        Self {
            name,
            pattern,
            handler,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    /// Run this rule against the first occurrence of its pattern only.
    pub fn apply(&self, text: &str) -> Option<ExtractionMatch<T>> {
        let caps = self.pattern.captures(text)?;
        let value = (self.handler)(&caps)?;
        let full_match = caps.get(0)?;
        Some(
            ExtractionMatch::new(value, self.name, full_match.as_str())
                .with_position(full_match.start(), full_match.end()),
        )
    }
}

impl<T> std::fmt::Debug for Rule<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("pattern", &self.pattern.as_str())
            .finish()
    }
}

/// Rules evaluated in priority order; the first usable match wins.
#[derive(Debug, Clone)]
pub struct RuleSet<T> {
    rules: Vec<Rule<T>>,
}

impl<T> RuleSet<T> {
    pub fn new(rules: Vec<Rule<T>>) -> Self {
        Self { rules }
    }

    /// Append a lower-priority rule.
    pub fn with_rule(mut self, rule: Rule<T>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn first_match(&self, text: &str) -> Option<ExtractionMatch<T>> {
        self.rules.iter().find_map(|rule| rule.apply(text))
    }

    /// Rule names in evaluation order.
    pub fn names(&self) -> Vec<&'static str> {
        self.rules.iter().map(Rule::name).collect()
    }

    pub fn rules(&self) -> &[Rule<T>] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// A field value with the rule and text that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Name of the rule that matched.
    pub rule: &'static str,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, rule: &'static str, source: impl Into<String>) -> Self {
        Self {
            value,
            rule,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}

/// Trimmed capture group 1, truncated to `max_chars`, if longer than `min_chars`.
pub(crate) fn captured_line(caps: &Captures<'_>, min_chars: usize, max_chars: usize) -> Option<String> {
    let value = caps.get(1)?.as_str().trim();
    if value.chars().count() > min_chars {
        Some(truncate_chars(value, max_chars))
    } else {
        None
    }
}

pub(crate) fn truncate_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digits(caps: &Captures<'_>) -> Option<u32> {
        caps[1].parse().ok()
    }

    fn reject(_: &Captures<'_>) -> Option<u32> {
        None
    }

    #[test]
    fn test_first_rule_wins() {
        let rules = RuleSet::new(vec![
            Rule::new("a", Regex::new(r"a(\d)").unwrap(), digits),
            Rule::new("b", Regex::new(r"b(\d)").unwrap(), digits),
        ]);

        // "b" occurs first in the text but "a" has priority.
        let found = rules.first_match("b2 a1").unwrap();
        assert_eq!(found.value, 1);
        assert_eq!(found.rule, "a");
        assert_eq!(found.position, Some((3, 5)));
    }

    #[test]
    fn test_rejected_match_falls_through() {
        let rules = RuleSet::new(vec![Rule::new("never", Regex::new(r"(\d)").unwrap(), reject)])
            .with_rule(Rule::new("digit", Regex::new(r"(\d)").unwrap(), digits));

        assert_eq!(rules.names(), vec!["never", "digit"]);
        assert_eq!(rules.first_match("x7").unwrap().value, 7);
    }

    #[test]
    fn test_only_first_occurrence_is_tried() {
        fn even(caps: &Captures<'_>) -> Option<u32> {
            caps[1].parse::<u32>().ok().filter(|n| n % 2 == 0)
        }
        let rule = Rule::new("even", Regex::new(r"(\d)").unwrap(), even);
        assert!(rule.apply("1 2").is_none());
    }

    #[test]
    fn test_truncate_chars_counts_characters() {
        assert_eq!(truncate_chars("añoñoño", 3), "año");
    }
}
