//! Editable monetary values.
//!
//! Planned amounts and transaction amounts are user-editable text first and
//! numbers second. `EditableAmount` keeps the raw text for display and a
//! cached parse result, refreshed only when the text changes. A failed parse
//! reads as `0.0` so data entry stays tolerant, while
//! [`EditableAmount::parsed`] exposes the failure to callers that care.

use std::fmt;
use std::str::FromStr;

/// Rounds to the nearest hundredth. Applied after every aggregation step so
/// floating point drift cannot accumulate across rollups.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A currency value stored as its editable text plus a cached parse.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditableAmount {
    text: String,
    cached: Option<f64>,
}

impl EditableAmount {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let cached = parse_amount(&text);
        Self { text, cached }
    }

    /// Replaces the raw text and re-parses the cached value.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cached = parse_amount(&self.text);
    }

    /// The raw text as the user typed it.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The cached numeric value; `0.0` when the text does not parse.
    pub fn value(&self) -> f64 {
        self.cached.unwrap_or(0.0)
    }

    /// The cached parse result, `None` when the text is not numeric.
    pub fn parsed(&self) -> Option<f64> {
        self.cached
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

impl fmt::Display for EditableAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<f64> for EditableAmount {
    fn from(value: f64) -> Self {
        Self::new(format!("{:.2}", value))
    }
}

/// Parses user-entered currency text. Tolerates surrounding whitespace, an
/// optional leading `$` after the sign, and thousands commas.
fn parse_amount(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let (sign, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, trimmed),
    };
    let body = body.strip_prefix('$').unwrap_or(body);
    let cleaned: String = body.chars().filter(|c| *c != ',').collect();
    f64::from_str(&cleaned).ok().map(|v| sign * v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_decimal() {
        let amount = EditableAmount::new("42.50");
        assert_eq!(amount.value(), 42.5);
        assert_eq!(amount.text(), "42.50");
    }

    #[test]
    fn parses_dollar_sign_and_commas() {
        assert_eq!(EditableAmount::new("$1,250.75").value(), 1250.75);
        assert_eq!(EditableAmount::new("-$60,000.00").value(), -60000.0);
    }

    #[test]
    fn non_numeric_reads_as_zero() {
        let amount = EditableAmount::new("abc");
        assert_eq!(amount.value(), 0.0);
        assert_eq!(amount.parsed(), None);
        assert_eq!(amount.text(), "abc");
    }

    #[test]
    fn set_text_refreshes_cache() {
        let mut amount = EditableAmount::new("10");
        amount.set_text("25.25");
        assert_eq!(amount.value(), 25.25);
        amount.set_text("not a number");
        assert_eq!(amount.value(), 0.0);
    }

    #[test]
    fn rounding_is_half_away_to_hundredths() {
        assert_eq!(round_cents(0.125), 0.13);
        assert_eq!(round_cents(2.674), 2.67);
        assert_eq!(round_cents(-0.125), -0.13);
    }
}
