//! Warning and critical thresholds.
//!
//! Range text names the values that raise the alert; a leading `@`
//! negates it. Bounds are inclusive.
//!
//! | text     | alert when                 |
//! |----------|----------------------------|
//! | `10`     | `0 <= x <= 10`             |
//! | `10:`    | `x >= 10`                  |
//! | `~:10`   | `x <= 10`                  |
//! | `10:20`  | `10 <= x <= 20`            |
//! | `@10:20` | `x < 10` or `x > 20`       |
//!
//! A threshold given on the command line may also be a condition
//! expression (`load > 5`); see [`Threshold`].

use crate::condition::{parse_number, Condition, ConditionError, Row};
use std::fmt;
use thiserror::Error;

/// Errors from parsing range text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("invalid range {text:?}: {reason}")]
    Invalid { text: String, reason: String },

    #[error("invalid range {text:?}: start is greater than end")]
    StartAfterEnd { text: String },
}

/// A parsed range, keeping the text it was parsed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Range {
    text: String,
    start: f64,
    end: f64,
    inverted: bool,
}

impl Range {
    /// Parse range text. Empty text means "no threshold".
    pub fn parse(text: &str) -> Result<Option<Self>, RangeError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        let (inverted, body) = match trimmed.strip_prefix('@') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let invalid = |reason: &str| RangeError::Invalid {
            text: trimmed.to_string(),
            reason: reason.to_string(),
        };

        let (start, end) = match body.split_once(':') {
            None => (0.0, parse_bound(body).ok_or_else(|| invalid("bad bound"))?),
            Some((start, end)) => {
                let start = match start {
                    "~" => f64::NEG_INFINITY,
                    "" => 0.0,
                    s => parse_bound(s).ok_or_else(|| invalid("bad start"))?,
                };
                let end = match end {
                    "" => f64::INFINITY,
                    e => parse_bound(e).ok_or_else(|| invalid("bad end"))?,
                };
                (start, end)
            }
        };

        if start > end {
            return Err(RangeError::StartAfterEnd {
                text: trimmed.to_string(),
            });
        }

        Ok(Some(Range {
            text: trimmed.to_string(),
            start,
            end,
            inverted,
        }))
    }

    /// Whether `value` raises an alert: inside the range, or outside it
    /// for the `@` form.
    pub fn breached(&self, value: f64) -> bool {
        let inside = self.start <= value && value <= self.end;
        inside != self.inverted
    }

    /// The text this range was parsed from.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn parse_bound(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Errors from parsing a `warn=`/`crit=` value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThresholdError {
    #[error(transparent)]
    Range(#[from] RangeError),

    #[error(transparent)]
    Condition(#[from] ConditionError),
}

/// A threshold: either plain range text or a condition over row fields.
#[derive(Debug, Clone)]
pub enum Threshold {
    Range(Range),
    Condition(Condition),
}

impl Threshold {
    /// Parse a threshold argument.
    ///
    /// Empty text and `none` mean "no threshold". Text that reads as a range
    /// is a range; anything else must be a condition.
    pub fn parse(text: &str) -> Result<Option<Self>, ThresholdError> {
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
            return Ok(None);
        }
        if looks_like_range(trimmed) {
            return Ok(Range::parse(trimmed)?.map(Threshold::Range));
        }
        Ok(Some(Threshold::Condition(Condition::parse(trimmed)?)))
    }

    /// Whether a list row raises this threshold.
    ///
    /// A range is checked against the row's `range_field` value; a row
    /// without a numeric value there never matches.
    pub fn matches_row(&self, row: &Row, range_field: &str) -> bool {
        match self {
            Threshold::Range(range) => row
                .get(range_field)
                .and_then(|v| parse_number(v))
                .is_some_and(|v| range.breached(v)),
            Threshold::Condition(condition) => condition.matches(row),
        }
    }

    /// Range text to attach to a metric whose threshold name is `field`.
    pub fn range_text(&self, field: &str) -> Option<String> {
        match self {
            Threshold::Range(range) => Some(range.text().to_string()),
            Threshold::Condition(condition) => condition.to_range_text(field),
        }
    }

    /// Field names referenced by a condition threshold.
    pub fn fields(&self) -> Vec<&str> {
        match self {
            Threshold::Range(_) => Vec::new(),
            Threshold::Condition(condition) => condition.fields(),
        }
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Threshold::Range(range) => range.fmt(f),
            Threshold::Condition(condition) => condition.fmt(f),
        }
    }
}

// Range text only ever holds digits, signs, dots, `@`, `~` and one colon.
fn looks_like_range(text: &str) -> bool {
    text.chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | ':' | '@' | '~' | 'e' | 'E'))
        && text.chars().any(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(text: &str) -> Range {
        Range::parse(text).unwrap().unwrap()
    }

    #[test]
    fn empty_text_is_no_threshold() {
        assert_eq!(Range::parse("").unwrap(), None);
        assert_eq!(Range::parse("  ").unwrap(), None);
        assert!(Range::parse("0").unwrap().is_some());
    }

    #[test]
    fn upper_bound_only() {
        let r = range("10");
        assert!(r.breached(0.0));
        assert!(r.breached(5.0));
        assert!(r.breached(10.0));
        assert!(!r.breached(10.5));
        assert!(!r.breached(15.0));
        assert!(!r.breached(-1.0));
    }

    #[test]
    fn lower_bound_only() {
        let r = range("10:");
        assert!(!r.breached(9.9));
        assert!(r.breached(10.0));
        assert!(r.breached(1e12));
    }

    #[test]
    fn unbounded_start() {
        let r = range("~:10");
        assert!(r.breached(-1e12));
        assert!(r.breached(10.0));
        assert!(!r.breached(11.0));
    }

    #[test]
    fn closed_and_negated() {
        let r = range("10:20");
        assert!(!r.breached(9.0));
        assert!(r.breached(10.0));
        assert!(r.breached(15.0));
        assert!(r.breached(20.0));
        assert!(!r.breached(21.0));

        let r = range("@5:30");
        assert!(r.is_inverted());
        assert!(r.breached(4.0));
        assert!(!r.breached(5.0));
        assert!(!r.breached(30.0));
        assert!(r.breached(40.0));
    }

    #[test]
    fn keeps_original_text() {
        assert_eq!(range(" @5:30 ").text(), "@5:30");
        assert_eq!(range("10.50:").to_string(), "10.50:");
    }

    #[test]
    fn rejects_bad_ranges() {
        assert!(matches!(
            Range::parse("20:10"),
            Err(RangeError::StartAfterEnd { .. })
        ));
        assert!(matches!(Range::parse("abc"), Err(RangeError::Invalid { .. })));
        assert!(matches!(Range::parse("1:2:3"), Err(RangeError::Invalid { .. })));
        assert!(matches!(Range::parse("@"), Err(RangeError::Invalid { .. })));
    }

    #[test]
    fn threshold_chooses_range_or_condition() {
        assert!(matches!(
            Threshold::parse("80").unwrap(),
            Some(Threshold::Range(_))
        ));
        assert!(matches!(
            Threshold::parse("@1:5").unwrap(),
            Some(Threshold::Range(_))
        ));
        assert!(matches!(
            Threshold::parse("used_pct > 80").unwrap(),
            Some(Threshold::Condition(_))
        ));
        assert!(Threshold::parse("none").unwrap().is_none());
        assert!(Threshold::parse("").unwrap().is_none());
        assert!(Threshold::parse("used_pct >").is_err());
        assert!(Threshold::parse("30:10").is_err());
    }

    #[test]
    fn threshold_range_text() {
        let t = Threshold::parse("uptime < 180").unwrap().unwrap();
        assert_eq!(t.range_text("uptime").as_deref(), Some("~:180"));
        assert_eq!(t.range_text("other"), None);

        let t = Threshold::parse("@5:30").unwrap().unwrap();
        assert_eq!(t.range_text("anything").as_deref(), Some("@5:30"));
    }

    #[test]
    fn threshold_row_matching() {
        let mut row = Row::new();
        row.insert("used_pct".into(), "91".into());
        let t = Threshold::parse("used_pct > 90").unwrap().unwrap();
        assert!(t.matches_row(&row, ""));
        let t = Threshold::parse("90:").unwrap().unwrap();
        assert!(t.matches_row(&row, "used_pct"));
        assert!(!t.matches_row(&row, "free"));
        let t = Threshold::parse("95:").unwrap().unwrap();
        assert!(!t.matches_row(&row, "used_pct"));
        let t = Threshold::parse("@0:95").unwrap().unwrap();
        assert!(!t.matches_row(&row, "used_pct"));
    }
}
