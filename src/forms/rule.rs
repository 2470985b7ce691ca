//! Per-field validation rules

use super::value::FieldValue;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use validator::ValidateEmail;

/// A single constraint on one field, carrying its own message
#[derive(Debug, Clone)]
pub enum Rule {
    /// Value must be present and not blank
    Required { message: String },
    /// Text must have at least `min` characters
    MinLength { min: usize, message: String },
    /// Text must have at most `max` characters
    MaxLength { max: usize, message: String },
    /// Text must be an email address
    Email { message: String },
    /// Text must be one of the options, compared exactly
    OneOf {
        options: Vec<String>,
        message: String,
    },
    /// Text must match the pattern
    Pattern { regex: Regex, message: String },
    /// Text must parse as a calendar date
    Date { message: String },
    /// Date must not be before today (day granularity)
    NotInPast { message: String },
    /// List must contain at least `min` items
    MinItems { min: usize, message: String },
    /// Number must lie within `min..=max`
    Range { min: i64, max: i64, message: String },
}

impl Rule {
    pub fn message(&self) -> &str {
        match self {
            Rule::Required { message }
            | Rule::MinLength { message, .. }
            | Rule::MaxLength { message, .. }
            | Rule::Email { message }
            | Rule::OneOf { message, .. }
            | Rule::Pattern { message, .. }
            | Rule::Date { message }
            | Rule::NotInPast { message }
            | Rule::MinItems { message, .. }
            | Rule::Range { message, .. } => message,
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, Rule::Required { .. })
    }

    /// Evaluate the rule against a present value.
    ///
    /// `Required` is handled by the schema before any other rule runs, so
    /// here it only rejects blank values.
    pub fn passes(&self, value: &FieldValue, today: NaiveDate) -> bool {
        match self {
            Rule::Required { .. } => !value.is_blank(),
            Rule::MinLength { min, .. } => value.as_text().chars().count() >= *min,
            Rule::MaxLength { max, .. } => value.as_text().chars().count() <= *max,
            Rule::Email { .. } => value.as_text().to_string().validate_email(),
            Rule::OneOf { options, .. } => options.iter().any(|o| o == value.as_text()),
            Rule::Pattern { regex, .. } => regex.is_match(value.as_text()),
            Rule::Date { .. } => parse_day(value.as_text()).is_some(),
            // An unparseable date is reported by `Date`, not here
            Rule::NotInPast { .. } => parse_day(value.as_text()).map_or(true, |day| day >= today),
            Rule::MinItems { min, .. } => value.as_list().len() >= *min,
            Rule::Range { min, max, .. } => value
                .as_number()
                .is_some_and(|n| (*min..=*max).contains(&n)),
        }
    }
}

/// Parse a date the way form inputs produce them, dropping any time of day.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps and `YYYY-MM-DDTHH:MM[:SS]`.
pub fn parse_day(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if let Ok(day) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(day);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return Some(ts.date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .map(|ts| ts.date())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 8).unwrap()
    }

    fn rule_passes(rule: Rule, value: impl Into<FieldValue>) -> bool {
        rule.passes(&value.into(), today())
    }

    #[test]
    fn test_parse_day_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 1, 10);
        assert_eq!(parse_day("2025-01-10"), expected);
        assert_eq!(parse_day("2025-01-10T23:59:00Z"), expected);
        assert_eq!(parse_day("2025-01-10T08:30"), expected);
        assert_eq!(parse_day(" 2025-01-10 "), expected);
        assert_eq!(parse_day("10/01/2025"), None);
        assert_eq!(parse_day(""), None);
    }

    #[test]
    fn test_required() {
        let rule = Rule::Required {
            message: "required".into(),
        };
        assert!(rule.is_required());
        assert!(!rule_passes(rule.clone(), " "));
        assert!(rule_passes(rule, "x"));
    }

    #[test]
    fn test_length_counts_characters() {
        let min = Rule::MinLength {
            min: 2,
            message: "short".into(),
        };
        assert!(!rule_passes(min.clone(), "é"));
        assert!(rule_passes(min, "éé"));
        let max = Rule::MaxLength {
            max: 3,
            message: "long".into(),
        };
        assert!(rule_passes(max.clone(), "abc"));
        assert!(!rule_passes(max, "abcd"));
    }

    #[test]
    fn test_email() {
        let rule = Rule::Email {
            message: "Invalid email address".into(),
        };
        assert!(rule_passes(rule.clone(), "ann@x.com"));
        assert!(!rule_passes(rule.clone(), "ann"));
        assert!(!rule_passes(rule, ""));
    }

    #[test]
    fn test_one_of_is_case_sensitive() {
        let rule = Rule::OneOf {
            options: vec!["LOW".into(), "MEDIUM".into(), "HIGH".into()],
            message: "bad".into(),
        };
        assert!(rule_passes(rule.clone(), "MEDIUM"));
        assert!(!rule_passes(rule, "Medium"));
    }

    #[test]
    fn test_pattern() {
        let rule = Rule::Pattern {
            regex: Regex::new(r"^[0-9]+$").unwrap(),
            message: "digits".into(),
        };
        assert!(rule_passes(rule.clone(), "123456"));
        assert!(!rule_passes(rule, "12a45"));
    }

    #[test]
    fn test_not_in_past_uses_day_granularity() {
        let rule = Rule::NotInPast {
            message: "past".into(),
        };
        assert!(rule_passes(rule.clone(), "2025-01-08T00:00:01Z"));
        assert!(rule_passes(rule.clone(), "2025-01-09"));
        assert!(!rule_passes(rule.clone(), "2025-01-07"));
        // Unparseable dates are left to the Date rule
        assert!(rule_passes(rule, "not a date"));
    }

    #[test]
    fn test_min_items() {
        let rule = Rule::MinItems {
            min: 1,
            message: "pick one".into(),
        };
        assert!(!rule_passes(rule.clone(), Vec::<String>::new()));
        assert!(rule_passes(rule, vec!["p1"]));
    }

    #[test]
    fn test_range() {
        let rule = Rule::Range {
            min: 0,
            max: 100,
            message: "range".into(),
        };
        assert!(rule_passes(rule.clone(), 100i64));
        assert!(!rule_passes(rule.clone(), 101i64));
        assert!(rule_passes(rule.clone(), "55"));
        assert!(!rule_passes(rule, "abc"));
    }

    #[test]
    fn test_message_accessor() {
        let rule = Rule::Date {
            message: "Invalid start date format".into(),
        };
        assert_eq!(rule.message(), "Invalid start date format");
    }
}
