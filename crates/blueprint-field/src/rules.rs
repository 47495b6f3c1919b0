//! The rule evaluator shared by server-side field validation and both client
//! form runtimes.
//!
//! Rules always run in the same order:
//!
//! 1. required (an empty required value stops evaluation)
//! 2. empty and optional stops evaluation with no error
//! 3. value type (whole number, number, boolean, date); a mismatch stops
//!    evaluation
//! 4. min / max length on strings
//! 5. min / max value on number-like values
//! 6. pattern
//! 7. format (email, url)
//! 8. option membership
//!
//! [`check`] reports every failing rule in that order; [`first_failure`]
//! reports only the first, which is what forms surface inline.

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));

/// Format checks attached to a field by its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Email,
    Url,
}

/// The shape a value must have before any other rule runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Integer,
    Number,
    Boolean,
    Date,
}

/// The declarative rule set for one field, as shipped to client controllers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationRules {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ValueType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<Format>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl ValidationRules {
    pub fn is_empty(&self) -> bool {
        *self == ValidationRules::default()
    }
}

/// Which rule rejected a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Required,
    MinLength,
    MaxLength,
    Min,
    Max,
    Pattern,
    Email,
    Url,
    OneOf,
    Type,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleFailure {
    pub rule: RuleKind,
    pub message: String,
}

impl RuleFailure {
    pub fn new(rule: RuleKind, message: impl Into<String>) -> Self {
        Self {
            rule,
            message: message.into(),
        }
    }
}

impl fmt::Display for RuleFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Null, blank strings, `false` and empty collections count as empty.
/// Numbers, including zero, are always present values.
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Number(_) => false,
    }
}

/// Numbers and strings that parse as finite numbers.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Booleans, 0/1 and the usual checkbox strings.
pub fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_f64() {
            Some(x) if x == 0.0 => Some(false),
            Some(x) if x == 1.0 => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "on" | "yes" => Some(true),
            "0" | "false" | "off" | "no" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// `YYYY-MM-DD`, a local `YYYY-MM-DDTHH:MM[:SS]` or an RFC 3339 timestamp.
pub fn is_date(text: &str) -> bool {
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok()
        || DateTime::parse_from_rfc3339(text).is_ok()
        || ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
            .iter()
            .any(|fmt| NaiveDateTime::parse_from_str(text, fmt).is_ok())
}

fn type_failure(label: &str, value_type: ValueType, value: &Value) -> Option<RuleFailure> {
    let ok = match value_type {
        ValueType::Integer => as_number(value).is_some_and(|n| n.fract() == 0.0),
        ValueType::Number => as_number(value).is_some(),
        ValueType::Boolean => as_bool(value).is_some(),
        ValueType::Date => value.as_str().is_some_and(is_date),
    };
    if ok {
        return None;
    }
    let expected = match value_type {
        ValueType::Integer => "a whole number",
        ValueType::Number => "a number",
        ValueType::Boolean => "true or false",
        ValueType::Date => "a valid date",
    };
    Some(RuleFailure::new(
        RuleKind::Type,
        format!("{label} must be {expected}"),
    ))
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Emptiness as the required rule sees it. Boolean fields are empty
/// unless checked, so `0`, `"0"` and `"off"` are unchecked boxes.
fn is_unset(rules: &ValidationRules, value: &Value) -> bool {
    match rules.value_type {
        Some(ValueType::Boolean) => is_empty(value) || as_bool(value) == Some(false),
        _ => is_empty(value),
    }
}

/// Evaluate every rule for one value, in the fixed order.
pub fn check(label: &str, required: bool, rules: &ValidationRules, value: &Value) -> Vec<RuleFailure> {
    if is_unset(rules, value) {
        if required {
            return vec![RuleFailure::new(
                RuleKind::Required,
                format!("{label} is required"),
            )];
        }
        return Vec::new();
    }

    if let Some(failure) = rules
        .value_type
        .and_then(|value_type| type_failure(label, value_type, value))
    {
        return vec![failure];
    }

    let mut failures = Vec::new();

    if let Value::String(s) = value {
        let len = s.chars().count();
        if let Some(min) = rules.min_length.filter(|min| len < *min) {
            failures.push(RuleFailure::new(
                RuleKind::MinLength,
                format!("{label} must be at least {min} characters"),
            ));
        }
        if let Some(max) = rules.max_length.filter(|max| len > *max) {
            failures.push(RuleFailure::new(
                RuleKind::MaxLength,
                format!("{label} must be no more than {max} characters"),
            ));
        }
    }

    if let Some(n) = as_number(value) {
        if let Some(min) = rules.min.filter(|min| n < *min) {
            failures.push(RuleFailure::new(
                RuleKind::Min,
                format!("{label} must be at least {}", format_number(min)),
            ));
        }
        if let Some(max) = rules.max.filter(|max| n > *max) {
            failures.push(RuleFailure::new(
                RuleKind::Max,
                format!("{label} must be no more than {}", format_number(max)),
            ));
        }
    }

    if let (Some(pattern), Some(text)) = (&rules.pattern, as_text(value)) {
        match Regex::new(pattern) {
            Ok(re) if !re.is_match(&text) => {
                let message = rules
                    .pattern_message
                    .clone()
                    .unwrap_or_else(|| format!("{label} format is invalid"));
                failures.push(RuleFailure::new(RuleKind::Pattern, message));
            }
            Ok(_) => {}
            Err(e) => warn!(%pattern, error = %e, "skipping invalid validation pattern"),
        }
    }

    if let (Some(format), Some(text)) = (rules.format, as_text(value)) {
        match format {
            Format::Email if !EMAIL.is_match(&text) => failures.push(RuleFailure::new(
                RuleKind::Email,
                format!("{label} must be a valid email"),
            )),
            Format::Url if url::Url::parse(&text).is_err() => failures.push(RuleFailure::new(
                RuleKind::Url,
                format!("{label} must be a valid URL"),
            )),
            _ => {}
        }
    }

    if let Some(options) = rules.options.as_ref().filter(|o| !o.is_empty()) {
        let chosen: Vec<String> = match value {
            Value::Array(items) => items.iter().filter_map(as_text).collect(),
            other => as_text(other).into_iter().collect(),
        };
        if chosen.iter().any(|c| !options.contains(c)) {
            failures.push(RuleFailure::new(
                RuleKind::OneOf,
                format!("{label} must be one of: {}", options.join(", ")),
            ));
        }
    }

    failures
}

pub fn first_failure(
    label: &str,
    required: bool,
    rules: &ValidationRules,
    value: &Value,
) -> Option<RuleFailure> {
    check(label, required, rules, value).into_iter().next()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn rules() -> ValidationRules {
        ValidationRules::default()
    }

    #[test]
    fn required_short_circuits() {
        let rules = ValidationRules {
            min_length: Some(3),
            pattern: Some("^x".into()),
            format: Some(Format::Email),
            ..rules()
        };
        for empty in [json!(null), json!(""), json!(false), json!([])] {
            let failures = check("Title", true, &rules, &empty);
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].rule, RuleKind::Required);
            assert_eq!(failures[0].message, "Title is required");
        }
    }

    #[test]
    fn empty_optional_passes_everything() {
        let rules = ValidationRules {
            min_length: Some(3),
            format: Some(Format::Url),
            options: Some(vec!["a".into()]),
            ..rules()
        };
        assert!(check("Site", false, &rules, &json!("")).is_empty());
        assert!(check("Site", false, &rules, &json!(null)).is_empty());
    }

    #[test]
    fn blank_strings_are_empty() {
        let failures = check("Title", true, &rules(), &json!("   "));
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].rule, RuleKind::Required);
        assert!(check("Title", false, &rules(), &json!(" \t ")).is_empty());
    }

    #[test]
    fn unchecked_boxes_fail_required() {
        let flag = ValidationRules {
            value_type: Some(ValueType::Boolean),
            ..rules()
        };
        for unchecked in [json!(false), json!(0), json!("0"), json!("off"), json!("no")] {
            let failures = check("Agree", true, &flag, &unchecked);
            assert_eq!(failures.len(), 1, "{unchecked}");
            assert_eq!(failures[0].rule, RuleKind::Required);
            assert!(check("Agree", false, &flag, &unchecked).is_empty());
        }
        for checked in [json!(true), json!(1), json!("on")] {
            assert!(check("Agree", true, &flag, &checked).is_empty(), "{checked}");
        }
    }

    #[test]
    fn zero_is_a_present_value() {
        let rules = ValidationRules {
            min: Some(1.0),
            ..rules()
        };
        let failures = check("Count", true, &rules, &json!(0));
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].rule, RuleKind::Min);
        assert_eq!(failures[0].message, "Count must be at least 1");
    }

    #[test]
    fn length_counts_characters() {
        let rules = ValidationRules {
            max_length: Some(3),
            ..rules()
        };
        assert!(check("Code", false, &rules, &json!("äöü")).is_empty());
        let failures = check("Code", false, &rules, &json!("äöüß"));
        assert_eq!(failures[0].rule, RuleKind::MaxLength);
        assert_eq!(failures[0].message, "Code must be no more than 3 characters");
    }

    #[test]
    fn numeric_strings_are_range_checked() {
        let rules = ValidationRules {
            min: Some(1.0),
            max: Some(5.5),
            ..rules()
        };
        assert!(check("Rating", false, &rules, &json!("3")).is_empty());
        let failures = check("Rating", false, &rules, &json!("9"));
        assert_eq!(failures[0].rule, RuleKind::Max);
        assert_eq!(failures[0].message, "Rating must be no more than 5.5");
    }

    #[test]
    fn pattern_uses_custom_message() {
        let rules = ValidationRules {
            pattern: Some("^[A-Z]{3}-\\d+$".into()),
            pattern_message: Some("Use the form ABC-123".into()),
            ..rules()
        };
        assert!(check("Ref", false, &rules, &json!("ABC-12")).is_empty());
        let failure = first_failure("Ref", false, &rules, &json!("abc")).unwrap();
        assert_eq!(failure.rule, RuleKind::Pattern);
        assert_eq!(failure.message, "Use the form ABC-123");
    }

    #[test]
    fn invalid_pattern_is_skipped() {
        let rules = ValidationRules {
            pattern: Some("(".into()),
            ..rules()
        };
        assert!(check("Ref", false, &rules, &json!("anything")).is_empty());
    }

    #[test]
    fn email_and_url_formats() {
        let email = ValidationRules {
            format: Some(Format::Email),
            ..rules()
        };
        assert!(check("Email", false, &email, &json!("a@b.co")).is_empty());
        let failure = first_failure("Email", false, &email, &json!("not-an-email")).unwrap();
        assert_eq!(failure.rule, RuleKind::Email);
        assert_eq!(failure.message, "Email must be a valid email");

        let url = ValidationRules {
            format: Some(Format::Url),
            ..rules()
        };
        assert!(check("Site", false, &url, &json!("https://example.com/x")).is_empty());
        assert_eq!(
            first_failure("Site", false, &url, &json!("example dot com"))
                .unwrap()
                .rule,
            RuleKind::Url
        );
    }

    #[test]
    fn option_membership() {
        let rules = ValidationRules {
            options: Some(vec!["low".into(), "high".into()]),
            ..rules()
        };
        assert!(check("Priority", false, &rules, &json!("low")).is_empty());
        assert!(check("Priority", false, &rules, &json!(["low", "high"])).is_empty());
        let failure = first_failure("Priority", false, &rules, &json!("urgent")).unwrap();
        assert_eq!(failure.rule, RuleKind::OneOf);
        assert_eq!(failure.message, "Priority must be one of: low, high");
    }

    #[test]
    fn failures_keep_rule_order() {
        let rules = ValidationRules {
            max_length: Some(3),
            pattern: Some("^\\d+$".into()),
            format: Some(Format::Email),
            ..rules()
        };
        let kinds: Vec<_> = check("X", false, &rules, &json!("abcdef"))
            .into_iter()
            .map(|f| f.rule)
            .collect();
        assert_eq!(
            kinds,
            vec![RuleKind::MaxLength, RuleKind::Pattern, RuleKind::Email]
        );
    }

    #[test]
    fn type_mismatch_stops_evaluation() {
        let rules = ValidationRules {
            value_type: Some(ValueType::Integer),
            min: Some(1.0),
            ..rules()
        };
        assert!(check("Count", false, &rules, &json!("12")).is_empty());
        let failures = check("Count", false, &rules, &json!("1.5"));
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].rule, RuleKind::Type);
        assert_eq!(failures[0].message, "Count must be a whole number");
        assert_eq!(
            first_failure("Count", false, &rules, &json!("abc")).unwrap().rule,
            RuleKind::Type
        );
    }

    #[test]
    fn dates_and_booleans() {
        let date = ValidationRules {
            value_type: Some(ValueType::Date),
            ..rules()
        };
        for ok in ["2024-02-29", "2024-02-29T10:30", "2024-02-29T10:30:00Z"] {
            assert!(check("Due", false, &date, &json!(ok)).is_empty(), "{ok}");
        }
        assert_eq!(
            first_failure("Due", false, &date, &json!("2023-02-29")).unwrap().message,
            "Due must be a valid date"
        );

        let flag = ValidationRules {
            value_type: Some(ValueType::Boolean),
            ..rules()
        };
        assert!(check("Active", false, &flag, &json!("on")).is_empty());
        assert!(check("Active", false, &flag, &json!(true)).is_empty());
        assert_eq!(
            first_failure("Active", false, &flag, &json!("maybe")).unwrap().rule,
            RuleKind::Type
        );
    }

    #[test]
    fn rules_serialize_with_snake_case_keys() {
        let rules = ValidationRules {
            value_type: Some(ValueType::Number),
            max_length: Some(50),
            pattern_message: Some("nope".into()),
            ..rules()
        };
        let value = serde_json::to_value(&rules).unwrap();
        assert_eq!(
            value,
            json!({ "type": "number", "max_length": 50, "pattern_message": "nope" })
        );
    }
}
