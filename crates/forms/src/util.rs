//! Internal helpers shared by the rules.
//!
//! These utilities are **not** part of the public API. They centralize how a field
//! value is read (emptiness, length, numbers, dates) so every rule agrees on it.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::FieldValue;

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];
const DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// A value counts as empty when it is null, a blank string or an empty collection.
///
/// Numbers and booleans are never empty.
pub(crate) fn is_empty_value(value: &FieldValue) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Length in Unicode scalar values, for strings only.
pub(crate) fn text_len(value: &FieldValue) -> Option<usize> {
    value.as_str().map(|text| text.chars().count())
}

/// Reads a number from a JSON number or from a numeric string (`"12.5"`, `"12,5"`).
pub(crate) fn as_number(value: &FieldValue) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

/// Returns `true` if `value` names a calendar date or an instant.
///
/// Strings may be `YYYY-MM-DD`, `DD/MM/YYYY`, RFC 3339 or a local `YYYY-MM-DDTHH:MM[:SS]`;
/// numbers are read as epoch milliseconds.
pub(crate) fn is_valid_date(value: &FieldValue) -> bool {
    match value {
        Value::String(text) => parse_date(text.trim()).is_some(),
        Value::Number(number) => number
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .is_some(),
        _ => false,
    }
}

pub(crate) fn parse_date(text: &str) -> Option<NaiveDate> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Some(instant.date_naive());
    }
    if let Some(date_time) = DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
    {
        return Some(date_time.date());
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn emptiness_depends_on_the_value_kind() {
        assert!(is_empty_value(&json!(null)));
        assert!(is_empty_value(&json!("")));
        assert!(is_empty_value(&json!("   \t")));
        assert!(is_empty_value(&json!([])));
        assert!(is_empty_value(&json!({})));
        assert!(!is_empty_value(&json!(0)));
        assert!(!is_empty_value(&json!(false)));
        assert!(!is_empty_value(&json!("a")));
    }

    #[test]
    fn length_counts_characters() {
        assert_eq!(text_len(&json!("café")), Some(4));
        assert_eq!(text_len(&json!(12)), None);
    }

    #[test]
    fn numbers_come_from_numbers_or_numeric_text() {
        assert_eq!(as_number(&json!(3)), Some(3.0));
        assert_eq!(as_number(&json!(" 12,5 ")), Some(12.5));
        assert_eq!(as_number(&json!("NaN")), None);
        assert_eq!(as_number(&json!("doze")), None);
        assert_eq!(as_number(&json!(true)), None);
    }

    #[test]
    fn dates_accept_common_formats() {
        assert!(is_valid_date(&json!("2024-01-01")));
        assert!(is_valid_date(&json!("01/02/2024")));
        assert!(is_valid_date(&json!("2024-01-01T10:30")));
        assert!(is_valid_date(&json!("2024-01-01T10:30:00Z")));
        assert!(is_valid_date(&json!(1_704_067_200_000_i64)));
        assert!(!is_valid_date(&json!("2024-02-30")));
        assert!(!is_valid_date(&json!("ontem")));
        assert!(!is_valid_date(&json!(null)));
    }
}
