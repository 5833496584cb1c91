//! Removal of HTML/script injection vectors from user-typed text.
//!
//! The sanitizer strips, case-insensitively:
//!
//! - `<script>`, `<iframe>` and `<object>` blocks, tag plus contents up to the first
//!   matching closing tag (newlines included);
//! - `<embed ...>` tags;
//! - `javascript:` plus the run of non-whitespace that follows it;
//! - inline `on<word>=` handlers with a double-quoted, single-quoted or bare value.
//!
//! Removal passes run until nothing else matches, so markup that is only formed once
//! an inner block has been cut out is removed as well and sanitizing twice never
//! changes the result of sanitizing once. Benign text, Unicode included, is left alone.
//!
//! Non-string values pass through untouched.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{FieldValue, FormRecord};

#[allow(clippy::expect_used)]
static DANGEROUS_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?is)<script\b.*?</script\s*>",
        r"(?is)<iframe\b.*?</iframe\s*>",
        r"(?is)<object\b.*?</object\s*>",
        r"(?i)<embed\b[^>]*>",
        r"(?i)javascript:\S*",
        r#"(?i)\s*\bon\w+\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#,
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).expect("sanitizer pattern must compile"))
    .collect()
});

/// How the sanitizer treats whitespace around the cleaned text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrimPolicy {
    /// Always trim leading and trailing whitespace.
    #[default]
    Always,
    /// Keep the cleaned text untrimmed when it differs from the trimmed input and the
    /// input itself started or ended with a space; trim otherwise.
    Legacy,
}

/// Configurable sanitizer. [`Sanitizer::default`] trims always.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sanitizer {
    trim: TrimPolicy,
}

impl Sanitizer {
    #[must_use]
    pub const fn new(trim: TrimPolicy) -> Self {
        Self { trim }
    }

    /// Sanitizer reproducing the asymmetric trimming of older clients.
    #[must_use]
    pub const fn legacy() -> Self {
        Self::new(TrimPolicy::Legacy)
    }

    #[must_use]
    pub const fn trim_policy(&self) -> TrimPolicy {
        self.trim
    }

    /// Sanitizes a string.
    #[must_use]
    pub fn sanitize_str(&self, input: &str) -> String {
        let stripped = strip_dangerous(input);
        match self.trim {
            TrimPolicy::Always => stripped.trim().to_string(),
            TrimPolicy::Legacy => {
                let padded = input.starts_with(' ') || input.ends_with(' ');
                if stripped != input.trim() && padded {
                    stripped
                } else {
                    stripped.trim().to_string()
                }
            }
        }
    }

    /// Sanitizes a value: strings are cleaned, everything else is returned as is.
    #[must_use]
    pub fn sanitize(&self, value: &FieldValue) -> FieldValue {
        match value {
            Value::String(text) => Value::String(self.sanitize_str(text)),
            other => other.clone(),
        }
    }

    /// Sanitizes every top-level string of `record`.
    ///
    /// Nested arrays and objects are copied without being inspected.
    #[must_use]
    pub fn sanitize_record(&self, record: &FormRecord) -> FormRecord {
        record
            .iter()
            .map(|(key, value)| (key.clone(), self.sanitize(value)))
            .collect()
    }
}

/// Sanitizes `value` with the default sanitizer.
#[must_use]
pub fn sanitize_input(value: &FieldValue) -> FieldValue {
    Sanitizer::default().sanitize(value)
}

/// Sanitizes a string with the default sanitizer.
#[must_use]
pub fn sanitize_str(input: &str) -> String {
    Sanitizer::default().sanitize_str(input)
}

/// Returns `false` if `value` is a string containing a construct the sanitizer removes.
///
/// A string is safe exactly when sanitizing it can change nothing but surrounding
/// whitespace.
#[must_use]
pub fn is_safe_value(value: &FieldValue) -> bool {
    match value {
        Value::String(text) => !contains_dangerous(text),
        _ => true,
    }
}

/// Shallow sanitization of a flat record with the default sanitizer.
#[must_use]
pub fn sanitize_form_data(record: &FormRecord) -> FormRecord {
    Sanitizer::default().sanitize_record(record)
}

/// Removal passes only: markup is cut out and whitespace is left exactly as typed.
///
/// Used while a field is being edited, so a trailing space between two words
/// survives until the value is sanitized for submission.
#[must_use]
pub fn strip_markup(input: &str) -> String {
    strip_dangerous(input)
}

fn contains_dangerous(input: &str) -> bool {
    DANGEROUS_PATTERNS
        .iter()
        .any(|pattern| pattern.is_match(input))
}

fn strip_dangerous(input: &str) -> String {
    let mut current = input.to_string();
    // Every pass that matches shortens the text, so this terminates.
    while contains_dangerous(&current) {
        for pattern in DANGEROUS_PATTERNS.iter() {
            current = pattern.replace_all(&current, "").into_owned();
        }
    }
    current
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn strips_script_blocks() {
        assert_eq!(sanitize_str("<script>alert(1)</script>Hello"), "Hello");
        assert_eq!(
            sanitize_str("a<SCRIPT type=\"x\">if (a < b) { x() }\n</Script >b"),
            "ab"
        );
    }

    #[test]
    fn strips_frames_objects_and_embeds() {
        assert_eq!(sanitize_str("<iframe src=x>inner</iframe>ok"), "ok");
        assert_eq!(sanitize_str("<object data=x><p>y</p></object>ok"), "ok");
        assert_eq!(sanitize_str("<embed src=\"evil.swf\">ok"), "ok");
    }

    #[test]
    fn strips_javascript_scheme_up_to_whitespace() {
        assert_eq!(
            sanitize_str("javascript:alert(\"x\") Normal text"),
            "Normal text"
        );
        assert_eq!(sanitize_str("link JavaScript:void(0)"), "link");
    }

    #[test]
    fn strips_event_handlers_in_every_quoting_style() {
        let cleaned = sanitize_str("onclick=\"alert()\" onload=\"evil()\" Normal text");
        assert!(!cleaned.contains("onclick"));
        assert!(!cleaned.contains("onload"));
        assert!(cleaned.contains("Normal text"));

        assert_eq!(sanitize_str("a onmouseover='x()' b"), "a b");
        assert_eq!(sanitize_str("a onerror=boom b"), "a b");
    }

    #[test]
    fn removes_markup_formed_by_an_inner_removal() {
        let nested = "<scr<script>x</script>ipt>alert(1)</script>Hi";
        assert_eq!(sanitize_str(nested), "Hi");
        assert!(is_safe_value(&json!(sanitize_str(nested))));
    }

    #[test]
    fn strip_markup_keeps_whitespace() {
        assert_eq!(strip_markup("Ana "), "Ana ");
        assert_eq!(strip_markup(" Ana <embed src=x> B"), " Ana  B");
        assert_eq!(strip_markup("<script>x</script>"), "");
    }

    #[test]
    fn leaves_benign_text_alone() {
        let text = "🔒 Secure Text 中文 العربية";
        assert_eq!(sanitize_str(text), text);
        assert_eq!(sanitize_str("Mercado <3 > padaria"), "Mercado <3 > padaria");
        assert_eq!(sanitize_str("  Groceries  "), "Groceries");
    }

    #[test]
    fn passes_non_strings_through() {
        let values = [
            json!(42),
            json!(1.5),
            json!(true),
            json!(null),
            json!({"a": "<script>x</script>"}),
            json!(["<embed>"]),
        ];
        for value in values {
            assert_eq!(sanitize_input(&value), value);
            assert!(is_safe_value(&value));
        }
    }

    #[test]
    fn detects_unsafe_strings() {
        assert!(!is_safe_value(&json!("<script>x</script>")));
        assert!(!is_safe_value(&json!("go to javascript:x")));
        assert!(!is_safe_value(&json!("<img onerror=x>")));
        assert!(is_safe_value(&json!("plain text")));
        assert!(is_safe_value(&json!("<script> without closing tag")));
    }

    #[test]
    fn legacy_policy_keeps_padding_only_when_content_was_removed_from_padded_input() {
        let legacy = Sanitizer::legacy();
        assert_eq!(legacy.sanitize_str(" <script>x</script>Hello"), " Hello");
        assert_eq!(legacy.sanitize_str("<script>x</script> Hello"), "Hello");
        assert_eq!(legacy.sanitize_str("Hello"), "Hello");
        assert_eq!(legacy.sanitize_str(" Hello "), " Hello ");
        assert_eq!(
            legacy.sanitize_str("javascript:alert(\"x\") Normal text"),
            "Normal text"
        );
    }

    #[test]
    fn record_sanitization_is_shallow() {
        let record = json!({
            "title": "<script>x</script>Groceries",
            "amount": 50,
            "nested": {"note": "<script>x</script>"},
            "tags": ["<embed>"],
            "missing": null
        });
        let Value::Object(record) = record else {
            unreachable!()
        };

        let cleaned = sanitize_form_data(&record);
        assert_eq!(cleaned["title"], json!("Groceries"));
        assert_eq!(cleaned["amount"], json!(50));
        assert_eq!(cleaned["nested"], json!({"note": "<script>x</script>"}));
        assert_eq!(cleaned["tags"], json!(["<embed>"]));
        assert_eq!(cleaned["missing"], json!(null));
    }
}
