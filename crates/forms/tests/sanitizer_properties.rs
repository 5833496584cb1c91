//! Property tests for the sanitizer.
//!
//! - Sanitizing twice gives the result of sanitizing once.
//! - Sanitized text is always safe, and safe text only loses surrounding whitespace.
//! - Unsafe text never comes back unchanged.
//! - Non-string values pass through unchanged.
//! - Benign Unicode text survives untouched.

use forms::{
    FormRecord, Sanitizer, is_safe_value, sanitize_form_data, sanitize_input, sanitize_str,
    strip_markup,
};
use proptest::prelude::*;
use serde_json::{Value, json};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

const MARKUP: [&str; 15] = [
    "<script>alert(1)</script>",
    "<SCRIPT type=\"text/javascript\">\nx()\n</SCRIPT>",
    "<iframe src=\"evil\"></iframe>",
    "<object data=x></object>",
    "<embed src=x>",
    "javascript:void(0)",
    " onclick=\"steal()\"",
    " onload='x'",
    " onerror=boom",
    "<scr",
    "ipt>",
    "</script>",
    "<b>",
    " ",
    "\t",
];

/// Fragments that look like markup, mixed with ordinary words.
fn arb_fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(MARKUP.to_vec()).prop_map(str::to_string),
        "[a-zA-Z0-9 ,.!?]{0,12}",
        "\\PC{0,6}",
    ]
}

fn arb_text() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_fragment(), 0..8).prop_map(|parts| parts.concat())
}

/// Text with no markup characters at all.
fn arb_benign() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 àáâãçéêíóôõúüñßøæœ€£¥₩日本語中文한국어🙂🚀,.;!?()-]{0,40}"
        .prop_filter("no handler-like words", |text| {
            !text.to_lowercase().contains("on")
        })
}

fn arb_non_string() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        (-1.0e9f64..1.0e9).prop_map(|n| json!(n)),
        Just(json!(["<script>x</script>", 1])),
        Just(json!({"nested": "<embed src=x>"})),
    ]
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn sanitizing_is_idempotent(text in arb_text()) {
        let once = sanitize_str(&text);
        prop_assert_eq!(sanitize_str(&once), once);
    }

    #[test]
    fn sanitized_text_is_safe(text in arb_text()) {
        prop_assert!(is_safe_value(&Value::String(sanitize_str(&text))));
    }

    #[test]
    fn safe_text_only_loses_surrounding_whitespace(text in arb_text()) {
        let value = Value::String(text.clone());
        if is_safe_value(&value) {
            prop_assert_eq!(sanitize_input(&value), Value::String(text.trim().to_string()));
        }
    }

    #[test]
    fn unsafe_text_is_always_changed(text in arb_text()) {
        if !is_safe_value(&Value::String(text.clone())) {
            prop_assert_ne!(sanitize_str(&text), text);
        }
    }

    #[test]
    fn markup_stripping_never_touches_safe_text(text in arb_text()) {
        if is_safe_value(&Value::String(text.clone())) {
            prop_assert_eq!(strip_markup(&text), text);
        }
    }

    #[test]
    fn non_strings_pass_through(value in arb_non_string()) {
        prop_assert_eq!(sanitize_input(&value), value.clone());
        prop_assert!(is_safe_value(&value));
    }

    #[test]
    fn benign_unicode_is_preserved(text in arb_benign()) {
        prop_assert!(is_safe_value(&Value::String(text.clone())));
        prop_assert_eq!(sanitize_str(&text), text.trim());
    }

    #[test]
    fn record_sanitization_is_shallow(text in arb_text(), nested in arb_text()) {
        let mut record = FormRecord::new();
        record.insert("field".to_string(), Value::String(text.clone()));
        record.insert("nested".to_string(), json!([nested.clone()]));

        let clean = sanitize_form_data(&record);
        prop_assert_eq!(&clean["field"], &Value::String(sanitize_str(&text)));
        prop_assert_eq!(&clean["nested"], &json!([nested]));
    }

    #[test]
    fn legacy_policy_agrees_on_unpadded_input(text in arb_text()) {
        let text = text.trim().to_string();
        prop_assert_eq!(Sanitizer::legacy().sanitize_str(&text), sanitize_str(&text));
    }
}
