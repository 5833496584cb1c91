//! Input sanitization and form validation for the finance tracker.
//!
//! - [`sanitizer`] strips script and markup injection vectors from user text.
//! - [`fields`] builds the rule of one field, [`rule_sets`] the rules of each form.
//! - [`form`] drives one form: values, errors, dirty/touched flags and submission.

pub use currency::Currency;
pub use error::{FormError, SubmitError};
pub use form::{
    FormBuilder, FormController, FormId, FormSnapshot, SetValueOptions, SubmitHandler,
    SubmitOutcome, ValidationMode,
};
pub use frequency::Frequency;
pub use money::{CurrencyParser, Money, currency_parser, parse_currency, parse_currency_as};
pub use rule_sets::{FormKind, SchemaContext};
pub use rules::{
    FieldErrors, LengthRule, PatternRule, RuleSet, Schema, VALIDATOR_FAILURE_MESSAGE,
    ValidationRule, Validator,
};
pub use sanitizer::{
    Sanitizer, TrimPolicy, is_safe_value, sanitize_form_data, sanitize_input, sanitize_str,
    strip_markup,
};

pub mod fields;
pub mod form;
pub mod rule_sets;
pub mod sanitizer;

mod currency;
mod error;
mod frequency;
mod money;
mod rules;
mod util;

/// Value of one form field.
pub type FieldValue = serde_json::Value;

/// Flat field name → value record of a whole form.
pub type FormRecord = serde_json::Map<String, serde_json::Value>;
