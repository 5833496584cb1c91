//! Declarative validation rules and the per-form rule sets built from them.
//!
//! A [`ValidationRule`] describes how one field is checked; it never changes the
//! value it inspects. A [`RuleSet`] maps field names to rules for a whole form, and a
//! [`Schema`] decides which rule set applies to the current values.

use std::{
    collections::BTreeMap,
    fmt,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::Arc,
};

use regex::Regex;

use crate::{
    FieldValue, FormError, FormRecord,
    util::{is_empty_value, text_len},
};

/// Message reported when a custom validator panics instead of answering.
pub const VALIDATOR_FAILURE_MESSAGE: &str = "Erro ao validar campo";

/// Custom check attached to a rule: `Ok(())` when the value passes, the message otherwise.
pub type Validator = Arc<dyn Fn(&FieldValue) -> Result<(), String> + Send + Sync>;

/// Error messages per field, as shown next to the inputs.
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Clone, Debug)]
pub struct PatternRule {
    pub regex: Regex,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LengthRule {
    pub bound: usize,
    pub message: String,
}

/// Validation descriptor for one field.
///
/// Checks run in this order and stop at the first failure: `required`, `min_length`,
/// `max_length`, `pattern`, `validate`. When the value is empty and the rule is not
/// required, nothing else is checked.
#[derive(Clone, Default)]
pub struct ValidationRule {
    required: Option<String>,
    pattern: Option<PatternRule>,
    min_length: Option<LengthRule>,
    max_length: Option<LengthRule>,
    validate: Option<Validator>,
}

impl ValidationRule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self, message: impl Into<String>) -> Self {
        self.required = Some(message.into());
        self
    }

    pub fn pattern(mut self, regex: Regex, message: impl Into<String>) -> Self {
        self.pattern = Some(PatternRule {
            regex,
            message: message.into(),
        });
        self
    }

    /// Same as [`pattern`](Self::pattern) for a pattern written as text.
    pub fn try_pattern(
        self,
        pattern: &str,
        message: impl Into<String>,
    ) -> Result<Self, FormError> {
        Ok(self.pattern(Regex::new(pattern)?, message))
    }

    pub fn min_length(mut self, bound: usize, message: impl Into<String>) -> Self {
        self.min_length = Some(LengthRule {
            bound,
            message: message.into(),
        });
        self
    }

    pub fn max_length(mut self, bound: usize, message: impl Into<String>) -> Self {
        self.max_length = Some(LengthRule {
            bound,
            message: message.into(),
        });
        self
    }

    pub fn validate<F>(mut self, validator: F) -> Self
    where
        F: Fn(&FieldValue) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validate = Some(Arc::new(validator));
        self
    }

    pub fn required_message(&self) -> Option<&str> {
        self.required.as_deref()
    }

    pub fn pattern_rule(&self) -> Option<&PatternRule> {
        self.pattern.as_ref()
    }

    pub fn min_length_rule(&self) -> Option<&LengthRule> {
        self.min_length.as_ref()
    }

    pub fn max_length_rule(&self) -> Option<&LengthRule> {
        self.max_length.as_ref()
    }

    pub fn has_validator(&self) -> bool {
        self.validate.is_some()
    }

    /// Runs only the custom validator; `Ok(())` when the rule has none.
    ///
    /// A panicking validator is reported as [`VALIDATOR_FAILURE_MESSAGE`].
    pub fn run_validator(&self, value: &FieldValue) -> Result<(), String> {
        let Some(validator) = &self.validate else {
            return Ok(());
        };
        match catch_unwind(AssertUnwindSafe(|| validator(value))) {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::error!("custom validator panicked");
                Err(VALIDATOR_FAILURE_MESSAGE.to_string())
            }
        }
    }

    /// Checks `value` against the whole rule.
    pub fn check(&self, value: &FieldValue) -> Result<(), String> {
        if is_empty_value(value) {
            return match &self.required {
                Some(message) => Err(message.clone()),
                None => Ok(()),
            };
        }

        if let Some(len) = text_len(value) {
            if let Some(min) = &self.min_length
                && len < min.bound
            {
                return Err(min.message.clone());
            }
            if let Some(max) = &self.max_length
                && len > max.bound
            {
                return Err(max.message.clone());
            }
        }

        if let Some(pattern) = &self.pattern {
            let matches = match value {
                FieldValue::String(text) => pattern.regex.is_match(text),
                other => pattern.regex.is_match(&other.to_string()),
            };
            if !matches {
                return Err(pattern.message.clone());
            }
        }

        self.run_validator(value)
    }
}

impl fmt::Debug for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationRule")
            .field("required", &self.required)
            .field("pattern", &self.pattern.as_ref().map(|p| p.regex.as_str()))
            .field("min_length", &self.min_length)
            .field("max_length", &self.max_length)
            .field("validate", &self.validate.is_some())
            .finish()
    }
}

/// Field name → rule mapping describing one form.
#[derive(Clone, Debug, Default)]
pub struct RuleSet {
    rules: BTreeMap<String, ValidationRule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the rule for `name`.
    ///
    /// # Panics
    ///
    /// Panics if `name` already has a rule: two rules for one field is a bug in the
    /// form definition, not a runtime condition.
    pub fn field(mut self, name: impl Into<String>, rule: ValidationRule) -> Self {
        let name = name.into();
        assert!(
            !self.rules.contains_key(&name),
            "duplicate validation rule for field `{name}`"
        );
        self.rules.insert(name, rule);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ValidationRule> {
        self.rules.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Checks one field of `values`; a missing field is checked as `null`.
    ///
    /// Fields without a rule always pass.
    pub fn check_field(&self, name: &str, values: &FormRecord) -> Result<(), String> {
        match self.rules.get(name) {
            Some(rule) => rule.check(values.get(name).unwrap_or(&FieldValue::Null)),
            None => Ok(()),
        }
    }

    /// Checks every ruled field and collects the failures.
    pub fn check_all(&self, values: &FormRecord) -> FieldErrors {
        self.rules
            .keys()
            .filter_map(|name| {
                self.check_field(name, values)
                    .err()
                    .map(|message| (name.clone(), message))
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ValidationRule)> {
        self.rules.iter().map(|(name, rule)| (name.as_str(), rule))
    }
}

/// Rule set bound to a form.
///
/// A `Dynamic` schema is rebuilt from the live values every time validation runs, so
/// rules that close over another field (password confirmation) never go stale.
#[derive(Clone)]
pub enum Schema {
    Fixed(RuleSet),
    Dynamic(Arc<dyn Fn(&FormRecord) -> RuleSet + Send + Sync>),
}

impl Schema {
    pub fn dynamic<F>(build: F) -> Self
    where
        F: Fn(&FormRecord) -> RuleSet + Send + Sync + 'static,
    {
        Self::Dynamic(Arc::new(build))
    }

    /// Resolves the rule set that applies to `values`.
    pub fn rules_for(&self, values: &FormRecord) -> RuleSet {
        match self {
            Self::Fixed(rules) => rules.clone(),
            Self::Dynamic(build) => build(values),
        }
    }
}

impl From<RuleSet> for Schema {
    fn from(rules: RuleSet) -> Self {
        Self::Fixed(rules)
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::Fixed(RuleSet::default())
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(rules) => f.debug_tuple("Fixed").field(rules).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}
