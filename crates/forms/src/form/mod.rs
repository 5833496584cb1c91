//! Stateful controller binding a schema, a sanitizer and a submit handler to one form.
//!
//! The controller owns the [`FormState`] of its form: values, errors and the
//! dirty/touched flags. Derived flags (`is_valid`, `is_dirty`, `can_submit`) are
//! computed on every read, never cached. Observers receive a [`FormSnapshot`] after
//! every operation that changes the state through [`FormController::subscribe`].
//!
//! A change goes through two phases inside [`FormController::on_field_change`]:
//! the raw input is stored and validated first, so an injection attempt surfaces as
//! a field error, then the input with its markup removed replaces it when the two
//! differ. Whitespace is left as typed until the values are sanitized for submission.

use std::fmt;

use tokio::sync::watch;

use crate::{
    FieldErrors, FieldValue, FormError, FormRecord, RuleSet, Sanitizer, Schema, strip_markup,
};

pub use options::{FormBuilder, SetValueOptions, ValidationMode};
pub use state::{FormId, FormSnapshot};
pub use submit::{SubmitHandler, SubmitOutcome};

use state::FormState;
use submit::SubmitInFlight;

mod options;
mod state;
mod submit;

type ResultForm<T> = Result<T, FormError>;

pub struct FormController<H> {
    id: FormId,
    schema: Schema,
    on_submit: H,
    sanitizer: Sanitizer,
    sanitize_on_change: bool,
    mode: ValidationMode,
    state: FormState,
    notifier: watch::Sender<FormSnapshot>,
}

impl<H: SubmitHandler> FormController<H> {
    /// Return a builder for `FormController`; `on_submit` receives the sanitized values.
    pub fn builder(on_submit: H) -> FormBuilder<H> {
        FormBuilder::new(on_submit)
    }

    fn from_builder(builder: FormBuilder<H>) -> Self {
        let (notifier, _) = watch::channel(FormSnapshot::default());
        let controller = Self {
            id: FormId::new(),
            schema: builder.schema,
            on_submit: builder.on_submit,
            sanitizer: builder.sanitizer,
            sanitize_on_change: builder.sanitize_on_change,
            mode: builder.mode,
            state: FormState::new(builder.default_values),
            notifier,
        };
        controller.notify();
        tracing::debug!(form = %controller.id, "form initialized");
        controller
    }

    pub fn id(&self) -> FormId {
        self.id
    }

    /// Rule set that applies to the current values.
    pub fn rules(&self) -> RuleSet {
        self.schema.rules_for(&self.state.values)
    }

    /// Handles a user edit of `name`.
    ///
    /// The raw value is stored, marked dirty and touched, and validated (depending on
    /// the [`ValidationMode`]). With sanitize-on-change enabled, a string carrying
    /// markup is then overwritten by the same text without it; surrounding whitespace
    /// is kept so the user can keep typing. The error reported for the raw input stays
    /// until the field is edited or validated again.
    pub fn on_field_change(&mut self, name: &str, raw: FieldValue) {
        self.state.values.insert(name.to_string(), raw.clone());
        self.state.touched.insert(name.to_string());
        self.state.refresh_dirty(name);
        if self.validates_on_change() {
            self.check_field(name);
        }

        if self.sanitize_on_change
            && let FieldValue::String(text) = &raw
        {
            let clean = strip_markup(text);
            if clean != *text {
                tracing::warn!(form = %self.id, field = name, "input rewritten by the sanitizer");
                self.state
                    .values
                    .insert(name.to_string(), FieldValue::String(clean));
                self.state.refresh_dirty(name);
            }
        }

        tracing::debug!(form = %self.id, field = name, "field changed");
        self.notify();
    }

    /// Marks `name` as touched.
    pub fn on_field_blur(&mut self, name: &str) {
        if self.state.touched.insert(name.to_string()) {
            self.notify();
        }
    }

    /// Programmatic update; strings are sanitized before being stored.
    pub fn set_field_value(&mut self, name: &str, value: FieldValue, options: SetValueOptions) {
        let value = self.sanitizer.sanitize(&value);
        self.state.values.insert(name.to_string(), value);
        if options.should_dirty {
            self.state.refresh_dirty(name);
        }
        if options.should_touch {
            self.state.touched.insert(name.to_string());
        }
        if options.should_validate {
            self.check_field(name);
        }
        self.notify();
    }

    /// Validates one field and records its error.
    ///
    /// Returns [`FormError::UnknownField`] if `name` is neither ruled by the schema
    /// nor present in the values.
    pub fn validate_field(&mut self, name: &str) -> ResultForm<bool> {
        if !self.rules().contains(name) && !self.state.values.contains_key(name) {
            return Err(FormError::UnknownField(name.to_string()));
        }
        let valid = self.check_field(name);
        self.notify();
        Ok(valid)
    }

    /// Validates every field of the schema, replacing all recorded errors.
    pub fn validate_all_fields(&mut self) -> bool {
        let valid = self.check_all();
        self.notify();
        valid
    }

    /// Validates everything and, when valid, hands the sanitized values to the handler.
    ///
    /// Every schema field is marked touched first so all errors become visible. The
    /// handler runs at most once per call, and `is_submitting` is false again on
    /// every return path, including when the returned future is dropped mid-submit.
    pub async fn handle_submit(&mut self) -> ResultForm<SubmitOutcome> {
        self.state.submit_count += 1;
        let rules = self.rules();
        self.state
            .touched
            .extend(rules.field_names().map(str::to_string));

        if !self.check_all() {
            tracing::warn!(
                form = %self.id,
                errors = self.state.errors.len(),
                "submit rejected by validation"
            );
            self.notify();
            return Ok(SubmitOutcome::Invalid);
        }

        self.state.is_submitting = true;
        self.notify();

        let values = self.sanitizer.sanitize_record(&self.state.values);
        let outcome = {
            // Clears the flag even if this future is dropped while the handler runs.
            let _in_flight = SubmitInFlight::new(&mut self.state, &self.notifier);
            self.on_submit.submit(values).await
        };

        match outcome {
            Ok(()) => {
                self.state.submit_failed = false;
                tracing::debug!(form = %self.id, "form submitted");
                self.notify();
                Ok(SubmitOutcome::Submitted)
            }
            Err(err) => {
                tracing::error!(form = %self.id, "submit handler failed: {err}");
                self.state.submit_failed = true;
                self.notify();
                Err(FormError::Submit(err))
            }
        }
    }

    /// Restores `values` or, with `None`, the defaults given at construction.
    ///
    /// The restored values become the baseline of the dirty flags; errors, touched
    /// and dirty flags, the submitting flag and the submit failure are cleared.
    pub fn reset_form(&mut self, values: Option<FormRecord>) {
        let baseline = values.unwrap_or_else(|| self.state.initial_defaults.clone());
        self.state.reset(baseline);
        tracing::debug!(form = %self.id, "form reset");
        self.notify();
    }

    pub fn values(&self) -> &FormRecord {
        &self.state.values
    }

    /// Current value of `name`.
    pub fn watch(&self, name: &str) -> Option<&FieldValue> {
        self.state.values.get(name)
    }

    /// Sanitized copy of the current values; the form itself is left untouched.
    pub fn get_sanitized_values(&self) -> FormRecord {
        self.sanitizer.sanitize_record(&self.state.values)
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.state.errors
    }

    pub fn get_field_error(&self, name: &str) -> Option<&str> {
        self.state.errors.get(name).map(String::as_str)
    }

    /// True once `name` has been touched and has an error.
    pub fn has_field_error(&self, name: &str) -> bool {
        self.state.touched.contains(name) && self.state.errors.contains_key(name)
    }

    pub fn is_touched(&self, name: &str) -> bool {
        self.state.touched.contains(name)
    }

    pub fn is_field_dirty(&self, name: &str) -> bool {
        self.state.dirty.contains(name)
    }

    pub fn is_dirty(&self) -> bool {
        !self.state.dirty.is_empty()
    }

    /// No recorded error and every schema rule passes on the current values.
    pub fn is_valid(&self) -> bool {
        self.state.errors.is_empty() && self.rules().check_all(&self.state.values).is_empty()
    }

    pub fn is_submitting(&self) -> bool {
        self.state.is_submitting
    }

    pub fn can_submit(&self) -> bool {
        self.is_valid() && !self.is_submitting()
    }

    pub fn submit_count(&self) -> u32 {
        self.state.submit_count
    }

    /// True when the last submission failed in the handler.
    pub fn has_submit_error(&self) -> bool {
        self.state.submit_failed
    }

    pub fn snapshot(&self) -> FormSnapshot {
        let is_valid = self.is_valid();
        FormSnapshot {
            values: self.state.values.clone(),
            errors: self.state.errors.clone(),
            is_valid,
            is_dirty: self.is_dirty(),
            is_submitting: self.state.is_submitting,
            can_submit: is_valid && !self.state.is_submitting,
            submit_count: self.state.submit_count,
        }
    }

    /// Receiver of the snapshots published after every state change.
    pub fn subscribe(&self) -> watch::Receiver<FormSnapshot> {
        self.notifier.subscribe()
    }

    fn validates_on_change(&self) -> bool {
        match self.mode {
            ValidationMode::OnChange => true,
            ValidationMode::OnSubmit => self.state.submit_count > 0,
        }
    }

    fn check_field(&mut self, name: &str) -> bool {
        match self.rules().check_field(name, &self.state.values) {
            Ok(()) => {
                self.state.errors.remove(name);
                true
            }
            Err(message) => {
                self.state.errors.insert(name.to_string(), message);
                false
            }
        }
    }

    fn check_all(&mut self) -> bool {
        self.state.errors = self.rules().check_all(&self.state.values);
        self.state.errors.is_empty()
    }

    fn notify(&self) {
        self.notifier.send_replace(self.snapshot());
    }
}

impl<H> fmt::Debug for FormController<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormController")
            .field("id", &self.id)
            .field("schema", &self.schema)
            .field("sanitize_on_change", &self.sanitize_on_change)
            .field("mode", &self.mode)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::{SubmitError, ValidationRule, fields};

    fn record(value: Value) -> FormRecord {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test records are objects"),
        }
    }

    async fn accept(_: FormRecord) -> Result<(), SubmitError> {
        Ok(())
    }

    fn controller(defaults: Value) -> FormController<impl SubmitHandler> {
        FormController::builder(accept)
            .default_values(record(defaults))
            .schema(RuleSet::new().field("title", fields::title()))
            .build()
    }

    #[test]
    fn change_validates_raw_input_then_stores_it_sanitized() {
        let mut form = controller(json!({"title": ""}));
        form.on_field_change("title", json!("<script>x</script>Almoço"));

        assert_eq!(form.watch("title"), Some(&json!("Almoço")));
        assert_eq!(
            form.get_field_error("title"),
            Some("Título contém caracteres inválidos")
        );
        assert!(form.has_field_error("title"));
        assert!(!form.is_valid());

        form.on_field_change("title", json!("Almoço"));
        assert_eq!(form.get_field_error("title"), None);
        assert!(form.is_valid());
        assert!(form.can_submit());
    }

    #[test]
    fn typing_keeps_spaces_between_words() {
        let mut form = FormController::builder(accept)
            .schema(RuleSet::new().field("name", fields::text(2, 50, true, "Nome")))
            .build();

        form.on_field_change("name", json!("Ana "));
        assert_eq!(form.watch("name"), Some(&json!("Ana ")));
        assert_eq!(form.get_field_error("name"), None);

        form.on_field_change("name", json!("Ana B"));
        assert_eq!(form.watch("name"), Some(&json!("Ana B")));

        form.on_field_change("name", json!("Ana B "));
        assert_eq!(form.get_sanitized_values()["name"], json!("Ana B"));
    }

    #[test]
    fn sanitize_on_change_can_be_disabled() {
        let mut form = FormController::builder(accept)
            .sanitize_on_change(false)
            .build();
        form.on_field_change("note", json!("<embed src=x>hi"));
        assert_eq!(form.watch("note"), Some(&json!("<embed src=x>hi")));
        assert_eq!(form.get_sanitized_values()["note"], json!("hi"));
    }

    #[test]
    fn errors_are_hidden_until_touched() {
        let mut form = controller(json!({"title": ""}));
        assert!(!form.validate_field("title").unwrap());
        assert_eq!(form.get_field_error("title"), Some("Título é obrigatório"));
        assert!(!form.has_field_error("title"));

        form.on_field_blur("title");
        assert!(form.has_field_error("title"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let mut form = controller(json!({}));
        assert_eq!(
            form.validate_field("nope"),
            Err(FormError::UnknownField("nope".to_string()))
        );
    }

    #[test]
    fn set_field_value_sanitizes_and_honours_options() {
        let mut form = controller(json!({"title": "a"}));
        form.set_field_value(
            "title",
            json!("  b javascript:alert(1) "),
            SetValueOptions::default(),
        );
        assert_eq!(form.watch("title"), Some(&json!("b")));
        assert!(!form.is_dirty());
        assert!(!form.is_touched("title"));

        form.set_field_value("title", json!(""), SetValueOptions::all());
        assert!(form.is_dirty());
        assert!(form.has_field_error("title"));
    }

    #[test]
    fn dirty_tracks_the_baseline() {
        let mut form = controller(json!({"title": "a"}));
        assert!(!form.is_dirty());
        form.on_field_change("title", json!("b"));
        assert!(form.is_dirty());
        assert!(form.is_field_dirty("title"));
        form.on_field_change("title", json!("a"));
        assert!(!form.is_dirty());
    }

    #[test]
    fn on_submit_mode_waits_for_the_first_submit() {
        let mut form = FormController::builder(accept)
            .schema(RuleSet::new().field("title", fields::title()))
            .mode(ValidationMode::OnSubmit)
            .build();
        form.on_field_change("title", json!(""));
        assert!(form.errors().is_empty());
        assert!(!form.is_valid());
    }

    #[test]
    fn subscribers_see_every_change() {
        let mut form = controller(json!({"title": ""}));
        let mut updates = form.subscribe();
        assert!(!updates.borrow_and_update().is_valid);

        form.on_field_change("title", json!("Mercado"));
        assert!(updates.has_changed().unwrap());
        let snapshot = updates.borrow_and_update().clone();
        assert!(snapshot.is_valid);
        assert!(snapshot.can_submit);
        assert_eq!(snapshot.values["title"], json!("Mercado"));
    }

    #[tokio::test]
    async fn dropped_submit_clears_the_submitting_flag() {
        let never = |_: FormRecord| std::future::pending::<Result<(), SubmitError>>();
        let mut form = FormController::builder(never)
            .default_values(record(json!({"title": "Aluguel"})))
            .schema(RuleSet::new().field("title", fields::title()))
            .build();
        let updates = form.subscribe();

        tokio::select! {
            biased;
            _ = form.handle_submit() => unreachable!("the handler never completes"),
            _ = std::future::ready(()) => {}
        }

        assert!(!form.is_submitting());
        assert!(form.can_submit());
        assert!(!updates.borrow().is_submitting);
        assert!(updates.borrow().can_submit);
    }

    #[tokio::test]
    async fn invalid_submit_touches_every_field() {
        let mut form = FormController::builder(accept)
            .schema(
                RuleSet::new()
                    .field("title", fields::title())
                    .field("note", ValidationRule::new()),
            )
            .build();

        assert_eq!(form.handle_submit().await, Ok(SubmitOutcome::Invalid));
        assert!(form.has_field_error("title"));
        assert!(form.is_touched("note"));
        assert_eq!(form.submit_count(), 1);
        assert!(!form.is_submitting());
    }
}
