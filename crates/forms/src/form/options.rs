use crate::{FormRecord, Sanitizer, Schema};

use super::{FormController, SubmitHandler};

/// When field changes trigger validation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ValidationMode {
    /// Every change validates the changed field.
    #[default]
    OnChange,
    /// Fields are validated by the first submit, then on every change.
    OnSubmit,
}

/// Flags for [`FormController::set_field_value`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SetValueOptions {
    pub should_validate: bool,
    pub should_dirty: bool,
    pub should_touch: bool,
}

impl SetValueOptions {
    /// Validate, mark dirty and mark touched, as a user edit would.
    pub const fn all() -> Self {
        Self {
            should_validate: true,
            should_dirty: true,
            should_touch: true,
        }
    }
}

/// Builder for [`FormController`].
pub struct FormBuilder<H> {
    pub(super) on_submit: H,
    pub(super) default_values: FormRecord,
    pub(super) schema: Schema,
    pub(super) sanitize_on_change: bool,
    pub(super) mode: ValidationMode,
    pub(super) sanitizer: Sanitizer,
}

impl<H: SubmitHandler> FormBuilder<H> {
    pub(super) fn new(on_submit: H) -> Self {
        Self {
            on_submit,
            default_values: FormRecord::new(),
            schema: Schema::default(),
            sanitize_on_change: true,
            mode: ValidationMode::default(),
            sanitizer: Sanitizer::default(),
        }
    }

    /// Initial values, also the baseline for the dirty flags.
    pub fn default_values(mut self, values: FormRecord) -> Self {
        self.default_values = values;
        self
    }

    pub fn schema(mut self, schema: impl Into<Schema>) -> Self {
        self.schema = schema.into();
        self
    }

    /// Re-sanitize string inputs right after each change. On by default.
    pub fn sanitize_on_change(mut self, enabled: bool) -> Self {
        self.sanitize_on_change = enabled;
        self
    }

    pub fn mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn sanitizer(mut self, sanitizer: Sanitizer) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    /// Construct the `FormController`.
    pub fn build(self) -> FormController<H> {
        FormController::from_builder(self)
    }
}
