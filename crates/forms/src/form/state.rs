use std::{collections::BTreeSet, fmt};

use serde::Serialize;
use uuid::Uuid;

use crate::{FieldErrors, FormRecord};

/// Identifier of one form instance, carried in log events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct FormId(Uuid);

impl FormId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Mutable state owned by a [`FormController`](super::FormController).
#[derive(Clone, Debug, Default)]
pub(crate) struct FormState {
    pub values: FormRecord,
    /// Baseline the dirty flags are computed against.
    pub defaults: FormRecord,
    /// Defaults given at construction; `reset_form(None)` goes back to these.
    pub initial_defaults: FormRecord,
    pub errors: FieldErrors,
    pub touched: BTreeSet<String>,
    pub dirty: BTreeSet<String>,
    pub is_submitting: bool,
    pub submit_count: u32,
    pub submit_failed: bool,
}

impl FormState {
    pub fn new(defaults: FormRecord) -> Self {
        Self {
            values: defaults.clone(),
            defaults: defaults.clone(),
            initial_defaults: defaults,
            ..Self::default()
        }
    }

    /// Re-derives the dirty flag of `name` from the baseline.
    pub fn refresh_dirty(&mut self, name: &str) {
        if self.values.get(name) == self.defaults.get(name) {
            self.dirty.remove(name);
        } else {
            self.dirty.insert(name.to_string());
        }
    }

    /// Starts over from `baseline`, which also becomes the new dirty baseline.
    pub fn reset(&mut self, baseline: FormRecord) {
        self.values = baseline.clone();
        self.defaults = baseline;
        self.errors.clear();
        self.touched.clear();
        self.dirty.clear();
        self.is_submitting = false;
        self.submit_failed = false;
    }
}

/// Read-only view of a form broadcast to subscribers after every change.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FormSnapshot {
    pub values: FormRecord,
    pub errors: FieldErrors,
    pub is_valid: bool,
    pub is_dirty: bool,
    pub is_submitting: bool,
    pub can_submit: bool,
    pub submit_count: u32,
}
