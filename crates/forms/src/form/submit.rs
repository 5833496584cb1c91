use std::future::Future;

use tokio::sync::watch;

use crate::{FormRecord, SubmitError};

use super::{FormSnapshot, state::FormState};

/// Receives the sanitized record of a valid form.
///
/// Implemented for every `Fn(FormRecord) -> impl Future<Output = Result<(), SubmitError>>`,
/// so async closures can be passed directly.
pub trait SubmitHandler {
    fn submit(&self, values: FormRecord) -> impl Future<Output = Result<(), SubmitError>>;
}

impl<F, Fut> SubmitHandler for F
where
    F: Fn(FormRecord) -> Fut,
    Fut: Future<Output = Result<(), SubmitError>>,
{
    fn submit(&self, values: FormRecord) -> impl Future<Output = Result<(), SubmitError>> {
        self(values)
    }
}

/// Result of a submission that did not fail in the handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The handler received the sanitized values and succeeded.
    Submitted,
    /// Validation failed; the handler was not called.
    Invalid,
}

impl SubmitOutcome {
    pub fn is_submitted(self) -> bool {
        self == SubmitOutcome::Submitted
    }
}

/// Marks a form as submitting for as long as it lives.
///
/// Dropping it, on completion or because the submit future itself was dropped,
/// clears the flag and republishes the snapshot.
pub(super) struct SubmitInFlight<'a> {
    state: &'a mut FormState,
    notifier: &'a watch::Sender<FormSnapshot>,
}

impl<'a> SubmitInFlight<'a> {
    pub(super) fn new(
        state: &'a mut FormState,
        notifier: &'a watch::Sender<FormSnapshot>,
    ) -> Self {
        state.is_submitting = true;
        Self { state, notifier }
    }
}

impl Drop for SubmitInFlight<'_> {
    fn drop(&mut self) {
        self.state.is_submitting = false;
        self.notifier.send_modify(|snapshot| {
            snapshot.is_submitting = false;
            snapshot.can_submit = snapshot.is_valid;
        });
    }
}
