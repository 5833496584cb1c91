use std::io::Write;

use forms::{FieldErrors, FormController, FormKind, FormRecord, SubmitError, SubmitOutcome};
use serde::Serialize;

use crate::{error::Result, settings::Settings};

/// Errors printed when the record does not pass validation.
#[derive(Debug, Serialize)]
pub struct Rejection {
    pub form: &'static str,
    pub errors: FieldErrors,
}

/// Feeds `record` into a `kind` form field by field, the way a user would fill it in,
/// then submits it. The sanitized record is written to `out` on success.
///
/// A record is rejected as soon as any field fails while being filled in, even when
/// the form has since cleaned the offending markup out of the stored value.
pub async fn run<W: Write>(
    kind: FormKind,
    settings: &Settings,
    record: FormRecord,
    out: &mut W,
) -> Result<SubmitOutcome> {
    let sink = std::cell::RefCell::new(out);
    let on_submit = |values: FormRecord| {
        let sink = &sink;
        async move {
            let mut out = sink.borrow_mut();
            serde_json::to_writer_pretty(&mut **out, &values)?;
            writeln!(out)?;
            Ok::<(), SubmitError>(())
        }
    };

    let mut form = FormController::builder(on_submit)
        .schema(kind.schema(&settings.schema_context()))
        .sanitize_on_change(settings.sanitize_on_change)
        .sanitizer(settings.sanitizer())
        .build();
    tracing::info!(form = %form.id(), kind = %kind, fields = record.len(), "checking record");

    for (name, value) in record {
        form.on_field_change(&name, value);
    }
    let rejected_on_change = form.errors().clone();

    let outcome = if rejected_on_change.is_empty() {
        form.handle_submit().await?
    } else {
        tracing::warn!(
            form = %form.id(),
            fields = rejected_on_change.len(),
            "record rejected while filling in"
        );
        SubmitOutcome::Invalid
    };

    if outcome == SubmitOutcome::Invalid {
        form.validate_all_fields();
        let mut errors = form.errors().clone();
        // Errors on the raw input win over those of its cleaned copy.
        errors.extend(rejected_on_change);
        let rejection = Rejection {
            form: kind.as_str(),
            errors,
        };
        drop(form);
        let out = sink.into_inner();
        serde_json::to_writer_pretty(&mut *out, &rejection)?;
        writeln!(out)?;
    }
    Ok(outcome)
}
