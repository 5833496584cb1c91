//! The module contains the errors the form core can return.
//!
//! Field validation failures are **not** errors: they are reported as data
//! (see [`FieldErrors`]) and never travel through `Err`. The errors are:
//!
//! - [`UnknownField`] returned when an operation names a field the form does not know.
//! - [`UnknownForm`] returned when a form name does not match any [`FormKind`].
//! - [`InvalidAmount`] returned when a currency string cannot be parsed as money.
//! - [`UnsupportedCurrency`] returned for a currency code outside [`Currency`].
//! - [`InvalidFrequency`] returned for an unknown recurrence identifier.
//! - [`InvalidPattern`] returned when a field pattern is not a valid regex.
//! - [`Submit`] returned when the submit handler fails.
//!
//!  [`FieldErrors`]: crate::FieldErrors
//!  [`FormKind`]: crate::FormKind
//!  [`Currency`]: crate::Currency
//!  [`UnknownField`]: FormError::UnknownField
//!  [`UnknownForm`]: FormError::UnknownForm
//!  [`InvalidAmount`]: FormError::InvalidAmount
//!  [`UnsupportedCurrency`]: FormError::UnsupportedCurrency
//!  [`InvalidFrequency`]: FormError::InvalidFrequency
//!  [`InvalidPattern`]: FormError::InvalidPattern
//!  [`Submit`]: FormError::Submit
use thiserror::Error;

/// Error produced by a caller-supplied submit handler.
pub type SubmitError = Box<dyn std::error::Error + Send + Sync>;

/// Form core errors.
#[derive(Error, Debug)]
pub enum FormError {
    #[error("\"{0}\" field not found!")]
    UnknownField(String),
    #[error("\"{0}\" form not found!")]
    UnknownForm(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),
    #[error("Invalid frequency: {0}")]
    InvalidFrequency(String),
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
    #[error("Submit failed: {0}")]
    Submit(#[source] SubmitError),
}

impl PartialEq for FormError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::UnknownField(a), Self::UnknownField(b)) => a == b,
            (Self::UnknownForm(a), Self::UnknownForm(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::UnsupportedCurrency(a), Self::UnsupportedCurrency(b)) => a == b,
            (Self::InvalidFrequency(a), Self::InvalidFrequency(b)) => a == b,
            (Self::InvalidPattern(a), Self::InvalidPattern(b)) => a.to_string() == b.to_string(),
            (Self::Submit(a), Self::Submit(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
