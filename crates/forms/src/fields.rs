//! Field-level rule factories.
//!
//! Every factory returns a fresh [`ValidationRule`]. Factories taking dynamic input
//! (`confirm_password`, `category`, `currency`) capture it by value, so a rule built
//! from an old password or category list must be rebuilt when that input changes.
//!
//! Messages are the Portuguese strings shown in the app.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::Value;

use crate::{
    CurrencyParser, FieldValue, Frequency, ValidationRule,
    sanitizer::is_safe_value,
    util::{as_number, is_valid_date},
};

pub const DEFAULT_REQUIRED_MESSAGE: &str = "Este campo é obrigatório";
pub const DEFAULT_PASSWORD_MIN_LENGTH: usize = 6;
pub const TITLE_MIN_LENGTH: usize = 1;
pub const TITLE_MAX_LENGTH: usize = 100;
pub const DESCRIPTION_MIN_LENGTH: usize = 3;
pub const DESCRIPTION_MAX_LENGTH: usize = 500;

#[allow(clippy::expect_used)]
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern must compile")
});

#[allow(clippy::expect_used)]
static HEX_COLOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("color pattern must compile"));

pub fn required(message: Option<&str>) -> ValidationRule {
    ValidationRule::new().required(message.unwrap_or(DEFAULT_REQUIRED_MESSAGE))
}

pub fn email(message: Option<&str>) -> ValidationRule {
    ValidationRule::new()
        .required("Email é obrigatório")
        .pattern(EMAIL_REGEX.clone(), message.unwrap_or("Email inválido"))
}

pub fn password(min_length: usize, message: Option<&str>) -> ValidationRule {
    let too_short = message.map_or_else(
        || format!("Senha deve ter pelo menos {min_length} caracteres"),
        str::to_string,
    );
    ValidationRule::new()
        .required("Senha é obrigatória")
        .min_length(min_length, too_short)
}

/// Confirmation bound to the password typed so far.
pub fn confirm_password(expected: &str, message: Option<&str>) -> ValidationRule {
    let expected = expected.to_string();
    let mismatch = message.unwrap_or("As senhas não coincidem").to_string();
    ValidationRule::new()
        .required("Confirmação de senha é obrigatória")
        .validate(move |value| {
            if value.as_str() == Some(expected.as_str()) {
                Ok(())
            } else {
                Err(mismatch.clone())
            }
        })
}

/// Title with the default 1–100 character bounds.
pub fn title() -> ValidationRule {
    title_bounded(TITLE_MIN_LENGTH, TITLE_MAX_LENGTH)
}

/// Titles are rejected, not cleaned, when they carry markup the sanitizer would remove.
pub fn title_bounded(min: usize, max: usize) -> ValidationRule {
    ValidationRule::new()
        .required("Título é obrigatório")
        .min_length(min, format!("Título deve ter pelo menos {min} caracteres"))
        .max_length(max, format!("Título deve ter no máximo {max} caracteres"))
        .validate(reject_unsafe("Título contém caracteres inválidos"))
}

/// Description with the default 3–500 character bounds.
pub fn description() -> ValidationRule {
    description_bounded(DESCRIPTION_MIN_LENGTH, DESCRIPTION_MAX_LENGTH)
}

pub fn description_bounded(min: usize, max: usize) -> ValidationRule {
    ValidationRule::new()
        .required("Descrição é obrigatória")
        .min_length(min, format!("Descrição deve ter pelo menos {min} caracteres"))
        .max_length(max, format!("Descrição deve ter no máximo {max} caracteres"))
        .validate(reject_unsafe("Descrição contém caracteres inválidos"))
}

/// Amount field: the raw input goes through `parse` and must come out as a number > 0.
pub fn currency(parse: CurrencyParser, message: Option<&str>) -> ValidationRule {
    let invalid = message
        .unwrap_or("Valor deve ser um número maior que zero")
        .to_string();
    ValidationRule::new()
        .required("Valor é obrigatório")
        .validate(move |value| {
            let raw = match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            let amount = parse(&raw).trim().parse::<f64>().unwrap_or(f64::NAN);
            if amount.is_nan() || amount <= 0.0 {
                Err(invalid.clone())
            } else {
                Ok(())
            }
        })
}

/// Category picked from `allowed`; an empty list accepts any category.
pub fn category<I, S>(allowed: I, message: Option<&str>) -> ValidationRule
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let allowed: Vec<String> = allowed.into_iter().map(Into::into).collect();
    let invalid = message.unwrap_or("Categoria inválida").to_string();
    ValidationRule::new()
        .required("Categoria é obrigatória")
        .validate(move |value| {
            if allowed.is_empty() {
                return Ok(());
            }
            match value.as_str() {
                Some(picked) if allowed.iter().any(|name| name == picked) => Ok(()),
                _ => Err(invalid.clone()),
            }
        })
}

pub fn date(message: Option<&str>) -> ValidationRule {
    let invalid = message.unwrap_or("Data inválida").to_string();
    ValidationRule::new()
        .required("Data é obrigatória")
        .validate(move |value| {
            if is_valid_date(value) {
                Ok(())
            } else {
                Err(invalid.clone())
            }
        })
}

pub fn frequency() -> ValidationRule {
    ValidationRule::new()
        .required("Frequência é obrigatória")
        .validate(|value| {
            match value.as_str().map(str::parse::<Frequency>) {
                Some(Ok(_)) => Ok(()),
                _ => Err("Frequência inválida".to_string()),
            }
        })
}

/// Free text labelled `label` in the messages; `min == 0` disables the lower bound.
pub fn text(min: usize, max: usize, required: bool, label: &str) -> ValidationRule {
    let mut rule = ValidationRule::new();
    if required {
        rule = rule.required(format!("{label} é obrigatório"));
    }
    if min > 0 {
        rule = rule.min_length(min, format!("{label} deve ter pelo menos {min} caracteres"));
    }
    rule.max_length(max, format!("{label} deve ter no máximo {max} caracteres"))
        .validate(reject_unsafe(&format!("{label} contém caracteres inválidos")))
}

/// `#RRGGBB` color picked for a category.
pub fn color() -> ValidationRule {
    ValidationRule::new()
        .required("Cor é obrigatória")
        .pattern(HEX_COLOR_REGEX.clone(), "Cor inválida")
}

/// Number (or numeric text) inside `[min, max]`.
pub fn numeric(min: f64, max: f64, message: Option<&str>) -> ValidationRule {
    let out_of_range = message.map_or_else(
        || format!("Valor deve estar entre {min} e {max}"),
        str::to_string,
    );
    ValidationRule::new()
        .required("Valor é obrigatório")
        .validate(move |value| match as_number(value) {
            None => Err("Valor deve ser um número".to_string()),
            Some(number) if number < min || number > max => Err(out_of_range.clone()),
            Some(_) => Ok(()),
        })
}

/// Wraps a predicate: `false` reports `message`.
pub fn custom<F>(predicate: F, message: &str) -> ValidationRule
where
    F: Fn(&FieldValue) -> bool + Send + Sync + 'static,
{
    let message = message.to_string();
    ValidationRule::new().validate(move |value| {
        if predicate(value) {
            Ok(())
        } else {
            Err(message.clone())
        }
    })
}

/// Value restricted to a fixed list of identifiers.
pub fn one_of(allowed: &[&str], required_message: &str, message: &str) -> ValidationRule {
    let allowed: Arc<[String]> = allowed.iter().map(|item| (*item).to_string()).collect();
    custom(
        move |value| {
            value
                .as_str()
                .is_some_and(|picked| allowed.iter().any(|item| item == picked))
        },
        message,
    )
    .required(required_message)
}

fn reject_unsafe(
    message: &str,
) -> impl Fn(&FieldValue) -> Result<(), String> + Send + Sync + 'static {
    let message = message.to_string();
    move |value| {
        if is_safe_value(value) {
            Ok(())
        } else {
            Err(message.clone())
        }
    }
}
