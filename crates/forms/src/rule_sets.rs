//! Rule sets for every form of the app.
//!
//! Assemblers are pure: the same inputs give structurally equivalent rule sets.
//! Rules depending on live input (`register`, the category lists) are rebuilt on
//! every call and capture that input.

use std::{fmt, str::FromStr};

use serde_json::Value;

use crate::{
    Currency, CurrencyParser, FormError, RuleSet, Schema, ValidationRule,
    fields::{self, DEFAULT_PASSWORD_MIN_LENGTH, DESCRIPTION_MAX_LENGTH},
    money::currency_parser,
};

pub const NAME_MIN_LENGTH: usize = 2;
pub const NAME_MAX_LENGTH: usize = 50;
pub const CATEGORY_NAME_MAX_LENGTH: usize = 30;
pub const MONTHLY_LIMIT_MAX: f64 = 1_000_000_000.0;
pub const EXPORT_FORMATS: [&str; 2] = ["csv", "txt"];

/// Inputs some rule sets depend on.
#[derive(Clone)]
pub struct SchemaContext {
    /// Allowed transaction categories; empty accepts any.
    pub categories: Vec<String>,
    pub parse_currency: CurrencyParser,
    pub password_min_length: usize,
}

impl SchemaContext {
    pub fn new(categories: Vec<String>, currency: Currency) -> Self {
        Self {
            categories,
            parse_currency: currency_parser(currency),
            password_min_length: DEFAULT_PASSWORD_MIN_LENGTH,
        }
    }

    pub fn password_min_length(mut self, min: usize) -> Self {
        self.password_min_length = min;
        self
    }
}

impl Default for SchemaContext {
    fn default() -> Self {
        Self::new(Vec::new(), Currency::default())
    }
}

impl fmt::Debug for SchemaContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaContext")
            .field("categories", &self.categories)
            .field("password_min_length", &self.password_min_length)
            .finish()
    }
}

pub fn login() -> RuleSet {
    login_with(DEFAULT_PASSWORD_MIN_LENGTH)
}

fn login_with(password_min_length: usize) -> RuleSet {
    RuleSet::new()
        .field("email", fields::email(None))
        .field("password", fields::password(password_min_length, None))
}

/// Registration rules with the confirmation bound to `password_value`.
pub fn register(password_value: &str) -> RuleSet {
    register_with(password_value, DEFAULT_PASSWORD_MIN_LENGTH)
}

fn register_with(password_value: &str, password_min_length: usize) -> RuleSet {
    RuleSet::new()
        .field("name", name_rule())
        .field("email", fields::email(None))
        .field("password", fields::password(password_min_length, None))
        .field(
            "confirm_password",
            fields::confirm_password(password_value, None),
        )
}

/// Registration schema re-bound to the live `password` field on every validation.
pub fn register_schema() -> Schema {
    register_schema_with(DEFAULT_PASSWORD_MIN_LENGTH)
}

fn register_schema_with(password_min_length: usize) -> Schema {
    Schema::dynamic(move |values| {
        let password = values
            .get("password")
            .and_then(Value::as_str)
            .unwrap_or_default();
        register_with(password, password_min_length)
    })
}

pub fn transaction(categories: &[String], parse_currency: CurrencyParser) -> RuleSet {
    RuleSet::new()
        .field("title", fields::title())
        .field("amount", fields::currency(parse_currency, None))
        .field("category", fields::category(categories.to_vec(), None))
        .field("date", fields::date(None))
        .field("description", optional_description())
}

pub fn recurring_transaction(categories: &[String], parse_currency: CurrencyParser) -> RuleSet {
    RuleSet::new()
        .field("title", fields::title())
        .field("amount", fields::currency(parse_currency, None))
        .field("category", fields::category(categories.to_vec(), None))
        .field("frequency", fields::frequency())
        .field("start_date", fields::date(Some("Data inicial inválida")))
        .field("description", optional_description())
}

pub fn profile() -> RuleSet {
    RuleSet::new()
        .field("name", name_rule())
        .field("email", fields::email(None))
}

pub fn settings() -> RuleSet {
    let codes: Vec<&str> = Currency::SUPPORTED.iter().map(|c| c.code()).collect();
    RuleSet::new()
        .field(
            "currency",
            fields::one_of(&codes, "Moeda é obrigatória", "Moeda inválida"),
        )
        .field(
            "monthly_limit",
            fields::numeric(
                0.0,
                MONTHLY_LIMIT_MAX,
                Some("Limite mensal deve estar entre 0 e 1000000000"),
            ),
        )
}

/// Rules of the category management form (not the `category` field rule).
pub fn category_form() -> RuleSet {
    RuleSet::new()
        .field(
            "name",
            fields::text(
                NAME_MIN_LENGTH,
                CATEGORY_NAME_MAX_LENGTH,
                true,
                "Nome da categoria",
            ),
        )
        .field("color", fields::color())
}

pub fn export() -> RuleSet {
    RuleSet::new()
        .field(
            "format",
            fields::one_of(&EXPORT_FORMATS, "Formato é obrigatório", "Formato inválido"),
        )
        .field("start_date", fields::date(Some("Data inicial inválida")))
        .field("end_date", fields::date(Some("Data final inválida")))
}

fn name_rule() -> ValidationRule {
    fields::text(NAME_MIN_LENGTH, NAME_MAX_LENGTH, true, "Nome")
}

fn optional_description() -> ValidationRule {
    fields::text(0, DESCRIPTION_MAX_LENGTH, false, "Descrição")
}

/// Every form the app validates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FormKind {
    Login,
    Register,
    Transaction,
    RecurringTransaction,
    Profile,
    Settings,
    Category,
    Export,
}

impl FormKind {
    pub const ALL: [FormKind; 8] = [
        FormKind::Login,
        FormKind::Register,
        FormKind::Transaction,
        FormKind::RecurringTransaction,
        FormKind::Profile,
        FormKind::Settings,
        FormKind::Category,
        FormKind::Export,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            FormKind::Login => "login",
            FormKind::Register => "register",
            FormKind::Transaction => "transaction",
            FormKind::RecurringTransaction => "recurring-transaction",
            FormKind::Profile => "profile",
            FormKind::Settings => "settings",
            FormKind::Category => "category",
            FormKind::Export => "export",
        }
    }

    /// Schema of this form; `Register` is dynamic, every other form is fixed.
    pub fn schema(self, context: &SchemaContext) -> Schema {
        let parse = || context.parse_currency.clone();
        match self {
            FormKind::Login => login_with(context.password_min_length).into(),
            FormKind::Register => register_schema_with(context.password_min_length),
            FormKind::Transaction => transaction(&context.categories, parse()).into(),
            FormKind::RecurringTransaction => {
                recurring_transaction(&context.categories, parse()).into()
            }
            FormKind::Profile => profile().into(),
            FormKind::Settings => settings().into(),
            FormKind::Category => category_form().into(),
            FormKind::Export => export().into(),
        }
    }
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormKind {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        FormKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| FormError::UnknownForm(s.to_string()))
    }
}
