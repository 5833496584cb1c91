use serde::{Deserialize, Serialize};

use crate::FormError;

/// ISO currency code selectable in the settings form and used to read amounts.
///
/// The tracker defaults to `BRL`; every supported currency has two minor units.
///
/// ## Minor units
///
/// Amounts are parsed into an `i64` number of **minor units** (see `Money`).
/// `minor_units()` returns how many decimal digits are used when converting between:
/// - major units (human input/output, e.g. `R$ 10,50`)
/// - minor units (integers, e.g. `1050`)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Brl,
    Usd,
    Eur,
}

impl Currency {
    /// Every currency the settings form accepts.
    pub const SUPPORTED: [Currency; 3] = [Currency::Brl, Currency::Usd, Currency::Eur];

    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Brl => "BRL",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
        }
    }

    /// Symbol shown next to amounts and tolerated in user input.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Currency::Brl => "R$",
            Currency::Usd => "$",
            Currency::Eur => "€",
        }
    }

    /// Number of fraction digits used when formatting/parsing amounts.
    #[must_use]
    pub const fn minor_units(self) -> u8 {
        match self {
            Currency::Brl | Currency::Usd | Currency::Eur => 2,
        }
    }

    /// Decimal separator users of this currency type by default.
    #[must_use]
    pub const fn decimal_separator(self) -> char {
        match self {
            Currency::Brl | Currency::Eur => ',',
            Currency::Usd => '.',
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = FormError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "BRL" => Ok(Currency::Brl),
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            other => Err(FormError::UnsupportedCurrency(other.to_string())),
        }
    }
}
