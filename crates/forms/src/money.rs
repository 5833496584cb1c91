use std::{fmt, sync::Arc};

use crate::{Currency, FormError};

/// Parser injected into the `currency` rule: raw user input in, decimal string out.
///
/// The rule only inspects the returned string, so any parser producing `"12.50"`-style
/// output (or something that is not a number when the input is unusable) fits.
pub type CurrencyParser = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Signed money amount represented as integer **minor units** of a [`Currency`].
///
/// # Examples
///
/// ```rust
/// use forms::{Currency, Money};
///
/// let amount = Money::parse_major("R$ 1.234,56", Currency::Brl).unwrap();
/// assert_eq!(amount.minor(), 123_456);
/// assert_eq!(amount.to_decimal_string(), "1234.56");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Money {
    minor: i64,
    currency: Currency,
}

impl Money {
    /// Creates a new amount from integer minor units.
    #[must_use]
    pub const fn new(minor: i64, currency: Currency) -> Self {
        Self { minor, currency }
    }

    /// Returns the raw value in minor units.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.minor
    }

    #[must_use]
    pub const fn currency(self) -> Currency {
        self.currency
    }

    /// Returns `true` if the amount is strictly positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.minor > 0
    }

    /// Renders the amount as a plain decimal string (`"-12.50"`), the format the
    /// `currency` rule reads back.
    #[must_use]
    pub fn to_decimal_string(self) -> String {
        let (sign, major, fraction) = self.split();
        format!("{sign}{major}.{fraction:0width$}", width = self.width())
    }

    /// Parses an amount typed by a user.
    ///
    /// Accepted input:
    /// - an optional currency symbol or code (`R$ 10`, `BRL 10`), before or after the sign
    /// - an optional leading `+`/`-`
    /// - `.` or `,` as decimal separator, the other one as thousands separator
    ///   (`1.234,56` and `1,234.56` are both `123456` minor units)
    /// - a single separator followed by exactly three digits is read as grouping
    ///   (`1.234` is one thousand two hundred thirty-four)
    ///
    /// Rejects empty input, more fraction digits than the currency allows and overflow.
    pub fn parse_major(input: &str, currency: Currency) -> Result<Self, FormError> {
        let empty = || FormError::InvalidAmount("empty amount".to_string());
        let invalid = || FormError::InvalidAmount("invalid amount".to_string());
        let overflow = || FormError::InvalidAmount("amount too large".to_string());

        let (negative, rest) = split_sign(input.trim());
        let rest = strip_currency(rest.trim_start(), currency);
        let (negative_after_symbol, rest) = split_sign(rest.trim_start());
        if negative && negative_after_symbol {
            return Err(invalid());
        }
        let negative = negative || negative_after_symbol;

        let digits = rest.trim();
        if digits.is_empty() {
            return Err(empty());
        }
        if !digits
            .chars()
            .all(|c| c.is_ascii_digit() || c == '.' || c == ',')
        {
            return Err(invalid());
        }

        let (integer, fraction) = split_separators(digits).ok_or_else(invalid)?;

        let scale = 10i64.pow(u32::from(currency.minor_units()));
        let fraction_minor = match fraction {
            None | Some("") => 0,
            Some(frac) if frac.len() <= usize::from(currency.minor_units()) => {
                let width = usize::from(currency.minor_units());
                let padded = format!("{frac:0<width$}");
                padded.parse::<i64>().map_err(|_| invalid())?
            }
            Some(_) => return Err(FormError::InvalidAmount("too many decimals".to_string())),
        };

        let major: i64 = integer.parse().map_err(|_| overflow())?;
        let total = major
            .checked_mul(scale)
            .and_then(|value| value.checked_add(fraction_minor))
            .ok_or_else(overflow)?;

        let minor = if negative {
            total.checked_neg().ok_or_else(overflow)?
        } else {
            total
        };

        Ok(Self { minor, currency })
    }

    fn width(self) -> usize {
        usize::from(self.currency.minor_units())
    }

    fn split(self) -> (&'static str, u64, u64) {
        let sign = if self.minor < 0 { "-" } else { "" };
        let scale = 10u64.pow(u32::from(self.currency.minor_units()));
        let abs = self.minor.unsigned_abs();
        (sign, abs / scale, abs % scale)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (sign, major, fraction) = self.split();
        write!(
            f,
            "{sign}{} {major}{}{fraction:0width$}",
            self.currency.symbol(),
            self.currency.decimal_separator(),
            width = self.width()
        )
    }
}

/// Default parser used by the transaction forms: reads BRL input and returns the
/// decimal string, or `"NaN"` when the input is not an amount.
///
/// ```rust
/// assert_eq!(forms::parse_currency("R$ 12,50"), "12.50");
/// assert_eq!(forms::parse_currency("doze"), "NaN");
/// ```
pub fn parse_currency(input: &str) -> String {
    parse_currency_as(input, Currency::default())
}

/// Same as [`parse_currency`] for an explicit currency.
pub fn parse_currency_as(input: &str, currency: Currency) -> String {
    Money::parse_major(input, currency)
        .map(Money::to_decimal_string)
        .unwrap_or_else(|_| "NaN".to_string())
}

/// Wraps [`parse_currency_as`] into the shared parser type the rules expect.
pub fn currency_parser(currency: Currency) -> CurrencyParser {
    Arc::new(move |input| parse_currency_as(input, currency))
}

fn split_sign(input: &str) -> (bool, &str) {
    if let Some(stripped) = input.strip_prefix('-') {
        (true, stripped)
    } else if let Some(stripped) = input.strip_prefix('+') {
        (false, stripped)
    } else {
        (false, input)
    }
}

fn strip_currency(input: &str, currency: Currency) -> &str {
    if let Some(stripped) = input.strip_prefix(currency.symbol()) {
        return stripped;
    }
    let code = currency.code();
    match input.get(..code.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(code) => &input[code.len()..],
        _ => input,
    }
}

/// Splits `digits` into an integer part (grouping removed) and an optional fraction.
///
/// Returns `None` when separators are used inconsistently.
fn split_separators(digits: &str) -> Option<(String, Option<&str>)> {
    let dots = digits.matches('.').count();
    let commas = digits.matches(',').count();

    let decimal = match (dots, commas) {
        (0, 0) => None,
        (_, 0) | (0, _) => {
            let sep = if dots > 0 { '.' } else { ',' };
            let count = dots.max(commas);
            let (head, tail) = digits.rsplit_once(sep)?;
            let looks_grouped = tail.len() == 3
                && (1..=3).contains(&head.len())
                && !head.starts_with('0');
            if count > 1 || looks_grouped {
                None
            } else {
                Some(sep)
            }
        }
        _ => {
            let last = digits.rfind(['.', ','])?;
            let sep = digits[last..].chars().next()?;
            if digits.matches(sep).count() > 1 {
                return None;
            }
            Some(sep)
        }
    };

    let (integer, fraction) = match decimal {
        Some(sep) => {
            let (integer, fraction) = digits.rsplit_once(sep)?;
            (integer, Some(fraction))
        }
        None => (digits, None),
    };

    if fraction.is_some_and(|frac| frac.contains(['.', ','])) {
        return None;
    }

    Some((ungroup(integer)?, fraction))
}

fn ungroup(integer: &str) -> Option<String> {
    if !integer.contains(['.', ',']) {
        return (!integer.is_empty()).then(|| integer.to_string());
    }

    let mut groups = integer.split(['.', ',']);
    let first = groups.next()?;
    if !(1..=3).contains(&first.len()) {
        return None;
    }
    let mut out = first.to_string();
    for group in groups {
        if group.len() != 3 {
            return None;
        }
        out.push_str(group);
    }
    Some(out)
}
