//! Fixed-point money codec.
//!
//! Every amount the engine stores is an `i64` number of **minor units** of a
//! currency. How many decimal digits a currency uses comes from its
//! `currency_metadata.decimal_places` row, so the codec functions take the
//! precision explicitly instead of assuming cents.

use std::fmt;

use crate::{EngineError, ResultEngine};

/// Amount in minor units paired with the precision used to display it.
///
/// ```rust
/// use engine::Money;
///
/// assert_eq!(Money::new(1050, 2).to_string(), "10.50");
/// assert_eq!(Money::new(-7, 3).to_string(), "-0.007");
/// assert_eq!(Money::new(500, 0).to_string(), "500");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Money {
    minor: i64,
    decimal_places: u8,
}

impl Money {
    #[must_use]
    pub const fn new(minor: i64, decimal_places: u8) -> Self {
        Self {
            minor,
            decimal_places,
        }
    }

    /// Parses a human amount (see [`parse_minor_units`]).
    pub fn parse(text: &str, decimal_places: u8) -> ResultEngine<Self> {
        Ok(Self::new(parse_minor_units(text, decimal_places)?, decimal_places))
    }

    #[must_use]
    pub const fn minor(self) -> i64 {
        self.minor
    }

    #[must_use]
    pub const fn decimal_places(self) -> u8 {
        self.decimal_places
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_display_string(self.minor, self.decimal_places))
    }
}

/// Converts a human amount into minor units, rounding half away from zero.
///
/// The float is first rendered as its shortest round-trip decimal, so `1.005`
/// with two decimal places rounds to `101` the way a person would expect
/// rather than following the binary representation down to `100`.
pub fn to_minor_units(amount: f64, decimal_places: u8) -> ResultEngine<i64> {
    if !amount.is_finite() {
        return Err(EngineError::InvalidAmount(
            "amount must be a finite number".to_string(),
        ));
    }
    let rendered = amount.to_string();
    let parts = DecimalParts::split(&rendered)?;
    parts.to_minor(decimal_places, Rounding::HalfAwayFromZero)
}

/// Parses a decimal string into minor units without rounding.
///
/// Accepts `.` or `,` as decimal separator and an optional leading `+`/`-`.
/// More fractional digits than `decimal_places` is an error.
pub fn parse_minor_units(text: &str, decimal_places: u8) -> ResultEngine<i64> {
    let trimmed = text.trim().replace(',', ".");
    let parts = DecimalParts::split(&trimmed)?;
    parts.to_minor(decimal_places, Rounding::Reject)
}

/// Formats minor units with exactly `decimal_places` fractional digits.
#[must_use]
pub fn to_display_string(amount: i64, decimal_places: u8) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let digits = amount.unsigned_abs().to_string();
    let places = usize::from(decimal_places);
    if places == 0 {
        return format!("{sign}{digits}");
    }

    let padded = format!("{digits:0>width$}", width = places + 1);
    let (major, minor) = padded.split_at(padded.len() - places);
    format!("{sign}{major}.{minor}")
}

/// Converts an amount between two currencies.
///
/// `rate` is the price of one major unit of the source currency expressed in
/// the target currency. The result is rounded half away from zero.
pub fn convert_minor(
    amount: i64,
    from_decimal_places: u8,
    to_decimal_places: u8,
    rate: f64,
) -> ResultEngine<i64> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(EngineError::InvalidAmount(format!(
            "invalid exchange rate: {rate}"
        )));
    }
    let shift = i32::from(to_decimal_places) - i32::from(from_decimal_places);
    let converted = (amount as f64 * rate * 10f64.powi(shift)).round();
    if !converted.is_finite() || converted.abs() >= i64::MAX as f64 {
        return Err(EngineError::InvalidAmount(
            "converted amount too large".to_string(),
        ));
    }
    Ok(converted as i64)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Rounding {
    HalfAwayFromZero,
    Reject,
}

struct DecimalParts<'a> {
    negative: bool,
    whole: &'a str,
    fraction: &'a str,
}

impl<'a> DecimalParts<'a> {
    fn split(text: &'a str) -> ResultEngine<Self> {
        let invalid = || EngineError::InvalidAmount(format!("invalid amount: {text:?}"));

        let (negative, rest) = if let Some(stripped) = text.strip_prefix('-') {
            (true, stripped)
        } else if let Some(stripped) = text.strip_prefix('+') {
            (false, stripped)
        } else {
            (false, text)
        };

        let (whole, fraction) = match rest.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (rest, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(EngineError::InvalidAmount("empty amount".to_string()));
        }
        if !whole.chars().all(|c| c.is_ascii_digit())
            || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        Ok(Self {
            negative,
            whole,
            fraction,
        })
    }

    fn to_minor(&self, decimal_places: u8, rounding: Rounding) -> ResultEngine<i64> {
        let overflow = || EngineError::InvalidAmount("amount too large".to_string());
        let places = usize::from(decimal_places);

        let (kept, dropped) = if self.fraction.len() > places {
            self.fraction.split_at(places)
        } else {
            (self.fraction, "")
        };
        if rounding == Rounding::Reject && dropped.chars().any(|c| c != '0') {
            return Err(EngineError::InvalidAmount(format!(
                "too many decimals: at most {decimal_places} allowed"
            )));
        }

        let scale = 10i64
            .checked_pow(u32::from(decimal_places))
            .ok_or_else(overflow)?;
        let whole = parse_digits(self.whole).ok_or_else(overflow)?;
        let kept_value = parse_digits(kept).ok_or_else(overflow)?;
        let kept_scale = 10i64
            .checked_pow((places - kept.len()) as u32)
            .ok_or_else(overflow)?;

        let mut magnitude = whole
            .checked_mul(scale)
            .and_then(|v| v.checked_add(kept_value * kept_scale))
            .ok_or_else(overflow)?;

        if rounding == Rounding::HalfAwayFromZero
            && dropped.chars().next().is_some_and(|c| c >= '5')
        {
            magnitude = magnitude.checked_add(1).ok_or_else(overflow)?;
        }

        Ok(if self.negative { -magnitude } else { magnitude })
    }
}

fn parse_digits(digits: &str) -> Option<i64> {
    if digits.is_empty() {
        return Some(0);
    }
    digits.parse().ok()
}
