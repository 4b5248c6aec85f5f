#![deny(warnings)]

//! Conversion arithmetic for the Tro exchange.
//!
//! This module provides validated, stateless utilities for:
//! - Converting currency amounts to Tro and back through a ratio
//! - Rounding and formatting Tro values to two decimals
//! - Validating and parsing the numeric text typed into input fields
//! - Valuing item quantities in gralats

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;
use thiserror::Error;

/// Number of decimals kept on every converted value.
pub const TRO_DECIMALS: u32 = 2;

/// Errors produced by conversion helpers.
#[derive(Debug, Error, PartialEq)]
pub enum ConvertError {
    /// Field text is not a number (empty, a lone sign or dot, or off-pattern).
    #[error("not a number: {0:?}")]
    NotANumber(String),
    /// Ratios must be strictly positive.
    #[error("invalid ratio: {0}")]
    InvalidRatio(Decimal),
    /// Result does not fit in a decimal.
    #[error("numeric overflow")]
    Overflow,
}

/// Currency amount to Tro: `amount / ratio`, unrounded.
///
/// Example:
/// let tro = convert_forward(Decimal::new(100, 0), Decimal::new(2, 0)).unwrap();
/// assert_eq!(tro, Decimal::new(50, 0));
pub fn convert_forward(amount: Decimal, ratio: Decimal) -> Result<Decimal, ConvertError> {
    if ratio <= Decimal::ZERO {
        return Err(ConvertError::InvalidRatio(ratio));
    }
    amount.checked_div(ratio).ok_or(ConvertError::Overflow)
}

/// Tro to currency amount: `tro * ratio`, unrounded.
///
/// Example:
/// let amount = convert_reverse(Decimal::new(10, 0), Decimal::new(13, 1)).unwrap();
/// assert_eq!(amount, Decimal::new(13, 0));
pub fn convert_reverse(tro: Decimal, ratio: Decimal) -> Result<Decimal, ConvertError> {
    if ratio <= Decimal::ZERO {
        return Err(ConvertError::InvalidRatio(ratio));
    }
    tro.checked_mul(ratio).ok_or(ConvertError::Overflow)
}

/// Round to two decimals, halves away from zero.
pub fn round_tro(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(TRO_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
}

/// Two-decimal rendering used for computed values, e.g. "50.00".
pub fn format_fixed(value: Decimal) -> String {
    format!("{:.2}", round_tro(value))
}

/// Shortest rendering used for entered values, e.g. "100" or "2.5".
pub fn format_plain(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Unsigned decimal text: digits with at most one dot. Empty is accepted.
pub fn is_quantity_text(raw: &str) -> bool {
    is_decimal_text(raw)
}

/// Like [`is_quantity_text`] with an optional leading minus.
pub fn is_amount_text(raw: &str) -> bool {
    is_decimal_text(raw.strip_prefix('-').unwrap_or(raw))
}

fn is_decimal_text(raw: &str) -> bool {
    let mut dots = 0;
    for c in raw.chars() {
        match c {
            '0'..='9' => {}
            '.' => {
                dots += 1;
                if dots > 1 {
                    return false;
                }
            }
            _ => return false,
        }
    }
    true
}

/// Parse field text into a number.
///
/// Accepts the [`is_amount_text`] pattern with at least one digit, so "5.",
/// ".5" and "-2" parse while "", "." and "-" do not.
pub fn parse_amount(raw: &str) -> Result<Decimal, ConvertError> {
    let not_a_number = || ConvertError::NotANumber(raw.to_string());
    if !is_amount_text(raw) {
        return Err(not_a_number());
    }
    let (sign, body) = match raw.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", raw),
    };
    let (int_part, frac_part) = body.split_once('.').unwrap_or((body, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(not_a_number());
    }
    let int_part = if int_part.is_empty() { "0" } else { int_part };
    let text = if frac_part.is_empty() {
        format!("{sign}{int_part}")
    } else {
        format!("{sign}{int_part}.{frac_part}")
    };
    Decimal::from_str(&text).map_err(|_| ConvertError::Overflow)
}

/// Numeric value of a quantity field; unset or unparseable text counts as 0.
pub fn quantity_value(raw: &str) -> Decimal {
    if !is_quantity_text(raw) {
        return Decimal::ZERO;
    }
    parse_amount(raw).unwrap_or(Decimal::ZERO)
}

/// Gralat value of `quantity` items at `ratio` gralats each.
pub fn item_value(quantity: Decimal, ratio: Decimal) -> Result<Decimal, ConvertError> {
    quantity.checked_mul(ratio).ok_or(ConvertError::Overflow)
}

/// Sum of `quantity * ratio` over all pairs.
///
/// Example:
/// let pairs = [(Decimal::new(20, 0), Decimal::new(5, 0)), (Decimal::ZERO, Decimal::new(7, 0))];
/// assert_eq!(total_value(pairs).unwrap(), Decimal::new(100, 0));
pub fn total_value<I>(pairs: I) -> Result<Decimal, ConvertError>
where
    I: IntoIterator<Item = (Decimal, Decimal)>,
{
    let mut total = Decimal::ZERO;
    for (quantity, ratio) in pairs {
        let value = item_value(quantity, ratio)?;
        total = total.checked_add(value).ok_or(ConvertError::Overflow)?;
    }
    Ok(total)
}
