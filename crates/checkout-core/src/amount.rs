//! Amount Parsing
//!
//! Turns the free-form `amount` form field into a [`BigDecimal`]. The accepted
//! grammar is that of an arbitrary-precision decimal literal: optional sign,
//! digits with an optional fraction, optional exponent. Values are kept
//! exactly as written, however large, small or precise. Negative amounts are
//! well-formed here; whether an amount is acceptable is the gateway's call.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use rust_decimal::Decimal;
use thiserror::Error;

/// Gateway validation code reported for a malformed amount
pub const INVALID_AMOUNT_CODE: &str = "81503";

/// Message paired with [`INVALID_AMOUNT_CODE`]
pub const INVALID_AMOUNT_MESSAGE: &str = "Amount is an invalid format.";

/// The raw amount could not be read as a decimal
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid amount format: {raw:?}")]
pub struct InvalidAmount {
    pub raw: String,
}

/// Parse a raw amount string
pub fn parse_amount(raw: &str) -> Result<BigDecimal, InvalidAmount> {
    let invalid = || InvalidAmount { raw: raw.to_string() };

    // The digit parser tolerates `_` separators; a decimal literal does not.
    if raw.is_empty() || raw.contains('_') || raw.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    BigDecimal::from_str(raw).map_err(|_| invalid())
}

/// Exact conversion to a fixed-precision [`Decimal`]
///
/// `None` when the value needs more than 28 fractional digits or a mantissa
/// wider than 96 bits. Never rounds.
pub fn to_decimal(amount: &BigDecimal) -> Option<Decimal> {
    let (mantissa, scale) = amount.as_bigint_and_exponent();

    // Negative scale means trailing zeros folded into the exponent (`1E+3`).
    let (mantissa, scale) = if scale < 0 {
        (amount.with_scale(0).as_bigint_and_exponent().0, 0)
    } else {
        (mantissa, scale)
    };

    let mantissa = i128::try_from(mantissa).ok()?;
    let scale = u32::try_from(scale).ok()?;
    Decimal::try_from_i128_with_scale(mantissa, scale).ok()
}
