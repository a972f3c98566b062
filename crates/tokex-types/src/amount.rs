//! Token amounts and human-readable unit conversion.
//!
//! Every balance, order amount and fee is an [`Amount`] in the token's
//! smallest unit. All tokens use [`TOKEN_DECIMALS`] fixed-point decimals,
//! so `tokens(1) == 10^18`.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::constants::{TOKEN_DECIMALS, UNIT};
use crate::{ExchangeError, Result};

/// Quantity of a token in base units.
pub type Amount = u128;

/// Whole tokens → base units.
#[must_use]
pub const fn tokens(whole: u64) -> Amount {
    whole as Amount * UNIT
}

/// Parse a decimal string such as `"2.5"` into base units.
///
/// # Errors
/// Returns [`ExchangeError::InvalidUnits`] for negative values, more than
/// [`TOKEN_DECIMALS`] fractional digits, malformed input, or overflow.
pub fn parse_units(input: &str) -> Result<Amount> {
    let invalid = |reason: &str| ExchangeError::InvalidUnits {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let value = Decimal::from_str(input.trim())
        .map_err(|e| invalid(&e.to_string()))?
        .normalize();
    if value.is_sign_negative() && !value.is_zero() {
        return Err(invalid("negative amount"));
    }
    if value.scale() > TOKEN_DECIMALS {
        return Err(invalid("too many fractional digits"));
    }

    let mantissa: Amount = value.mantissa().unsigned_abs();
    let factor = 10u128.pow(TOKEN_DECIMALS - value.scale());
    mantissa
        .checked_mul(factor)
        .ok_or_else(|| invalid("out of range"))
}

/// Render base units as a decimal string with trailing zeros trimmed.
#[must_use]
pub fn format_units(amount: Amount) -> String {
    let whole = amount / UNIT;
    let frac = amount % UNIT;
    if frac == 0 {
        return whole.to_string();
    }
    let digits = format!("{frac:0width$}", width = TOKEN_DECIMALS as usize);
    format!("{whole}.{}", digits.trim_end_matches('0'))
}

/// Base units as a [`Decimal`] number of whole tokens.
///
/// Returns `None` when the amount exceeds `Decimal`'s 96-bit mantissa.
#[must_use]
pub fn to_decimal(amount: Amount) -> Option<Decimal> {
    let signed = i128::try_from(amount).ok()?;
    Decimal::try_from_i128_with_scale(signed, TOKEN_DECIMALS).ok()
}

/// Serde adapter writing amounts as decimal strings.
///
/// Base-unit amounts routinely exceed 2^64 and JavaScript's safe integer
/// range, so they never appear as bare JSON numbers.
pub mod as_string {
    use serde::{Deserialize, Deserializer, Serializer, de};

    use super::Amount;

    pub fn serialize<S: Serializer>(amount: &Amount, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(amount)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Amount, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
