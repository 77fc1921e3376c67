//! Conversions between scaled integer amounts and decimal text

use thiserror::Error;

use crate::math::*;
use crate::state::*;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,

    #[error("invalid character {0:?} in amount")]
    InvalidCharacter(char),

    #[error("amount has more than 6 decimal places")]
    TooManyDecimals,

    #[error("amount is too large")]
    Overflow,
}

/// Parse a decimal token amount ("10000", "12.5", ".25") into scaled units
pub fn parse_amount(input: &str) -> Result<Amount, AmountError> {
    let s = input.trim();
    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(AmountError::Empty);
    }
    if let Some(c) = whole.chars().chain(frac.chars()).find(|c| !c.is_ascii_digit()) {
        return Err(AmountError::InvalidCharacter(c));
    }
    if frac.len() > AMOUNT_DECIMALS as usize {
        return Err(AmountError::TooManyDecimals);
    }

    let mut scaled: Amount = 0;
    for c in whole.chars() {
        scaled = scaled
            .checked_mul(10)
            .and_then(|v| v.checked_add(c as u128 - '0' as u128))
            .ok_or(AmountError::Overflow)?;
    }
    scaled = scaled.checked_mul(AMOUNT_SCALE).ok_or(AmountError::Overflow)?;

    let mut frac_units: Amount = 0;
    for c in frac.chars() {
        frac_units = frac_units * 10 + (c as u128 - '0' as u128);
    }
    frac_units *= 10u128.pow(AMOUNT_DECIMALS - frac.len() as u32);

    scaled.checked_add(frac_units).ok_or(AmountError::Overflow)
}

/// Two decimals, half-up on the third ("1.23")
pub fn format_amount(amount: Amount) -> String {
    let cents = add_u128(amount, 5_000) / 10_000;
    format!("{}.{:02}", cents / 100, cents % 100)
}

/// Every significant decimal, at least one ("10000.0", "295.89041")
pub fn format_amount_exact(amount: Amount) -> String {
    let whole = amount / AMOUNT_SCALE;
    let frac = format!("{:06}", amount % AMOUNT_SCALE);
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        format!("{}.0", whole)
    } else {
        format!("{}.{}", whole, frac)
    }
}

/// Basis points as a percentage ("12.00%")
pub fn format_bps(bps: Bps) -> String {
    format!("{}%", format_fixed(bps as u128, 2))
}

/// Integer with an implied number of decimals (`format_fixed(328, 4)` is "0.0328")
pub fn format_fixed(value: u128, decimals: u32) -> String {
    if decimals == 0 {
        return value.to_string();
    }
    let scale = 10u128.pow(decimals);
    format!(
        "{}.{:0width$}",
        value / scale,
        value % scale,
        width = decimals as usize
    )
}
