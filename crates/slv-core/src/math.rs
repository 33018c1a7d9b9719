//! Wide fixed-point helpers for Q64.96 reserve math.
//!
//! Products widen to `U512` before dividing, so no valid pool state can
//! overflow mid-expression. Every division truncates toward zero; the
//! solvency fold accepts the sub-unit understatement.

use std::fmt;

use primitive_types::{U256, U512};

use crate::types::Q96;

/// Arithmetic failure inside a reserve formula.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MathError {
    /// A result does not fit in 256 bits.
    Overflow,
    /// A divisor was zero.
    DivisionByZero,
}

impl fmt::Display for MathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MathError::Overflow => write!(f, "overflow in 256-bit reserve math"),
            MathError::DivisionByZero => write!(f, "division by zero in reserve math"),
        }
    }
}

impl std::error::Error for MathError {}

/// `a * b / denominator` with a 512-bit intermediate, truncating toward zero.
pub fn mul_div(a: U256, b: U256, denominator: U256) -> Result<U256, MathError> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    let wide = U512::from(a)
        .checked_mul(U512::from(b))
        .ok_or(MathError::Overflow)?;
    let quotient = wide / U512::from(denominator);
    U256::try_from(quotient).map_err(|_| MathError::Overflow)
}

/// Token-X owed by `liquidity` over `[sqrt_lower, sqrt_upper]`:
/// `(liquidity << 96) * (sqrt_upper - sqrt_lower) / sqrt_upper / sqrt_lower`.
///
/// Requires `sqrt_lower <= sqrt_upper`; a reversed pair reports as overflow
/// from the inner subtraction.
pub fn amount_x_delta(
    sqrt_lower: U256,
    sqrt_upper: U256,
    liquidity: u128,
) -> Result<U256, MathError> {
    if sqrt_lower.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    let diff = sqrt_upper
        .checked_sub(sqrt_lower)
        .ok_or(MathError::Overflow)?;
    let numerator = U256::from(liquidity) << 96;
    let scaled = mul_div(numerator, diff, sqrt_upper)?;
    Ok(scaled / sqrt_lower)
}

/// Token-Y owed by `liquidity` over `[sqrt_lower, sqrt_upper]`:
/// `liquidity * (sqrt_upper - sqrt_lower) / Q96`.
pub fn amount_y_delta(
    sqrt_lower: U256,
    sqrt_upper: U256,
    liquidity: u128,
) -> Result<U256, MathError> {
    let diff = sqrt_upper
        .checked_sub(sqrt_lower)
        .ok_or(MathError::Overflow)?;
    mul_div(U256::from(liquidity), diff, Q96)
}

/// Both token amounts `liquidity` pins over `[sqrt_lower, sqrt_upper]` at
/// the current sqrt price, as `(amount_x, amount_y)`.
///
/// Below the range the position is entirely token X; above it entirely
/// token Y; inside it splits at the current price. The boundaries fold into
/// the outer cases: at the lower bound Y is zero, at the upper bound X is
/// zero.
pub fn amounts_in_range(
    sqrt_lower: U256,
    sqrt_upper: U256,
    sqrt_current: U256,
    liquidity: u128,
) -> Result<(U256, U256), MathError> {
    if sqrt_current <= sqrt_lower {
        Ok((amount_x_delta(sqrt_lower, sqrt_upper, liquidity)?, U256::zero()))
    } else if sqrt_current >= sqrt_upper {
        Ok((U256::zero(), amount_y_delta(sqrt_lower, sqrt_upper, liquidity)?))
    } else {
        Ok((
            amount_x_delta(sqrt_current, sqrt_upper, liquidity)?,
            amount_y_delta(sqrt_lower, sqrt_current, liquidity)?,
        ))
    }
}
