//! Per-interval reserve computation.
//!
//! Two modes cover the two trust stances an audit can take. Delegating mode
//! treats the pricing curve as ground truth and propagates its failures.
//! Independent mode recomputes amounts locally and never aborts: a leg that
//! cannot be computed contributes zero and carries a fault tag, so the rest
//! of the audit still runs on a conservative floor.

use std::fmt;

use primitive_types::U256;

use crate::curve::{validate_price_bounds, CurveError, PricingCurve};
use crate::math::{amount_x_delta, amount_y_delta, MathError};
use crate::types::LiquidityInterval;

/// How range amounts are produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComputeMode {
    /// Ask the pricing curve; its numbers and its rounding are the answer.
    Delegating,
    /// Compute locally; failed legs degrade to zero instead of aborting.
    Independent,
}

/// Which side of the pair a leg belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenLeg {
    X,
    Y,
}

impl fmt::Display for TokenLeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenLeg::X => f.write_str("x"),
            TokenLeg::Y => f.write_str("y"),
        }
    }
}

/// Why an independent-mode leg fell back to zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LegFault {
    InvalidBound,
    Overflow,
    DivisionByZero,
}

impl From<MathError> for LegFault {
    fn from(e: MathError) -> Self {
        match e {
            MathError::Overflow => LegFault::Overflow,
            MathError::DivisionByZero => LegFault::DivisionByZero,
        }
    }
}

impl fmt::Display for LegFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LegFault::InvalidBound => f.write_str("invalid price bound"),
            LegFault::Overflow => f.write_str("overflow"),
            LegFault::DivisionByZero => f.write_str("division by zero"),
        }
    }
}

/// One leg of an interval's requirement. `Degraded` contributes zero;
/// callers surface the fault.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LegAmount {
    Exact(U256),
    Degraded(LegFault),
}

impl LegAmount {
    pub fn amount(&self) -> U256 {
        match self {
            LegAmount::Exact(a) => *a,
            LegAmount::Degraded(_) => U256::zero(),
        }
    }

    pub fn fault(&self) -> Option<LegFault> {
        match self {
            LegAmount::Exact(_) => None,
            LegAmount::Degraded(fault) => Some(*fault),
        }
    }
}

/// Token amounts one interval pins, one leg per side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntervalReserves {
    pub x: LegAmount,
    pub y: LegAmount,
}

/// Computes the token amounts `interval` pins at `sqrt_current`.
///
/// Returns `Err` only in delegating mode, where a curve failure makes the
/// requirement unknowable. Independent mode always returns a value; faulted
/// legs are degraded to zero.
pub fn interval_reserves(
    mode: ComputeMode,
    curve: &dyn PricingCurve,
    interval: &LiquidityInterval,
    sqrt_current: U256,
) -> Result<IntervalReserves, CurveError> {
    match mode {
        ComputeMode::Delegating => {
            let (sqrt_lower, sqrt_upper) = interval_bounds(curve, interval)?;
            let (x, y) =
                curve.range_amounts(interval.liquidity, sqrt_lower, sqrt_upper, sqrt_current)?;
            Ok(IntervalReserves { x: LegAmount::Exact(x), y: LegAmount::Exact(y) })
        }
        ComputeMode::Independent => {
            let (sqrt_lower, sqrt_upper) = match interval_bounds(curve, interval) {
                Ok(bounds) => bounds,
                // Bad bounds poison both legs; degrade the whole interval.
                Err(_) => {
                    return Ok(IntervalReserves {
                        x: LegAmount::Degraded(LegFault::InvalidBound),
                        y: LegAmount::Degraded(LegFault::InvalidBound),
                    })
                }
            };
            Ok(independent_reserves(sqrt_lower, sqrt_upper, sqrt_current, interval.liquidity))
        }
    }
}

fn interval_bounds(
    curve: &dyn PricingCurve,
    interval: &LiquidityInterval,
) -> Result<(U256, U256), CurveError> {
    let sqrt_lower = curve.sqrt_price_at_tick(interval.lower_index)?;
    let sqrt_upper = curve.sqrt_price_at_tick(interval.upper_index)?;
    validate_price_bounds(sqrt_lower, sqrt_upper)?;
    Ok((sqrt_lower, sqrt_upper))
}

fn independent_reserves(
    sqrt_lower: U256,
    sqrt_upper: U256,
    sqrt_current: U256,
    liquidity: u128,
) -> IntervalReserves {
    // A zero current price is corrupt input, not a price below the range.
    if sqrt_current.is_zero() {
        return IntervalReserves {
            x: LegAmount::Degraded(LegFault::InvalidBound),
            y: LegAmount::Degraded(LegFault::InvalidBound),
        };
    }
    // At or above the upper bound the interval holds no X; at or below the
    // lower bound it holds no Y. Each leg clamps and degrades on its own.
    let x = if sqrt_current >= sqrt_upper {
        LegAmount::Exact(U256::zero())
    } else {
        match amount_x_delta(sqrt_current.max(sqrt_lower), sqrt_upper, liquidity) {
            Ok(amount) => LegAmount::Exact(amount),
            Err(e) => LegAmount::Degraded(e.into()),
        }
    };
    let y = if sqrt_current <= sqrt_lower {
        LegAmount::Exact(U256::zero())
    } else {
        match amount_y_delta(sqrt_lower, sqrt_current.min(sqrt_upper), liquidity) {
            Ok(amount) => LegAmount::Exact(amount),
            Err(e) => LegAmount::Degraded(e.into()),
        }
    };
    IntervalReserves { x, y }
}
