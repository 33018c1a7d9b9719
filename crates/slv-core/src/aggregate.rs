//! Folds interval reserves and protocol fees into per-token requirements.

use crate::curve::{CurveError, PricingCurve};
use crate::reserves::{interval_reserves, ComputeMode, LegFault, TokenLeg};
use crate::types::{LiquidityInterval, PoolId, PoolSnapshot, ReserveRequirement};

/// A leg that fell back to zero during the fold. Independent mode only;
/// delegating mode fails instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DegradedLeg {
    pub pool: PoolId,
    pub lower_index: i32,
    pub upper_index: i32,
    pub leg: TokenLeg,
    pub fault: LegFault,
}

/// One pool's contribution to the audit: its requirement plus any legs that
/// degraded while computing it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PoolRequirement {
    pub requirement: ReserveRequirement,
    pub degraded: Vec<DegradedLeg>,
}

/// Folds every interval plus the pool's protocol fees into one requirement.
///
/// The result depends only on the snapshot and interval set, and merging
/// pool requirements commutes, so callers may fold pools in any order or in
/// parallel and land on the same totals.
pub fn pool_requirement(
    snapshot: &PoolSnapshot,
    intervals: &[LiquidityInterval],
    mode: ComputeMode,
    curve: &dyn PricingCurve,
) -> Result<PoolRequirement, CurveError> {
    let mut requirement = ReserveRequirement::empty();
    let mut degraded = Vec::new();

    for interval in intervals {
        let reserves = interval_reserves(mode, curve, interval, snapshot.sqrt_price_x96)?;
        requirement.add(snapshot.token_x.clone(), reserves.x.amount());
        requirement.add(snapshot.token_y.clone(), reserves.y.amount());

        if let Some(fault) = reserves.x.fault() {
            degraded.push(DegradedLeg {
                pool: snapshot.pool.clone(),
                lower_index: interval.lower_index,
                upper_index: interval.upper_index,
                leg: TokenLeg::X,
                fault,
            });
        }
        if let Some(fault) = reserves.y.fault() {
            degraded.push(DegradedLeg {
                pool: snapshot.pool.clone(),
                lower_index: interval.lower_index,
                upper_index: interval.upper_index,
                leg: TokenLeg::Y,
                fault,
            });
        }
    }

    // Protocol fees are pool custody too, just not tied to any interval.
    requirement.add(snapshot.token_x.clone(), snapshot.fee_protocol_x);
    requirement.add(snapshot.token_y.clone(), snapshot.fee_protocol_y);

    Ok(PoolRequirement { requirement, degraded })
}
