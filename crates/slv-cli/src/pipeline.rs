//! Shared fetch, reconstruct and fold pipeline behind both subcommands.

use anyhow::{Context, Result};
use futures_util::{stream, StreamExt};
use slv_core::{
    pool_requirement, reconstruct_intervals, ComputeMode, PoolId, PoolRequirement, PricingCurve,
    ReserveRequirement, StructuralViolation,
};
use slv_ledger::PoolSource;
use tracing::{error, info, warn};

/// Everything the per-pool fan-out produced. `violations` non-empty means
/// `total` is not trustworthy and the audit must not reach a verdict.
pub struct GatheredRequirements {
    pub total: ReserveRequirement,
    pub pools: Vec<(PoolId, ReserveRequirement)>,
    pub violations: Vec<StructuralViolation>,
}

enum PoolOutcome {
    Priced(PoolRequirement),
    Structural(StructuralViolation),
}

/// Fetches every pool, reconstructs its intervals and folds its requirement,
/// up to `pool_concurrency` pools in flight at once. Requirement merging
/// commutes, so the fan-out order never changes the totals.
pub async fn gather_requirements(
    source: &dyn PoolSource,
    curve: &dyn PricingCurve,
    mode: ComputeMode,
    pool_concurrency: usize,
) -> Result<GatheredRequirements> {
    let pool_ids = source.fetch_pools().await.context("fetching pool set failed")?;
    info!(source = source.source_name(), pools = pool_ids.len(), "pool set fetched");

    let results: Vec<(PoolId, Result<PoolOutcome>)> = stream::iter(pool_ids)
        .map(|id| async move {
            let outcome = price_pool(source, curve, mode, &id).await;
            (id, outcome)
        })
        .buffered(pool_concurrency.max(1))
        .collect()
        .await;

    let mut gathered = GatheredRequirements {
        total: ReserveRequirement::empty(),
        pools: Vec::new(),
        violations: Vec::new(),
    };

    for (pool, outcome) in results {
        match outcome {
            Err(e) => return Err(e.context(format!("auditing pool {pool} failed"))),
            Ok(PoolOutcome::Structural(violation)) => {
                error!(pool = %violation.pool, reason = %violation, "structural violation");
                gathered.violations.push(violation);
            }
            Ok(PoolOutcome::Priced(priced)) => {
                for leg in &priced.degraded {
                    warn!(
                        pool = %leg.pool,
                        lower = leg.lower_index,
                        upper = leg.upper_index,
                        leg = %leg.leg,
                        fault = %leg.fault,
                        "reserve leg degraded to zero"
                    );
                }
                gathered.total.merge(priced.requirement.clone());
                gathered.pools.push((pool, priced.requirement));
            }
        }
    }

    Ok(gathered)
}

async fn price_pool(
    source: &dyn PoolSource,
    curve: &dyn PricingCurve,
    mode: ComputeMode,
    pool: &PoolId,
) -> Result<PoolOutcome> {
    let snapshot = source.fetch_pool(pool).await.context("fetching pool state failed")?;
    let ticks = source.fetch_ticks(pool).await.context("fetching ticks failed")?;
    info!(pool = %pool, ticks = ticks.len(), "pool fetched");

    let intervals = match reconstruct_intervals(pool, &ticks) {
        Ok(intervals) => intervals,
        Err(violation) => return Ok(PoolOutcome::Structural(violation)),
    };

    let priced = pool_requirement(&snapshot, &intervals, mode, curve)
        .with_context(|| format!("pricing curve failed for pool {pool}"))?;
    Ok(PoolOutcome::Priced(priced))
}
