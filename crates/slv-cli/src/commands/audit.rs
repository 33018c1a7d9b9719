//! `slv audit`: the full reconstruct, price and verify pipeline.

use std::time::Duration;

use anyhow::{Context, Result};
use slv_core::{
    verify_balances, AccountId, ComputeMode, PricingCurve, Q96Curve, TokenFinding, TokenId,
};
use slv_ledger::{BalanceSource, HttpLedger, PoolSource};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::{self, AuditConfig};
use crate::pipeline;

/// Final audit outcome; `main` maps it onto the process exit code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuditOutcome {
    Pass,
    Shortfall,
    Structural,
}

pub async fn run(cfg: &AuditConfig) -> Result<AuditOutcome> {
    let ledger_url = config::require_ledger_url(cfg)?;
    let custody = AccountId::new(config::require_custody(cfg)?);
    let mode = config::parse_mode(&cfg.mode)?;
    let ledger = HttpLedger::new(
        ledger_url.to_string(),
        Duration::from_secs(cfg.request_timeout_secs),
    )
    .context("building ledger client failed")?;

    execute(&ledger, &ledger, &Q96Curve, mode, &custody, cfg.pool_concurrency).await
}

/// Pipeline body, generic over its collaborators so tests can drive it with
/// in-memory sources.
pub async fn execute(
    pools: &dyn PoolSource,
    balances: &dyn BalanceSource,
    curve: &dyn PricingCurve,
    mode: ComputeMode,
    custody: &AccountId,
    pool_concurrency: usize,
) -> Result<AuditOutcome> {
    let run_id = Uuid::new_v4();
    info!(run_id = %run_id, mode = ?mode, custody = %custody, "audit starting");

    let gathered = pipeline::gather_requirements(pools, curve, mode, pool_concurrency).await?;

    if !gathered.violations.is_empty() {
        // Unverifiable beats unsound: with malformed tick data no verdict
        // about custody is reachable.
        error!(
            run_id = %run_id,
            violations = gathered.violations.len(),
            "audit halted, tick data failed structural checks"
        );
        println!("verdict=STRUCTURAL_VIOLATION violations={}", gathered.violations.len());
        return Ok(AuditOutcome::Structural);
    }

    let tokens: Vec<TokenId> = gathered.total.amounts.keys().cloned().collect();
    let held = balances
        .fetch_balances(custody, &tokens)
        .await
        .context("fetching custody balances failed")?;

    let report = verify_balances(&gathered.total, &held);
    for finding in &report.findings {
        match finding {
            TokenFinding::Shortfall { .. } => error!(finding = %finding, "token shortfall"),
            TokenFinding::LookupMiss { .. } => warn!(finding = %finding, "balance lookup miss"),
            TokenFinding::Reconciled { .. } => info!(finding = %finding, "token reconciled"),
        }
    }

    if report.passed() {
        info!(run_id = %run_id, tokens = report.findings.len(), "audit verdict=PASS");
        println!("verdict=PASS pools={} tokens={}", gathered.pools.len(), report.findings.len());
        Ok(AuditOutcome::Pass)
    } else {
        error!(
            run_id = %run_id,
            shortfalls = report.shortfall_count(),
            "audit verdict=FAIL"
        );
        println!("verdict=FAIL pools={} tokens={}", gathered.pools.len(), report.findings.len());
        Ok(AuditOutcome::Shortfall)
    }
}
