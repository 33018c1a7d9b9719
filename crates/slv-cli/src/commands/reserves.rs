//! `slv reserves`: print required reserves without touching custody.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use slv_core::Q96Curve;
use slv_ledger::HttpLedger;

use crate::config::{self, AuditConfig};
use crate::pipeline;

pub async fn run(cfg: &AuditConfig) -> Result<()> {
    let ledger_url = config::require_ledger_url(cfg)?;
    let mode = config::parse_mode(&cfg.mode)?;
    let ledger = HttpLedger::new(
        ledger_url.to_string(),
        Duration::from_secs(cfg.request_timeout_secs),
    )
    .context("building ledger client failed")?;

    let gathered =
        pipeline::gather_requirements(&ledger, &Q96Curve, mode, cfg.pool_concurrency).await?;

    if !gathered.violations.is_empty() {
        bail!("{} pool(s) failed structural checks", gathered.violations.len());
    }

    for (pool, requirement) in &gathered.pools {
        for (token, amount) in &requirement.amounts {
            println!("pool={pool} token={token} required={amount}");
        }
    }
    for (token, amount) in &gathered.total.amounts {
        println!("token={token} required_total={amount}");
    }
    Ok(())
}
