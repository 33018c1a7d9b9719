//! Layered audit configuration: defaults, then YAML file, then environment,
//! then command-line flags. Later layers win.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use slv_core::ComputeMode;

pub const ENV_LEDGER_URL: &str = "SLV_LEDGER_URL";
pub const ENV_CUSTODY: &str = "SLV_CUSTODY";

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Base url of the ledger indexer.
    #[serde(default)]
    pub ledger_url: String,
    /// Custody account whose balances cover the pools.
    #[serde(default)]
    pub custody: String,
    /// `delegating` or `independent`.
    #[serde(default = "default_mode")]
    pub mode: String,
    /// Pools fetched and priced concurrently.
    #[serde(default = "default_pool_concurrency")]
    pub pool_concurrency: usize,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            ledger_url: String::new(),
            custody: String::new(),
            mode: default_mode(),
            pool_concurrency: default_pool_concurrency(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_mode() -> String {
    "delegating".to_string()
}

fn default_pool_concurrency() -> usize {
    8
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Flag-level overrides, the highest-precedence layer.
#[derive(Debug, Default)]
pub struct Overrides {
    pub ledger_url: Option<String>,
    pub custody: Option<String>,
    pub mode: Option<String>,
    pub concurrency: Option<usize>,
}

pub fn load(path: Option<&str>, overrides: Overrides) -> Result<AuditConfig> {
    let mut cfg = match path {
        Some(p) => {
            let raw = std::fs::read_to_string(p)
                .with_context(|| format!("failed to read config file: {p}"))?;
            serde_yaml::from_str(&raw).with_context(|| format!("invalid config yaml: {p}"))?
        }
        None => AuditConfig::default(),
    };
    apply_env(
        &mut cfg,
        std::env::var(ENV_LEDGER_URL).ok(),
        std::env::var(ENV_CUSTODY).ok(),
    );
    apply_overrides(&mut cfg, overrides);
    Ok(cfg)
}

fn apply_env(cfg: &mut AuditConfig, ledger_url: Option<String>, custody: Option<String>) {
    if let Some(url) = ledger_url {
        cfg.ledger_url = url;
    }
    if let Some(account) = custody {
        cfg.custody = account;
    }
}

fn apply_overrides(cfg: &mut AuditConfig, overrides: Overrides) {
    if let Some(url) = overrides.ledger_url {
        cfg.ledger_url = url;
    }
    if let Some(account) = overrides.custody {
        cfg.custody = account;
    }
    if let Some(mode) = overrides.mode {
        cfg.mode = mode;
    }
    if let Some(concurrency) = overrides.concurrency {
        cfg.pool_concurrency = concurrency;
    }
}

pub fn parse_mode(raw: &str) -> Result<ComputeMode> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "delegating" => Ok(ComputeMode::Delegating),
        "independent" => Ok(ComputeMode::Independent),
        other => bail!("invalid mode '{other}', expected 'delegating' or 'independent'"),
    }
}

pub fn require_ledger_url(cfg: &AuditConfig) -> Result<&str> {
    if cfg.ledger_url.trim().is_empty() {
        bail!("ledger url not set; use --ledger-url, {ENV_LEDGER_URL}, or the config file");
    }
    Ok(&cfg.ledger_url)
}

pub fn require_custody(cfg: &AuditConfig) -> Result<&str> {
    if cfg.custody.trim().is_empty() {
        bail!("custody account not set; use --custody, {ENV_CUSTODY}, or the config file");
    }
    Ok(&cfg.custody)
}
