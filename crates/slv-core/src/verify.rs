//! Requirement-vs-custody comparison.

use std::fmt;

use primitive_types::U256;

use crate::types::{BalanceSet, ReserveRequirement, TokenId};

/// Run verdict. One shortfall anywhere fails the whole run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuditVerdict {
    Pass,
    Fail,
}

/// Per-token comparison outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenFinding {
    /// Custody covers the requirement; `surplus` may be zero.
    Reconciled { token: TokenId, required: U256, actual: U256, surplus: U256 },
    /// Custody falls short by `deficit`.
    Shortfall { token: TokenId, required: U256, actual: U256, deficit: U256 },
    /// The ledger could not resolve the token. Skipped, never a shortfall.
    LookupMiss { token: TokenId, required: U256 },
}

impl TokenFinding {
    pub fn token(&self) -> &TokenId {
        match self {
            TokenFinding::Reconciled { token, .. } => token,
            TokenFinding::Shortfall { token, .. } => token,
            TokenFinding::LookupMiss { token, .. } => token,
        }
    }
}

impl fmt::Display for TokenFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenFinding::Reconciled { token, required, actual, surplus } => {
                write!(f, "token={token} required={required} actual={actual} diff=+{surplus}")
            }
            TokenFinding::Shortfall { token, required, actual, deficit } => {
                write!(f, "token={token} required={required} actual={actual} diff=-{deficit}")
            }
            TokenFinding::LookupMiss { token, required } => {
                write!(f, "token={token} required={required} actual=MISSING")
            }
        }
    }
}

/// Full comparison output, findings in token order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuditReport {
    pub verdict: AuditVerdict,
    pub findings: Vec<TokenFinding>,
}

impl AuditReport {
    /// Report for an empty requirement set: nothing to check, nothing owed.
    pub fn clean() -> Self {
        Self { verdict: AuditVerdict::Pass, findings: Vec::new() }
    }

    pub fn passed(&self) -> bool {
        self.verdict == AuditVerdict::Pass
    }

    pub fn shortfall_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| matches!(f, TokenFinding::Shortfall { .. }))
            .count()
    }
}

/// Compares required reserves against custody balances.
///
/// Never stops at the first problem: every token is checked and reported,
/// so one run shows the full damage. Tokens the ledger could not resolve
/// become [`TokenFinding::LookupMiss`] and leave the verdict alone.
pub fn verify_balances(required: &ReserveRequirement, balances: &BalanceSet) -> AuditReport {
    let mut verdict = AuditVerdict::Pass;
    let mut findings = Vec::with_capacity(required.len());

    for (token, req) in &required.amounts {
        match balances.get(token) {
            None => {
                findings.push(TokenFinding::LookupMiss { token: token.clone(), required: *req });
            }
            Some(actual) if actual < *req => {
                verdict = AuditVerdict::Fail;
                findings.push(TokenFinding::Shortfall {
                    token: token.clone(),
                    required: *req,
                    actual,
                    deficit: *req - actual,
                });
            }
            Some(actual) => {
                findings.push(TokenFinding::Reconciled {
                    token: token.clone(),
                    required: *req,
                    actual,
                    surplus: actual - *req,
                });
            }
        }
    }

    AuditReport { verdict, findings }
}
