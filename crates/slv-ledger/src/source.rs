//! Source traits for pool data and custody balances.

use std::fmt;

use slv_core::{AccountId, BalanceSet, LiquidityTick, PoolId, PoolSnapshot, TokenId};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors a source implementation may surface.
#[derive(Debug)]
pub enum SourceError {
    /// Network-level failure before any response arrived.
    Transport(String),
    /// The upstream answered with an application-level error.
    Api { status: Option<u16>, message: String },
    /// A response arrived but could not be decoded.
    Decode(String),
    /// The source was built from unusable configuration.
    Config(String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Transport(msg) => write!(f, "transport error: {msg}"),
            SourceError::Api { status: Some(code), message } => {
                write!(f, "ledger api error status={code}: {message}")
            }
            SourceError::Api { status: None, message } => {
                write!(f, "ledger api error: {message}")
            }
            SourceError::Decode(msg) => write!(f, "decode error: {msg}"),
            SourceError::Config(msg) => write!(f, "config error: {msg}"),
        }
    }
}

impl std::error::Error for SourceError {}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Read side of the pool ledger.
///
/// Object safe and `Send + Sync` so one source can serve concurrent per-pool
/// tasks. Tick lists are complete for the pool and sorted ascending by
/// index; whatever arrives here is a single consistent observation.
#[async_trait::async_trait]
pub trait PoolSource: Send + Sync {
    /// Short name for logs.
    fn source_name(&self) -> &'static str;

    /// Every pool the audit should cover.
    async fn fetch_pools(&self) -> Result<Vec<PoolId>, SourceError>;

    /// Current state of one pool.
    async fn fetch_pool(&self, pool: &PoolId) -> Result<PoolSnapshot, SourceError>;

    /// Complete tick-delta list for one pool.
    async fn fetch_ticks(&self, pool: &PoolId) -> Result<Vec<LiquidityTick>, SourceError>;
}

/// Custody balance lookup.
#[async_trait::async_trait]
pub trait BalanceSource: Send + Sync {
    /// Balances of `tokens` held by `custody`, fetched in one batched call.
    /// Tokens the ledger cannot resolve are simply absent from the result;
    /// absence is the caller's signal, not an error.
    async fn fetch_balances(
        &self,
        custody: &AccountId,
        tokens: &[TokenId],
    ) -> Result<BalanceSet, SourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use primitive_types::U256;
    use slv_core::Q96;

    struct FixtureSource;

    #[async_trait::async_trait]
    impl PoolSource for FixtureSource {
        fn source_name(&self) -> &'static str {
            "fixture"
        }

        async fn fetch_pools(&self) -> Result<Vec<PoolId>, SourceError> {
            Ok(vec![PoolId::new("pool-1")])
        }

        async fn fetch_pool(&self, pool: &PoolId) -> Result<PoolSnapshot, SourceError> {
            Ok(PoolSnapshot {
                pool: pool.clone(),
                token_x: TokenId::new("tokx"),
                token_y: TokenId::new("toky"),
                sqrt_price_x96: Q96,
                current_tick: 0,
                fee_protocol_x: U256::zero(),
                fee_protocol_y: U256::zero(),
            })
        }

        async fn fetch_ticks(&self, _pool: &PoolId) -> Result<Vec<LiquidityTick>, SourceError> {
            Ok(vec![LiquidityTick::open(-10, 100), LiquidityTick::close(10, 100)])
        }
    }

    #[async_trait::async_trait]
    impl BalanceSource for FixtureSource {
        async fn fetch_balances(
            &self,
            _custody: &AccountId,
            tokens: &[TokenId],
        ) -> Result<BalanceSet, SourceError> {
            let mut set = BalanceSet::empty();
            for token in tokens {
                set.insert(token.clone(), U256::from(1_000));
            }
            Ok(set)
        }
    }

    #[tokio::test]
    async fn traits_are_object_safe() {
        let pools: Box<dyn PoolSource> = Box::new(FixtureSource);
        let balances: Box<dyn BalanceSource> = Box::new(FixtureSource);

        let ids = pools.fetch_pools().await.unwrap();
        assert_eq!(ids, vec![PoolId::new("pool-1")]);
        assert_eq!(pools.source_name(), "fixture");

        let set = balances
            .fetch_balances(&AccountId::new("acct"), &[TokenId::new("tokx")])
            .await
            .unwrap();
        assert_eq!(set.get(&TokenId::new("tokx")), Some(U256::from(1_000)));
    }

    #[test]
    fn error_display_is_stable() {
        assert_eq!(
            SourceError::Transport("connection refused".into()).to_string(),
            "transport error: connection refused"
        );
        assert_eq!(
            SourceError::Api { status: Some(502), message: "bad gateway".into() }.to_string(),
            "ledger api error status=502: bad gateway"
        );
        assert_eq!(
            SourceError::Api { status: None, message: "rejected".into() }.to_string(),
            "ledger api error: rejected"
        );
        assert_eq!(
            SourceError::Decode("bad json".into()).to_string(),
            "decode error: bad json"
        );
        assert_eq!(
            SourceError::Config("empty base url".into()).to_string(),
            "config error: empty base url"
        );
    }
}
