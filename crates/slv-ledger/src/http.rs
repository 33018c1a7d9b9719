//! HTTP/JSON ledger client.
//!
//! Amounts and sqrt prices travel as decimal strings on the wire and are
//! parsed here exactly once, so no floating point ever enters the pipeline.
//! A response naming a different pool than the one requested is treated as
//! a decode failure.

use std::time::Duration;

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use slv_core::{AccountId, BalanceSet, LiquidityTick, PoolId, PoolSnapshot, TokenId};

use crate::source::{BalanceSource, PoolSource, SourceError};

/// Ledger indexer client. Endpoints, relative to the base url:
///
/// - `GET  /v1/pools`
/// - `GET  /v1/pools/{id}`
/// - `GET  /v1/pools/{id}/ticks`
/// - `POST /v1/balances`
#[derive(Clone, Debug)]
pub struct HttpLedger {
    http: reqwest::Client,
    base_url: String,
}

impl HttpLedger {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, SourceError> {
        if base_url.trim().is_empty() {
            return Err(SourceError::Config("empty base url".into()));
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Config(e.to_string()))?;
        Ok(Self { http, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, SourceError> {
        let response = self
            .http
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;
        Self::decode(response).await
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, SourceError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SourceError::Api { status: Some(status.as_u16()), message });
        }
        response
            .json::<T>()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct PoolsDto {
    pools: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PoolDto {
    pool: String,
    token_x: String,
    token_y: String,
    sqrt_price_x96: String,
    current_tick: i32,
    /// Absent means zero; indexers omit fee fields for fee-less pools.
    fee_protocol_x: Option<String>,
    fee_protocol_y: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TicksDto {
    ticks: Vec<TickDto>,
}

#[derive(Debug, Deserialize)]
struct TickDto {
    index: i32,
    side: TickSideDto,
    liquidity_change: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum TickSideDto {
    Open,
    Close,
}

#[derive(Debug, Serialize)]
struct BalancesRequestDto<'a> {
    account: &'a str,
    tokens: Vec<&'a str>,
}

#[derive(Debug, Deserialize)]
struct BalancesDto {
    balances: Vec<BalanceDto>,
}

#[derive(Debug, Deserialize)]
struct BalanceDto {
    token: String,
    amount: String,
}

fn parse_u256(field: &str, raw: &str) -> Result<U256, SourceError> {
    U256::from_dec_str(raw.trim())
        .map_err(|_| SourceError::Decode(format!("{field}: invalid unsigned decimal '{raw}'")))
}

fn parse_u128(field: &str, raw: &str) -> Result<u128, SourceError> {
    raw.trim()
        .parse::<u128>()
        .map_err(|_| SourceError::Decode(format!("{field}: invalid unsigned decimal '{raw}'")))
}

// ---------------------------------------------------------------------------
// Trait impls
// ---------------------------------------------------------------------------

#[async_trait::async_trait]
impl PoolSource for HttpLedger {
    fn source_name(&self) -> &'static str {
        "http-ledger"
    }

    async fn fetch_pools(&self) -> Result<Vec<PoolId>, SourceError> {
        let dto: PoolsDto = self.get_json("/v1/pools").await?;
        Ok(dto.pools.into_iter().map(PoolId::new).collect())
    }

    async fn fetch_pool(&self, pool: &PoolId) -> Result<PoolSnapshot, SourceError> {
        let dto: PoolDto = self.get_json(&format!("/v1/pools/{pool}")).await?;
        if dto.pool != pool.as_str() {
            return Err(SourceError::Decode(format!(
                "pool id mismatch: asked for {pool}, got {}",
                dto.pool
            )));
        }
        let fee_protocol_x = match dto.fee_protocol_x.as_deref() {
            Some(raw) => parse_u256("fee_protocol_x", raw)?,
            None => U256::zero(),
        };
        let fee_protocol_y = match dto.fee_protocol_y.as_deref() {
            Some(raw) => parse_u256("fee_protocol_y", raw)?,
            None => U256::zero(),
        };
        Ok(PoolSnapshot {
            pool: PoolId::new(dto.pool),
            token_x: TokenId::new(dto.token_x),
            token_y: TokenId::new(dto.token_y),
            sqrt_price_x96: parse_u256("sqrt_price_x96", &dto.sqrt_price_x96)?,
            current_tick: dto.current_tick,
            fee_protocol_x,
            fee_protocol_y,
        })
    }

    async fn fetch_ticks(&self, pool: &PoolId) -> Result<Vec<LiquidityTick>, SourceError> {
        let dto: TicksDto = self.get_json(&format!("/v1/pools/{pool}/ticks")).await?;
        dto.ticks
            .into_iter()
            .map(|t| {
                Ok(LiquidityTick {
                    index: t.index,
                    sign: matches!(t.side, TickSideDto::Open),
                    liquidity_change: parse_u128("liquidity_change", &t.liquidity_change)?,
                })
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl BalanceSource for HttpLedger {
    async fn fetch_balances(
        &self,
        custody: &AccountId,
        tokens: &[TokenId],
    ) -> Result<BalanceSet, SourceError> {
        let request = BalancesRequestDto {
            account: custody.as_str(),
            tokens: tokens.iter().map(TokenId::as_str).collect(),
        };
        let response = self
            .http
            .post(self.url("/v1/balances"))
            .json(&request)
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;
        let dto: BalancesDto = Self::decode(response).await?;

        let mut set = BalanceSet::empty();
        for entry in dto.balances {
            let amount = parse_u256("amount", &entry.amount)?;
            set.insert(TokenId::new(entry.token), amount);
        }
        Ok(set)
    }
}
