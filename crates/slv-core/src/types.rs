//! slv-core types

use std::collections::BTreeMap;
use std::fmt;

use primitive_types::U256;

// ---------------------------------------------------------------------------
// Fixed-point constants
// ---------------------------------------------------------------------------

/// Q64.96 scale: sqrt prices carry 96 fractional bits, so 2^96 encodes 1.0.
pub const Q96: U256 = U256([0, 0x1_0000_0000, 0, 0]);

/// Lowest tick index a pool can quote.
pub const MIN_TICK: i32 = -887_272;

/// Highest tick index a pool can quote.
pub const MAX_TICK: i32 = 887_272;

/// sqrt price at [`MIN_TICK`]; inclusive floor of the valid Q64.96 range.
pub const MIN_SQRT_RATIO: U256 = U256([4_295_128_739, 0, 0, 0]);

/// sqrt price at [`MAX_TICK`]; inclusive ceiling of the valid Q64.96 range.
pub const MAX_SQRT_RATIO: U256 =
    U256([0x5d95_1d52_6398_8d26, 0xefd1_fc6a_5064_8849, 0xfffd_8963, 0]);

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Token identifier as the ledger spells it. `Ord` so every report and fold
/// iterates tokens in one deterministic order.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct TokenId(pub String);

impl TokenId {
    pub fn new<S: Into<String>>(s: S) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pool identifier.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct PoolId(pub String);

impl PoolId {
    pub fn new<S: Into<String>>(s: S) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Custody account identifier.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn new<S: Into<String>>(s: S) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Pool data
// ---------------------------------------------------------------------------

/// One signed liquidity delta at a tick index.
///
/// `sign == true` opens liquidity at this index; `sign == false` closes
/// liquidity opened at a lower index. Magnitude is always the unsigned
/// `liquidity_change`. Per-pool tick lists arrive sorted strictly ascending
/// by `index`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LiquidityTick {
    pub index: i32,
    pub sign: bool,
    pub liquidity_change: u128,
}

impl LiquidityTick {
    pub fn open(index: i32, liquidity_change: u128) -> Self {
        Self { index, sign: true, liquidity_change }
    }

    pub fn close(index: i32, liquidity_change: u128) -> Self {
        Self { index, sign: false, liquidity_change }
    }
}

/// Closed range of constant liquidity recovered from a matched tick pair.
///
/// Reconstruction guarantees `lower_index < upper_index` and `liquidity > 0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct LiquidityInterval {
    pub lower_index: i32,
    pub upper_index: i32,
    pub liquidity: u128,
}

impl LiquidityInterval {
    pub fn new(lower_index: i32, upper_index: i32, liquidity: u128) -> Self {
        Self { lower_index, upper_index, liquidity }
    }
}

/// Point-in-time state of one pool, everything needed to price its intervals.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolSnapshot {
    pub pool: PoolId,
    pub token_x: TokenId,
    pub token_y: TokenId,
    /// Current sqrt price in Q64.96.
    pub sqrt_price_x96: U256,
    /// Tick the current price sits in. Diagnostic; pricing reads
    /// `sqrt_price_x96` directly.
    pub current_tick: i32,
    /// Protocol-owed fees custodied by the pool but outside every interval.
    pub fee_protocol_x: U256,
    pub fee_protocol_y: U256,
}

// ---------------------------------------------------------------------------
// Requirement and balance folds
// ---------------------------------------------------------------------------

/// Required custody amount per token, accumulated across intervals and pools.
///
/// `add` saturates at `U256::MAX`. A saturated total can only overstate the
/// requirement, which pushes a run toward failure and never hides a
/// shortfall.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReserveRequirement {
    pub amounts: BTreeMap<TokenId, U256>,
}

impl ReserveRequirement {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn add(&mut self, token: TokenId, amount: U256) {
        let slot = self.amounts.entry(token).or_default();
        *slot = slot.saturating_add(amount);
    }

    /// Folds `other` into `self`. Token-wise saturating addition, so merges
    /// commute and associate regardless of pool order.
    pub fn merge(&mut self, other: ReserveRequirement) {
        for (token, amount) in other.amounts {
            self.add(token, amount);
        }
    }

    pub fn get(&self, token: &TokenId) -> U256 {
        self.amounts.get(token).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.amounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }
}

/// Custody balances by token. A token absent from the map is one the ledger
/// could not resolve.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BalanceSet {
    pub amounts: BTreeMap<TokenId, U256>,
}

impl BalanceSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, token: TokenId, amount: U256) {
        self.amounts.insert(token, amount);
    }

    pub fn get(&self, token: &TokenId) -> Option<U256> {
        self.amounts.get(token).copied()
    }

    pub fn len(&self) -> usize {
        self.amounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
