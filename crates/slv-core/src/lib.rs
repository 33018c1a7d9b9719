//! slv-core: pure solvency engine for concentrated-liquidity pools.
//!
//! Everything in this crate is synchronous and deterministic: sorted tick
//! deltas go in, per-token reserve requirements and an audit verdict come
//! out. Fetching pool data and custody balances lives in `slv-ledger`;
//! orchestration and reporting live in `slv-cli`.
//!
//! Decisions encoded here:
//! - All prices are Q64.96 sqrt prices on `U256`; no floating point anywhere.
//! - Intermediates widen to `U512`, divisions truncate toward zero, and
//!   per-token totals saturate at `U256::MAX` (overstating a requirement can
//!   only fail an audit, never pass one).
//! - Interval reconstruction is LIFO: a closing tick settles the most
//!   recently opened liquidity first.
//! - Malformed tick data is a structural violation, not a shortfall; the two
//!   are reported and exit-coded separately.

mod aggregate;
mod curve;
mod intervals;
mod math;
mod reserves;
mod types;
mod verify;

pub use aggregate::*;
pub use curve::*;
pub use intervals::*;
pub use math::*;
pub use reserves::*;
pub use types::*;
pub use verify::*;

pub use primitive_types::U256;
