//! slv-ledger: data sources for the solvency auditor.
//!
//! Defines the async source traits the engine is driven from and the
//! HTTP/JSON ledger client implementing them. Sources hand over complete,
//! already-sorted data for a single point in time; retries, pagination and
//! caching are upstream concerns.

mod http;
mod source;

pub use http::HttpLedger;
pub use source::{BalanceSource, PoolSource, SourceError};
