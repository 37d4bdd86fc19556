//! Asset Tracker Core - dated portfolio snapshots, valuation, and FX.
//!
//! This crate holds the bookkeeping logic for the tracker. It is
//! storage-agnostic and defines the repository trait that the
//! `storage-json` crate implements, plus the adapter that turns the
//! `market-data` provider registry into per-date prices and rates.

pub mod constants;
pub mod errors;
pub mod fx;
pub mod market_data;
pub mod portfolio;

// Re-export common types from portfolio and market modules
pub use fx::Currency;
pub use market_data::Market;
pub use portfolio::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
