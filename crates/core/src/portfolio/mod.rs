//! Portfolio module - snapshots, valuation, and the manager that ties them
//! to storage and market data.

pub mod manager;
pub mod snapshot;
pub mod valuation;

pub use manager::*;
pub use snapshot::*;
pub use valuation::*;
