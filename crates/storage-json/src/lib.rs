//! JSON file storage for the asset tracker.
//!
//! Implements the repository trait defined in `asset-tracker-core` on top of
//! a single pretty-printed JSON document whose top-level keys are snapshot
//! dates.
//!
//! ```text
//! core (domain)
//!       │
//!       ▼
//! storage-json (this crate)
//!       │
//!       ▼
//! portfolio.json
//! ```

pub mod errors;
pub mod portfolio;

pub use errors::JsonStoreError;
pub use portfolio::JsonPortfolioRepository;
