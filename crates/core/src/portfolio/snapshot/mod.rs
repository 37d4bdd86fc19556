//! Portfolio snapshot module - dated holdings, cash, and the document that
//! collects them.

mod document_model;
mod snapshot_model;
mod snapshot_traits;

pub use document_model::*;
pub use snapshot_model::*;
pub use snapshot_traits::*;

#[cfg(test)]
mod snapshot_model_tests;
