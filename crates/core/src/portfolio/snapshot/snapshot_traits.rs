//! Repository trait for the persisted portfolio document.

use super::PortfolioDocument;
use crate::errors::Result;

/// Whole-document persistence.
///
/// Implementations must leave the previous document intact when `save` fails.
pub trait PortfolioRepositoryTrait: Send + Sync {
    /// Load and validate the document. Fails with `StorageError::NotFound`
    /// when nothing has been saved yet and `StorageError::Corrupt` when the
    /// content cannot be parsed or fails validation.
    fn load(&self) -> Result<PortfolioDocument>;

    /// Replace the stored document.
    fn save(&self, document: &PortfolioDocument) -> Result<()>;

    fn exists(&self) -> bool;
}
