//! Storage-specific error types for the JSON file store.
//!
//! These wrap IO and serde_json errors and convert them to the
//! backend-agnostic `StorageError` defined in `asset_tracker_core`.

use std::path::PathBuf;

use asset_tracker_core::errors::{Error, StorageError, ValidationError};
use thiserror::Error;

/// Errors raised while reading or writing the portfolio file.
///
/// Internal to this crate; callers only see `asset_tracker_core::Error`.
#[derive(Error, Debug)]
pub enum JsonStoreError {
    #[error("{}", .0.display())]
    NotFound(PathBuf),

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },

    #[error("Failed to encode portfolio: {0}")]
    Encode(#[from] serde_json::Error),
}

impl JsonStoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        JsonStoreError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<JsonStoreError> for Error {
    fn from(err: JsonStoreError) -> Self {
        let message = err.to_string();
        match err {
            JsonStoreError::NotFound(_) => Error::Storage(StorageError::NotFound(message)),
            JsonStoreError::Io { .. } => Error::Storage(StorageError::Io(message)),
            JsonStoreError::Parse { .. } | JsonStoreError::Invalid { .. } => {
                Error::Storage(StorageError::Corrupt(message))
            }
            JsonStoreError::Encode(_) => Error::Storage(StorageError::Serialization(message)),
        }
    }
}

/// Extension trait for converting store Results to core Results.
pub trait IntoCore<T> {
    fn into_core(self) -> asset_tracker_core::Result<T>;
}

impl<T> IntoCore<T> for std::result::Result<T, JsonStoreError> {
    fn into_core(self) -> asset_tracker_core::Result<T> {
        self.map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_invalid_map_to_corrupt() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = JsonStoreError::Parse {
            path: PathBuf::from("p.json"),
            source,
        }
        .into();
        assert!(matches!(err, Error::Storage(StorageError::Corrupt(_))));

        let err: Error = JsonStoreError::Invalid {
            path: PathBuf::from("p.json"),
            source: ValidationError::EmptyField("code"),
        }
        .into();
        assert!(matches!(err, Error::Storage(StorageError::Corrupt(_))));
    }

    #[test]
    fn test_not_found_keeps_path() {
        let err: Error = JsonStoreError::NotFound(PathBuf::from("data/portfolio.json")).into();
        match err {
            Error::Storage(StorageError::NotFound(message)) => {
                assert!(message.contains("data/portfolio.json"))
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
