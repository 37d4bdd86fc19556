//! Core error types for the asset tracker.
//!
//! Storage-specific errors (file system, JSON parsing) are converted to
//! [`StorageError`] by the storage layer so this crate stays backend-agnostic.

use chrono::{NaiveDate, ParseError as ChronoParseError};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::fx::FxError;
use crate::market_data::{Market, MarketDataError};

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for portfolio operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("Storage operation failed: {0}")]
    Storage(#[from] StorageError),

    #[error("FX operation failed: {0}")]
    Fx(#[from] FxError),

    #[error("No snapshot exists for {0}")]
    SnapshotNotFound(NaiveDate),

    #[error("No {market} holding with code '{code}' on {date}")]
    HoldingNotFound {
        market: Market,
        code: String,
        date: NaiveDate,
    },

    #[error("The portfolio has no snapshots")]
    EmptyPortfolio,

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Backend-agnostic storage failures.
///
/// All details are carried as strings so the storage crate can map its own
/// error types into this one.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Portfolio file not found: {0}")]
    NotFound(String),

    #[error("Portfolio file is corrupt: {0}")]
    Corrupt(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Unsupported currency '{0}'")]
    UnsupportedCurrency(String),

    #[error("Unknown market '{0}'")]
    UnknownMarket(String),

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: Decimal },

    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    #[error("Duplicate {market} holding '{code}'")]
    DuplicateHolding { market: Market, code: String },

    #[error("Invalid date: {0}")]
    DateParse(#[from] ChronoParseError),

    #[error("Invalid decimal: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Storage(StorageError::Io(err.to_string()))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Storage(StorageError::Serialization(err.to_string()))
    }
}
