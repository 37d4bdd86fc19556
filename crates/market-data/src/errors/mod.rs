//! Failures reported by providers and the registry.

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

/// Every variant maps to a [`RetryClass`]; the registry uses it to decide
/// between stopping and asking the next provider.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The vendor does not list the symbol.
    #[error("Unknown symbol {0}")]
    SymbolNotFound(String),

    #[error("Instrument kind not served: {0}")]
    UnsupportedAssetType(String),

    /// Listed, but no bars inside the window.
    #[error("No quotes in the requested window")]
    NoDataForRange,

    /// HTTP 429 or a quota notice in the payload.
    #[error("{provider} is rate limiting requests")]
    RateLimited { provider: String },

    #[error("{provider} did not answer in time")]
    Timeout { provider: String },

    #[error("{provider}: {message}")]
    ProviderError { provider: String, message: String },

    #[error("No {provider} notation for this instrument")]
    ResolutionFailed { provider: String },

    #[error("Quote rejected: {message}")]
    ValidationFailed { message: String },

    #[error("No provider serves this instrument")]
    NoProvidersAvailable,

    #[error("Every provider failed")]
    AllProvidersFailed,

    #[error("HTTP failure: {0}")]
    Network(#[from] reqwest::Error),
}

impl MarketDataError {
    /// ```
    /// use asset_tracker_market_data::errors::{MarketDataError, RetryClass};
    ///
    /// let throttled = MarketDataError::RateLimited { provider: "ALPHA_VANTAGE".into() };
    /// assert_eq!(throttled.retry_class(), RetryClass::WithBackoff);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        use MarketDataError::*;

        match self {
            ValidationFailed { .. } | NoProvidersAvailable | AllProvidersFailed => {
                RetryClass::Never
            }
            RateLimited { .. } | Timeout { .. } => RetryClass::WithBackoff,
            // Coverage differs between vendors: Alpha Vantage has no HKEX
            // listings while Yahoo does.
            SymbolNotFound(_)
            | UnsupportedAssetType(_)
            | NoDataForRange
            | ProviderError { .. }
            | ResolutionFailed { .. }
            | Network(_) => RetryClass::NextProvider,
        }
    }
}
