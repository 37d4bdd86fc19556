use thiserror::Error;

#[derive(Error, Debug)]
pub enum FxError {
    #[error("Exchange rate not found: {0}")]
    RateNotFound(String),

    #[error("Invalid exchange rate: {0}")]
    InvalidRate(String),

    #[error("Rate cache error: {0}")]
    CacheError(String),
}
