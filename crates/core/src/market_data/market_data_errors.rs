use chrono::NaiveDate;
use thiserror::Error;

/// Failure to obtain a price or rate for an instrument and date.
///
/// Provider-level failures (network, rate limits, unknown symbols) are
/// collapsed into `reason` so callers handle a single condition.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketDataError {
    #[error("No data for {instrument} on {date}: {reason}")]
    DataUnavailable {
        instrument: String,
        date: NaiveDate,
        reason: String,
    },
}

impl MarketDataError {
    pub fn unavailable(
        instrument: impl Into<String>,
        date: NaiveDate,
        reason: impl Into<String>,
    ) -> Self {
        MarketDataError::DataUnavailable {
            instrument: instrument.into(),
            date,
            reason: reason.into(),
        }
    }
}
