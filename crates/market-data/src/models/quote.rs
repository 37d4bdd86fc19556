use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::instrument::InstrumentId;
use super::types::Currency;

/// Request context for quote fetching
#[derive(Clone, Debug)]
pub struct QuoteContext {
    /// Canonical instrument
    pub instrument: InstrumentId,

    /// Expected quote currency (native currency of the listing market)
    pub currency_hint: Option<Currency>,
}

impl QuoteContext {
    pub fn new(instrument: InstrumentId, currency_hint: Option<Currency>) -> Self {
        Self {
            instrument,
            currency_hint,
        }
    }

    /// Currency hint or USD.
    pub fn currency_or_default(&self) -> String {
        self.currency_hint
            .as_ref()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "USD".to_string())
    }
}

/// Market data quote
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Quote {
    /// Timestamp of the quote (UTC midnight of the trading day for daily bars)
    pub timestamp: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub open: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<Decimal>,

    /// Closing/current price (required)
    pub close: Decimal,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<Decimal>,

    /// Quote currency
    pub currency: String,

    /// Provider that produced the quote (YAHOO, ALPHA_VANTAGE, ...)
    pub source: String,
}

impl Quote {
    /// Create a new quote with minimal required fields
    pub fn new(timestamp: DateTime<Utc>, close: Decimal, currency: String, source: String) -> Self {
        Self {
            timestamp,
            open: None,
            high: None,
            low: None,
            close,
            volume: None,
            currency,
            source,
        }
    }

    /// Calendar date of the quote in UTC.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}
