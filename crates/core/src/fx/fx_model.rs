use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::currency::Currency;
use crate::constants::DECIMAL_PRECISION;

/// Where a rate used for a valuation came from.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RateSource {
    /// Fetched for the requested date.
    Provider,
    /// The requested date had no rate; the current rate was used instead.
    LatestFallback,
}

/// One `from -> to` rate, meaning one unit of `from` is worth `rate` units of `to`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRate {
    pub from_currency: Currency,
    pub to_currency: Currency,
    #[serde(serialize_with = "serialize_decimal_6")]
    pub rate: Decimal,
    pub date: NaiveDate,
    pub source: RateSource,
}

impl ExchangeRate {
    pub fn new(from: Currency, to: Currency, rate: Decimal, date: NaiveDate) -> Self {
        Self {
            from_currency: from,
            to_currency: to,
            rate,
            date,
            source: RateSource::Provider,
        }
    }

    pub fn with_source(mut self, source: RateSource) -> Self {
        self.source = source;
        self
    }

    /// Pair label such as `HKD/USD`.
    pub fn pair(&self) -> String {
        format!("{}/{}", self.from_currency, self.to_currency)
    }
}

fn serialize_decimal_6<S>(decimal: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let rounded = decimal.round_dp(DECIMAL_PRECISION);
    serializer.serialize_str(&rounded.to_string())
}
