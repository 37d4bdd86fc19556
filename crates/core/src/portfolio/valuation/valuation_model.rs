use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::fx::{Currency, ExchangeRate};
use crate::market_data::Market;

/// A holding left out of a valuation because it has no price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnpricedHolding {
    pub market: Market,
    pub code: String,
}

/// Result of valuing one snapshot. Amounts are unrounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotValuation {
    pub date: NaiveDate,
    /// Priced holdings per market, in the market's native currency.
    pub market_values: BTreeMap<Market, Decimal>,
    /// Cash plus holdings, expressed in every supported currency.
    pub totals: BTreeMap<Currency, Decimal>,
    pub unpriced: Vec<UnpricedHolding>,
    /// Rates the conversion used.
    pub rates: Vec<ExchangeRate>,
}

impl SnapshotValuation {
    pub fn total(&self, currency: Currency) -> Decimal {
        self.totals.get(&currency).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn is_complete(&self) -> bool {
        self.unpriced.is_empty()
    }
}
