use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::DISPLAY_DECIMAL_PRECISION;
use crate::fx::Currency;
use crate::market_data::Market;
use crate::portfolio::snapshot::{Snapshot, SnapshotState};
use crate::portfolio::valuation::SnapshotValuation;

/// A holding whose price was refreshed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceUpdate {
    pub market: Market,
    pub code: String,
    pub price: Decimal,
    pub previous_price: Option<Decimal>,
}

/// A holding the provider could not price; its last price is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceFailure {
    pub market: Market,
    pub code: String,
    pub retained_price: Option<Decimal>,
    pub reason: String,
}

/// Outcome of `update_stock_prices` for one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRefreshReport {
    pub date: NaiveDate,
    pub updated: Vec<PriceUpdate>,
    pub unavailable: Vec<PriceFailure>,
}

impl PriceRefreshReport {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            updated: Vec::new(),
            unavailable: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.unavailable.is_empty()
    }
}

/// Prices and valuation from a single `refresh`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshOutcome {
    pub prices: PriceRefreshReport,
    pub valuation: SnapshotValuation,
}

/// Per-market line of a summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSummary {
    pub count: usize,
    /// Native-currency value, absent while any holding is unpriced.
    pub value: Option<Decimal>,
    pub unpriced: Vec<String>,
}

/// Read-only projection of one snapshot for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub date: NaiveDate,
    pub state: SnapshotState,
    pub cash: BTreeMap<Currency, Decimal>,
    pub stocks: BTreeMap<Market, MarketSummary>,
    /// Stored totals rounded for display; empty until valued.
    pub total_assets: BTreeMap<Currency, Decimal>,
}

impl PortfolioSummary {
    pub fn from_snapshot(date: NaiveDate, snapshot: &Snapshot) -> Self {
        let stocks = snapshot
            .stocks
            .iter()
            .map(|(market, holdings)| {
                let unpriced: Vec<String> = holdings
                    .iter()
                    .filter(|h| h.price.is_none())
                    .map(|h| h.code.clone())
                    .collect();
                let value = if unpriced.is_empty() {
                    let total: Decimal = holdings.iter().filter_map(|h| h.market_value()).sum();
                    Some(total.round_dp(DISPLAY_DECIMAL_PRECISION))
                } else {
                    None
                };
                (
                    *market,
                    MarketSummary {
                        count: holdings.len(),
                        value,
                        unpriced,
                    },
                )
            })
            .collect();

        let total_assets = snapshot
            .total_assets
            .iter()
            .map(|(currency, amount)| (*currency, amount.round_dp(DISPLAY_DECIMAL_PRECISION)))
            .collect();

        Self {
            date,
            state: snapshot.state(),
            cash: snapshot.cash.clone(),
            stocks,
            total_assets,
        }
    }
}
