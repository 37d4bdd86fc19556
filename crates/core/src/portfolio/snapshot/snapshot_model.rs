use std::collections::{BTreeMap, HashSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::ValidationError;
use crate::fx::Currency;
use crate::market_data::Market;

/// A position in one listed instrument.
///
/// `quantity` and `cost` are required; `price` stays empty until a refresh
/// finds a quote for the snapshot date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub name: String,
    pub code: String,
    pub quantity: Decimal,
    /// Average unit cost in the market's native currency.
    pub cost: Decimal,
    #[serde(default)]
    pub price: Option<Decimal>,
}

impl Holding {
    pub fn new(
        name: impl Into<String>,
        code: impl Into<String>,
        quantity: Decimal,
        cost: Decimal,
    ) -> Self {
        Self {
            name: name.into(),
            code: normalize_code(&code.into()),
            quantity,
            cost,
            price: None,
        }
    }

    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    pub fn cost_basis(&self) -> Decimal {
        self.quantity * self.cost
    }

    pub fn market_value(&self) -> Option<Decimal> {
        self.price.map(|price| self.quantity * price)
    }

    pub fn unrealized_gain(&self) -> Option<Decimal> {
        self.market_value().map(|value| value - self.cost_basis())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.code.trim().is_empty() {
            return Err(ValidationError::EmptyField("code"));
        }
        check_non_negative("quantity", self.quantity)?;
        check_non_negative("cost", self.cost)?;
        if let Some(price) = self.price {
            check_non_negative("price", price)?;
        }
        Ok(())
    }

    /// Folds another lot of the same instrument into this one.
    ///
    /// Quantities add and cost becomes the quantity-weighted average. The
    /// existing name is kept unless it is blank; a known incoming price wins.
    pub fn merge(&mut self, incoming: Holding) {
        let total_quantity = self.quantity + incoming.quantity;
        self.cost = if total_quantity.is_zero() {
            incoming.cost
        } else {
            (self.cost_basis() + incoming.cost_basis()) / total_quantity
        };
        self.quantity = total_quantity;

        if self.name.trim().is_empty() {
            self.name = incoming.name;
        }
        if incoming.price.is_some() {
            self.price = incoming.price;
        }
    }
}

/// Lifecycle of a snapshot, derived from its contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SnapshotState {
    /// No holdings and no cash.
    Empty,
    /// Has cash or holdings, but not every holding is priced.
    Populated,
    /// Has holdings and every one of them is priced.
    Priced,
    /// Totals have been computed.
    Valued,
}

/// Holdings, cash, and valuation totals for one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub cash: BTreeMap<Currency, Decimal>,

    #[serde(default)]
    pub stocks: BTreeMap<Market, Vec<Holding>>,

    /// Last computed totals per currency. Empty until first valued.
    #[serde(
        rename = "totalAssets",
        default,
        deserialize_with = "deserialize_total_assets"
    )]
    pub total_assets: BTreeMap<Currency, Decimal>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl Snapshot {
    /// Empty snapshot with zero cash in every currency and no holdings.
    pub fn new() -> Self {
        Self {
            cash: Currency::ALL.iter().map(|c| (*c, Decimal::ZERO)).collect(),
            stocks: Market::ALL.iter().map(|m| (*m, Vec::new())).collect(),
            total_assets: BTreeMap::new(),
        }
    }

    pub fn cash_balance(&self, currency: Currency) -> Decimal {
        self.cash.get(&currency).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn set_cash(&mut self, currency: Currency, amount: Decimal) -> Result<(), ValidationError> {
        check_non_negative("cash", amount)?;
        self.cash.insert(currency, amount);
        Ok(())
    }

    pub fn holdings(&self, market: Market) -> &[Holding] {
        self.stocks.get(&market).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn find_holding(&self, market: Market, code: &str) -> Option<&Holding> {
        let code = normalize_code(code);
        self.holdings(market).iter().find(|h| h.code == code)
    }

    /// Adds a holding, merging into an existing one with the same code.
    pub fn upsert_holding(
        &mut self,
        market: Market,
        mut holding: Holding,
    ) -> Result<&Holding, ValidationError> {
        holding.code = normalize_code(&holding.code);
        holding.validate()?;
        let holdings = self.stocks.entry(market).or_default();

        let index = match holdings.iter().position(|h| h.code == holding.code) {
            Some(index) => {
                holdings[index].merge(holding);
                index
            }
            None => {
                holdings.push(holding);
                holdings.len() - 1
            }
        };
        Ok(&holdings[index])
    }

    pub fn remove_holding(&mut self, market: Market, code: &str) -> Option<Holding> {
        let code = normalize_code(code);
        let holdings = self.stocks.get_mut(&market)?;
        let index = holdings.iter().position(|h| h.code == code)?;
        Some(holdings.remove(index))
    }

    /// Sets the price on the holding with `code`; returns the previous price.
    pub fn set_price(
        &mut self,
        market: Market,
        code: &str,
        price: Decimal,
    ) -> Option<Option<Decimal>> {
        let holding = self
            .stocks
            .get_mut(&market)?
            .iter_mut()
            .find(|h| h.code == code)?;
        Some(holding.price.replace(price))
    }

    /// Distinct `(market, code)` pairs in market order.
    pub fn holding_keys(&self) -> Vec<(Market, String)> {
        self.stocks
            .iter()
            .flat_map(|(market, holdings)| {
                holdings.iter().map(move |h| (*market, h.code.clone()))
            })
            .collect()
    }

    pub fn state(&self) -> SnapshotState {
        if !self.total_assets.is_empty() {
            return SnapshotState::Valued;
        }
        let has_cash = self.cash.values().any(|amount| !amount.is_zero());
        if self.holding_count() == 0 && !has_cash {
            return SnapshotState::Empty;
        }
        let all_priced = self
            .stocks
            .values()
            .flatten()
            .all(|holding| holding.price.is_some());
        if self.holding_count() > 0 && all_priced {
            SnapshotState::Priced
        } else {
            SnapshotState::Populated
        }
    }

    pub fn holding_count(&self) -> usize {
        self.stocks.values().map(Vec::len).sum()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for amount in self.cash.values() {
            check_non_negative("cash", *amount)?;
        }

        for (market, holdings) in &self.stocks {
            let mut seen = HashSet::new();
            for holding in holdings {
                holding.validate()?;
                if !seen.insert(holding.code.as_str()) {
                    return Err(ValidationError::DuplicateHolding {
                        market: *market,
                        code: holding.code.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Listing codes are stored trimmed and upper-cased.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

fn check_non_negative(field: &'static str, value: Decimal) -> Result<(), ValidationError> {
    if value < Decimal::ZERO {
        return Err(ValidationError::Negative { field, value });
    }
    Ok(())
}

/// Accepts `null` for the whole map or for individual currencies.
fn deserialize_total_assets<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<Currency, Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<Currency, Option<Decimal>>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(currency, value)| value.map(|v| (currency, v)))
        .collect())
}
