use crate::errors::{Error, Result};
use crate::fx::{Currency, CurrencyConverter, ExchangeRate};
use crate::market_data::Market;
use crate::portfolio::snapshot::Snapshot;
use crate::portfolio::valuation::{SnapshotValuation, UnpricedHolding};

use chrono::NaiveDate;
use log::{debug, error, warn};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Values a snapshot in every supported currency.
///
/// Holdings are summed per market in the market's native currency, cash is
/// taken per currency, and each subtotal is converted into every target
/// currency. Holdings without a price are excluded and listed in
/// `unpriced`. A missing conversion fails the whole valuation.
///
/// # Arguments
///
/// * `snapshot` - Holdings and cash for `date`.
/// * `rates` - Rates for `date`; at least every non-pivot currency against the pivot.
/// * `date` - The valuation date.
pub fn calculate_valuation(
    snapshot: &Snapshot,
    rates: Vec<ExchangeRate>,
    date: NaiveDate,
) -> Result<SnapshotValuation> {
    let (market_values, unpriced) = calculate_market_values(snapshot);

    if !unpriced.is_empty() {
        warn!(
            "{} holding(s) on {} have no price and are excluded from totals",
            unpriced.len(),
            date
        );
    }

    let converter = CurrencyConverter::new(rates.clone())?;

    // Native-currency subtotals: holdings per market plus cash per currency.
    let mut native: BTreeMap<Currency, Decimal> = BTreeMap::new();
    for (market, value) in &market_values {
        *native.entry(market.native_currency()).or_default() += *value;
    }
    for (currency, amount) in &snapshot.cash {
        *native.entry(*currency).or_default() += *amount;
    }

    let mut totals = BTreeMap::new();
    for target in Currency::ALL {
        let mut total = Decimal::ZERO;
        for (currency, amount) in &native {
            if amount.is_zero() {
                continue;
            }
            let converted = converter
                .convert_amount(*amount, *currency, target, date)
                .map_err(|e| {
                    error!(
                        "Valuation failed on {}: cannot convert {} to {}: {}",
                        date, currency, target, e
                    );
                    Error::Fx(e)
                })?;
            total += converted;
        }
        totals.insert(target, total);
    }

    debug!("Valued snapshot {}: {:?}", date, totals);

    Ok(SnapshotValuation {
        date,
        market_values,
        totals,
        unpriced,
        rates,
    })
}

/// Per-market value of priced holdings, plus the holdings that were skipped.
pub fn calculate_market_values(
    snapshot: &Snapshot,
) -> (BTreeMap<Market, Decimal>, Vec<UnpricedHolding>) {
    let mut values = BTreeMap::new();
    let mut unpriced = Vec::new();

    for (market, holdings) in &snapshot.stocks {
        let mut subtotal = Decimal::ZERO;
        for holding in holdings {
            match holding.market_value() {
                Some(value) => subtotal += value,
                None => unpriced.push(UnpricedHolding {
                    market: *market,
                    code: holding.code.clone(),
                }),
            }
        }
        values.insert(*market, subtotal);
    }

    (values, unpriced)
}
