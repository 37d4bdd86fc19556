use crate::fx::currency::Currency;
use crate::fx::fx_errors::FxError;
use crate::fx::fx_model::ExchangeRate;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

/// Graph-based currency calculator.
///
/// Rates are stored as independent time-series per pair and paths are found
/// on demand, so only `X -> pivot` rates need to be fetched to convert between
/// any two supported currencies. Lookups use the nearest dated rate.
pub struct CurrencyConverter {
    /// Currency -> currencies with a known direct rate.
    adj: HashMap<Currency, HashSet<Currency>>,

    /// (from, to) -> dated rates.
    rates: HashMap<(Currency, Currency), BTreeMap<NaiveDate, Decimal>>,
}

impl CurrencyConverter {
    pub fn new(exchange_rates: Vec<ExchangeRate>) -> Result<Self, FxError> {
        let mut converter = CurrencyConverter {
            adj: HashMap::new(),
            rates: HashMap::new(),
        };
        converter.add_rates(exchange_rates)?;
        Ok(converter)
    }

    /// Adds rates together with their inverses.
    pub fn add_rates(&mut self, rates: Vec<ExchangeRate>) -> Result<(), FxError> {
        for rate in rates {
            if rate.from_currency == rate.to_currency {
                continue;
            }
            if rate.rate <= Decimal::ZERO {
                return Err(FxError::InvalidRate(format!(
                    "{} on {} is {}",
                    rate.pair(),
                    rate.date,
                    rate.rate
                )));
            }

            let from = rate.from_currency;
            let to = rate.to_currency;

            self.rates
                .entry((from, to))
                .or_default()
                .insert(rate.date, rate.rate);
            self.adj.entry(from).or_default().insert(to);

            self.rates
                .entry((to, from))
                .or_default()
                .insert(rate.date, Decimal::ONE / rate.rate);
            self.adj.entry(to).or_default().insert(from);
        }
        Ok(())
    }

    /// Closest rate to `date` in either direction; ties prefer the past.
    fn get_direct_rate(&self, from: Currency, to: Currency, date: NaiveDate) -> Option<Decimal> {
        let history = self.rates.get(&(from, to))?;

        let prev = history.range(..=date).next_back();
        let next = history.range(date..).next();

        match (prev, next) {
            (Some((d1, r1)), Some((d2, r2))) => {
                if d1 == d2 {
                    return Some(*r1);
                }
                let dist_prev = (date - *d1).num_days().abs();
                let dist_next = (*d2 - date).num_days().abs();
                if dist_prev <= dist_next {
                    Some(*r1)
                } else {
                    Some(*r2)
                }
            }
            (Some((_, r)), None) => Some(*r),
            (None, Some((_, r))) => Some(*r),
            (None, None) => None,
        }
    }

    /// Converts an amount along the shortest known path (BFS).
    pub fn convert_amount(
        &self,
        amount: Decimal,
        from_currency: Currency,
        to_currency: Currency,
        date: NaiveDate,
    ) -> Result<Decimal, FxError> {
        if from_currency == to_currency {
            return Ok(amount);
        }

        let mut queue: VecDeque<(Currency, Decimal)> = VecDeque::new();
        let mut visited: HashSet<Currency> = HashSet::new();

        queue.push_back((from_currency, Decimal::ONE));
        visited.insert(from_currency);

        while let Some((current, current_rate)) = queue.pop_front() {
            if current == to_currency {
                return Ok(amount * current_rate);
            }

            if let Some(neighbors) = self.adj.get(&current) {
                for neighbor in neighbors {
                    if visited.contains(neighbor) {
                        continue;
                    }
                    if let Some(rate) = self.get_direct_rate(current, *neighbor, date) {
                        visited.insert(*neighbor);
                        queue.push_back((*neighbor, current_rate * rate));
                    }
                }
            }
        }

        Err(FxError::RateNotFound(format!(
            "No conversion path found for {} -> {} on or near {}",
            from_currency, to_currency, date
        )))
    }

    pub fn get_rate(
        &self,
        from_currency: Currency,
        to_currency: Currency,
        date: NaiveDate,
    ) -> Result<Decimal, FxError> {
        self.convert_amount(Decimal::ONE, from_currency, to_currency, date)
    }
}
