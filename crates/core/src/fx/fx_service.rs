use super::currency::{Currency, PIVOT_CURRENCY};
use super::fx_errors::FxError;
use super::fx_model::{ExchangeRate, RateSource};
use super::fx_traits::FxServiceTrait;
use crate::errors::Result;
use crate::market_data::{Market, MarketDataServiceTrait};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use futures::future::try_join_all;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

type RateKey = (Currency, Currency, NaiveDate);

/// Fetches FX rates through the market data service and caches them per
/// pair and date for the lifetime of the service.
pub struct FxService {
    market_data: Arc<dyn MarketDataServiceTrait>,
    cache: RwLock<HashMap<RateKey, ExchangeRate>>,
    today: fn() -> NaiveDate,
}

fn market_today() -> NaiveDate {
    Market::latest_local_date(Utc::now())
}

impl FxService {
    pub fn new(market_data: Arc<dyn MarketDataServiceTrait>) -> Self {
        Self {
            market_data,
            cache: RwLock::new(HashMap::new()),
            today: market_today,
        }
    }

    /// Replaces the source of "today" used to decide when a fallback applies.
    pub fn with_today(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    fn cached(&self, key: &RateKey) -> Result<Option<ExchangeRate>> {
        let cache = self
            .cache
            .read()
            .map_err(|e| FxError::CacheError(e.to_string()))?;
        Ok(cache.get(key).cloned())
    }

    fn store(&self, key: RateKey, rate: ExchangeRate) -> Result<()> {
        let mut cache = self
            .cache
            .write()
            .map_err(|e| FxError::CacheError(e.to_string()))?;
        cache.insert(key, rate);
        Ok(())
    }

    /// Provider rate for `date`; a past date without data falls back to the current rate.
    async fn fetch_rate(
        &self,
        from: Currency,
        to: Currency,
        date: NaiveDate,
    ) -> Result<ExchangeRate> {
        let today = (self.today)();

        let error = match self.market_data.get_fx_rate(from, to, date).await {
            Ok(rate) => return Ok(ExchangeRate::new(from, to, rate, date)),
            Err(e) => e,
        };

        if date >= today {
            log::error!("No {}/{} rate for {}: {}", from, to, date, error);
            return Err(FxError::RateNotFound(error.to_string()).into());
        }

        log::warn!(
            "No {}/{} rate for {} ({}), falling back to the latest rate",
            from,
            to,
            date,
            error
        );

        match self.market_data.get_fx_rate(from, to, today).await {
            Ok(rate) => {
                Ok(ExchangeRate::new(from, to, rate, date).with_source(RateSource::LatestFallback))
            }
            Err(e) => {
                log::error!("Latest {}/{} rate unavailable: {}", from, to, e);
                Err(FxError::RateNotFound(format!("{}/{} on {}: {}", from, to, date, e)).into())
            }
        }
    }
}

#[async_trait]
impl FxServiceTrait for FxService {
    async fn get_exchange_rate_for_date(
        &self,
        from_currency: Currency,
        to_currency: Currency,
        date: NaiveDate,
    ) -> Result<ExchangeRate> {
        if from_currency == to_currency {
            return Ok(ExchangeRate::new(
                from_currency,
                to_currency,
                Decimal::ONE,
                date,
            ));
        }

        let key = (from_currency, to_currency, date);
        if let Some(rate) = self.cached(&key)? {
            return Ok(rate);
        }

        let rate = self.fetch_rate(from_currency, to_currency, date).await?;
        if rate.rate <= Decimal::ZERO {
            return Err(FxError::InvalidRate(format!(
                "{} on {} is {}",
                rate.pair(),
                date,
                rate.rate
            ))
            .into());
        }

        self.store(key, rate.clone())?;
        Ok(rate)
    }

    async fn get_pivot_rates(&self, date: NaiveDate) -> Result<Vec<ExchangeRate>> {
        let requests = Currency::ALL
            .iter()
            .filter(|c| **c != PIVOT_CURRENCY)
            .map(|c| self.get_exchange_rate_for_date(*c, PIVOT_CURRENCY, date));

        try_join_all(requests).await
    }
}
