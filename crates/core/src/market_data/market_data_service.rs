use std::borrow::Cow;
use std::sync::Arc;

use asset_tracker_market_data::{InstrumentId, ProviderRegistry, Quote, QuoteContext};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use log::{debug, warn};
use rust_decimal::Decimal;

use super::market_data_errors::MarketDataError;
use super::market_data_model::Market;
use super::market_data_traits::MarketDataServiceTrait;
use crate::constants::PRICE_LOOKBACK_DAYS;
use crate::fx::Currency;

/// Resolves prices and FX rates for a valuation date through the provider registry.
///
/// - a future date is never priced
/// - today during regular hours uses the latest quote
/// - anything else uses the last daily close on or before the date,
///   searched over [`PRICE_LOOKBACK_DAYS`]
pub struct MarketDataService {
    registry: Arc<ProviderRegistry>,
    now: fn() -> DateTime<Utc>,
}

impl MarketDataService {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self {
            registry,
            now: Utc::now,
        }
    }

    /// Replaces the wall clock, used to pin "today" and session state.
    pub fn with_clock(mut self, now: fn() -> DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// UTC bounds covering the lookback window ending on `date`.
    fn lookback_window(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = (date - Duration::days(PRICE_LOOKBACK_DAYS)).and_time(NaiveTime::MIN);
        let end = date
            .and_hms_opt(23, 59, 59)
            .unwrap_or_else(|| date.and_time(NaiveTime::MIN));
        (start.and_utc(), end.and_utc())
    }

    /// Close of the most recent bar dated on or before `date`.
    fn last_close_on_or_before(quotes: &[Quote], date: NaiveDate) -> Option<Decimal> {
        quotes
            .iter()
            .filter(|q| q.date() <= date)
            .max_by_key(|q| q.timestamp)
            .map(|q| q.close)
    }

    async fn historical_close(
        &self,
        context: &QuoteContext,
        date: NaiveDate,
    ) -> Result<Decimal, MarketDataError> {
        let (start, end) = Self::lookback_window(date);
        let quotes = self
            .registry
            .fetch_quotes(context, start, end)
            .await
            .map_err(|e| {
                MarketDataError::unavailable(context.instrument.to_string(), date, e.to_string())
            })?;

        Self::last_close_on_or_before(&quotes, date).ok_or_else(|| {
            MarketDataError::unavailable(
                context.instrument.to_string(),
                date,
                format!("no close within {} days", PRICE_LOOKBACK_DAYS),
            )
        })
    }

    async fn latest_or_historical(
        &self,
        context: &QuoteContext,
        date: NaiveDate,
    ) -> Result<Decimal, MarketDataError> {
        match self.registry.fetch_latest_quote(context).await {
            Ok(quote) => Ok(quote.close),
            Err(e) => {
                debug!(
                    "Latest quote failed for {}: {}, using the last close",
                    context.instrument, e
                );
                self.historical_close(context, date).await
            }
        }
    }

    async fn resolve_close(
        &self,
        context: QuoteContext,
        date: NaiveDate,
        today: NaiveDate,
        session_open: bool,
    ) -> Result<Decimal, MarketDataError> {
        if date > today {
            return Err(MarketDataError::unavailable(
                context.instrument.to_string(),
                date,
                format!("date is after today ({})", today),
            ));
        }

        if date == today && session_open {
            self.latest_or_historical(&context, date).await
        } else {
            self.historical_close(&context, date).await
        }
    }
}

#[async_trait]
impl MarketDataServiceTrait for MarketDataService {
    async fn get_price(
        &self,
        market: Market,
        code: &str,
        date: NaiveDate,
    ) -> Result<Decimal, MarketDataError> {
        let instrument = market
            .instrument_id(code)
            .map_err(|e| MarketDataError::unavailable(code, date, e.to_string()))?;
        let currency = market.native_currency();
        let context = QuoteContext::new(instrument, Some(Cow::Borrowed(currency.as_str())));

        let now = (self.now)();
        let today = market.local_date(now);
        let session_open = market.is_session_open(now);

        let price = self.resolve_close(context, date, today, session_open).await;
        match &price {
            Ok(value) => debug!("{} {} on {}: {}", market, code, date, value),
            Err(e) => warn!("{}", e),
        }
        price
    }

    async fn get_fx_rate(
        &self,
        from: Currency,
        to: Currency,
        date: NaiveDate,
    ) -> Result<Decimal, MarketDataError> {
        if from == to {
            return Ok(Decimal::ONE);
        }

        let instrument = InstrumentId::fx(from.as_str(), to.as_str());
        let context = QuoteContext::new(instrument, Some(Cow::Borrowed(to.as_str())));

        let today = Market::latest_local_date((self.now)());

        // FX has no session; today always asks for the latest rate.
        self.resolve_close(context, date, today, true).await
    }
}
