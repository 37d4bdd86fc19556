use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::market_data_errors::MarketDataError;
use super::market_data_model::Market;
use crate::fx::Currency;

/// Price and FX lookups for a valuation date.
#[async_trait]
pub trait MarketDataServiceTrait: Send + Sync {
    /// Price of one unit of `code`, in the market's native currency.
    async fn get_price(
        &self,
        market: Market,
        code: &str,
        date: NaiveDate,
    ) -> Result<Decimal, MarketDataError>;

    /// Units of `to` per one unit of `from`.
    async fn get_fx_rate(
        &self,
        from: Currency,
        to: Currency,
        date: NaiveDate,
    ) -> Result<Decimal, MarketDataError>;
}
