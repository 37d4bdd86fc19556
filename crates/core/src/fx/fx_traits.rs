use async_trait::async_trait;
use chrono::NaiveDate;

use super::currency::Currency;
use super::fx_model::ExchangeRate;
use crate::errors::Result;

/// Trait defining the contract for FX service operations.
#[async_trait]
pub trait FxServiceTrait: Send + Sync {
    /// Rate for one pair and date, with the provider-level fallback applied.
    async fn get_exchange_rate_for_date(
        &self,
        from_currency: Currency,
        to_currency: Currency,
        date: NaiveDate,
    ) -> Result<ExchangeRate>;

    /// Every non-pivot currency against the pivot for `date`.
    async fn get_pivot_rates(&self, date: NaiveDate) -> Result<Vec<ExchangeRate>>;
}
