//! Market data provider trait definitions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::MarketDataError;
use crate::models::{ProviderInstrument, Quote, QuoteContext};

use super::capabilities::ProviderCapabilities;

/// A quote source the registry can fall through.
///
/// Providers receive instruments already resolved into their own notation
/// and report failures as [`MarketDataError`] so the registry can decide
/// whether another provider is worth asking.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Stable id such as "YAHOO"; the resolver and priority overrides key on it.
    fn id(&self) -> &'static str;

    /// Lower runs first.
    fn priority(&self) -> u8 {
        10
    }

    fn capabilities(&self) -> ProviderCapabilities;

    /// Most recent quote. `context` keeps the canonical id and currency hint.
    async fn get_latest_quote(
        &self,
        context: &QuoteContext,
        instrument: ProviderInstrument,
    ) -> Result<Quote, MarketDataError>;

    /// Daily bars in `[start, end]`, oldest first.
    async fn get_historical_quotes(
        &self,
        context: &QuoteContext,
        instrument: ProviderInstrument,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Quote>, MarketDataError>;
}
