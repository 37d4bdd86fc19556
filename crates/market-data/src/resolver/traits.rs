//! Resolution traits for the market data crate.

use crate::errors::MarketDataError;
use crate::models::{Currency, ProviderId, ProviderInstrument, QuoteContext};

/// Maps a canonical instrument to a provider's own notation.
pub trait SymbolResolver: Send + Sync {
    /// Resolve a provider-specific instrument.
    ///
    /// Returns `ResolutionFailed` when the provider has no notation for the
    /// instrument, which lets the registry move on to the next provider.
    fn resolve(
        &self,
        provider: &ProviderId,
        context: &QuoteContext,
    ) -> Result<ProviderInstrument, MarketDataError>;

    /// Trading currency of the instrument as quoted by the provider.
    fn get_currency(&self, provider: &ProviderId, context: &QuoteContext) -> Option<Currency>;
}
