//! Provider capability description.

use crate::models::{InstrumentId, InstrumentKind};

/// Describes what a market data provider can do.
///
/// Used by the registry to skip providers that can't serve a request.
#[derive(Clone, Debug)]
pub struct ProviderCapabilities {
    /// Instrument kinds this provider supports.
    pub instrument_kinds: &'static [InstrumentKind],

    /// Whether the provider can return a latest (intraday or last close) quote.
    pub supports_latest: bool,

    /// Whether the provider supports daily history for a date range.
    pub supports_historical: bool,
}

impl ProviderCapabilities {
    pub fn supports_instrument(&self, instrument: &InstrumentId) -> bool {
        self.instrument_kinds.contains(&instrument.kind())
    }
}
