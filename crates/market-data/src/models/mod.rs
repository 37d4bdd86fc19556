//! Instrument identities, vendor notations and quotes.

mod instrument;
mod provider_params;
mod quote;
mod types;

pub use instrument::{InstrumentId, InstrumentKind};
pub use provider_params::ProviderInstrument;
pub use quote::{Quote, QuoteContext};
pub use types::{Currency, Mic, ProviderId, ProviderSymbol};
