//! Quotes and FX rates for the asset tracker.
//!
//! A caller describes what it wants as an [`InstrumentId`] (exchange code
//! plus MIC, or a currency pair). The [`RulesResolver`] turns that into the
//! notation each vendor understands, and the [`ProviderRegistry`] asks
//! Yahoo Finance, Alpha Vantage and open.er-api in priority order until
//! one of them returns quotes that pass the [`QuoteValidator`].

pub mod errors;
pub mod models;
pub mod provider;
pub mod registry;
pub mod resolver;

pub use errors::{MarketDataError, RetryClass};

pub use models::{
    Currency, InstrumentId, InstrumentKind, Mic, ProviderId, ProviderInstrument, ProviderSymbol,
    Quote, QuoteContext,
};

pub use resolver::{normalize_hk_ticker, ExchangeMap, RulesResolver, SymbolResolver};

pub use provider::alpha_vantage::AlphaVantageProvider;
pub use provider::open_er_api::OpenErApiProvider;
pub use provider::yahoo::YahooProvider;
pub use provider::{MarketDataProvider, ProviderCapabilities};

pub use registry::{ProviderRegistry, QuoteValidator};
