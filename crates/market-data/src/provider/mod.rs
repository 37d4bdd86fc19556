//! Market data provider abstractions and implementations.
//!
//! - The `MarketDataProvider` trait that all providers implement
//! - Provider capabilities
//! - Concrete providers: Yahoo Finance, Alpha Vantage, Open Exchange Rate API
//!
//! Providers receive pre-resolved `ProviderInstrument` parameters. The
//! mapping from canonical `InstrumentId` to provider notation happens in
//! the resolver module, not in the providers themselves.

mod capabilities;
mod traits;

pub mod alpha_vantage;
pub mod open_er_api;
pub mod yahoo;

pub use capabilities::ProviderCapabilities;
pub use traits::MarketDataProvider;
