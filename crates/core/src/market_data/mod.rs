//! Market data module - listing markets, price/FX lookups, and the adapter
//! over the provider registry.

mod market_data_errors;
mod market_data_model;
mod market_data_service;
mod market_data_traits;


pub use market_data_errors::MarketDataError;
pub use market_data_model::{Market, TradingSession};
pub use market_data_service::MarketDataService;
pub use market_data_traits::MarketDataServiceTrait;
