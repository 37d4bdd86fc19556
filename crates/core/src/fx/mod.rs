//! FX module - supported currencies, rate fetching, and path-based conversion.

pub mod currency;
pub mod currency_converter;
mod fx_errors;
mod fx_model;
mod fx_service;
mod fx_traits;


pub use currency::{Currency, PIVOT_CURRENCY};
pub use currency_converter::CurrencyConverter;
pub use fx_errors::FxError;
pub use fx_model::{ExchangeRate, RateSource};
pub use fx_service::FxService;
pub use fx_traits::FxServiceTrait;
