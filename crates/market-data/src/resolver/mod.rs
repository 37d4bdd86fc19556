//! Symbol resolution for market data providers.
//!
//! Converts canonical instruments (ticker + MIC, or a currency pair) to
//! provider-specific notation:
//!
//! | Instrument | YAHOO | ALPHA_VANTAGE | OPEN_ER_API |
//! |------------|-------|---------------|-------------|
//! | 600519 @ XSHG | `600519.SS` | `600519.SHH` | - |
//! | 000001 @ XSHE | `000001.SZ` | `000001.SHZ` | - |
//! | 00700 @ XHKG | `0700.HK` | - | - |
//! | TSLA (no MIC) | `TSLA` | `TSLA` | - |
//! | HKD/USD | `HKDUSD=X` | FxPair | FxPair |
//!
//! A dash means resolution fails with `ResolutionFailed` and the registry
//! tries the next provider.

mod exchange_suffixes;
mod rules_resolver;
mod traits;

pub use exchange_suffixes::{normalize_hk_ticker, ExchangeMap, ExchangeSuffix, EXCHANGE_SUFFIXES};
pub use rules_resolver::RulesResolver;
pub use traits::SymbolResolver;
