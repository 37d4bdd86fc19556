//! Rules resolver - deterministic MIC->suffix resolution.

use std::sync::Arc;

use crate::errors::MarketDataError;
use crate::models::{Currency, InstrumentId, Mic, ProviderId, ProviderInstrument, QuoteContext};

use super::exchange_suffixes::{normalize_hk_ticker, ExchangeMap};
use super::traits::SymbolResolver;

/// Resolves provider instruments from deterministic rules.
///
/// - Securities: exchange map suffixes (600519.SS, 0700.HK, 600519.SHH)
/// - FX: provider conventions (HKDUSD=X for Yahoo, from/to pairs elsewhere)
pub struct RulesResolver {
    exchange_map: ExchangeMap,
}

impl RulesResolver {
    pub fn new() -> Self {
        Self {
            exchange_map: ExchangeMap::new(),
        }
    }

    fn resolve_equity(
        &self,
        ticker: &Arc<str>,
        mic: &Option<Mic>,
        provider: &ProviderId,
    ) -> Option<ProviderInstrument> {
        let symbol = match mic {
            Some(mic) => {
                let suffix = self.exchange_map.get_suffix(mic, provider)?;
                let local = if mic == "XHKG" {
                    normalize_hk_ticker(ticker)
                } else {
                    ticker.to_string()
                };
                Arc::from(format!("{}{}", local, suffix))
            }
            // No MIC = US listing, no suffix needed
            None => match provider.as_ref() {
                "YAHOO" | "ALPHA_VANTAGE" => ticker.clone(),
                _ => return None,
            },
        };

        Some(ProviderInstrument::EquitySymbol { symbol })
    }

    fn resolve_fx(
        &self,
        base: &Currency,
        quote: &Currency,
        provider: &ProviderId,
    ) -> Option<ProviderInstrument> {
        match provider.as_ref() {
            "YAHOO" => Some(ProviderInstrument::FxSymbol {
                symbol: Arc::from(format!("{}{}=X", base, quote)),
            }),
            "ALPHA_VANTAGE" | "OPEN_ER_API" => Some(ProviderInstrument::FxPair {
                from: base.clone(),
                to: quote.clone(),
            }),
            _ => None,
        }
    }
}

impl Default for RulesResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolResolver for RulesResolver {
    fn resolve(
        &self,
        provider: &ProviderId,
        context: &QuoteContext,
    ) -> Result<ProviderInstrument, MarketDataError> {
        let resolved = match &context.instrument {
            InstrumentId::Equity { ticker, mic } => self.resolve_equity(ticker, mic, provider),
            InstrumentId::Fx { base, quote } => self.resolve_fx(base, quote, provider),
        };

        resolved.ok_or_else(|| MarketDataError::ResolutionFailed {
            provider: provider.to_string(),
        })
    }

    fn get_currency(&self, provider: &ProviderId, context: &QuoteContext) -> Option<Currency> {
        match &context.instrument {
            InstrumentId::Equity { mic: Some(mic), .. } => self
                .exchange_map
                .get_currency(mic, provider)
                .map(Currency::Borrowed),
            InstrumentId::Equity { mic: None, .. } => Some(Currency::Borrowed("USD")),
            InstrumentId::Fx { quote, .. } => Some(quote.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_equity_context(ticker: &str, mic: Option<&'static str>) -> QuoteContext {
        QuoteContext::new(InstrumentId::equity(ticker, mic), None)
    }

    fn make_fx_context(base: &'static str, quote: &'static str) -> QuoteContext {
        QuoteContext::new(InstrumentId::fx(base, quote), None)
    }

    fn symbol_of(instrument: ProviderInstrument) -> String {
        match instrument {
            ProviderInstrument::EquitySymbol { symbol } | ProviderInstrument::FxSymbol { symbol } => {
                symbol.to_string()
            }
            other => panic!("Expected a symbol, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_us_equity_yahoo() {
        let resolver = RulesResolver::new();
        let resolved = resolver
            .resolve(&"YAHOO".into(), &make_equity_context("TSLA", None))
            .unwrap();
        assert_eq!(symbol_of(resolved), "TSLA");
    }

    #[test]
    fn test_resolve_shanghai_equity() {
        let resolver = RulesResolver::new();
        let context = make_equity_context("600519", Some("XSHG"));

        let yahoo = resolver.resolve(&"YAHOO".into(), &context).unwrap();
        assert_eq!(symbol_of(yahoo), "600519.SS");

        let av = resolver.resolve(&"ALPHA_VANTAGE".into(), &context).unwrap();
        assert_eq!(symbol_of(av), "600519.SHH");
    }

    #[test]
    fn test_resolve_shenzhen_equity_yahoo() {
        let resolver = RulesResolver::new();
        let resolved = resolver
            .resolve(&"YAHOO".into(), &make_equity_context("000001", Some("XSHE")))
            .unwrap();
        assert_eq!(symbol_of(resolved), "000001.SZ");
    }

    #[test]
    fn test_resolve_hk_equity_yahoo_normalizes_code() {
        let resolver = RulesResolver::new();
        let resolved = resolver
            .resolve(&"YAHOO".into(), &make_equity_context("00700", Some("XHKG")))
            .unwrap();
        assert_eq!(symbol_of(resolved), "0700.HK");
    }

    #[test]
    fn test_resolve_hk_equity_alpha_vantage_fails() {
        let resolver = RulesResolver::new();
        let err = resolver
            .resolve(
                &"ALPHA_VANTAGE".into(),
                &make_equity_context("00700", Some("XHKG")),
            )
            .unwrap_err();
        assert!(matches!(err, MarketDataError::ResolutionFailed { .. }));
    }

    #[test]
    fn test_resolve_fx() {
        let resolver = RulesResolver::new();
        let context = make_fx_context("HKD", "USD");

        let yahoo = resolver.resolve(&"YAHOO".into(), &context).unwrap();
        assert_eq!(symbol_of(yahoo), "HKDUSD=X");

        match resolver.resolve(&"OPEN_ER_API".into(), &context).unwrap() {
            ProviderInstrument::FxPair { from, to } => {
                assert_eq!(from.as_ref(), "HKD");
                assert_eq!(to.as_ref(), "USD");
            }
            other => panic!("Expected FxPair, got {:?}", other),
        }
    }

    #[test]
    fn test_equity_not_resolved_for_fx_only_provider() {
        let resolver = RulesResolver::new();
        let err = resolver
            .resolve(&"OPEN_ER_API".into(), &make_equity_context("TSLA", None))
            .unwrap_err();
        assert!(matches!(err, MarketDataError::ResolutionFailed { .. }));
    }

    #[test]
    fn test_get_currency() {
        let resolver = RulesResolver::new();
        let currency =
            resolver.get_currency(&"YAHOO".into(), &make_equity_context("00700", Some("XHKG")));
        assert_eq!(currency.as_deref(), Some("HKD"));

        let currency = resolver.get_currency(&"YAHOO".into(), &make_equity_context("NVDA", None));
        assert_eq!(currency.as_deref(), Some("USD"));

        let currency = resolver.get_currency(&"YAHOO".into(), &make_fx_context("CNY", "USD"));
        assert_eq!(currency.as_deref(), Some("USD"));
    }
}
