//! Picks providers for an instrument and falls through them until one
//! returns usable quotes.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, warn};

use super::QuoteValidator;
use crate::errors::{MarketDataError, RetryClass};
use crate::models::{ProviderId, ProviderInstrument, Quote, QuoteContext};
use crate::provider::{MarketDataProvider, ProviderCapabilities};
use crate::resolver::SymbolResolver;

/// What a caller wants from the chain.
#[derive(Debug, Clone, Copy)]
enum QuoteRequest {
    Latest,
    Daily {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl QuoteRequest {
    fn served_by(self, caps: &ProviderCapabilities) -> bool {
        match self {
            QuoteRequest::Latest => caps.supports_latest,
            QuoteRequest::Daily { .. } => caps.supports_historical,
        }
    }

    async fn send(
        self,
        provider: &dyn MarketDataProvider,
        context: &QuoteContext,
        instrument: ProviderInstrument,
    ) -> Result<Vec<Quote>, MarketDataError> {
        match self {
            QuoteRequest::Latest => provider
                .get_latest_quote(context, instrument)
                .await
                .map(|quote| vec![quote]),
            QuoteRequest::Daily { start, end } => {
                provider
                    .get_historical_quotes(context, instrument, start, end)
                    .await
            }
        }
    }
}

/// Ordered set of providers behind one symbol resolver.
///
/// Order is the configured priority for a provider id when there is one,
/// otherwise the provider's own `priority()`. Lower goes first.
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn MarketDataProvider>>,
    resolver: Arc<dyn SymbolResolver>,
    validator: QuoteValidator,
    custom_priorities: HashMap<String, i32>,
}

impl ProviderRegistry {
    pub fn new(
        providers: Vec<Arc<dyn MarketDataProvider>>,
        resolver: Arc<dyn SymbolResolver>,
    ) -> Self {
        Self::with_priorities(providers, resolver, HashMap::new())
    }

    pub fn with_priorities(
        providers: Vec<Arc<dyn MarketDataProvider>>,
        resolver: Arc<dyn SymbolResolver>,
        custom_priorities: HashMap<String, i32>,
    ) -> Self {
        Self {
            providers,
            resolver,
            validator: QuoteValidator::new(),
            custom_priorities,
        }
    }

    /// Daily quotes between `start` and `end`, oldest first.
    pub async fn fetch_quotes(
        &self,
        context: &QuoteContext,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Quote>, MarketDataError> {
        self.run_chain(context, QuoteRequest::Daily { start, end })
            .await
    }

    pub async fn fetch_latest_quote(
        &self,
        context: &QuoteContext,
    ) -> Result<Quote, MarketDataError> {
        self.run_chain(context, QuoteRequest::Latest)
            .await?
            .pop()
            .ok_or(MarketDataError::NoDataForRange)
    }

    pub fn providers(&self) -> &[Arc<dyn MarketDataProvider>] {
        &self.providers
    }

    /// Asks each eligible provider in turn. A provider is skipped when the
    /// resolver has no notation for it, when none of its quotes validate,
    /// or when its error allows another provider to be tried. A terminal
    /// error ends the chain at once.
    async fn run_chain(
        &self,
        context: &QuoteContext,
        request: QuoteRequest,
    ) -> Result<Vec<Quote>, MarketDataError> {
        let candidates = self.ordered_providers(context, request);
        if candidates.is_empty() {
            warn!(
                "No provider serves {:?} for {}",
                request, context.instrument
            );
            return Err(MarketDataError::NoProvidersAvailable);
        }

        let mut last_error = None;
        for provider in candidates {
            let provider_id: ProviderId = Cow::Borrowed(provider.id());

            let instrument = match self.resolver.resolve(&provider_id, context) {
                Ok(instrument) => instrument,
                Err(e) => {
                    debug!("'{}' cannot quote {}: {}", provider_id, context.instrument, e);
                    last_error = Some(e);
                    continue;
                }
            };

            debug!("{} via '{}' as {:?}", context.instrument, provider_id, instrument);
            let error = match request.send(&**provider, context, instrument).await {
                Ok(quotes) => {
                    let received = quotes.len();
                    let valid = self.validator.retain_valid(quotes);
                    if !valid.is_empty() {
                        return Ok(valid);
                    }
                    warn!("'{}' returned {} quotes, none usable", provider_id, received);
                    MarketDataError::NoDataForRange
                }
                Err(e) => e,
            };

            match error.retry_class() {
                RetryClass::Never => {
                    debug!("'{}' failed for good: {}", provider_id, error);
                    return Err(error);
                }
                RetryClass::WithBackoff => {
                    warn!("'{}' throttled or slow: {}", provider_id, error)
                }
                RetryClass::NextProvider => debug!("'{}' failed: {}", provider_id, error),
            }
            last_error = Some(error);
        }

        Err(last_error.unwrap_or(MarketDataError::AllProvidersFailed))
    }

    fn ordered_providers(
        &self,
        context: &QuoteContext,
        request: QuoteRequest,
    ) -> Vec<&Arc<dyn MarketDataProvider>> {
        let mut eligible: Vec<_> = self
            .providers
            .iter()
            .filter(|p| {
                let caps = p.capabilities();
                caps.supports_instrument(&context.instrument) && request.served_by(&caps)
            })
            .collect();

        eligible.sort_by_key(|p| {
            self.custom_priorities
                .get(p.id())
                .copied()
                .unwrap_or(i32::from(p.priority()))
        });
        eligible
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Currency, InstrumentId, InstrumentKind};
    use crate::resolver::RulesResolver;
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Copy)]
    enum Behavior {
        Succeed(Decimal),
        ProviderError,
        RateLimited,
        Invalid,
    }

    struct MockProvider {
        id: &'static str,
        priority: u8,
        kinds: &'static [InstrumentKind],
        historical: bool,
        behavior: Behavior,
        call_count: AtomicUsize,
    }

    impl MockProvider {
        fn new(id: &'static str, priority: u8, behavior: Behavior) -> Self {
            Self {
                id,
                priority,
                kinds: &[InstrumentKind::Equity, InstrumentKind::Fx],
                historical: true,
                behavior,
                call_count: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }

        fn respond(&self) -> Result<Quote, MarketDataError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                Behavior::Succeed(close) => Ok(Quote::new(
                    Utc.with_ymd_and_hms(2025, 3, 3, 0, 0, 0).unwrap(),
                    close,
                    "USD".to_string(),
                    self.id.to_string(),
                )),
                Behavior::Invalid => Ok(Quote::new(
                    Utc.with_ymd_and_hms(2025, 3, 3, 0, 0, 0).unwrap(),
                    dec!(-1),
                    "USD".to_string(),
                    self.id.to_string(),
                )),
                Behavior::ProviderError => Err(MarketDataError::ProviderError {
                    provider: self.id.to_string(),
                    message: "Mock failure".to_string(),
                }),
                Behavior::RateLimited => Err(MarketDataError::RateLimited {
                    provider: self.id.to_string(),
                }),
            }
        }
    }

    #[async_trait::async_trait]
    impl MarketDataProvider for MockProvider {
        fn id(&self) -> &'static str {
            self.id
        }

        fn priority(&self) -> u8 {
            self.priority
        }

        fn capabilities(&self) -> ProviderCapabilities {
            ProviderCapabilities {
                instrument_kinds: self.kinds,
                supports_latest: true,
                supports_historical: self.historical,
            }
        }

        async fn get_latest_quote(
            &self,
            _context: &QuoteContext,
            _instrument: ProviderInstrument,
        ) -> Result<Quote, MarketDataError> {
            self.respond()
        }

        async fn get_historical_quotes(
            &self,
            _context: &QuoteContext,
            _instrument: ProviderInstrument,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> Result<Vec<Quote>, MarketDataError> {
            self.respond().map(|q| vec![q])
        }
    }

    /// Resolves everything for every provider.
    struct PermissiveResolver;

    impl SymbolResolver for PermissiveResolver {
        fn resolve(
            &self,
            _provider: &ProviderId,
            _context: &QuoteContext,
        ) -> Result<ProviderInstrument, MarketDataError> {
            Ok(ProviderInstrument::EquitySymbol {
                symbol: Arc::from("TEST"),
            })
        }

        fn get_currency(
            &self,
            _provider: &ProviderId,
            _context: &QuoteContext,
        ) -> Option<Currency> {
            Some(Cow::Borrowed("USD"))
        }
    }

    fn equity_context() -> QuoteContext {
        QuoteContext::new(InstrumentId::equity("TSLA", None), Some("USD".into()))
    }

    fn range() -> (DateTime<Utc>, DateTime<Utc>) {
        (
            Utc.with_ymd_and_hms(2025, 2, 21, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 3, 23, 59, 59).unwrap(),
        )
    }

    fn daily() -> QuoteRequest {
        let (start, end) = range();
        QuoteRequest::Daily { start, end }
    }

    #[test]
    fn test_provider_ordering_by_priority() {
        let providers: Vec<Arc<dyn MarketDataProvider>> = vec![
            Arc::new(MockProvider::new("LOW_PRIORITY", 20, Behavior::Succeed(dec!(1)))),
            Arc::new(MockProvider::new("HIGH_PRIORITY", 5, Behavior::Succeed(dec!(1)))),
            Arc::new(MockProvider::new("MED_PRIORITY", 10, Behavior::Succeed(dec!(1)))),
        ];
        let registry = ProviderRegistry::new(providers, Arc::new(PermissiveResolver));

        let ordered = registry.ordered_providers(&equity_context(), daily());

        assert_eq!(ordered[0].id(), "HIGH_PRIORITY");
        assert_eq!(ordered[1].id(), "MED_PRIORITY");
        assert_eq!(ordered[2].id(), "LOW_PRIORITY");
    }

    #[test]
    fn test_custom_priorities_override_defaults() {
        let providers: Vec<Arc<dyn MarketDataProvider>> = vec![
            Arc::new(MockProvider::new("PROVIDER_A", 1, Behavior::Succeed(dec!(1)))),
            Arc::new(MockProvider::new("PROVIDER_B", 2, Behavior::Succeed(dec!(1)))),
        ];
        let mut custom = HashMap::new();
        custom.insert("PROVIDER_B".to_string(), 0);
        let registry =
            ProviderRegistry::with_priorities(providers, Arc::new(PermissiveResolver), custom);

        let ordered = registry.ordered_providers(&equity_context(), QuoteRequest::Latest);
        assert_eq!(ordered[0].id(), "PROVIDER_B");
        assert_eq!(ordered[1].id(), "PROVIDER_A");
    }

    #[test]
    fn test_filter_by_instrument_kind_and_capability() {
        let mut fx_only = MockProvider::new("FX_ONLY", 1, Behavior::Succeed(dec!(1)));
        fx_only.kinds = &[InstrumentKind::Fx];
        fx_only.historical = false;

        let providers: Vec<Arc<dyn MarketDataProvider>> = vec![
            Arc::new(fx_only),
            Arc::new(MockProvider::new("BOTH", 2, Behavior::Succeed(dec!(1)))),
        ];
        let registry = ProviderRegistry::new(providers, Arc::new(PermissiveResolver));

        let ordered = registry.ordered_providers(&equity_context(), QuoteRequest::Latest);
        assert_eq!(ordered.len(), 1);
        assert_eq!(ordered[0].id(), "BOTH");

        let fx_context = QuoteContext::new(InstrumentId::fx("HKD", "USD"), None);
        assert_eq!(registry.ordered_providers(&fx_context, QuoteRequest::Latest).len(), 2);
        assert_eq!(registry.ordered_providers(&fx_context, daily()).len(), 1);
    }

    #[tokio::test]
    async fn test_failover_to_next_provider() {
        let failing = Arc::new(MockProvider::new("FAILING", 1, Behavior::ProviderError));
        let throttled = Arc::new(MockProvider::new("THROTTLED", 2, Behavior::RateLimited));
        let working = Arc::new(MockProvider::new("WORKING", 3, Behavior::Succeed(dec!(284.65))));
        let providers: Vec<Arc<dyn MarketDataProvider>> =
            vec![failing.clone(), throttled.clone(), working.clone()];
        let registry = ProviderRegistry::new(providers, Arc::new(PermissiveResolver));

        let quote = registry.fetch_latest_quote(&equity_context()).await.unwrap();

        assert_eq!(quote.close, dec!(284.65));
        assert_eq!(quote.source, "WORKING");
        assert_eq!(failing.calls(), 1);
        assert_eq!(throttled.calls(), 1);
        assert_eq!(working.calls(), 1);
    }

    #[tokio::test]
    async fn test_returns_last_error_when_all_fail() {
        let providers: Vec<Arc<dyn MarketDataProvider>> = vec![
            Arc::new(MockProvider::new("A", 1, Behavior::ProviderError)),
            Arc::new(MockProvider::new("B", 2, Behavior::RateLimited)),
        ];
        let registry = ProviderRegistry::new(providers, Arc::new(PermissiveResolver));
        let (start, end) = range();

        let err = registry
            .fetch_quotes(&equity_context(), start, end)
            .await
            .unwrap_err();
        assert!(matches!(err, MarketDataError::RateLimited { .. }));
    }

    #[tokio::test]
    async fn test_invalid_quotes_fall_through() {
        let providers: Vec<Arc<dyn MarketDataProvider>> = vec![
            Arc::new(MockProvider::new("BAD", 1, Behavior::Invalid)),
            Arc::new(MockProvider::new("GOOD", 2, Behavior::Succeed(dec!(10)))),
        ];
        let registry = ProviderRegistry::new(providers, Arc::new(PermissiveResolver));
        let (start, end) = range();

        let quotes = registry
            .fetch_quotes(&equity_context(), start, end)
            .await
            .unwrap();
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].source, "GOOD");
    }

    #[tokio::test]
    async fn test_no_providers_available() {
        let registry = ProviderRegistry::new(vec![], Arc::new(PermissiveResolver));
        let err = registry
            .fetch_latest_quote(&equity_context())
            .await
            .unwrap_err();
        assert!(matches!(err, MarketDataError::NoProvidersAvailable));
    }

    #[tokio::test]
    async fn test_unresolvable_provider_is_skipped() {
        // The rules resolver has no HKEX notation for Alpha Vantage
        let av = Arc::new(MockProvider::new("ALPHA_VANTAGE", 1, Behavior::Succeed(dec!(1))));
        let yahoo = Arc::new(MockProvider::new("YAHOO", 2, Behavior::Succeed(dec!(372.5))));
        let providers: Vec<Arc<dyn MarketDataProvider>> = vec![av.clone(), yahoo.clone()];
        let registry = ProviderRegistry::new(providers, Arc::new(RulesResolver::new()));

        let context = QuoteContext::new(
            InstrumentId::equity("00700", Some("XHKG")),
            Some("HKD".into()),
        );
        let quote = registry.fetch_latest_quote(&context).await.unwrap();

        assert_eq!(quote.close, dec!(372.5));
        assert_eq!(av.calls(), 0);
        assert_eq!(yahoo.calls(), 1);
    }
}
