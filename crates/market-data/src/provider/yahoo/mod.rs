//! Yahoo Finance provider.
//!
//! Covers every tracked listing and the FX pairs:
//! - Shanghai/Shenzhen/Beijing A-shares (`600519.SS`, `000001.SZ`)
//! - Hong Kong (`0700.HK`)
//! - US (`TSLA`)
//! - FX (`HKDUSD=X`)

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use time::OffsetDateTime;
use tracing::{debug, warn};
use yahoo_finance_api as yahoo;

use crate::errors::MarketDataError;
use crate::models::{InstrumentKind, ProviderInstrument, Quote, QuoteContext};
use crate::provider::{MarketDataProvider, ProviderCapabilities};

const PROVIDER_ID: &str = "YAHOO";

/// History window searched when the intraday chart is empty.
const LATEST_FALLBACK_DAYS: i64 = 7;

fn yahoo_symbol(instrument: &ProviderInstrument) -> String {
    match instrument {
        ProviderInstrument::EquitySymbol { symbol } | ProviderInstrument::FxSymbol { symbol } => {
            symbol.to_string()
        }
        ProviderInstrument::FxPair { from, to } => format!("{}{}=X", from, to),
    }
}

fn to_offset(instant: DateTime<Utc>) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(instant.timestamp())
        .unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

fn classify(symbol: &str, error: yahoo::YahooError) -> MarketDataError {
    match error {
        yahoo::YahooError::NoQuotes | yahoo::YahooError::NoResult => {
            MarketDataError::SymbolNotFound(symbol.to_string())
        }
        other => MarketDataError::ProviderError {
            provider: PROVIDER_ID.to_string(),
            message: other.to_string(),
        },
    }
}

/// Converts one Yahoo bar. Floats are read at their shortest decimal
/// form, so a 372.4 close becomes exactly 372.4. The close must be
/// representable; the other fields are kept when they are.
fn convert_bar(bar: &yahoo::Quote, currency: &str) -> Result<Quote, MarketDataError> {
    let invalid = |what: &str| MarketDataError::ValidationFailed {
        message: format!("Yahoo bar with bad {}: {:?}", what, bar),
    };

    let timestamp = Utc
        .timestamp_opt(bar.timestamp as i64, 0)
        .single()
        .ok_or_else(|| invalid("timestamp"))?;
    let close = Decimal::from_f64(bar.close).ok_or_else(|| invalid("close"))?;

    let mut quote = Quote::new(timestamp, close, currency.to_string(), PROVIDER_ID.to_string());
    quote.open = Decimal::from_f64(bar.open);
    quote.high = Decimal::from_f64(bar.high);
    quote.low = Decimal::from_f64(bar.low);
    quote.volume = Decimal::from_u64(bar.volume);
    Ok(quote)
}

/// Yahoo Finance market data provider.
pub struct YahooProvider {
    connector: yahoo::YahooConnector,
}

impl YahooProvider {
    pub fn new() -> Result<Self, MarketDataError> {
        let connector = yahoo::YahooConnector::new().map_err(|e| MarketDataError::ProviderError {
            provider: PROVIDER_ID.to_string(),
            message: format!("Yahoo connector unavailable: {}", e),
        })?;
        Ok(Self { connector })
    }

    async fn intraday_last(&self, symbol: &str, currency: &str) -> Result<Quote, MarketDataError> {
        let response = self
            .connector
            .get_latest_quotes(symbol, "1d")
            .await
            .map_err(|e| classify(symbol, e))?;
        let bar = response
            .last_quote()
            .map_err(|e| classify(symbol, e))?;
        convert_bar(&bar, currency)
    }

    async fn daily_history(
        &self,
        symbol: &str,
        currency: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Quote>, MarketDataError> {
        let response = self
            .connector
            .get_quote_history(symbol, to_offset(start), to_offset(end))
            .await
            .map_err(|e| classify(symbol, e))?;

        let bars = match response.quotes() {
            Ok(bars) => bars,
            Err(yahoo::YahooError::NoQuotes) => {
                warn!(
                    "Yahoo has no {} bars between {} and {}",
                    symbol,
                    start.date_naive(),
                    end.date_naive()
                );
                return Err(MarketDataError::NoDataForRange);
            }
            Err(e) => return Err(classify(symbol, e)),
        };

        let mut quotes: Vec<Quote> = bars
            .iter()
            .filter_map(|bar| {
                convert_bar(bar, currency)
                    .map_err(|e| warn!("Dropping {} bar: {}", symbol, e))
                    .ok()
            })
            .collect();
        if quotes.is_empty() {
            return Err(MarketDataError::NoDataForRange);
        }
        quotes.sort_by_key(|q| q.timestamp);
        Ok(quotes)
    }
}

#[async_trait]
impl MarketDataProvider for YahooProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        1
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            instrument_kinds: &[InstrumentKind::Equity, InstrumentKind::Fx],
            supports_latest: true,
            supports_historical: true,
        }
    }

    /// Intraday last trade, or the most recent daily close when the chart is empty.
    async fn get_latest_quote(
        &self,
        context: &QuoteContext,
        instrument: ProviderInstrument,
    ) -> Result<Quote, MarketDataError> {
        let symbol = yahoo_symbol(&instrument);
        let currency = context.currency_or_default();
        debug!("Yahoo latest quote for {}", symbol);

        match self.intraday_last(&symbol, &currency).await {
            Ok(quote) => Ok(quote),
            Err(e) => {
                debug!("Yahoo intraday failed for {} ({}), using daily bars", symbol, e);
                let end = Utc::now();
                let start = end - Duration::days(LATEST_FALLBACK_DAYS);
                self.daily_history(&symbol, &currency, start, end)
                    .await?
                    .pop()
                    .ok_or(MarketDataError::NoDataForRange)
            }
        }
    }

    async fn get_historical_quotes(
        &self,
        context: &QuoteContext,
        instrument: ProviderInstrument,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Quote>, MarketDataError> {
        let symbol = yahoo_symbol(&instrument);
        debug!(
            "Yahoo history for {} from {} to {}",
            symbol,
            start.date_naive(),
            end.date_naive()
        );
        self.daily_history(&symbol, &context.currency_or_default(), start, end)
            .await
    }
}
