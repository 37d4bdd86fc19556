//! Alpha Vantage provider.
//!
//! Daily closes for US and mainland listings (`TIME_SERIES_DAILY`) and for
//! currency pairs (`FX_DAILY`). Requires an API key; the free tier allows a
//! handful of calls per minute, so the registry ranks it behind Yahoo.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, warn};
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::errors::MarketDataError;
use crate::models::{InstrumentKind, ProviderInstrument, Quote, QuoteContext};
use crate::provider::{MarketDataProvider, ProviderCapabilities};

const BASE_URL: &str = "https://www.alphavantage.co/query";
const PROVIDER_ID: &str = "ALPHA_VANTAGE";

/// Phrases Alpha Vantage uses in `Note`/`Information` when a quota is hit.
const QUOTA_MARKERS: [&str; 3] = ["API call frequency", "rate limit", "requests per day"];

fn provider_error(message: impl Into<String>) -> MarketDataError {
    MarketDataError::ProviderError {
        provider: PROVIDER_ID.to_string(),
        message: message.into(),
    }
}

/// What to ask the API for.
#[derive(Debug, Clone, PartialEq)]
enum SeriesRequest {
    Equity { symbol: String, currency: String },
    Fx { from: String, to: String },
}

impl SeriesRequest {
    fn from_instrument(
        context: &QuoteContext,
        instrument: &ProviderInstrument,
    ) -> Result<Self, MarketDataError> {
        match instrument {
            ProviderInstrument::EquitySymbol { symbol } => Ok(SeriesRequest::Equity {
                symbol: symbol.to_string(),
                currency: context.currency_or_default(),
            }),
            ProviderInstrument::FxPair { from, to } => Ok(SeriesRequest::Fx {
                from: from.to_string(),
                to: to.to_string(),
            }),
            // "HKDUSD" style pairs
            ProviderInstrument::FxSymbol { symbol } if symbol.len() == 6 && symbol.is_ascii() => {
                Ok(SeriesRequest::Fx {
                    from: symbol[..3].to_string(),
                    to: symbol[3..].to_string(),
                })
            }
            ProviderInstrument::FxSymbol { symbol } => Err(MarketDataError::UnsupportedAssetType(
                format!("Cannot split FX symbol {}", symbol),
            )),
        }
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        match self {
            // "full" output is premium-only for equities
            SeriesRequest::Equity { symbol, .. } => vec![
                ("function", "TIME_SERIES_DAILY".to_string()),
                ("symbol", symbol.clone()),
                ("outputsize", "compact".to_string()),
            ],
            SeriesRequest::Fx { from, to } => vec![
                ("function", "FX_DAILY".to_string()),
                ("from_symbol", from.clone()),
                ("to_symbol", to.clone()),
                ("outputsize", "full".to_string()),
            ],
        }
    }

    fn quote_currency(&self) -> &str {
        match self {
            SeriesRequest::Equity { currency, .. } => currency,
            SeriesRequest::Fx { to, .. } => to,
        }
    }

    fn label(&self) -> String {
        match self {
            SeriesRequest::Equity { symbol, .. } => symbol.clone(),
            SeriesRequest::Fx { from, to } => format!("{}/{}", from, to),
        }
    }
}

/// Shared shape of the equity and FX daily payloads.
#[derive(Debug, Deserialize)]
struct SeriesPayload {
    #[serde(rename = "Time Series (Daily)", alias = "Time Series FX (Daily)")]
    series: Option<BTreeMap<NaiveDate, DailyBar>>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DailyBar {
    #[serde(rename = "1. open")]
    open: Option<String>,
    #[serde(rename = "2. high")]
    high: Option<String>,
    #[serde(rename = "3. low")]
    low: Option<String>,
    #[serde(rename = "4. close")]
    close: String,
    #[serde(rename = "5. volume")]
    volume: Option<String>,
}

fn decimal(raw: Option<&str>) -> Option<Decimal> {
    raw.and_then(|s| s.trim().parse().ok())
}

impl SeriesPayload {
    fn check(&self) -> Result<(), MarketDataError> {
        if let Some(message) = &self.error_message {
            return Err(if message.contains("Invalid API call") || message.contains("not found") {
                MarketDataError::SymbolNotFound(message.clone())
            } else {
                provider_error(message.clone())
            });
        }

        for notice in [&self.note, &self.information].into_iter().flatten() {
            if QUOTA_MARKERS.iter().any(|m| notice.contains(m)) {
                return Err(MarketDataError::RateLimited {
                    provider: PROVIDER_ID.to_string(),
                });
            }
            warn!("Alpha Vantage notice: {}", notice);
        }
        Ok(())
    }

    /// Bars in ascending date order; bars with an unreadable close are skipped.
    fn into_quotes(self, request: &SeriesRequest) -> Result<Vec<Quote>, MarketDataError> {
        self.check()?;
        let series = self.series.ok_or_else(|| {
            MarketDataError::SymbolNotFound(format!("No series for {}", request.label()))
        })?;

        Ok(series
            .into_iter()
            .filter_map(|(date, bar)| {
                let close = decimal(Some(bar.close.as_str()))?;
                let timestamp = date.and_hms_opt(0, 0, 0)?.and_utc();
                let mut quote = Quote::new(
                    timestamp,
                    close,
                    request.quote_currency().to_string(),
                    PROVIDER_ID.to_string(),
                );
                quote.open = decimal(bar.open.as_deref());
                quote.high = decimal(bar.high.as_deref());
                quote.low = decimal(bar.low.as_deref());
                quote.volume = decimal(bar.volume.as_deref());
                Some(quote)
            })
            .collect())
    }
}

fn parse_series(text: &str, request: &SeriesRequest) -> Result<Vec<Quote>, MarketDataError> {
    let payload: SeriesPayload = serde_json::from_str(text)
        .map_err(|e| provider_error(format!("Unreadable response: {}", e)))?;
    payload.into_quotes(request)
}

/// Alpha Vantage market data provider.
pub struct AlphaVantageProvider {
    client: Client,
    api_key: String,
}

impl AlphaVantageProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_timeout(api_key, Duration::from_secs(30))
    }

    pub fn with_timeout(api_key: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, api_key }
    }

    async fn fetch_series(&self, request: &SeriesRequest) -> Result<Vec<Quote>, MarketDataError> {
        let mut params = request.params();
        params.push(("apikey", self.api_key.clone()));
        let url = reqwest::Url::parse_with_params(BASE_URL, &params)
            .map_err(|e| provider_error(format!("Bad request URL: {}", e)))?;

        debug!(
            "Alpha Vantage request: {}",
            url.as_str().replace(&self.api_key, "***")
        );

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                MarketDataError::Timeout {
                    provider: PROVIDER_ID.to_string(),
                }
            } else {
                provider_error(e.to_string())
            }
        })?;

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(MarketDataError::RateLimited {
                    provider: PROVIDER_ID.to_string(),
                })
            }
            status if !status.is_success() => {
                return Err(provider_error(format!("HTTP {}", status)))
            }
            _ => {}
        }

        let text = response
            .text()
            .await
            .map_err(|e| provider_error(e.to_string()))?;
        let quotes = parse_series(&text, request)?;
        debug!("Alpha Vantage: {} bars for {}", quotes.len(), request.label());
        Ok(quotes)
    }
}

#[async_trait]
impl MarketDataProvider for AlphaVantageProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        3
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            instrument_kinds: &[InstrumentKind::Equity, InstrumentKind::Fx],
            supports_latest: true,
            supports_historical: true,
        }
    }

    /// Latest daily close; the API has no intraday quote on the free tier.
    async fn get_latest_quote(
        &self,
        context: &QuoteContext,
        instrument: ProviderInstrument,
    ) -> Result<Quote, MarketDataError> {
        let request = SeriesRequest::from_instrument(context, &instrument)?;
        self.fetch_series(&request)
            .await?
            .pop()
            .ok_or(MarketDataError::NoDataForRange)
    }

    async fn get_historical_quotes(
        &self,
        context: &QuoteContext,
        instrument: ProviderInstrument,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Quote>, MarketDataError> {
        let request = SeriesRequest::from_instrument(context, &instrument)?;
        let quotes: Vec<Quote> = self
            .fetch_series(&request)
            .await?
            .into_iter()
            .filter(|q| q.timestamp >= start && q.timestamp <= end)
            .collect();

        if quotes.is_empty() {
            return Err(MarketDataError::NoDataForRange);
        }
        Ok(quotes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InstrumentId;
    use rust_decimal_macros::dec;
    use std::borrow::Cow;
    use std::sync::Arc;

    fn equity(symbol: &str) -> SeriesRequest {
        SeriesRequest::Equity {
            symbol: symbol.to_string(),
            currency: "USD".to_string(),
        }
    }

    fn fx(from: &str, to: &str) -> SeriesRequest {
        SeriesRequest::Fx {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    #[test]
    fn test_provider_metadata() {
        let provider = AlphaVantageProvider::new("test_key".to_string());
        assert_eq!(provider.id(), "ALPHA_VANTAGE");
        assert_eq!(provider.priority(), 3);
        let caps = provider.capabilities();
        assert!(caps.instrument_kinds.contains(&InstrumentKind::Fx));
        assert!(caps.supports_historical);
    }

    #[test]
    fn test_request_from_instrument() {
        let context = QuoteContext::new(
            InstrumentId::Equity {
                ticker: Arc::from("600519"),
                mic: Some(Cow::Borrowed("XSHG")),
            },
            Some(Cow::Borrowed("CNY")),
        );

        let request = SeriesRequest::from_instrument(
            &context,
            &ProviderInstrument::EquitySymbol {
                symbol: Arc::from("600519.SHH"),
            },
        )
        .unwrap();
        assert_eq!(
            request,
            SeriesRequest::Equity {
                symbol: "600519.SHH".to_string(),
                currency: "CNY".to_string()
            }
        );

        let request = SeriesRequest::from_instrument(
            &context,
            &ProviderInstrument::FxSymbol {
                symbol: Arc::from("HKDUSD"),
            },
        )
        .unwrap();
        assert_eq!(request, fx("HKD", "USD"));
        assert!(request.params().contains(&("function", "FX_DAILY".to_string())));

        let err = SeriesRequest::from_instrument(
            &context,
            &ProviderInstrument::FxSymbol {
                symbol: Arc::from("HKDUSD=X"),
            },
        )
        .unwrap_err();
        assert!(matches!(err, MarketDataError::UnsupportedAssetType(_)));
    }

    #[test]
    fn test_equity_series_sorted_ascending() {
        let text = r#"{
            "Meta Data": {"2. Symbol": "TSLA"},
            "Time Series (Daily)": {
                "2025-03-03": {"1. open": "300.3400", "2. high": "303.9400", "3. low": "277.3000", "4. close": "284.6500", "5. volume": "115551371"},
                "2025-02-28": {"1. open": "279.5000", "2. high": "293.8800", "3. low": "273.6000", "4. close": "292.9800", "5. volume": "115697024"}
            }
        }"#;

        let quotes = parse_series(text, &equity("TSLA")).unwrap();
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].date().to_string(), "2025-02-28");
        assert_eq!(quotes[1].close, dec!(284.6500));
        assert_eq!(quotes[1].volume, Some(dec!(115551371)));
        assert_eq!(quotes[1].source, "ALPHA_VANTAGE");
    }

    #[test]
    fn test_fx_series_uses_quote_currency() {
        let text = r#"{
            "Time Series FX (Daily)": {
                "2025-03-03": {"1. open": "0.12860", "2. high": "0.12870", "3. low": "0.12850", "4. close": "0.12865"}
            }
        }"#;

        let quotes = parse_series(text, &fx("HKD", "USD")).unwrap();
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].close, dec!(0.12865));
        assert_eq!(quotes[0].currency, "USD");
        assert!(quotes[0].volume.is_none());
    }

    #[test]
    fn test_unreadable_close_skipped() {
        let text = r#"{"Time Series (Daily)": {"2025-03-03": {"4. close": "n/a"}}}"#;
        assert!(parse_series(text, &equity("TSLA")).unwrap().is_empty());
    }

    #[test]
    fn test_quota_notice_is_rate_limit() {
        let text = r#"{"Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute."}"#;
        let err = parse_series(text, &equity("TSLA")).unwrap_err();
        assert!(matches!(err, MarketDataError::RateLimited { .. }));

        let text = r#"{"Information": "You have reached the 25 requests per day limit."}"#;
        let err = parse_series(text, &fx("CNY", "USD")).unwrap_err();
        assert!(matches!(err, MarketDataError::RateLimited { .. }));
    }

    #[test]
    fn test_error_message_and_missing_series() {
        let text = r#"{"Error Message": "Invalid API call. Please retry or visit the documentation."}"#;
        let err = parse_series(text, &equity("NOPE")).unwrap_err();
        assert!(matches!(err, MarketDataError::SymbolNotFound(_)));

        let err = parse_series("{}", &fx("CNY", "USD")).unwrap_err();
        assert!(matches!(err, MarketDataError::SymbolNotFound(_)));

        let err = parse_series("<html>", &fx("CNY", "USD")).unwrap_err();
        assert!(matches!(err, MarketDataError::ProviderError { .. }));
    }
}
