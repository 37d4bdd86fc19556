//! Open Exchange Rate API provider (open.er-api.com).
//!
//! Keyless endpoint returning the current rates for one base currency.
//! Only latest FX quotes are available; there is no history.

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use log::debug;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::errors::MarketDataError;
use crate::models::{InstrumentKind, ProviderInstrument, Quote, QuoteContext};
use crate::provider::{MarketDataProvider, ProviderCapabilities};

const BASE_URL: &str = "https://open.er-api.com/v6/latest";
const PROVIDER_ID: &str = "OPEN_ER_API";

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    result: String,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
    time_last_update_unix: Option<i64>,
    #[serde(default)]
    rates: HashMap<String, serde_json::Number>,
}

pub struct OpenErApiProvider {
    client: Client,
    base_url: String,
}

impl OpenErApiProvider {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: BASE_URL.to_string(),
        }
    }

    fn pair(instrument: &ProviderInstrument) -> Result<(String, String), MarketDataError> {
        match instrument {
            ProviderInstrument::FxPair { from, to } => Ok((from.to_string(), to.to_string())),
            ProviderInstrument::FxSymbol { symbol } if symbol.len() == 6 && symbol.is_ascii() => {
                Ok((symbol[..3].to_string(), symbol[3..].to_string()))
            }
            other => Err(MarketDataError::UnsupportedAssetType(format!(
                "{} only serves FX pairs, got {:?}",
                PROVIDER_ID, other
            ))),
        }
    }

    fn number_to_decimal(number: &serde_json::Number) -> Option<Decimal> {
        let text = number.to_string();
        Decimal::from_str(&text)
            .or_else(|_| Decimal::from_scientific(&text))
            .ok()
    }

    /// Extract the `from -> to` rate from a latest-rates payload.
    fn parse_rate(text: &str, from: &str, to: &str) -> Result<Quote, MarketDataError> {
        let response: LatestRatesResponse =
            serde_json::from_str(text).map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to parse response: {}", e),
            })?;

        if response.result != "success" {
            let error_type = response.error_type.unwrap_or_default();
            if error_type == "unsupported-code" {
                return Err(MarketDataError::SymbolNotFound(from.to_string()));
            }
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("result={} error-type={}", response.result, error_type),
            });
        }

        let rate = response
            .rates
            .get(to)
            .and_then(Self::number_to_decimal)
            .ok_or_else(|| MarketDataError::SymbolNotFound(format!("{}{}", from, to)))?;

        let timestamp: DateTime<Utc> = response
            .time_last_update_unix
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
            .unwrap_or_else(Utc::now);

        Ok(Quote::new(
            timestamp,
            rate,
            to.to_string(),
            PROVIDER_ID.to_string(),
        ))
    }
}

impl Default for OpenErApiProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataProvider for OpenErApiProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        5
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            instrument_kinds: &[InstrumentKind::Fx],
            supports_latest: true,
            supports_historical: false,
        }
    }

    async fn get_latest_quote(
        &self,
        _context: &QuoteContext,
        instrument: ProviderInstrument,
    ) -> Result<Quote, MarketDataError> {
        let (from, to) = Self::pair(&instrument)?;
        let url = format!("{}/{}", self.base_url, from);

        debug!("Open ER API request: {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                MarketDataError::Timeout {
                    provider: PROVIDER_ID.to_string(),
                }
            } else {
                MarketDataError::ProviderError {
                    provider: PROVIDER_ID.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        let text = response.text().await?;
        Self::parse_rate(&text, &from, &to)
    }

    async fn get_historical_quotes(
        &self,
        _context: &QuoteContext,
        _instrument: ProviderInstrument,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<Vec<Quote>, MarketDataError> {
        Err(MarketDataError::UnsupportedAssetType(format!(
            "{} has no historical rates",
            PROVIDER_ID
        )))
    }
}
