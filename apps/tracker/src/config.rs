use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};

pub const DEFAULT_PORTFOLIO_PATH: &str = "data/portfolio.json";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Runner settings, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub portfolio_path: PathBuf,
    pub alpha_vantage_api_key: Option<String>,
    /// Provider ids, most preferred first. Empty keeps each provider's own priority.
    pub provider_priority: Vec<String>,
    pub http_timeout: Duration,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let value = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let portfolio_path = value("TRACKER_PORTFOLIO_PATH")
            .unwrap_or_else(|| DEFAULT_PORTFOLIO_PATH.to_string())
            .into();

        let provider_priority = value("TRACKER_PROVIDER_PRIORITY")
            .map(|list| {
                list.split(',')
                    .map(|id| id.trim().to_ascii_uppercase())
                    .filter(|id| !id.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let http_timeout_secs = match value("TRACKER_HTTP_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("TRACKER_HTTP_TIMEOUT_SECS is not a number: {}", raw))?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };
        if http_timeout_secs == 0 {
            bail!("TRACKER_HTTP_TIMEOUT_SECS must be greater than zero");
        }

        let log_format = match value("TRACKER_LOG_FORMAT") {
            None => LogFormat::Text,
            Some(raw) if raw.eq_ignore_ascii_case("text") => LogFormat::Text,
            Some(raw) if raw.eq_ignore_ascii_case("json") => LogFormat::Json,
            Some(raw) => bail!("TRACKER_LOG_FORMAT must be 'text' or 'json', got '{}'", raw),
        };

        Ok(Self {
            portfolio_path,
            alpha_vantage_api_key: value("TRACKER_ALPHA_VANTAGE_API_KEY"),
            provider_priority,
            http_timeout: Duration::from_secs(http_timeout_secs),
            log_format,
        })
    }

    /// Registry priorities: position in the configured list, lower first.
    pub fn provider_priorities(&self) -> HashMap<String, i32> {
        self.provider_priority
            .iter()
            .enumerate()
            .map(|(position, id)| (id.clone(), position as i32))
            .collect()
    }
}
