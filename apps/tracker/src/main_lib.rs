use std::sync::Arc;

use asset_tracker_core::market_data::MarketDataService;
use asset_tracker_core::PortfolioManager;
use asset_tracker_market_data::{
    AlphaVantageProvider, MarketDataProvider, OpenErApiProvider, ProviderRegistry, RulesResolver,
    YahooProvider,
};
use asset_tracker_storage_json::JsonPortfolioRepository;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{Config, LogFormat};

/// Logs go to stderr; stdout carries command output.
pub fn init_tracing(log_format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match log_format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

pub fn build_registry(config: &Config) -> anyhow::Result<ProviderRegistry> {
    let mut providers: Vec<Arc<dyn MarketDataProvider>> = Vec::new();
    providers.push(Arc::new(YahooProvider::new()?));

    match &config.alpha_vantage_api_key {
        Some(api_key) => providers.push(Arc::new(AlphaVantageProvider::with_timeout(
            api_key.clone(),
            config.http_timeout,
        ))),
        None => tracing::debug!("No Alpha Vantage API key, provider disabled"),
    }

    providers.push(Arc::new(OpenErApiProvider::with_timeout(config.http_timeout)));

    tracing::info!(
        "Market data providers: {}",
        providers
            .iter()
            .map(|p| p.id())
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(ProviderRegistry::with_priorities(
        providers,
        Arc::new(RulesResolver::new()),
        config.provider_priorities(),
    ))
}

/// Opens the stored portfolio, or an empty one when the file does not exist yet.
pub fn build_manager(config: &Config) -> anyhow::Result<PortfolioManager> {
    let registry = Arc::new(build_registry(config)?);
    let market_data = Arc::new(MarketDataService::new(registry));
    let repository = Arc::new(JsonPortfolioRepository::new(&config.portfolio_path));
    tracing::info!("Portfolio file: {}", config.portfolio_path.display());

    Ok(PortfolioManager::open(repository, market_data)?)
}
