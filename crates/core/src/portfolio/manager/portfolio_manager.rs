use std::sync::Arc;

use chrono::NaiveDate;
use futures::future::join_all;
use log::{debug, error, info, warn};
use rust_decimal::Decimal;

use super::manager_model::{
    PortfolioSummary, PriceFailure, PriceRefreshReport, PriceUpdate, RefreshOutcome,
};
use crate::errors::{Error, Result, ValidationError};
use crate::fx::{Currency, FxService, FxServiceTrait};
use crate::market_data::{Market, MarketDataServiceTrait};
use crate::portfolio::snapshot::{
    normalize_code, Holding, PortfolioDocument, PortfolioRepositoryTrait, Snapshot,
};
use crate::portfolio::valuation::{calculate_valuation, SnapshotValuation};

/// Owns the in-memory portfolio document and applies every mutation to it.
///
/// Changes stay in memory until [`PortfolioManager::save`] is called.
pub struct PortfolioManager {
    repository: Arc<dyn PortfolioRepositoryTrait>,
    market_data: Arc<dyn MarketDataServiceTrait>,
    fx_service: Arc<dyn FxServiceTrait>,
    document: PortfolioDocument,
}

impl PortfolioManager {
    fn with_document(
        repository: Arc<dyn PortfolioRepositoryTrait>,
        market_data: Arc<dyn MarketDataServiceTrait>,
        document: PortfolioDocument,
    ) -> Self {
        let fx_service = Arc::new(FxService::new(market_data.clone()));
        Self {
            repository,
            market_data,
            fx_service,
            document,
        }
    }

    /// Starts from an empty document.
    pub fn create(
        repository: Arc<dyn PortfolioRepositoryTrait>,
        market_data: Arc<dyn MarketDataServiceTrait>,
    ) -> Self {
        Self::with_document(repository, market_data, PortfolioDocument::new())
    }

    /// Loads the stored document. A missing or corrupt file is an error.
    pub fn load(
        repository: Arc<dyn PortfolioRepositoryTrait>,
        market_data: Arc<dyn MarketDataServiceTrait>,
    ) -> Result<Self> {
        let document = repository.load()?;
        info!("Loaded portfolio with {} snapshot(s)", document.len());
        Ok(Self::with_document(repository, market_data, document))
    }

    /// Loads the stored document, or starts empty when none exists yet.
    pub fn open(
        repository: Arc<dyn PortfolioRepositoryTrait>,
        market_data: Arc<dyn MarketDataServiceTrait>,
    ) -> Result<Self> {
        if repository.exists() {
            Self::load(repository, market_data)
        } else {
            info!("No stored portfolio, starting empty");
            Ok(Self::create(repository, market_data))
        }
    }

    /// Replaces the FX service, e.g. to share a rate cache.
    pub fn with_fx_service(mut self, fx_service: Arc<dyn FxServiceTrait>) -> Self {
        self.fx_service = fx_service;
        self
    }

    pub fn document(&self) -> &PortfolioDocument {
        &self.document
    }

    pub fn save(&self) -> Result<()> {
        self.repository.save(&self.document)?;
        info!("Saved portfolio with {} snapshot(s)", self.document.len());
        Ok(())
    }

    /// Discards in-memory changes and reloads the stored document.
    pub fn reload(&mut self) -> Result<()> {
        self.document = self.repository.load()?;
        Ok(())
    }

    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.document.latest_date()
    }

    pub fn get_snapshot(&self, date: NaiveDate) -> Option<&Snapshot> {
        self.document.get(date)
    }

    /// Returns the snapshot for `date`, creating it if needed.
    pub fn create_snapshot(&mut self, date: NaiveDate) -> &Snapshot {
        self.document.get_or_create(date)
    }

    pub fn remove_snapshot(&mut self, date: NaiveDate) -> Result<Snapshot> {
        self.document
            .remove(date)
            .ok_or(Error::SnapshotNotFound(date))
    }

    /// Sets the absolute cash balance for one currency.
    pub fn update_cash(
        &mut self,
        date: NaiveDate,
        currency: Currency,
        amount: Decimal,
    ) -> Result<()> {
        if amount < Decimal::ZERO {
            return Err(ValidationError::Negative {
                field: "cash",
                value: amount,
            }
            .into());
        }
        self.document.get_or_create(date).set_cash(currency, amount)?;
        debug!("Cash {} on {} set to {}", currency, date, amount);
        Ok(())
    }

    /// Adds a holding, merging into an existing one with the same code.
    pub fn add_stock(
        &mut self,
        date: NaiveDate,
        market: Market,
        holding: Holding,
    ) -> Result<Holding> {
        holding.validate()?;
        let merged = self
            .document
            .get_or_create(date)
            .upsert_holding(market, holding)?
            .clone();
        debug!(
            "{} {} on {}: quantity {}, cost {}",
            market, merged.code, date, merged.quantity, merged.cost
        );
        Ok(merged)
    }

    pub fn remove_stock(
        &mut self,
        date: NaiveDate,
        market: Market,
        code: &str,
    ) -> Result<Holding> {
        let snapshot = self
            .document
            .get_mut(date)
            .ok_or(Error::SnapshotNotFound(date))?;
        snapshot
            .remove_holding(market, code)
            .ok_or_else(|| Error::HoldingNotFound {
                market,
                code: normalize_code(code),
                date,
            })
    }

    /// Looks up a price for every holding on `date`.
    ///
    /// Lookups run concurrently. An instrument without data keeps its
    /// previous price and is listed in the report.
    pub async fn update_stock_prices(&mut self, date: NaiveDate) -> Result<PriceRefreshReport> {
        let keys = self
            .document
            .get(date)
            .ok_or(Error::SnapshotNotFound(date))?
            .holding_keys();

        let lookups = keys.into_iter().map(|(market, code)| {
            let market_data = self.market_data.clone();
            async move {
                let result = market_data.get_price(market, &code, date).await;
                (market, code, result)
            }
        });
        let results = join_all(lookups).await;

        let snapshot = self
            .document
            .get_mut(date)
            .ok_or(Error::SnapshotNotFound(date))?;
        let mut report = PriceRefreshReport::new(date);

        for (market, code, result) in results {
            match result {
                Ok(price) => {
                    let previous_price = snapshot.set_price(market, &code, price).flatten();
                    report.updated.push(PriceUpdate {
                        market,
                        code,
                        price,
                        previous_price,
                    });
                }
                Err(e) => {
                    warn!("Keeping previous price for {} {}: {}", market, code, e);
                    let retained_price =
                        snapshot.find_holding(market, &code).and_then(|h| h.price);
                    report.unavailable.push(PriceFailure {
                        market,
                        code,
                        retained_price,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Prices for {}: {} updated, {} unavailable",
            date,
            report.updated.len(),
            report.unavailable.len()
        );
        Ok(report)
    }

    /// Values the snapshot and stores the totals in it.
    ///
    /// On failure the stored totals are left untouched.
    pub async fn update_total_assets(&mut self, date: NaiveDate) -> Result<SnapshotValuation> {
        if self.document.get(date).is_none() {
            return Err(Error::SnapshotNotFound(date));
        }

        let rates = self.fx_service.get_pivot_rates(date).await.map_err(|e| {
            error!("Cannot value {}: {}", date, e);
            e
        })?;

        let snapshot = self
            .document
            .get_mut(date)
            .ok_or(Error::SnapshotNotFound(date))?;
        let valuation = calculate_valuation(snapshot, rates, date)?;
        snapshot.total_assets = valuation.totals.clone();

        info!(
            "Total assets on {}: {} USD",
            date,
            valuation.total(Currency::USD).round_dp(2)
        );
        Ok(valuation)
    }

    /// Refreshes prices, then totals.
    pub async fn refresh(&mut self, date: NaiveDate) -> Result<RefreshOutcome> {
        let prices = self.update_stock_prices(date).await?;
        let valuation = self.update_total_assets(date).await?;
        Ok(RefreshOutcome { prices, valuation })
    }

    pub fn get_portfolio_summary(&self, date: NaiveDate) -> Result<PortfolioSummary> {
        let snapshot = self
            .document
            .get(date)
            .ok_or(Error::SnapshotNotFound(date))?;
        Ok(PortfolioSummary::from_snapshot(date, snapshot))
    }

    pub fn get_latest_summary(&self) -> Result<PortfolioSummary> {
        let date = self.latest_date().ok_or(Error::EmptyPortfolio)?;
        self.get_portfolio_summary(date)
    }
}
