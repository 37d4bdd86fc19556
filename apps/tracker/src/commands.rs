use std::path::PathBuf;

use asset_tracker_core::{Currency, Error, Holding, Market, PortfolioManager};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

/// Date the sample portfolio is recorded on.
pub const DEMO_DATE: &str = "2025-03-02";

/// asset-tracker: dated snapshots of cash and listed stocks across CNY, USD and HKD
#[derive(Debug, Parser)]
#[command(name = "asset-tracker")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Dated portfolio snapshots valued in USD, HKD and CNY", long_about = None)]
pub struct Cli {
    /// Portfolio file, overrides TRACKER_PORTFOLIO_PATH
    #[arg(short, long, global = true)]
    pub portfolio: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Record the sample portfolio, refresh it and print the summary
    Demo {
        #[arg(long, default_value = DEMO_DATE)]
        date: NaiveDate,
    },

    /// Refresh prices and totals for a date (default: latest snapshot)
    Refresh {
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Print the summary for a date (default: latest snapshot)
    Summary {
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Set the cash balance of one currency
    Cash {
        date: NaiveDate,
        /// USD, HKD or CNY
        currency: Currency,
        amount: Decimal,
    },

    /// Add a holding, merging into an existing one with the same code
    AddStock {
        date: NaiveDate,
        /// AShares, USStocks or HKStocks
        market: Market,
        code: String,
        name: String,
        quantity: Decimal,
        cost: Decimal,
    },

    /// Remove a holding
    RemoveStock {
        date: NaiveDate,
        market: Market,
        code: String,
    },
}

/// Sample holdings: market, name, code, quantity, unit cost as (mantissa, scale).
const DEMO_HOLDINGS: [(Market, &str, &str, i64, (i64, u32)); 5] = [
    (Market::AShares, "贵州茅台", "600519", 100, (10, 0)),
    (Market::AShares, "中证2000ETF", "563300", 100, (5, 1)),
    (Market::USStocks, "特斯拉", "TSLA", 100, (100, 0)),
    (Market::USStocks, "英伟达", "NVDA", 100, (100, 0)),
    (Market::HKStocks, "腾讯控股", "00700", 100, (100, 0)),
];

const DEMO_CASH: i64 = 10_000;

/// Replaces the snapshot on `date` with the sample portfolio.
pub fn seed_demo(
    manager: &mut PortfolioManager,
    date: NaiveDate,
) -> asset_tracker_core::Result<()> {
    if manager.get_snapshot(date).is_some() {
        manager.remove_snapshot(date)?;
    }
    for currency in Currency::ALL {
        manager.update_cash(date, currency, Decimal::from(DEMO_CASH))?;
    }
    for (market, name, code, quantity, (mantissa, scale)) in DEMO_HOLDINGS {
        let holding = Holding::new(
            name,
            code,
            Decimal::from(quantity),
            Decimal::new(mantissa, scale),
        );
        manager.add_stock(date, market, holding)?;
    }
    Ok(())
}

fn resolve_date(
    manager: &PortfolioManager,
    date: Option<NaiveDate>,
) -> anyhow::Result<NaiveDate> {
    match date.or_else(|| manager.latest_date()) {
        Some(date) => Ok(date),
        None => Err(Error::EmptyPortfolio.into()),
    }
}

/// Prices then totals. Gaps are reported; an FX failure leaves totals as
/// they were and is reported too, so the updated prices can still be saved.
async fn refresh(manager: &mut PortfolioManager, date: NaiveDate) -> anyhow::Result<()> {
    let report = manager.update_stock_prices(date).await?;
    for failure in &report.unavailable {
        tracing::warn!(
            "{} {}: {} (kept {})",
            failure.market,
            failure.code,
            failure.reason,
            failure
                .retained_price
                .map(|p| p.to_string())
                .unwrap_or_else(|| "no price".to_string())
        );
    }

    match manager.update_total_assets(date).await {
        Ok(valuation) => {
            for holding in &valuation.unpriced {
                tracing::warn!(
                    "{} {} left out of totals: no price",
                    holding.market,
                    holding.code
                );
            }
        }
        Err(e @ Error::Fx(_)) => tracing::error!("Totals for {} not updated: {}", date, e),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

fn print_summary(manager: &PortfolioManager, date: NaiveDate) -> anyhow::Result<()> {
    let summary = manager.get_portfolio_summary(date)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

pub async fn run(manager: &mut PortfolioManager, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Demo { date } => {
            seed_demo(manager, date)?;
            refresh(manager, date).await?;
            manager.save()?;
            print_summary(manager, date)
        }
        Commands::Refresh { date } => {
            let date = resolve_date(manager, date)?;
            refresh(manager, date).await?;
            manager.save()?;
            print_summary(manager, date)
        }
        Commands::Summary { date } => {
            let date = resolve_date(manager, date)?;
            print_summary(manager, date)
        }
        Commands::Cash {
            date,
            currency,
            amount,
        } => {
            manager.update_cash(date, currency, amount)?;
            manager.save()?;
            tracing::info!("{} cash on {} set to {}", currency, date, amount);
            Ok(())
        }
        Commands::AddStock {
            date,
            market,
            code,
            name,
            quantity,
            cost,
        } => {
            let holding =
                manager.add_stock(date, market, Holding::new(name, code, quantity, cost))?;
            manager.save()?;
            tracing::info!(
                "{} {} on {}: {} @ {}",
                market,
                holding.code,
                date,
                holding.quantity,
                holding.cost
            );
            Ok(())
        }
        Commands::RemoveStock { date, market, code } => {
            let removed = manager.remove_stock(date, market, &code)?;
            manager.save()?;
            tracing::info!("Removed {} {} from {}", market, removed.code, date);
            Ok(())
        }
    }
}
