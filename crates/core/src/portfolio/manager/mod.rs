//! Portfolio manager - the operations applied to the portfolio document.

mod manager_model;
mod portfolio_manager;

pub use manager_model::*;
pub use portfolio_manager::PortfolioManager;
