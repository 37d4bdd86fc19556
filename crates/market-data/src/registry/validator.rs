//! Sanity checks applied to every quote before it leaves the registry.

use log::warn;
use rust_decimal::Decimal;

use crate::errors::MarketDataError;
use crate::models::Quote;

/// Rejects quotes that cannot serve as a price or rate: a non-positive
/// close (it would zero a valuation) or a high below the low. A close
/// outside the day's range is only logged.
#[derive(Clone, Debug, Default)]
pub struct QuoteValidator;

impl QuoteValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, quote: &Quote) -> Result<(), MarketDataError> {
        let mut problems = Vec::new();

        if quote.close <= Decimal::ZERO {
            problems.push(format!("close {} is not positive", quote.close));
        }

        match (quote.high, quote.low) {
            (Some(high), Some(low)) if high < low => {
                problems.push(format!("high {} below low {}", high, low));
            }
            (Some(high), Some(low)) if quote.close < low || quote.close > high => {
                warn!(
                    "Close {} at {} lies outside the day range {}..{}",
                    quote.close, quote.timestamp, low, high
                );
            }
            _ => {}
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(MarketDataError::ValidationFailed {
                message: problems.join("; "),
            })
        }
    }

    /// Drops the quotes that fail [`validate`](Self::validate).
    pub fn retain_valid(&self, quotes: Vec<Quote>) -> Vec<Quote> {
        quotes
            .into_iter()
            .filter(|quote| {
                self.validate(quote)
                    .map_err(|e| warn!("Dropping quote at {}: {}", quote.timestamp, e))
                    .is_ok()
            })
            .collect()
    }
}
