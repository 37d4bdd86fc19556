//! Currencies the tracker books cash and totals in.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// Pivot currency every FX rate is fetched against.
pub const PIVOT_CURRENCY: Currency = Currency::USD;

/// A supported currency.
///
/// Declaration order is the persisted key order (`USD`, `HKD`, `CNY`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Currency {
    USD,
    HKD,
    CNY,
}

impl Currency {
    pub const ALL: [Currency; 3] = [Currency::USD, Currency::HKD, Currency::CNY];

    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::HKD => "HKD",
            Currency::CNY => "CNY",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::USD),
            "HKD" => Ok(Currency::HKD),
            "CNY" => Ok(Currency::CNY),
            other => Err(ValidationError::UnsupportedCurrency(other.to_string())),
        }
    }
}
