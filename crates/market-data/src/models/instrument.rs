use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::types::{Currency, Mic};

/// Broad instrument category used for provider capability matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstrumentKind {
    Equity,
    Fx,
}

/// Provider-agnostic instrument identifier.
/// This is what the domain layer works with.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum InstrumentId {
    /// Exchange-traded security. `mic: None` means a US listing.
    Equity { ticker: Arc<str>, mic: Option<Mic> },

    /// Foreign exchange pair, priced as units of `quote` per unit of `base`
    Fx { base: Currency, quote: Currency },
}

impl InstrumentId {
    pub fn equity(ticker: impl Into<Arc<str>>, mic: Option<&'static str>) -> Self {
        Self::Equity {
            ticker: ticker.into(),
            mic: mic.map(Mic::Borrowed),
        }
    }

    pub fn fx(base: impl Into<Currency>, quote: impl Into<Currency>) -> Self {
        Self::Fx {
            base: base.into(),
            quote: quote.into(),
        }
    }

    pub fn kind(&self) -> InstrumentKind {
        match self {
            Self::Equity { .. } => InstrumentKind::Equity,
            Self::Fx { .. } => InstrumentKind::Fx,
        }
    }
}

impl std::fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Equity {
                ticker,
                mic: Some(mic),
            } => write!(f, "{}@{}", ticker, mic),
            Self::Equity { ticker, mic: None } => write!(f, "{}", ticker),
            Self::Fx { base, quote } => write!(f, "{}/{}", base, quote),
        }
    }
}
