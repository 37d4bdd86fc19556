use std::fmt;
use std::str::FromStr;

use asset_tracker_market_data::InstrumentId;
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;
use crate::fx::Currency;

/// Listing market of a holding.
///
/// Declaration order is the persisted key order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Market {
    AShares,
    USStocks,
    HKStocks,
}

/// Regular trading hours in exchange-local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradingSession {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl Market {
    pub const ALL: [Market; 3] = [Market::AShares, Market::USStocks, Market::HKStocks];

    pub fn as_str(&self) -> &'static str {
        match self {
            Market::AShares => "AShares",
            Market::USStocks => "USStocks",
            Market::HKStocks => "HKStocks",
        }
    }

    pub fn native_currency(&self) -> Currency {
        match self {
            Market::AShares => Currency::CNY,
            Market::USStocks => Currency::USD,
            Market::HKStocks => Currency::HKD,
        }
    }

    pub fn timezone(&self) -> Tz {
        match self {
            Market::AShares => chrono_tz::Asia::Shanghai,
            Market::USStocks => chrono_tz::America::New_York,
            Market::HKStocks => chrono_tz::Asia::Hong_Kong,
        }
    }

    pub fn session(&self) -> TradingSession {
        let (open, close) = match self {
            Market::AShares => ((9, 30), (15, 0)),
            Market::USStocks | Market::HKStocks => ((9, 30), (16, 0)),
        };
        TradingSession {
            open: NaiveTime::from_hms_opt(open.0, open.1, 0).unwrap_or(NaiveTime::MIN),
            close: NaiveTime::from_hms_opt(close.0, close.1, 0).unwrap_or(NaiveTime::MIN),
        }
    }

    /// Calendar date at the exchange for the given instant.
    pub fn local_date(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.timezone()).date_naive()
    }

    /// The furthest-ahead local date among the tracked markets. A snapshot
    /// dated on or before it is not in the future for every market, so FX
    /// treats it as current.
    pub fn latest_local_date(now: DateTime<Utc>) -> NaiveDate {
        Market::ALL
            .iter()
            .map(|market| market.local_date(now))
            .fold(now.date_naive(), std::cmp::max)
    }

    /// Weekday check against regular hours. Exchange holidays are not modelled.
    pub fn is_session_open(&self, now: DateTime<Utc>) -> bool {
        let local = now.with_timezone(&self.timezone());
        if matches!(local.weekday(), Weekday::Sat | Weekday::Sun) {
            return false;
        }
        let session = self.session();
        let time = local.time();
        time >= session.open && time < session.close
    }

    /// Exchange MIC for a listing code.
    ///
    /// A-share exchanges are derived from the leading digit of the code;
    /// US listings carry no MIC.
    pub fn mic_for_code(&self, code: &str) -> Result<Option<&'static str>, ValidationError> {
        match self {
            Market::AShares => match code.trim().chars().next() {
                Some('5' | '6' | '9') => Ok(Some("XSHG")),
                Some('0' | '1' | '2' | '3') => Ok(Some("XSHE")),
                Some('4' | '8') => Ok(Some("XBSE")),
                _ => Err(ValidationError::InvalidInput(format!(
                    "cannot determine the A-share exchange for code '{}'",
                    code
                ))),
            },
            Market::HKStocks => Ok(Some("XHKG")),
            Market::USStocks => Ok(None),
        }
    }

    /// Canonical instrument used for provider lookups.
    pub fn instrument_id(&self, code: &str) -> Result<InstrumentId, ValidationError> {
        let mic = self.mic_for_code(code)?;
        Ok(InstrumentId::equity(code.trim().to_ascii_uppercase(), mic))
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Market {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ashares" | "a" | "cn" => Ok(Market::AShares),
            "usstocks" | "us" => Ok(Market::USStocks),
            "hkstocks" | "hk" => Ok(Market::HKStocks),
            _ => Err(ValidationError::UnknownMarket(s.to_string())),
        }
    }
}
