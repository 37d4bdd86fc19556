use serde::{Deserialize, Serialize};

use super::types::{Currency, ProviderSymbol};

/// An instrument spelled the way one vendor expects it. The resolver
/// builds these; providers only ever see this form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderInstrument {
    /// `600519.SS`, `0700.HK`, `TSLA`
    EquitySymbol { symbol: ProviderSymbol },

    /// `HKDUSD=X`
    FxSymbol { symbol: ProviderSymbol },

    /// Separate legs, for APIs that take `from` and `to` parameters.
    FxPair { from: Currency, to: Currency },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;
    use std::sync::Arc;

    #[test]
    fn test_tagged_json() {
        let hk = ProviderInstrument::EquitySymbol {
            symbol: Arc::from("0700.HK"),
        };
        assert_eq!(
            serde_json::to_value(&hk).unwrap(),
            serde_json::json!({ "type": "equity_symbol", "symbol": "0700.HK" })
        );

        let parsed: ProviderInstrument =
            serde_json::from_str(r#"{"type":"fx_pair","from":"CNY","to":"USD"}"#).unwrap();
        assert_eq!(
            parsed,
            ProviderInstrument::FxPair {
                from: Cow::Borrowed("CNY"),
                to: Cow::Borrowed("USD"),
            }
        );
    }
}
