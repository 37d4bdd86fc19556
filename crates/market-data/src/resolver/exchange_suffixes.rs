//! Provider-specific exchange suffixes.
//!
//! Maps ISO 10383 Market Identifier Codes to the suffix each provider
//! appends to a local ticker.

use crate::models::Mic;

/// Provider-specific exchange suffix and currency.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExchangeSuffix {
    pub mic: &'static str,
    pub provider: &'static str,
    /// The suffix to append to the ticker (e.g., ".SS" for Yahoo Shanghai).
    pub suffix: &'static str,
    pub currency: &'static str,
}

/// Known exchange suffixes. A MIC/provider pair that is absent here is not
/// served by that provider.
#[rustfmt::skip]
pub const EXCHANGE_SUFFIXES: &[ExchangeSuffix] = &[
    ExchangeSuffix { mic: "XSHG", provider: "YAHOO", suffix: ".SS", currency: "CNY" },
    ExchangeSuffix { mic: "XSHE", provider: "YAHOO", suffix: ".SZ", currency: "CNY" },
    ExchangeSuffix { mic: "XBSE", provider: "YAHOO", suffix: ".BJ", currency: "CNY" },
    ExchangeSuffix { mic: "XHKG", provider: "YAHOO", suffix: ".HK", currency: "HKD" },
    ExchangeSuffix { mic: "XSHG", provider: "ALPHA_VANTAGE", suffix: ".SHH", currency: "CNY" },
    ExchangeSuffix { mic: "XSHE", provider: "ALPHA_VANTAGE", suffix: ".SHZ", currency: "CNY" },
];

/// MIC to provider suffix lookup.
#[derive(Clone, Debug, Default)]
pub struct ExchangeMap;

impl ExchangeMap {
    pub fn new() -> Self {
        Self
    }

    fn entry(&self, mic: &Mic, provider: &str) -> Option<&'static ExchangeSuffix> {
        EXCHANGE_SUFFIXES
            .iter()
            .find(|e| e.mic == mic.as_ref() && e.provider == provider)
    }

    /// Get the suffix for a MIC and provider.
    pub fn get_suffix(&self, mic: &Mic, provider: &str) -> Option<&'static str> {
        self.entry(mic, provider).map(|e| e.suffix)
    }

    /// Get the currency for a MIC and provider.
    pub fn get_currency(&self, mic: &Mic, provider: &str) -> Option<&'static str> {
        self.entry(mic, provider).map(|e| e.currency)
    }

    pub fn has_mic(&self, mic: &Mic) -> bool {
        EXCHANGE_SUFFIXES.iter().any(|e| e.mic == mic.as_ref())
    }
}

/// Yahoo lists Hong Kong shares with four digit codes ("00700" -> "0700").
pub fn normalize_hk_ticker(ticker: &str) -> String {
    let trimmed = ticker.trim_start_matches('0');
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return ticker.to_string();
    }
    format!("{:0>4}", trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    #[test]
    fn test_yahoo_suffixes() {
        let map = ExchangeMap::new();
        assert_eq!(map.get_suffix(&Cow::Borrowed("XSHG"), "YAHOO"), Some(".SS"));
        assert_eq!(map.get_suffix(&Cow::Borrowed("XSHE"), "YAHOO"), Some(".SZ"));
        assert_eq!(map.get_suffix(&Cow::Borrowed("XHKG"), "YAHOO"), Some(".HK"));
        assert_eq!(map.get_currency(&Cow::Borrowed("XHKG"), "YAHOO"), Some("HKD"));
    }

    #[test]
    fn test_alpha_vantage_has_no_hkex() {
        let map = ExchangeMap::new();
        assert_eq!(
            map.get_suffix(&Cow::Borrowed("XSHG"), "ALPHA_VANTAGE"),
            Some(".SHH")
        );
        assert!(map.get_suffix(&Cow::Borrowed("XHKG"), "ALPHA_VANTAGE").is_none());
        assert!(map.has_mic(&Cow::Borrowed("XHKG")));
        assert!(!map.has_mic(&Cow::Borrowed("XNAS")));
    }

    #[test]
    fn test_normalize_hk_ticker() {
        assert_eq!(normalize_hk_ticker("00700"), "0700");
        assert_eq!(normalize_hk_ticker("9988"), "9988");
        assert_eq!(normalize_hk_ticker("05"), "0005");
        assert_eq!(normalize_hk_ticker("00000"), "00000");
        assert_eq!(normalize_hk_ticker("ABC"), "ABC");
    }
}
