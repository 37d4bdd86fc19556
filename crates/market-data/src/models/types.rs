use std::borrow::Cow;
use std::sync::Arc;

/// Provider identifier ("YAHOO", "ALPHA_VANTAGE", "OPEN_ER_API")
pub type ProviderId = Cow<'static, str>;

/// Market Identifier Code (ISO 10383), e.g. "XSHG" or "XHKG"
pub type Mic = Cow<'static, str>;

/// Currency code (ISO 4217)
pub type Currency = Cow<'static, str>;

/// Symbol in a provider's own notation, e.g. "0700.HK"
pub type ProviderSymbol = Arc<str>;
