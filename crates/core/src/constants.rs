/// Decimal places of exchange rates in valuation reports. Stored totals
/// keep full precision and are rounded only for display.
pub const DECIMAL_PRECISION: u32 = 6;

/// Decimal precision for display
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

/// Calendar days searched backwards for the last available close
pub const PRICE_LOOKBACK_DAYS: i64 = 10;
