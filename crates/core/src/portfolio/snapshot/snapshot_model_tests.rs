//! Tests for snapshot, holding, and document models.

#[cfg(test)]
mod tests {
    use crate::errors::ValidationError;
    use crate::fx::Currency;
    use crate::market_data::Market;
    use crate::portfolio::snapshot::{Holding, PortfolioDocument, Snapshot, SnapshotState};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ==================== Holding ====================

    #[test]
    fn test_holding_derived_values() {
        let holding = Holding::new("腾讯控股", "00700", dec!(100), dec!(100)).with_price(dec!(372.5));
        assert_eq!(holding.cost_basis(), dec!(10000));
        assert_eq!(holding.market_value(), Some(dec!(37250)));
        assert_eq!(holding.unrealized_gain(), Some(dec!(27250)));

        let unpriced = Holding::new("特斯拉", "TSLA", dec!(100), dec!(100));
        assert_eq!(unpriced.market_value(), None);
        assert_eq!(unpriced.unrealized_gain(), None);
    }

    #[test]
    fn test_merge_weighted_average_cost() {
        let mut existing = Holding::new("贵州茅台", "600519", dec!(100), dec!(10));
        existing.merge(Holding::new("Moutai", "600519", dec!(300), dec!(14)));

        assert_eq!(existing.quantity, dec!(400));
        assert_eq!(existing.cost, dec!(13));
        assert_eq!(existing.name, "贵州茅台");
        assert_eq!(existing.price, None);
    }

    #[test]
    fn test_merge_price_prefers_incoming() {
        let mut existing = Holding::new("NVDA", "NVDA", dec!(10), dec!(100)).with_price(dec!(120));
        existing.merge(Holding::new("NVDA", "NVDA", dec!(10), dec!(100)));
        assert_eq!(existing.price, Some(dec!(120)));

        existing.merge(Holding::new("NVDA", "NVDA", dec!(0), dec!(0)).with_price(dec!(125)));
        assert_eq!(existing.price, Some(dec!(125)));
        assert_eq!(existing.quantity, dec!(20));
    }

    #[test]
    fn test_merge_zero_quantities_takes_incoming_cost() {
        let mut existing = Holding::new("X", "X", dec!(0), dec!(5));
        existing.merge(Holding::new("X", "X", dec!(0), dec!(7)));
        assert_eq!(existing.quantity, dec!(0));
        assert_eq!(existing.cost, dec!(7));
    }

    #[test]
    fn test_holding_validation() {
        assert!(Holding::new("A", "A", dec!(1), dec!(1)).validate().is_ok());

        let err = Holding::new("A", "A", dec!(-1), dec!(1)).validate().unwrap_err();
        assert!(matches!(err, ValidationError::Negative { field: "quantity", .. }));

        let err = Holding::new("A", "A", dec!(1), dec!(-0.01)).validate().unwrap_err();
        assert!(matches!(err, ValidationError::Negative { field: "cost", .. }));

        let err = Holding::new("A", "  ", dec!(1), dec!(1)).validate().unwrap_err();
        assert!(matches!(err, ValidationError::EmptyField("code")));
    }

    #[test]
    fn test_code_is_normalized() {
        let holding = Holding::new("Tesla", " tsla ", dec!(1), dec!(1));
        assert_eq!(holding.code, "TSLA");
    }

    // ==================== Snapshot ====================

    #[test]
    fn test_new_snapshot_is_seeded() {
        let snapshot = Snapshot::new();
        for currency in Currency::ALL {
            assert_eq!(snapshot.cash_balance(currency), dec!(0));
        }
        for market in Market::ALL {
            assert!(snapshot.holdings(market).is_empty());
        }
        assert!(snapshot.total_assets.is_empty());
    }

    #[test]
    fn test_upsert_merges_same_code() {
        let mut snapshot = Snapshot::new();
        snapshot
            .upsert_holding(Market::USStocks, Holding::new("Tesla", "TSLA", dec!(100), dec!(100)))
            .unwrap();
        let merged = snapshot
            .upsert_holding(Market::USStocks, Holding::new("Tesla", "tsla", dec!(100), dec!(200)))
            .unwrap()
            .clone();

        assert_eq!(merged.quantity, dec!(200));
        assert_eq!(merged.cost, dec!(150));
        assert_eq!(snapshot.holdings(Market::USStocks).len(), 1);
    }

    #[test]
    fn test_same_code_in_different_markets_is_separate() {
        let mut snapshot = Snapshot::new();
        snapshot
            .upsert_holding(Market::USStocks, Holding::new("A", "0001", dec!(1), dec!(1)))
            .unwrap();
        snapshot
            .upsert_holding(Market::HKStocks, Holding::new("B", "0001", dec!(1), dec!(1)))
            .unwrap();
        assert_eq!(snapshot.holding_count(), 2);
    }

    #[test]
    fn test_set_cash_rejects_negative() {
        let mut snapshot = Snapshot::new();
        assert!(snapshot.set_cash(Currency::HKD, dec!(-5)).is_err());
        assert_eq!(snapshot.cash_balance(Currency::HKD), dec!(0));

        snapshot.set_cash(Currency::HKD, dec!(5000)).unwrap();
        assert_eq!(snapshot.cash_balance(Currency::HKD), dec!(5000));
    }

    #[test]
    fn test_remove_and_set_price() {
        let mut snapshot = Snapshot::new();
        snapshot
            .upsert_holding(Market::HKStocks, Holding::new("腾讯控股", "00700", dec!(100), dec!(100)))
            .unwrap();

        assert_eq!(snapshot.set_price(Market::HKStocks, "00700", dec!(372)), Some(None));
        assert_eq!(
            snapshot.set_price(Market::HKStocks, "00700", dec!(380)),
            Some(Some(dec!(372)))
        );
        assert_eq!(snapshot.set_price(Market::HKStocks, "09988", dec!(1)), None);

        let removed = snapshot.remove_holding(Market::HKStocks, "00700").unwrap();
        assert_eq!(removed.price, Some(dec!(380)));
        assert!(snapshot.remove_holding(Market::HKStocks, "00700").is_none());
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let mut snapshot = Snapshot::new();
        snapshot.stocks.insert(
            Market::AShares,
            vec![
                Holding::new("A", "600519", dec!(1), dec!(1)),
                Holding::new("B", "600519", dec!(2), dec!(2)),
            ],
        );
        let err = snapshot.validate().unwrap_err();
        assert!(matches!(err, ValidationError::DuplicateHolding { market: Market::AShares, .. }));
    }

    #[test]
    fn test_state_transitions() {
        let mut snapshot = Snapshot::new();
        assert_eq!(snapshot.state(), SnapshotState::Empty);

        snapshot.set_cash(Currency::USD, dec!(1)).unwrap();
        assert_eq!(snapshot.state(), SnapshotState::Populated);

        snapshot
            .upsert_holding(Market::USStocks, Holding::new("Tesla", "TSLA", dec!(1), dec!(1)))
            .unwrap();
        assert_eq!(snapshot.state(), SnapshotState::Populated);

        snapshot.set_price(Market::USStocks, "TSLA", dec!(200));
        assert_eq!(snapshot.state(), SnapshotState::Priced);

        snapshot.total_assets.insert(Currency::USD, dec!(201));
        assert_eq!(snapshot.state(), SnapshotState::Valued);
    }

    // ==================== Serialization ====================

    #[test]
    fn test_snapshot_json_shape() {
        let mut snapshot = Snapshot::new();
        snapshot
            .upsert_holding(Market::AShares, Holding::new("贵州茅台", "600519", dec!(100), dec!(10)))
            .unwrap();

        let json = serde_json::to_value(&snapshot).unwrap();
        let cash_keys: Vec<&String> = json["cash"].as_object().unwrap().keys().collect();
        assert_eq!(cash_keys.len(), 3);
        assert!(json["stocks"]["USStocks"].as_array().unwrap().is_empty());
        assert_eq!(json["stocks"]["AShares"][0]["name"], "贵州茅台");
        assert_eq!(json["stocks"]["AShares"][0]["quantity"], 100.0);
        assert!(json["stocks"]["AShares"][0]["price"].is_null());
        assert!(json["totalAssets"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_null_total_assets_accepted() {
        let text = r#"{
            "cash": {"USD": 10000, "HKD": 10000, "CNY": 10000},
            "stocks": {
                "AShares": [{"name": "贵州茅台", "code": "600519", "quantity": 100, "cost": 10}],
                "USStocks": [],
                "HKStocks": []
            },
            "totalAssets": null
        }"#;
        let snapshot: Snapshot = serde_json::from_str(text).unwrap();
        assert!(snapshot.total_assets.is_empty());
        assert_eq!(snapshot.cash_balance(Currency::CNY), dec!(10000));
        assert_eq!(snapshot.holdings(Market::AShares)[0].price, None);

        let text = r#"{"cash": {}, "stocks": {}, "totalAssets": {"USD": 1.5, "HKD": null}}"#;
        let snapshot: Snapshot = serde_json::from_str(text).unwrap();
        assert_eq!(snapshot.total_assets.len(), 1);
        assert_eq!(snapshot.total_assets[&Currency::USD], dec!(1.5));
    }

    #[test]
    fn test_unknown_market_rejected() {
        let text = r#"{"cash": {}, "stocks": {"JPStocks": []}}"#;
        assert!(serde_json::from_str::<Snapshot>(text).is_err());
    }

    // ==================== Document ====================

    #[test]
    fn test_document_keys_sorted_by_date() {
        let mut document = PortfolioDocument::new();
        document.get_or_create(day(2025, 3, 2));
        document.get_or_create(day(2024, 12, 31));
        document.get_or_create(day(2025, 1, 15));

        assert_eq!(document.latest_date(), Some(day(2025, 3, 2)));

        let json = serde_json::to_value(&document).unwrap();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["2024-12-31", "2025-01-15", "2025-03-02"]);
    }

    #[test]
    fn test_document_round_trip() {
        let mut document = PortfolioDocument::new();
        let snapshot = document.get_or_create(day(2025, 3, 2));
        snapshot.set_cash(Currency::USD, dec!(10000.25)).unwrap();
        snapshot
            .upsert_holding(
                Market::HKStocks,
                Holding::new("腾讯控股", "00700", dec!(100), dec!(100)).with_price(dec!(372.4)),
            )
            .unwrap();

        let text = serde_json::to_string(&document).unwrap();
        let parsed: PortfolioDocument = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, document);
    }

    #[test]
    fn test_document_bad_date_key_rejected() {
        let text = r#"{"2025-13-40": {"cash": {}, "stocks": {}}}"#;
        assert!(serde_json::from_str::<PortfolioDocument>(text).is_err());
    }

    #[test]
    fn test_get_or_create_keeps_existing() {
        let mut document = PortfolioDocument::new();
        document
            .get_or_create(day(2025, 3, 2))
            .set_cash(Currency::CNY, dec!(1))
            .unwrap();
        let again = document.get_or_create(day(2025, 3, 2));
        assert_eq!(again.cash_balance(Currency::CNY), dec!(1));
        assert_eq!(document.len(), 1);
    }
}
