//! Stock intake and inventory tests
//!
//! Tests for:
//! - Intake request checks (required fields, quantities, dates, invoices)
//! - Inventory listing with expiry status
//! - Per-product ranking

use chrono::{Duration, NaiveDate, Utc};
use fertistock_backend::handlers::AddStockRequest;
use fertistock_backend::middleware::RequiredFields;
use fertistock_backend::services::stock::{inventory_entries, rank_by_quantity, NewStockLot};
use fertistock_backend::AppError;
use proptest::prelude::*;
use rust_decimal_macros::dec;
use serde_json::json;
use shared::{ExpiryStatus, ProductStock, StockLot};
use uuid::Uuid;
use validator::Validate;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn lot(name: &str, qty: i64, expiry: NaiveDate) -> StockLot {
    StockLot {
        id: Uuid::new_v4(),
        product_name: name.to_string(),
        quantity_remaining: qty,
        purchase_date: date(2025, 1, 1),
        expiry_date: expiry,
        unit_price: dec!(266.50),
        invoice_number: format!("INV-{}", Uuid::new_v4()),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn request(body: serde_json::Value) -> AddStockRequest {
    serde_json::from_value(body).unwrap()
}

fn valid_body() -> serde_json::Value {
    json!({
        "fertilizerName": "Urea",
        "quantityReceived": 100,
        "purchaseDate": "2025-01-01",
        "invoiceNumber": "INV-001",
        "expiryDate": "2026-01-01",
        "price": 266.5
    })
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_valid_request_converts() {
        let req = request(valid_body());
        assert!(req.missing_field().is_none());
        assert!(req.validate().is_ok());

        let input = NewStockLot::try_from(req).unwrap();
        assert_eq!(input.product_name, "Urea");
        assert_eq!(input.quantity, 100);
        assert_eq!(input.unit_price, dec!(266.5));
        assert_eq!(input.expiry_date, date(2026, 1, 1));
    }

    #[test]
    fn test_missing_fields_reported_in_order() {
        let mut body = valid_body();
        body.as_object_mut().unwrap().remove("invoiceNumber");
        assert_eq!(request(body).missing_field().as_deref(), Some("invoiceNumber"));

        let mut body = valid_body();
        body["fertilizerName"] = json!("   ");
        assert_eq!(request(body).missing_field().as_deref(), Some("fertilizerName"));

        assert_eq!(
            request(json!({})).missing_field().as_deref(),
            Some("fertilizerName")
        );
    }

    #[test]
    fn test_zero_price_is_allowed() {
        let mut body = valid_body();
        body["price"] = json!(0);
        let req = request(body);
        assert!(req.missing_field().is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_negative_price_rejected() {
        let mut body = valid_body();
        body["price"] = json!(-1);
        assert!(request(body).validate().is_err());
    }

    #[test]
    fn test_non_positive_quantity_rejected() {
        let mut body = valid_body();
        body["quantityReceived"] = json!(0);
        let errors = request(body).validate().unwrap_err();
        let err: AppError = errors.into();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "quantityReceived"));
    }

    #[test]
    fn test_expiry_before_purchase_rejected() {
        let mut body = valid_body();
        body["expiryDate"] = json!("2024-12-31");
        let err = NewStockLot::try_from(request(body)).unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "expiryDate"));
    }

    #[test]
    fn test_overlong_invoice_rejected() {
        let mut body = valid_body();
        body["invoiceNumber"] = json!("X".repeat(65));
        assert!(request(body).validate().is_err());
    }

    #[test]
    fn test_inventory_entries_skip_depleted_lots() {
        let today = date(2025, 6, 1);
        let lots = vec![
            lot("Urea", 10, today + Duration::days(200)),
            lot("DAP", 0, today + Duration::days(200)),
        ];
        let entries = inventory_entries(lots, today, 60);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].lot.product_name, "Urea");
        assert_eq!(entries[0].days_remaining, 200);
        assert_eq!(entries[0].status, ExpiryStatus::Good);
    }

    #[test]
    fn test_inventory_entry_statuses() {
        let today = date(2025, 6, 1);
        let lots = vec![
            lot("Urea", 10, today + Duration::days(60)),
            lot("DAP", 10, today - Duration::days(1)),
            lot("Zinc", 10, today),
        ];
        let statuses: Vec<_> = inventory_entries(lots, today, 60)
            .into_iter()
            .map(|e| e.status)
            .collect();
        assert_eq!(
            statuses,
            vec![
                ExpiryStatus::NearExpiry,
                ExpiryStatus::Expired,
                ExpiryStatus::NearExpiry
            ]
        );
    }

    #[test]
    fn test_inventory_entry_serializes_flat() {
        let today = date(2025, 6, 1);
        let entries = inventory_entries(vec![lot("Urea", 10, today)], today, 60);
        let json = serde_json::to_value(&entries[0]).unwrap();
        assert_eq!(json["fertilizerName"], "Urea");
        assert_eq!(json["quantityReceived"], 10);
        assert_eq!(json["daysRemaining"], 0);
        assert_eq!(json["status"], "near_expiry");
    }

    #[test]
    fn test_rank_by_quantity_descending() {
        let ranked = rank_by_quantity(vec![
            ProductStock { name: "DAP".into(), quantity: 5 },
            ProductStock { name: "Urea".into(), quantity: 70 },
            ProductStock { name: "Potash".into(), quantity: 5 },
        ]);
        let names: Vec<_> = ranked.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Urea", "DAP", "Potash"]);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #[test]
        fn prop_ranking_is_sorted_and_complete(
            quantities in prop::collection::vec(0i64..1000, 0..20),
        ) {
            let totals: Vec<ProductStock> = quantities
                .iter()
                .enumerate()
                .map(|(i, q)| ProductStock { name: format!("P{:02}", i), quantity: *q })
                .collect();
            let ranked = rank_by_quantity(totals.clone());

            prop_assert_eq!(ranked.len(), totals.len());
            prop_assert!(ranked.windows(2).all(|w| w[0].quantity >= w[1].quantity));
        }

        #[test]
        fn prop_inventory_days_match_expiry(offset in -400i64..400) {
            let today = date(2025, 6, 1);
            let entries = inventory_entries(
                vec![lot("Urea", 1, today + Duration::days(offset))],
                today,
                60,
            );
            prop_assert_eq!(entries[0].days_remaining, offset);
            prop_assert_eq!(entries[0].status == ExpiryStatus::Expired, offset < 0);
        }
    }
}
