//! Stock lot and inventory models

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One intake batch of a fertilizer, received against a single invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockLot {
    pub id: Uuid,
    #[serde(rename = "fertilizerName")]
    pub product_name: String,
    /// Units left in this lot; only ever decreases after intake
    #[serde(rename = "quantityReceived")]
    pub quantity_remaining: i64,
    pub purchase_date: NaiveDate,
    pub expiry_date: NaiveDate,
    #[serde(rename = "price")]
    pub unit_price: Decimal,
    pub invoice_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StockLot {
    /// Whole days from `today` until expiry (negative once expired)
    pub fn days_until_expiry(&self, today: NaiveDate) -> i64 {
        (self.expiry_date - today).num_days()
    }

    pub fn expiry_status(&self, today: NaiveDate, warning_days: i64) -> ExpiryStatus {
        ExpiryStatus::classify(self.days_until_expiry(today), warning_days)
    }

    pub fn is_depleted(&self) -> bool {
        self.quantity_remaining <= 0
    }
}

/// Shelf-life status of a lot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryStatus {
    Good,
    NearExpiry,
    Expired,
}

impl ExpiryStatus {
    pub fn classify(days_remaining: i64, warning_days: i64) -> Self {
        if days_remaining < 0 {
            ExpiryStatus::Expired
        } else if days_remaining <= warning_days {
            ExpiryStatus::NearExpiry
        } else {
            ExpiryStatus::Good
        }
    }
}

/// Total units on hand for one product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductStock {
    pub name: String,
    pub quantity: i64,
}

/// Sum remaining quantity per product name, ordered by name
pub fn totals_by_product<'a, I>(lots: I) -> Vec<ProductStock>
where
    I: IntoIterator<Item = &'a StockLot>,
{
    let mut totals: BTreeMap<&str, i64> = BTreeMap::new();
    for lot in lots {
        *totals.entry(lot.product_name.as_str()).or_insert(0) += lot.quantity_remaining;
    }
    totals
        .into_iter()
        .map(|(name, quantity)| ProductStock {
            name: name.to_string(),
            quantity,
        })
        .collect()
}

/// Products whose total remaining quantity is at or below `threshold`
pub fn low_stock_products<'a, I>(lots: I, threshold: i64) -> Vec<ProductStock>
where
    I: IntoIterator<Item = &'a StockLot>,
{
    totals_by_product(lots)
        .into_iter()
        .filter(|p| is_low_stock(p.quantity, threshold))
        .collect()
}

pub fn is_low_stock(total_quantity: i64, threshold: i64) -> bool {
    total_quantity <= threshold
}

/// Inventory overview for the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub total_quantity: i64,
    pub total_types: i64,
}

impl InventorySummary {
    pub fn from_lots(lots: &[StockLot]) -> Self {
        let per_product = totals_by_product(lots);
        Self {
            total_quantity: per_product.iter().map(|p| p.quantity).sum(),
            total_types: per_product.len() as i64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn lot(name: &str, qty: i64, expiry: NaiveDate) -> StockLot {
        StockLot {
            id: Uuid::new_v4(),
            product_name: name.to_string(),
            quantity_remaining: qty,
            purchase_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            expiry_date: expiry,
            unit_price: dec!(250.00),
            invoice_number: format!("INV-{}", Uuid::new_v4()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    #[test]
    fn test_expiry_status_boundaries() {
        assert_eq!(ExpiryStatus::classify(-1, 60), ExpiryStatus::Expired);
        assert_eq!(ExpiryStatus::classify(0, 60), ExpiryStatus::NearExpiry);
        assert_eq!(ExpiryStatus::classify(60, 60), ExpiryStatus::NearExpiry);
        assert_eq!(ExpiryStatus::classify(61, 60), ExpiryStatus::Good);
    }

    #[test]
    fn test_lot_days_until_expiry() {
        let l = lot("Urea", 10, day(3, 1));
        assert_eq!(l.days_until_expiry(day(2, 1)), 29);
        assert_eq!(l.expiry_status(day(3, 2), 60), ExpiryStatus::Expired);
    }

    #[test]
    fn test_totals_by_product() {
        let lots = vec![
            lot("Urea", 30, day(12, 1)),
            lot("DAP", 10, day(12, 1)),
            lot("Urea", 40, day(12, 1)),
        ];
        let totals = totals_by_product(&lots);
        assert_eq!(
            totals,
            vec![
                ProductStock { name: "DAP".into(), quantity: 10 },
                ProductStock { name: "Urea".into(), quantity: 70 },
            ]
        );
    }

    #[test]
    fn test_low_stock_threshold_inclusive() {
        let lots = vec![lot("Urea", 50, day(12, 1)), lot("Potash", 51, day(12, 1))];
        let low = low_stock_products(&lots, 50);
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].name, "Urea");
    }

    #[test]
    fn test_inventory_summary() {
        let lots = vec![
            lot("Urea", 30, day(12, 1)),
            lot("Urea", 0, day(12, 1)),
            lot("DAP", 10, day(12, 1)),
        ];
        let summary = InventorySummary::from_lots(&lots);
        assert_eq!(summary.total_quantity, 40);
        assert_eq!(summary.total_types, 2);
    }

    #[test]
    fn test_lot_serializes_with_wire_names() {
        let l = lot("Urea", 5, day(6, 1));
        let json = serde_json::to_value(&l).unwrap();
        assert_eq!(json["fertilizerName"], "Urea");
        assert_eq!(json["quantityReceived"], 5);
        assert_eq!(json["expiryDate"], "2024-06-01");
    }
}
