//! CSV report tests

use chrono::{Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use fertistock_backend::services::reporting::{InventoryCsvRow, ReportingService};
use rust_decimal_macros::dec;
use shared::{start_of_day, Sale, SaleItem, StockLot};
use uuid::Uuid;

fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

fn sale(day: NaiveDate, customer: &str, items: Vec<(&str, i64)>) -> Sale {
    let date = start_of_day(day, utc());
    Sale {
        id: Uuid::new_v4(),
        customer_name: customer.to_string(),
        mobile_number: "9876543210".to_string(),
        items: items
            .into_iter()
            .map(|(name, quantity)| SaleItem {
                product_name: name.to_string(),
                quantity,
                unit_price: dec!(100),
            })
            .collect(),
        subtotal: dec!(100),
        tax_amount: dec!(18),
        total_amount: dec!(118.00),
        date,
        created_at: date,
    }
}

fn lot(name: &str, qty: i64) -> StockLot {
    let purchased = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    StockLot {
        id: Uuid::new_v4(),
        product_name: name.to_string(),
        quantity_remaining: qty,
        purchase_date: purchased,
        expiry_date: purchased + Duration::days(365),
        unit_price: dec!(100),
        invoice_number: format!("INV-{}", Uuid::new_v4()),
        created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, d).unwrap()
    }

    #[test]
    fn test_sales_rows_sorted_by_date() {
        let sales = vec![
            sale(day(27), "Meena", vec![("DAP", 1)]),
            sale(day(26), "Ravi", vec![("Urea", 50), ("DAP", 5)]),
        ];
        let rows = ReportingService::sales_rows(&sales, utc());

        assert_eq!(rows[0].date, "2025-05-26");
        assert_eq!(rows[0].customer, "Ravi");
        assert_eq!(rows[0].items, "Urea (50 units), DAP (5 units)");
        assert_eq!(rows[1].customer, "Meena");
    }

    #[test]
    fn test_sales_csv_layout() {
        let rows = ReportingService::sales_rows(&[sale(day(26), "Ravi", vec![("Urea", 2)])], utc());
        let csv = ReportingService::export_to_csv(&rows).unwrap();
        let mut lines = csv.lines();

        assert_eq!(lines.next(), Some("date,customer,mobile,items,total"));
        assert_eq!(
            lines.next(),
            Some("2025-05-26,Ravi,9876543210,Urea (2 units),118.00")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_items_with_commas_are_quoted() {
        let rows = ReportingService::sales_rows(
            &[sale(day(26), "Ravi", vec![("Urea", 2), ("DAP", 1)])],
            utc(),
        );
        let csv = ReportingService::export_to_csv(&rows).unwrap();
        assert!(csv.contains("\"Urea (2 units), DAP (1 units)\""));
    }

    #[test]
    fn test_inventory_rows_by_name() {
        let rows = ReportingService::inventory_rows(&[
            lot("Urea", 30),
            lot("DAP", 10),
            lot("Urea", 20),
        ]);
        assert_eq!(
            rows,
            vec![
                InventoryCsvRow { name: "DAP".into(), quantity: 10 },
                InventoryCsvRow { name: "Urea".into(), quantity: 50 },
            ]
        );

        let csv = ReportingService::export_to_csv(&rows).unwrap();
        assert_eq!(csv, "name,quantity\nDAP,10\nUrea,50\n");
    }

    #[test]
    fn test_empty_export() {
        let rows: Vec<InventoryCsvRow> = Vec::new();
        assert_eq!(ReportingService::export_to_csv(&rows).unwrap(), "");
    }
}
