//! Reporting service for CSV exports of sales and inventory

use chrono::FixedOffset;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::{local_date, totals_by_product, Sale, StockLot};

use crate::error::{AppError, AppResult};

/// Reporting service
#[derive(Clone)]
pub struct ReportingService;

/// One line of the sales export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesCsvRow {
    pub date: String,
    pub customer: String,
    pub mobile: String,
    pub items: String,
    pub total: Decimal,
}

/// One line of the inventory export
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryCsvRow {
    pub name: String,
    pub quantity: i64,
}

impl ReportingService {
    /// Sales rows sorted by sale date, dated in the reference offset
    pub fn sales_rows(sales: &[Sale], offset: FixedOffset) -> Vec<SalesCsvRow> {
        let mut sorted: Vec<&Sale> = sales.iter().collect();
        sorted.sort_by_key(|s| (s.date, s.created_at));
        sorted
            .into_iter()
            .map(|sale| SalesCsvRow {
                date: local_date(sale.date, offset).to_string(),
                customer: sale.customer_name.clone(),
                mobile: sale.mobile_number.clone(),
                items: sale.items_summary(),
                total: sale.total_amount,
            })
            .collect()
    }

    /// Per-product quantities sorted by product name
    pub fn inventory_rows(lots: &[StockLot]) -> Vec<InventoryCsvRow> {
        totals_by_product(lots)
            .into_iter()
            .map(|p| InventoryCsvRow {
                name: p.name,
                quantity: p.quantity,
            })
            .collect()
    }

    /// Export data to CSV format
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))
    }
}
