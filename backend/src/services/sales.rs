//! Sales service: billing with FIFO stock deduction, and sales queries
//!
//! Recording a sale happens in two passes over one [`LotStore`]. The
//! validation pass checks every product's aggregate stock before anything is
//! written; the deduction pass then consumes lots oldest purchase first. With
//! [`PgLotStore`] both passes share a single transaction whose row locks
//! serialize concurrent sales of the same product.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::{fifo, local_date, start_of_day, DateRange, DayWindow, Sale, SaleItem, SaleTotals};
use sqlx::PgPool;

use super::notification::NotificationService;
use super::stock::StockService;
use crate::config::{Config, InventoryConfig, SalesConfig};
use crate::error::{AppError, AppResult};
use crate::store::{LotStore, NewSale, PgLotStore, SaleRow, SALE_COLUMNS};

/// Days covered by the weekly sales view, today included
pub const WEEKLY_DAYS: u32 = 7;

/// A checkout as submitted by the billing counter
#[derive(Debug, Clone)]
pub struct SaleDraft {
    pub customer_name: String,
    pub mobile_number: String,
    pub items: Vec<SaleItem>,
}

/// Pre-tax sales on one calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySales {
    pub date: NaiveDate,
    pub total_sales: Decimal,
}

/// Validate stock, deduct it FIFO and persist the sale through `store`.
///
/// No lot is written unless every product in the draft can be covered. The
/// caller owns the transaction: on any error it must discard `store` so
/// deductions already applied are rolled back.
pub async fn process_sale<S>(
    store: &mut S,
    draft: &SaleDraft,
    tax_rate: Decimal,
    date: DateTime<Utc>,
) -> AppResult<Sale>
where
    S: LotStore + ?Sized,
{
    check_items(&draft.items)?;
    let demand = fifo::demand_by_product(&draft.items)?;
    let totals = sale_totals(&draft.items, tax_rate)?;

    // Products are visited in name order so row locks are always taken in
    // the same order.
    for (product, requested) in demand {
        let lots = store.find_lots_by_product(product, 1).await?;
        fifo::ensure_available(product, &lots, requested)?;
    }

    for item in &draft.items {
        let mut lots = store.find_lots_by_product_fifo(&item.product_name).await?;
        let plan = fifo::plan_deductions(&item.product_name, &lots, item.quantity)?;
        for lot in fifo::apply_deductions(&mut lots, &plan) {
            store.save_lot(&lot).await?;
        }
        tracing::debug!(
            product = %item.product_name,
            quantity = item.quantity,
            lots = plan.len(),
            "Stock deducted"
        );
    }

    store
        .create_sale(NewSale {
            customer_name: draft.customer_name.trim().to_string(),
            mobile_number: draft.mobile_number.trim().to_string(),
            items: draft.items.clone(),
            subtotal: totals.subtotal,
            tax_amount: totals.tax_amount,
            total_amount: totals.total,
            date,
        })
        .await
}

fn check_items(items: &[SaleItem]) -> AppResult<()> {
    if items.is_empty() {
        return Err(AppError::MissingField("items".to_string()));
    }
    for (idx, item) in items.iter().enumerate() {
        if item.product_name.trim().is_empty() {
            return Err(AppError::MissingField(format!("items[{}].name", idx)));
        }
        shared::validate_quantity(item.quantity).map_err(|m| AppError::Validation {
            field: format!("items[{}].quantity", idx),
            message: m.to_string(),
        })?;
        shared::validate_sale_price(item.unit_price).map_err(|m| AppError::Validation {
            field: format!("items[{}].price", idx),
            message: m.to_string(),
        })?;
    }
    Ok(())
}

/// Totals for `items`, rejected when they would not fit the money columns
fn sale_totals(items: &[SaleItem], tax_rate: Decimal) -> AppResult<SaleTotals> {
    SaleTotals::compute(items, tax_rate)
        .filter(|totals| totals.total <= shared::MAX_SALE_TOTAL)
        .ok_or_else(|| AppError::Validation {
            field: "items".to_string(),
            message: "Sale total is too large to record".to_string(),
        })
}

/// Sum of pre-tax line totals across `sales`
pub fn gross_total(sales: &[Sale]) -> Decimal {
    sales.iter().map(Sale::gross_sales).sum()
}

/// Group pre-tax totals by the sale's calendar day in `offset`, ascending.
/// Days without sales are omitted.
pub fn daily_totals(sales: &[Sale], offset: chrono::FixedOffset) -> Vec<DailySales> {
    let mut by_day: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for sale in sales {
        *by_day
            .entry(local_date(sale.date, offset))
            .or_insert(Decimal::ZERO) += sale.gross_sales();
    }
    by_day
        .into_iter()
        .map(|(date, total_sales)| DailySales { date, total_sales })
        .collect()
}

/// Sales service
#[derive(Clone)]
pub struct SalesService {
    db: PgPool,
    sales: SalesConfig,
    inventory: InventoryConfig,
}

impl SalesService {
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            sales: config.sales.clone(),
            inventory: config.inventory.clone(),
        }
    }

    /// Today's date in the reference offset
    pub fn today(&self) -> AppResult<NaiveDate> {
        Ok(local_date(Utc::now(), self.sales.day_offset()?))
    }

    /// Record a sale dated `date` (today when absent) in one transaction
    pub async fn record_sale(&self, draft: SaleDraft, date: Option<NaiveDate>) -> AppResult<Sale> {
        let offset = self.sales.day_offset()?;
        let day = match date {
            Some(day) => day,
            None => self.today()?,
        };
        let sale_date = start_of_day(day, offset);

        let mut store = PgLotStore::begin(&self.db).await?;
        let sale = process_sale(&mut store, &draft, self.sales.tax_rate, sale_date).await?;
        store.commit().await?;

        tracing::info!(
            sale_id = %sale.id,
            items = sale.items.len(),
            total = %sale.total_amount,
            "Sale recorded"
        );

        self.flag_low_stock(&sale).await;
        Ok(sale)
    }

    /// Raise low-stock notifications for products the sale drew down
    async fn flag_low_stock(&self, sale: &Sale) {
        let stock = StockService::new(self.db.clone(), self.inventory.clone());
        let notifications = NotificationService::new(self.db.clone());
        let products: BTreeSet<&str> =
            sale.items.iter().map(|i| i.product_name.as_str()).collect();
        for product in products {
            match stock.product_total(product).await {
                Ok(total) => {
                    notifications
                        .raise_low_stock(product, total, self.inventory.low_stock_threshold)
                        .await;
                }
                Err(e) => tracing::warn!("Failed to total stock for {}: {}", product, e),
            }
        }
    }

    /// Sales whose date falls inside `window`, oldest first
    pub async fn sales_in(&self, window: DayWindow) -> AppResult<Vec<Sale>> {
        let rows = sqlx::query_as::<_, SaleRow>(&format!(
            r#"
            SELECT {SALE_COLUMNS}
            FROM sales
            WHERE sale_date >= $1 AND sale_date < $2
            ORDER BY sale_date ASC, created_at ASC
            "#
        ))
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn all_sales(&self) -> AppResult<Vec<Sale>> {
        let rows = sqlx::query_as::<_, SaleRow>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales ORDER BY sale_date ASC, created_at ASC"
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Pre-tax total of today's sales
    pub async fn today_total(&self) -> AppResult<Decimal> {
        let window = DayWindow::for_day(self.today()?, self.sales.day_offset()?);
        let sales = self.sales_in(window).await?;
        Ok(gross_total(&sales))
    }

    /// Daily pre-tax totals for the last seven days, today included
    pub async fn weekly(&self) -> AppResult<Vec<DailySales>> {
        let offset = self.sales.day_offset()?;
        let range = DateRange::trailing_days(self.today()?, WEEKLY_DAYS);
        let sales = self.sales_in(range.to_window(offset)).await?;
        Ok(daily_totals(&sales, offset))
    }

    /// Sales recorded on `date`; `NotFound` when there are none
    pub async fn report_by_date(&self, date: NaiveDate) -> AppResult<Vec<Sale>> {
        let window = DayWindow::for_day(date, self.sales.day_offset()?);
        let sales = self.sales_in(window).await?;
        if sales.is_empty() {
            return Err(AppError::NotFound(format!("Sales for {}", date)));
        }
        Ok(sales)
    }
}
