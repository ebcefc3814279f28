//! Stock intake and inventory service

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::{ExpiryStatus, InventorySummary, ProductStock, StockLot};
use sqlx::PgPool;
use uuid::Uuid;

use super::notification::{CreateNotificationInput, NotificationKind, NotificationService};
use crate::config::InventoryConfig;
use crate::error::{map_unique_violation, AppError, AppResult};
use crate::store::{StockLotRow, STOCK_LOT_COLUMNS};

/// Stock service
#[derive(Clone)]
pub struct StockService {
    db: PgPool,
    inventory: InventoryConfig,
}

/// Input for receiving a new lot
#[derive(Debug, Clone)]
pub struct NewStockLot {
    pub product_name: String,
    pub quantity: i64,
    pub purchase_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub unit_price: Decimal,
    pub invoice_number: String,
}

/// A lot on hand with its shelf-life status
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryEntry {
    #[serde(flatten)]
    pub lot: StockLot,
    pub days_remaining: i64,
    pub status: ExpiryStatus,
}

/// Lots that still hold stock, annotated with days to expiry
pub fn inventory_entries(
    lots: Vec<StockLot>,
    today: NaiveDate,
    warning_days: i64,
) -> Vec<InventoryEntry> {
    lots.into_iter()
        .filter(|l| !l.is_depleted())
        .map(|lot| InventoryEntry {
            days_remaining: lot.days_until_expiry(today),
            status: lot.expiry_status(today, warning_days),
            lot,
        })
        .collect()
}

/// Per-product totals, largest first
pub fn rank_by_quantity(mut totals: Vec<ProductStock>) -> Vec<ProductStock> {
    totals.sort_by(|a, b| b.quantity.cmp(&a.quantity).then_with(|| a.name.cmp(&b.name)));
    totals
}

impl StockService {
    pub fn new(db: PgPool, inventory: InventoryConfig) -> Self {
        Self { db, inventory }
    }

    /// Receive a new lot, then raise the intake and low-stock notifications
    pub async fn add_lot(&self, input: NewStockLot) -> AppResult<StockLot> {
        let row = sqlx::query_as::<_, StockLotRow>(&format!(
            r#"
            INSERT INTO stock_lots (
                product_name, quantity_remaining, purchase_date, expiry_date,
                unit_price, invoice_number
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {STOCK_LOT_COLUMNS}
            "#
        ))
        .bind(input.product_name.trim())
        .bind(input.quantity)
        .bind(input.purchase_date)
        .bind(input.expiry_date)
        .bind(input.unit_price)
        .bind(input.invoice_number.trim())
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_unique_violation(e, "invoiceNumber"))?;

        let lot: StockLot = row.into();
        tracing::info!(
            lot_id = %lot.id,
            product = %lot.product_name,
            quantity = lot.quantity_remaining,
            "Stock lot received"
        );

        let notifications = NotificationService::new(self.db.clone());
        notifications
            .notify(CreateNotificationInput {
                kind: NotificationKind::StockAdded,
                message: format!(
                    "New stock of {} added. Quantity: {} units.",
                    lot.product_name, lot.quantity_remaining
                ),
                product: lot.product_name.clone(),
                details: Some(format!("Invoice: {}", lot.invoice_number)),
            })
            .await;

        match self.product_total(&lot.product_name).await {
            Ok(total) => {
                notifications
                    .raise_low_stock(&lot.product_name, total, self.inventory.low_stock_threshold)
                    .await;
            }
            Err(e) => tracing::warn!("Failed to total stock for {}: {}", lot.product_name, e),
        }

        Ok(lot)
    }

    /// All lots, most recent purchase first
    pub async fn list_lots(&self) -> AppResult<Vec<StockLot>> {
        let rows = sqlx::query_as::<_, StockLotRow>(&format!(
            r#"
            SELECT {STOCK_LOT_COLUMNS}
            FROM stock_lots
            ORDER BY purchase_date DESC, created_at DESC
            "#
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn inventory(&self, today: NaiveDate) -> AppResult<Vec<InventoryEntry>> {
        let lots = self.list_lots().await?;
        Ok(inventory_entries(
            lots,
            today,
            self.inventory.expiry_warning_days,
        ))
    }

    pub async fn summary(&self) -> AppResult<InventorySummary> {
        let (total_quantity, total_types): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(quantity_remaining), 0)::BIGINT,
                COUNT(DISTINCT product_name)
            FROM stock_lots
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        Ok(InventorySummary {
            total_quantity,
            total_types,
        })
    }

    pub async fn by_product(&self) -> AppResult<Vec<ProductStock>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT product_name, COALESCE(SUM(quantity_remaining), 0)::BIGINT
            FROM stock_lots
            GROUP BY product_name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rank_by_quantity(
            rows.into_iter()
                .map(|(name, quantity)| ProductStock { name, quantity })
                .collect(),
        ))
    }

    /// Total units on hand for one product
    pub async fn product_total(&self, product: &str) -> AppResult<i64> {
        let (total,): (i64,) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(quantity_remaining), 0)::BIGINT
            FROM stock_lots
            WHERE product_name = $1
            "#,
        )
        .bind(product)
        .fetch_one(&self.db)
        .await?;

        Ok(total)
    }

    /// Lots purchased on `date`
    pub async fn received_on(&self, date: NaiveDate) -> AppResult<Vec<StockLot>> {
        let rows = sqlx::query_as::<_, StockLotRow>(&format!(
            r#"
            SELECT {STOCK_LOT_COLUMNS}
            FROM stock_lots
            WHERE purchase_date = $1
            ORDER BY created_at ASC
            "#
        ))
        .bind(date)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn delete_lot(&self, id: Uuid) -> AppResult<StockLot> {
        let lot: StockLot = sqlx::query_as::<_, StockLotRow>(&format!(
            "DELETE FROM stock_lots WHERE id = $1 RETURNING {STOCK_LOT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Stock entry".to_string()))?
        .into();

        tracing::info!(lot_id = %lot.id, product = %lot.product_name, "Stock lot deleted");

        NotificationService::new(self.db.clone())
            .notify(CreateNotificationInput {
                kind: NotificationKind::StockDeleted,
                message: format!(
                    "Stock entry for {} (Invoice: {}) was deleted.",
                    lot.product_name, lot.invoice_number
                ),
                product: lot.product_name.clone(),
                details: Some(format!(
                    "Quantity: {} units. Expiry: {}",
                    lot.quantity_remaining, lot.expiry_date
                )),
            })
            .await;

        Ok(lot)
    }
}
