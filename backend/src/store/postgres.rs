//! PostgreSQL implementation of the sale workflow store

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use shared::{Sale, SaleItem, StockLot};
use sqlx::{types::Json, FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{LotStore, NewSale};
use crate::error::AppResult;

/// Column list shared by every stock lot query
pub const STOCK_LOT_COLUMNS: &str = "id, product_name, quantity_remaining, purchase_date, \
     expiry_date, unit_price, invoice_number, created_at, updated_at";

/// Column list shared by every sale query
pub const SALE_COLUMNS: &str = "id, customer_name, mobile_number, items, subtotal, tax_amount, \
     total_amount, sale_date, created_at";

/// Row for stock lot queries
#[derive(Debug, FromRow)]
pub struct StockLotRow {
    pub id: Uuid,
    pub product_name: String,
    pub quantity_remaining: i64,
    pub purchase_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub unit_price: Decimal,
    pub invoice_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<StockLotRow> for StockLot {
    fn from(row: StockLotRow) -> Self {
        StockLot {
            id: row.id,
            product_name: row.product_name,
            quantity_remaining: row.quantity_remaining,
            purchase_date: row.purchase_date,
            expiry_date: row.expiry_date,
            unit_price: row.unit_price,
            invoice_number: row.invoice_number,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Row for sale queries; line items live in a JSONB column
#[derive(Debug, FromRow)]
pub struct SaleRow {
    pub id: Uuid,
    pub customer_name: String,
    pub mobile_number: String,
    pub items: Json<Vec<SaleItem>>,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub sale_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<SaleRow> for Sale {
    fn from(row: SaleRow) -> Self {
        Sale {
            id: row.id,
            customer_name: row.customer_name,
            mobile_number: row.mobile_number,
            items: row.items.0,
            subtotal: row.subtotal,
            tax_amount: row.tax_amount,
            total_amount: row.total_amount,
            date: row.sale_date,
            created_at: row.created_at,
        }
    }
}

/// Transaction-scoped store.
///
/// Lot reads take row locks (`FOR UPDATE`), so a second sale touching the same
/// product waits until this transaction commits or rolls back. Nothing is
/// visible to other connections until [`PgLotStore::commit`]; dropping the
/// store rolls every write back.
pub struct PgLotStore {
    tx: Transaction<'static, Postgres>,
}

impl PgLotStore {
    pub async fn begin(db: &PgPool) -> AppResult<Self> {
        Ok(Self { tx: db.begin().await? })
    }

    pub async fn commit(self) -> AppResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl LotStore for PgLotStore {
    async fn find_lots_by_product(
        &mut self,
        product: &str,
        min_quantity: i64,
    ) -> AppResult<Vec<StockLot>> {
        let rows = sqlx::query_as::<_, StockLotRow>(&format!(
            r#"
            SELECT {STOCK_LOT_COLUMNS}
            FROM stock_lots
            WHERE product_name = $1 AND quantity_remaining >= $2
            ORDER BY id
            FOR UPDATE
            "#
        ))
        .bind(product)
        .bind(min_quantity)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_lots_by_product_fifo(&mut self, product: &str) -> AppResult<Vec<StockLot>> {
        let rows = sqlx::query_as::<_, StockLotRow>(&format!(
            r#"
            SELECT {STOCK_LOT_COLUMNS}
            FROM stock_lots
            WHERE product_name = $1 AND quantity_remaining > 0
            ORDER BY purchase_date ASC, created_at ASC
            FOR UPDATE
            "#
        ))
        .bind(product)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn save_lot(&mut self, lot: &StockLot) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE stock_lots
            SET quantity_remaining = $1, updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(lot.quantity_remaining)
        .bind(lot.id)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn create_sale(&mut self, sale: NewSale) -> AppResult<Sale> {
        let row = sqlx::query_as::<_, SaleRow>(&format!(
            r#"
            INSERT INTO sales (
                customer_name, mobile_number, items, subtotal, tax_amount, total_amount, sale_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {SALE_COLUMNS}
            "#
        ))
        .bind(&sale.customer_name)
        .bind(&sale.mobile_number)
        .bind(Json(&sale.items))
        .bind(sale.subtotal)
        .bind(sale.tax_amount)
        .bind(sale.total_amount)
        .bind(sale.date)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(row.into())
    }
}
