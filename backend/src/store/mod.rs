//! Storage seam for the sale workflow
//!
//! The sale service talks to stock lots and sales only through [`LotStore`],
//! so the same deduction logic runs inside a PostgreSQL transaction in
//! production and against [`InMemoryStore`] in tests.

mod memory;
mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::{Sale, SaleItem, StockLot};

use crate::error::AppResult;

pub use memory::{InMemoryStore, InMemoryTransaction};
pub use postgres::{PgLotStore, SaleRow, StockLotRow, SALE_COLUMNS, STOCK_LOT_COLUMNS};

/// A sale ready to be persisted
#[derive(Debug, Clone)]
pub struct NewSale {
    pub customer_name: String,
    pub mobile_number: String,
    pub items: Vec<SaleItem>,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub date: DateTime<Utc>,
}

/// Stock lot and sale persistence used while recording a sale
#[async_trait]
pub trait LotStore: Send {
    /// Lots of `product` holding at least `min_quantity` units
    async fn find_lots_by_product(
        &mut self,
        product: &str,
        min_quantity: i64,
    ) -> AppResult<Vec<StockLot>>;

    /// Lots of `product` that still hold stock, oldest purchase first
    async fn find_lots_by_product_fifo(&mut self, product: &str) -> AppResult<Vec<StockLot>>;

    /// Persist the current quantity of `lot`
    async fn save_lot(&mut self, lot: &StockLot) -> AppResult<()>;

    async fn create_sale(&mut self, sale: NewSale) -> AppResult<Sale>;
}
