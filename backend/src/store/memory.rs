//! In-memory store for tests and local experiments

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use shared::{fifo, Sale, StockLot};
use tokio::sync::OwnedMutexGuard;
use uuid::Uuid;

use super::{LotStore, NewSale};
use crate::error::{AppError, AppResult};

#[derive(Debug, Default)]
struct State {
    lots: Vec<StockLot>,
    sales: Vec<Sale>,
    lot_saves: usize,
    fail_saves_after: Option<usize>,
}

/// Shared in-memory lots and sales.
///
/// Clones share the same underlying state, so a test can keep one handle for
/// assertions while sales run through [`InMemoryStore::begin`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
    writer: Arc<tokio::sync::Mutex<()>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lots(lots: Vec<StockLot>) -> Self {
        let store = Self::new();
        store.lock().lots = lots;
        store
    }

    /// Start a transaction. Only one transaction runs at a time; the next
    /// `begin` waits until the current one commits or is dropped.
    pub async fn begin(&self) -> InMemoryTransaction {
        InMemoryTransaction {
            store: self.clone(),
            _writer: Arc::clone(&self.writer).lock_owned().await,
            staged_lots: Vec::new(),
            staged_sales: Vec::new(),
        }
    }

    pub fn lots(&self) -> Vec<StockLot> {
        self.lock().lots.clone()
    }

    pub fn lot(&self, id: Uuid) -> Option<StockLot> {
        self.lock().lots.iter().find(|l| l.id == id).cloned()
    }

    pub fn sales(&self) -> Vec<Sale> {
        self.lock().sales.clone()
    }

    /// Number of lot updates staged so far, committed or not
    pub fn lot_saves(&self) -> usize {
        self.lock().lot_saves
    }

    /// Make every `save_lot` after the first `n` fail with a storage error
    pub fn fail_saves_after(&self, n: usize) {
        self.lock().fail_saves_after = Some(n);
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A panic while holding the lock only happens inside a failing test.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Writes staged against an [`InMemoryStore`].
///
/// Reads see staged lot updates; nothing reaches the store until
/// [`commit`](Self::commit). Dropping the transaction discards it.
#[derive(Debug)]
pub struct InMemoryTransaction {
    store: InMemoryStore,
    _writer: OwnedMutexGuard<()>,
    staged_lots: Vec<StockLot>,
    staged_sales: Vec<Sale>,
}

impl InMemoryTransaction {
    pub fn commit(self) {
        let mut state = self.store.lock();
        for staged in self.staged_lots {
            if let Some(stored) = state.lots.iter_mut().find(|l| l.id == staged.id) {
                *stored = staged;
            }
        }
        state.sales.extend(self.staged_sales);
    }

    /// Lots of `product` as this transaction sees them
    fn visible_lots(&self, product: &str) -> Vec<StockLot> {
        self.store
            .lock()
            .lots
            .iter()
            .filter(|l| l.product_name == product)
            .map(|l| {
                self.staged_lots
                    .iter()
                    .find(|s| s.id == l.id)
                    .unwrap_or(l)
                    .clone()
            })
            .collect()
    }
}

#[async_trait]
impl LotStore for InMemoryTransaction {
    async fn find_lots_by_product(
        &mut self,
        product: &str,
        min_quantity: i64,
    ) -> AppResult<Vec<StockLot>> {
        let mut lots = self.visible_lots(product);
        lots.retain(|l| l.quantity_remaining >= min_quantity);
        Ok(lots)
    }

    async fn find_lots_by_product_fifo(&mut self, product: &str) -> AppResult<Vec<StockLot>> {
        let mut lots = self.visible_lots(product);
        lots.retain(|l| l.quantity_remaining > 0);
        fifo::sort_fifo(&mut lots);
        Ok(lots)
    }

    async fn save_lot(&mut self, lot: &StockLot) -> AppResult<()> {
        {
            let mut state = self.store.lock();
            if let Some(limit) = state.fail_saves_after {
                if state.lot_saves >= limit {
                    return Err(AppError::DatabaseError(sqlx::Error::PoolTimedOut));
                }
            }
            if !state.lots.iter().any(|l| l.id == lot.id) {
                return Err(AppError::NotFound("Stock lot".to_string()));
            }
            state.lot_saves += 1;
        }

        let mut updated = lot.clone();
        updated.updated_at = Utc::now();
        match self.staged_lots.iter_mut().find(|l| l.id == lot.id) {
            Some(staged) => *staged = updated,
            None => self.staged_lots.push(updated),
        }
        Ok(())
    }

    async fn create_sale(&mut self, sale: NewSale) -> AppResult<Sale> {
        let sale = Sale {
            id: Uuid::new_v4(),
            customer_name: sale.customer_name,
            mobile_number: sale.mobile_number,
            items: sale.items,
            subtotal: sale.subtotal,
            tax_amount: sale.tax_amount,
            total_amount: sale.total_amount,
            date: sale.date,
            created_at: Utc::now(),
        };
        self.staged_sales.push(sale.clone());
        Ok(sale)
    }
}
