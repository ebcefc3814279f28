//! FIFO stock allocation
//!
//! Pure planning logic for consuming stock lots oldest-first. The backend
//! applies the resulting plan inside a database transaction; keeping the
//! arithmetic here lets the same rules be exercised without a database.

use std::collections::BTreeMap;

use thiserror::Error;
use uuid::Uuid;

use crate::models::{SaleItem, StockLot};

/// Requested quantity exceeds what the lots of a product can supply
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Insufficient stock for {product}. Requested: {requested}, Available: {available}")]
pub struct Shortfall {
    pub product: String,
    pub requested: i64,
    pub available: i64,
}

/// Summed demand for one product does not fit in an `i64`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Total quantity requested for {product} is too large")]
pub struct DemandOverflow {
    pub product: String,
}

/// Quantity taken from a single lot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LotDeduction {
    pub lot_id: Uuid,
    pub quantity_before: i64,
    pub deducted: i64,
}

impl LotDeduction {
    pub fn quantity_after(&self) -> i64 {
        self.quantity_before - self.deducted
    }
}

/// Total units demanded per product, summed across line items.
///
/// A `BTreeMap` keeps products in a stable order, which the backend relies on
/// to take row locks in the same order for every sale.
pub fn demand_by_product(items: &[SaleItem]) -> Result<BTreeMap<&str, i64>, DemandOverflow> {
    let mut demand: BTreeMap<&str, i64> = BTreeMap::new();
    for item in items {
        let total = demand.entry(item.product_name.as_str()).or_insert(0);
        *total = total.checked_add(item.quantity).ok_or_else(|| DemandOverflow {
            product: item.product_name.clone(),
        })?;
    }
    Ok(demand)
}

/// Units available across lots that still hold stock, saturating at `i64::MAX`
pub fn available_quantity(lots: &[StockLot]) -> i64 {
    lots.iter()
        .filter(|l| l.quantity_remaining > 0)
        .fold(0i64, |acc, l| acc.saturating_add(l.quantity_remaining))
}

/// Fail with a [`Shortfall`] unless `lots` can cover `requested`
pub fn ensure_available(product: &str, lots: &[StockLot], requested: i64) -> Result<(), Shortfall> {
    let available = available_quantity(lots);
    if available < requested {
        return Err(Shortfall {
            product: product.to_string(),
            requested,
            available,
        });
    }
    Ok(())
}

/// Order lots oldest purchase first; ties keep intake order
pub fn sort_fifo(lots: &mut [StockLot]) {
    lots.sort_by(|a, b| {
        a.purchase_date
            .cmp(&b.purchase_date)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
}

/// Plan the deductions needed to take `requested` units from `lots`.
///
/// `lots` must already be in FIFO order. Lots without stock are skipped and
/// the walk stops as soon as the request is covered, so later lots are never
/// touched. A plan that cannot be covered yields a [`Shortfall`] and nothing
/// else.
pub fn plan_deductions(
    product: &str,
    lots: &[StockLot],
    requested: i64,
) -> Result<Vec<LotDeduction>, Shortfall> {
    ensure_available(product, lots, requested)?;

    let mut still_needed = requested;
    let mut plan = Vec::new();
    for lot in lots {
        if still_needed == 0 {
            break;
        }
        if lot.quantity_remaining <= 0 {
            continue;
        }
        let take = lot.quantity_remaining.min(still_needed);
        plan.push(LotDeduction {
            lot_id: lot.id,
            quantity_before: lot.quantity_remaining,
            deducted: take,
        });
        still_needed -= take;
    }
    Ok(plan)
}

/// Apply a plan to the matching lots in place, returning the lots that changed
pub fn apply_deductions(lots: &mut [StockLot], plan: &[LotDeduction]) -> Vec<StockLot> {
    let mut changed = Vec::with_capacity(plan.len());
    for step in plan {
        if let Some(lot) = lots.iter_mut().find(|l| l.id == step.lot_id) {
            lot.quantity_remaining -= step.deducted;
            changed.push(lot.clone());
        }
    }
    changed
}
