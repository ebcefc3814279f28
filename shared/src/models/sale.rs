//! Sale (point-of-sale billing) models

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tax applied on top of the line-item subtotal (18%)
pub const DEFAULT_TAX_RATE: Decimal = Decimal::from_parts(18, 0, 0, false, 2);

/// One billed line: product, units sold and the price charged per unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    #[serde(rename = "fertilizerName")]
    pub product_name: String,
    pub quantity: i64,
    #[serde(rename = "pricePerUnit")]
    pub unit_price: Decimal,
}

impl SaleItem {
    /// Assumes the item passed sale validation; see [`Self::checked_line_total`]
    pub fn line_total(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }

    pub fn checked_line_total(&self) -> Option<Decimal> {
        Decimal::from(self.quantity).checked_mul(self.unit_price)
    }
}

/// A completed, immutable sales transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: Uuid,
    pub customer_name: String,
    pub mobile_number: String,
    pub items: Vec<SaleItem>,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    /// Tax-inclusive amount charged
    pub total_amount: Decimal,
    /// Start of the sale's calendar day in the reference offset
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Pre-tax value of the goods sold
    pub fn gross_sales(&self) -> Decimal {
        self.items.iter().map(SaleItem::line_total).sum()
    }

    /// "Urea (50 units), DAP (5 units)"
    pub fn items_summary(&self) -> String {
        self.items
            .iter()
            .map(|i| format!("{} ({} units)", i.product_name, i.quantity))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Monetary breakdown of a sale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleTotals {
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
}

impl SaleTotals {
    /// `total = Σ(quantity × unit_price) × (1 + tax_rate)`, rounded to cents.
    ///
    /// `None` when the arithmetic overflows `Decimal`.
    pub fn compute(items: &[SaleItem], tax_rate: Decimal) -> Option<Self> {
        let subtotal = items.iter().try_fold(Decimal::ZERO, |acc, item| {
            acc.checked_add(item.checked_line_total()?)
        })?;
        let total = subtotal
            .checked_mul(Decimal::ONE.checked_add(tax_rate)?)?
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        Some(Self {
            subtotal,
            tax_amount: total.checked_sub(subtotal)?,
            total,
        })
    }
}
