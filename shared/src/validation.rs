//! Validation utilities for FertiStock
//!
//! Field-level checks shared by stock intake and billing.

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Most units a single sale line may carry
pub const MAX_SALE_QUANTITY: i64 = 100_000;

/// Highest unit price accepted on a sale
pub const MAX_SALE_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Largest sale total the `NUMERIC(14, 2)` money columns can hold
pub const MAX_SALE_TOTAL: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 2);

/// Validate that a required text field is present and not blank
pub fn validate_required(value: &str) -> Result<(), &'static str> {
    if value.trim().is_empty() {
        return Err("Value is required");
    }
    Ok(())
}

/// Validate a customer mobile number.
/// Accepts: 9876543210, 98765-43210, +91 98765 43210
pub fn validate_mobile_number(mobile: &str) -> Result<(), &'static str> {
    let trimmed = mobile.trim();
    if trimmed.is_empty() {
        return Err("Mobile number is required");
    }

    let body = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if !body
        .chars()
        .all(|c| c.is_ascii_digit() || c == ' ' || c == '-')
    {
        return Err("Mobile number may only contain digits, spaces and dashes");
    }

    let digits = body.chars().filter(|c| c.is_ascii_digit()).count();
    if !(10..=15).contains(&digits) {
        return Err("Mobile number must have 10 to 15 digits");
    }
    Ok(())
}

/// Validate an invoice number (non-blank, no control characters, at most 64 chars)
pub fn validate_invoice_number(invoice: &str) -> Result<(), &'static str> {
    let trimmed = invoice.trim();
    if trimmed.is_empty() {
        return Err("Invoice number is required");
    }
    if trimmed.chars().count() > 64 {
        return Err("Invoice number must be at most 64 characters");
    }
    if trimmed.chars().any(char::is_control) {
        return Err("Invoice number contains invalid characters");
    }
    Ok(())
}

/// Validate a sale line quantity (1 to [`MAX_SALE_QUANTITY`] units)
pub fn validate_quantity(quantity: i64) -> Result<(), &'static str> {
    if quantity <= 0 {
        return Err("Quantity must be positive");
    }
    if quantity > MAX_SALE_QUANTITY {
        return Err("Quantity cannot exceed 100000 units");
    }
    Ok(())
}

/// Validate a unit price charged on a sale: positive, whole cents, at most
/// [`MAX_SALE_PRICE`]
pub fn validate_sale_price(price: Decimal) -> Result<(), &'static str> {
    if price <= Decimal::ZERO {
        return Err("Price must be positive");
    }
    if price > MAX_SALE_PRICE {
        return Err("Price cannot exceed 1000000");
    }
    if price.normalize().scale() > 2 {
        return Err("Price cannot have more than 2 decimal places");
    }
    Ok(())
}

/// Validate a purchase price recorded at intake (zero allowed for free samples)
pub fn validate_purchase_price(price: Decimal) -> Result<(), &'static str> {
    if price < Decimal::ZERO {
        return Err("Price cannot be negative");
    }
    Ok(())
}

/// Validate a lot does not expire before it was purchased
pub fn validate_lot_dates(purchase: NaiveDate, expiry: NaiveDate) -> Result<(), &'static str> {
    if expiry < purchase {
        return Err("Expiry date cannot be before purchase date");
    }
    Ok(())
}
