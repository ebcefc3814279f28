//! HTTP handlers for stock intake and inventory endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{InventorySummary, ProductStock, StockLot};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::{today, DateQuery};
use crate::error::{AppError, AppResult};
use crate::middleware::validation::{field_rule, is_blank};
use crate::middleware::{RequiredFields, ValidatedJson};
use crate::services::stock::{InventoryEntry, NewStockLot};
use crate::services::StockService;
use crate::AppState;

/// A lot received against a purchase invoice
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddStockRequest {
    #[validate(length(max = 100, message = "Fertilizer name cannot exceed 100 characters"))]
    pub fertilizer_name: Option<String>,
    #[validate(range(min = 1, message = "Quantity must be positive"))]
    pub quantity_received: Option<i64>,
    pub purchase_date: Option<NaiveDate>,
    #[validate(custom = "valid_invoice_number")]
    pub invoice_number: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    #[validate(custom = "valid_purchase_price")]
    pub price: Option<Decimal>,
}

fn valid_invoice_number(value: &str) -> Result<(), ValidationError> {
    field_rule(shared::validate_invoice_number(value))
}

fn valid_purchase_price(value: &Decimal) -> Result<(), ValidationError> {
    field_rule(shared::validate_purchase_price(*value))
}

impl RequiredFields for AddStockRequest {
    fn missing_field(&self) -> Option<String> {
        let missing = if is_blank(&self.fertilizer_name) {
            "fertilizerName"
        } else if self.quantity_received.is_none() {
            "quantityReceived"
        } else if self.purchase_date.is_none() {
            "purchaseDate"
        } else if is_blank(&self.invoice_number) {
            "invoiceNumber"
        } else if self.expiry_date.is_none() {
            "expiryDate"
        } else if self.price.is_none() {
            "price"
        } else {
            return None;
        };
        Some(missing.to_string())
    }
}

impl TryFrom<AddStockRequest> for NewStockLot {
    type Error = AppError;

    fn try_from(req: AddStockRequest) -> AppResult<Self> {
        let (
            Some(product_name),
            Some(quantity),
            Some(purchase_date),
            Some(invoice_number),
            Some(expiry_date),
            Some(unit_price),
        ) = (
            req.fertilizer_name,
            req.quantity_received,
            req.purchase_date,
            req.invoice_number,
            req.expiry_date,
            req.price,
        ) else {
            return Err(AppError::ValidationError(
                "All stock fields are required".to_string(),
            ));
        };

        shared::validate_lot_dates(purchase_date, expiry_date).map_err(|m| {
            AppError::Validation {
                field: "expiryDate".to_string(),
                message: m.to_string(),
            }
        })?;

        Ok(NewStockLot {
            product_name,
            quantity,
            purchase_date,
            expiry_date,
            unit_price,
            invoice_number,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct AddStockResponse {
    pub message: &'static str,
    pub lot: StockLot,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteStockResponse {
    pub message: &'static str,
    pub deleted_item: StockLot,
}

fn stock_service(state: AppState) -> StockService {
    StockService::new(state.db, state.config.inventory.clone())
}

/// Receive a new stock lot
pub async fn add_stock(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<AddStockRequest>,
) -> AppResult<(StatusCode, Json<AddStockResponse>)> {
    let input = NewStockLot::try_from(request)?;
    let lot = stock_service(state).add_lot(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(AddStockResponse {
            message: "Stock added successfully",
            lot,
        }),
    ))
}

/// List every lot, depleted ones included
pub async fn list_stock(State(state): State<AppState>) -> AppResult<Json<Vec<StockLot>>> {
    Ok(Json(stock_service(state).list_lots().await?))
}

/// Lots on hand with days to expiry and status
pub async fn inventory(State(state): State<AppState>) -> AppResult<Json<Vec<InventoryEntry>>> {
    let today = today(&state)?;
    Ok(Json(stock_service(state).inventory(today).await?))
}

pub async fn stock_summary(State(state): State<AppState>) -> AppResult<Json<InventorySummary>> {
    Ok(Json(stock_service(state).summary().await?))
}

/// Total quantity per product, largest first
pub async fn stock_by_product(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ProductStock>>> {
    Ok(Json(stock_service(state).by_product().await?))
}

/// Lots purchased on `?date=YYYY-MM-DD`
pub async fn stock_received(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> AppResult<Json<Vec<StockLot>>> {
    let date = query.required_day()?;
    Ok(Json(stock_service(state).received_on(date).await?))
}

pub async fn delete_stock(
    State(state): State<AppState>,
    Path(lot_id): Path<Uuid>,
) -> AppResult<Json<DeleteStockResponse>> {
    let deleted_item = stock_service(state).delete_lot(lot_id).await?;
    Ok(Json(DeleteStockResponse {
        message: "Stock entry deleted successfully",
        deleted_item,
    }))
}
