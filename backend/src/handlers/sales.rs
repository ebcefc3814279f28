//! HTTP handlers for billing and sales queries

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{Sale, SaleItem};
use validator::{Validate, ValidationError};

use super::DateQuery;
use crate::error::{AppError, AppResult};
use crate::middleware::validation::{field_rule, is_blank};
use crate::middleware::{RequiredFields, ValidatedJson};
use crate::services::sales::{DailySales, SaleDraft};
use crate::services::SalesService;
use crate::AppState;

/// Checkout submitted by the billing counter
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecordSaleRequest {
    #[validate(length(max = 200, message = "Customer name cannot exceed 200 characters"))]
    pub customer_name: Option<String>,
    #[validate(custom = "valid_mobile_number")]
    pub mobile_number: Option<String>,
    #[validate]
    pub items: Option<Vec<SaleItemRequest>>,
    /// `YYYY-MM-DD`; today when absent
    pub date: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SaleItemRequest {
    pub name: Option<String>,
    #[validate(range(min = 1, max = 100000, message = "Quantity must be between 1 and 100000"))]
    pub quantity: Option<i64>,
    #[validate(custom = "valid_sale_price")]
    pub price: Option<Decimal>,
}

fn valid_mobile_number(value: &str) -> Result<(), ValidationError> {
    field_rule(shared::validate_mobile_number(value))
}

fn valid_sale_price(value: &Decimal) -> Result<(), ValidationError> {
    field_rule(shared::validate_sale_price(*value))
}

impl RequiredFields for RecordSaleRequest {
    fn missing_field(&self) -> Option<String> {
        if is_blank(&self.customer_name) {
            return Some("customerName".into());
        }
        if is_blank(&self.mobile_number) {
            return Some("mobileNumber".into());
        }
        let items = match &self.items {
            Some(items) if !items.is_empty() => items,
            _ => return Some("items".into()),
        };
        items.iter().enumerate().find_map(|(idx, item)| {
            if is_blank(&item.name) {
                Some(format!("items[{}].name", idx))
            } else if item.quantity.is_none() {
                Some(format!("items[{}].quantity", idx))
            } else if item.price.is_none() {
                Some(format!("items[{}].price", idx))
            } else {
                None
            }
        })
    }
}

impl RecordSaleRequest {
    /// Split into the sale draft and the requested day
    fn into_parts(self) -> AppResult<(SaleDraft, Option<chrono::NaiveDate>)> {
        let date = match self.date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(shared::parse_day(raw).ok_or_else(|| AppError::Validation {
                field: "date".to_string(),
                message: "Date must be in YYYY-MM-DD format".to_string(),
            })?),
        };

        let items = self
            .items
            .unwrap_or_default()
            .into_iter()
            .map(|item| SaleItem {
                product_name: item.name.unwrap_or_default().trim().to_string(),
                quantity: item.quantity.unwrap_or_default(),
                unit_price: item.price.unwrap_or_default(),
            })
            .collect();

        let draft = SaleDraft {
            customer_name: self.customer_name.unwrap_or_default(),
            mobile_number: self.mobile_number.unwrap_or_default(),
            items,
        };
        Ok((draft, date))
    }
}

#[derive(Debug, Serialize)]
pub struct RecordSaleResponse {
    pub message: &'static str,
    pub sale: Sale,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodaySalesResponse {
    pub total_sales: Decimal,
}

/// Record a sale, deducting stock FIFO
pub async fn record_sale(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RecordSaleRequest>,
) -> AppResult<(StatusCode, Json<RecordSaleResponse>)> {
    let (draft, date) = request.into_parts()?;
    let service = SalesService::new(state.db, &state.config);
    let sale = service.record_sale(draft, date).await?;
    Ok((
        StatusCode::CREATED,
        Json(RecordSaleResponse {
            message: "Sale recorded successfully",
            sale,
        }),
    ))
}

/// Pre-tax sales total for today
pub async fn today_sales(State(state): State<AppState>) -> AppResult<Json<TodaySalesResponse>> {
    let service = SalesService::new(state.db, &state.config);
    let total_sales = service.today_total().await?;
    Ok(Json(TodaySalesResponse { total_sales }))
}

/// Daily totals for the last seven days
pub async fn weekly_sales(State(state): State<AppState>) -> AppResult<Json<Vec<DailySales>>> {
    let service = SalesService::new(state.db, &state.config);
    Ok(Json(service.weekly().await?))
}

/// Sales recorded on `?date=YYYY-MM-DD`
pub async fn sales_report(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> AppResult<Json<Vec<Sale>>> {
    let date = query.required_day()?;
    let service = SalesService::new(state.db, &state.config);
    Ok(Json(service.report_by_date(date).await?))
}
