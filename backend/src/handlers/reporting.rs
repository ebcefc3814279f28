//! HTTP handlers for CSV report downloads

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

use crate::error::AppResult;
use crate::services::{ReportingService, SalesService, StockService};
use crate::AppState;

fn csv_attachment(filename: &str, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}

/// All sales as CSV: date, customer, mobile, items, total
pub async fn sales_csv(State(state): State<AppState>) -> AppResult<Response> {
    let offset = state.config.sales.day_offset()?;
    let sales = SalesService::new(state.db, &state.config)
        .all_sales()
        .await?;
    let csv = ReportingService::export_to_csv(&ReportingService::sales_rows(&sales, offset))?;
    Ok(csv_attachment("sales_report.csv", csv))
}

/// Quantity on hand per product as CSV
pub async fn inventory_csv(State(state): State<AppState>) -> AppResult<Response> {
    let lots = StockService::new(state.db, state.config.inventory.clone())
        .list_lots()
        .await?;
    let csv = ReportingService::export_to_csv(&ReportingService::inventory_rows(&lots))?;
    Ok(csv_attachment("inventory_report.csv", csv))
}
