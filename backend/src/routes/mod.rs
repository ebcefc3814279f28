//! Route definitions for the FertiStock API

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/stock", stock_routes())
        .nest("/sales", sales_routes())
        .nest("/notifications", notification_routes())
        .nest("/reports", report_routes())
}

/// Stock intake and inventory routes
fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_stock).post(handlers::add_stock))
        .route("/inventory", get(handlers::inventory))
        .route("/summary", get(handlers::stock_summary))
        .route("/by-product", get(handlers::stock_by_product))
        .route("/received", get(handlers::stock_received))
        .route("/:lot_id", delete(handlers::delete_stock))
}

/// Billing and sales query routes
fn sales_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::record_sale))
        .route("/today", get(handlers::today_sales))
        .route("/weekly", get(handlers::weekly_sales))
        .route("/report", get(handlers::sales_report))
}

/// Notification routes
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_notifications).post(handlers::create_notification),
        )
        .route("/recent", get(handlers::recent_notifications))
        .route("/alerts", get(handlers::stock_alerts))
        .route("/:notification_id", delete(handlers::delete_notification))
        .route("/:notification_id/read", put(handlers::mark_notification_read))
}

/// CSV export routes
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/sales.csv", get(handlers::sales_csv))
        .route("/inventory.csv", get(handlers::inventory_csv))
}
