//! HTTP handlers for notification management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::today;
use crate::error::{AppError, AppResult};
use crate::middleware::validation::is_blank;
use crate::middleware::{RequiredFields, ValidatedJson};
use crate::services::notification::{
    scan_alerts, CreateNotificationInput, Notification, NotificationFilter, NotificationKind,
    StockAlert,
};
use crate::services::{NotificationService, StockService};
use crate::AppState;

/// Query parameters for listing notifications
#[derive(Debug, Deserialize)]
pub struct ListNotificationsQuery {
    pub read: Option<bool>,
    #[serde(rename = "type")]
    pub kind: Option<NotificationKind>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateNotificationRequest {
    #[validate(length(max = 500, message = "Message cannot exceed 500 characters"))]
    pub message: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<NotificationKind>,
    pub product: Option<String>,
    #[validate(length(max = 500, message = "Details cannot exceed 500 characters"))]
    pub details: Option<String>,
}

impl RequiredFields for CreateNotificationRequest {
    fn missing_field(&self) -> Option<String> {
        if is_blank(&self.message) {
            Some("message".into())
        } else if self.kind.is_none() {
            Some("type".into())
        } else if is_blank(&self.product) {
            Some("product".into())
        } else {
            None
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub message: &'static str,
    pub notification: Notification,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// List notifications, newest first
pub async fn list_notifications(
    State(state): State<AppState>,
    Query(query): Query<ListNotificationsQuery>,
) -> AppResult<Json<Vec<Notification>>> {
    let service = NotificationService::new(state.db);
    let notifications = service
        .list(NotificationFilter {
            read: query.read,
            kind: query.kind,
        })
        .await?;
    Ok(Json(notifications))
}

/// Most recent notifications for the dashboard
pub async fn recent_notifications(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Notification>>> {
    let limit = state.config.inventory.recent_notifications;
    let service = NotificationService::new(state.db);
    Ok(Json(service.recent(limit).await?))
}

pub async fn create_notification(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateNotificationRequest>,
) -> AppResult<(StatusCode, Json<NotificationResponse>)> {
    let (Some(message), Some(kind), Some(product)) =
        (request.message, request.kind, request.product)
    else {
        return Err(AppError::ValidationError(
            "Message, type and product are required".to_string(),
        ));
    };
    let input = CreateNotificationInput {
        kind,
        message: message.trim().to_string(),
        product: product.trim().to_string(),
        details: request.details.filter(|d| !d.trim().is_empty()),
    };
    let service = NotificationService::new(state.db);
    let notification = service.create(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(NotificationResponse {
            message: "Notification added successfully",
            notification,
        }),
    ))
}

pub async fn mark_notification_read(
    State(state): State<AppState>,
    Path(notification_id): Path<Uuid>,
) -> AppResult<Json<NotificationResponse>> {
    let service = NotificationService::new(state.db);
    let notification = service.mark_read(notification_id).await?;
    Ok(Json(NotificationResponse {
        message: "Notification marked as read",
        notification,
    }))
}

pub async fn delete_notification(
    State(state): State<AppState>,
    Path(notification_id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    let service = NotificationService::new(state.db);
    service.delete(notification_id).await?;
    Ok(Json(MessageResponse {
        message: "Notification deleted successfully",
    }))
}

/// Low-stock, expiring and expired alerts computed from current stock
pub async fn stock_alerts(State(state): State<AppState>) -> AppResult<Json<Vec<StockAlert>>> {
    let today = today(&state)?;
    let inventory = state.config.inventory.clone();
    let lots = StockService::new(state.db, inventory.clone())
        .list_lots()
        .await?;
    Ok(Json(scan_alerts(
        &lots,
        today,
        inventory.low_stock_threshold,
        inventory.expiry_warning_days,
    )))
}
