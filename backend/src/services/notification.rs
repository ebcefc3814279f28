//! Notification service for stock events and alerts
//!
//! Supports:
//! - Persisted notifications raised by stock intake, deletion and sales
//! - Listing, filtering, marking read and deleting notifications
//! - A computed alert scan over current stock (low, expiring, expired)

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::{low_stock_products, StockLot};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Notification kind enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "notification_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    LowStock,
    Expiring,
    StockAdded,
    StockDeleted,
}

/// Persisted notification
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    pub product: String,
    pub details: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a notification
#[derive(Debug, Clone)]
pub struct CreateNotificationInput {
    pub kind: NotificationKind,
    pub message: String,
    pub product: String,
    pub details: Option<String>,
}

/// Filter for listing notifications
#[derive(Debug, Clone, Copy, Default)]
pub struct NotificationFilter {
    pub read: Option<bool>,
    pub kind: Option<NotificationKind>,
}

/// Kind of a computed stock alert
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    LowStock,
    Expiring,
    Expired,
}

/// Alert derived from current stock; never persisted
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StockAlert {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub product: String,
    pub details: String,
}

/// Scan lots for low-stock products, lots expiring within `warning_days`
/// (exclusive) and lots already past expiry.
///
/// Low stock is judged on every lot, depleted ones included, so a product
/// that sold out still shows up. Expiry alerts only cover lots with stock.
pub fn scan_alerts(
    lots: &[StockLot],
    today: NaiveDate,
    threshold: i64,
    warning_days: i64,
) -> Vec<StockAlert> {
    let mut alerts: Vec<StockAlert> = low_stock_products(lots, threshold)
        .into_iter()
        .map(|p| StockAlert {
            id: format!("{}-low_stock", p.name),
            kind: AlertKind::LowStock,
            details: format!("Total quantity remaining: {} units", p.quantity),
            product: p.name,
        })
        .collect();

    let stocked: Vec<&StockLot> = lots.iter().filter(|l| !l.is_depleted()).collect();

    alerts.extend(stocked.iter().filter_map(|lot| {
        let days = lot.days_until_expiry(today);
        (0..warning_days).contains(&days).then(|| StockAlert {
            id: format!("{}-expiring", lot.id),
            kind: AlertKind::Expiring,
            product: lot.product_name.clone(),
            details: format!("Expires in {} days", days),
        })
    }));

    alerts.extend(stocked.iter().filter_map(|lot| {
        (lot.days_until_expiry(today) < 0).then(|| StockAlert {
            id: format!("{}-expired", lot.id),
            kind: AlertKind::Expired,
            product: lot.product_name.clone(),
            details: format!("Expired on {}", lot.expiry_date),
        })
    }));

    alerts
}

pub fn low_stock_message(product: &str, total: i64) -> CreateNotificationInput {
    CreateNotificationInput {
        kind: NotificationKind::LowStock,
        message: format!("Low stock for {}! Current quantity: {} units.", product, total),
        product: product.to_string(),
        details: Some(format!("Only {} units remaining.", total)),
    }
}

/// Notification service
#[derive(Clone)]
pub struct NotificationService {
    db: PgPool,
}

impl NotificationService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List notifications, newest first
    pub async fn list(&self, filter: NotificationFilter) -> AppResult<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, kind, message, product, details, read, created_at, updated_at
            FROM notifications
            WHERE ($1::BOOLEAN IS NULL OR read = $1)
              AND ($2::notification_kind IS NULL OR kind = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(filter.read)
        .bind(filter.kind)
        .fetch_all(&self.db)
        .await?;

        Ok(notifications)
    }

    /// The `limit` most recent notifications
    pub async fn recent(&self, limit: i64) -> AppResult<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, kind, message, product, details, read, created_at, updated_at
            FROM notifications
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit.max(0))
        .fetch_all(&self.db)
        .await?;

        Ok(notifications)
    }

    pub async fn create(&self, input: CreateNotificationInput) -> AppResult<Notification> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (kind, message, product, details)
            VALUES ($1, $2, $3, $4)
            RETURNING id, kind, message, product, details, read, created_at, updated_at
            "#,
        )
        .bind(input.kind)
        .bind(&input.message)
        .bind(&input.product)
        .bind(&input.details)
        .fetch_one(&self.db)
        .await?;

        Ok(notification)
    }

    /// Create a notification, logging instead of failing when storage errors
    pub async fn notify(&self, input: CreateNotificationInput) -> Option<Notification> {
        let kind = input.kind;
        let product = input.product.clone();
        match self.create(input).await {
            Ok(notification) => Some(notification),
            Err(e) => {
                tracing::warn!(?kind, %product, "Failed to create notification: {}", e);
                None
            }
        }
    }

    pub async fn mark_read(&self, id: Uuid) -> AppResult<Notification> {
        sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications
            SET read = TRUE, updated_at = NOW()
            WHERE id = $1
            RETURNING id, kind, message, product, details, read, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Notification".to_string()))
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Notification".to_string()));
        }
        Ok(())
    }

    /// Whether an unread notification of `kind` exists for `product`
    pub async fn has_unread(&self, product: &str, kind: NotificationKind) -> AppResult<bool> {
        let exists: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM notifications
                WHERE product = $1 AND kind = $2 AND read = FALSE
            )
            "#,
        )
        .bind(product)
        .bind(kind)
        .fetch_one(&self.db)
        .await?;

        Ok(exists.0)
    }

    /// Raise a low-stock notification for `product` unless one is still unread.
    ///
    /// Best effort: failures are logged and reported as `None`.
    pub async fn raise_low_stock(
        &self,
        product: &str,
        total: i64,
        threshold: i64,
    ) -> Option<Notification> {
        if !shared::is_low_stock(total, threshold) {
            return None;
        }
        match self.has_unread(product, NotificationKind::LowStock).await {
            Ok(true) => None,
            Ok(false) => self.notify(low_stock_message(product, total)).await,
            Err(e) => {
                tracing::warn!(%product, "Failed to check low stock notifications: {}", e);
                None
            }
        }
    }
}
