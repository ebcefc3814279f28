//! HTTP handlers for the FertiStock API

pub mod health;
pub mod notification;
pub mod reporting;
pub mod sales;
pub mod stock;

pub use health::*;
pub use notification::*;
pub use reporting::*;
pub use sales::*;
pub use stock::*;

use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::AppState;

/// `?date=YYYY-MM-DD` query parameter
#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

impl DateQuery {
    /// The requested day; missing or malformed dates are rejected
    pub fn required_day(&self) -> AppResult<NaiveDate> {
        let raw = self
            .date
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .ok_or_else(|| AppError::MissingField("date".to_string()))?;
        shared::parse_day(raw).ok_or_else(|| AppError::Validation {
            field: "date".to_string(),
            message: "Invalid date format provided. Use YYYY-MM-DD.".to_string(),
        })
    }
}

/// Today's date in the configured reference offset
pub(crate) fn today(state: &AppState) -> AppResult<NaiveDate> {
    Ok(shared::local_date(
        Utc::now(),
        state.config.sales.day_offset()?,
    ))
}
