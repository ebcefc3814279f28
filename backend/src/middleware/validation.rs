//! Request body validation at the HTTP boundary
//!
//! [`ValidatedJson`] rejects a body before it reaches a handler when it is
//! malformed JSON, when a required field is absent or blank, or when a field
//! fails its `validator` rules.

use std::borrow::Cow;

use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError};

use crate::error::AppError;

/// Request bodies that can report their first missing required field
pub trait RequiredFields {
    /// Wire name of the first required field that is absent or blank
    fn missing_field(&self) -> Option<String>;
}

/// JSON body that passed required-field and `validator` checks
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + RequiredFields,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::ValidationError(rejection.body_text()))?;

        if let Some(field) = value.missing_field() {
            return Err(AppError::MissingField(field));
        }
        value.validate()?;

        Ok(ValidatedJson(value))
    }
}

/// True when an optional text field is absent or only whitespace
pub fn is_blank(value: &Option<String>) -> bool {
    value
        .as_deref()
        .map_or(true, |v| shared::validate_required(v).is_err())
}

/// Adapt a shared field check to a `validator` custom rule
pub fn field_rule(result: Result<(), &'static str>) -> Result<(), ValidationError> {
    result.map_err(|message| {
        let mut err = ValidationError::new("invalid");
        err.message = Some(Cow::Borrowed(message));
        err
    })
}
