use std::collections::BTreeMap;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use crate::db::StoreError;
use crate::reservation::ReservationError;

/// Field name to the messages reported against it.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug)]
pub enum ApiError {
    Validation(FieldErrors),
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl ApiError {
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![message.into()]);
        ApiError::Validation(errors)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                json!({"success": false, "errors": errors}),
            ),
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                json!({"success": false, "error": msg}),
            ),
            ApiError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                json!({"success": false, "error": msg}),
            ),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"success": false, "error": msg}),
            ),
        };
        (status, Json(body)).into_response()
    }
}

impl From<ReservationError> for ApiError {
    fn from(value: ReservationError) -> Self {
        match value {
            ReservationError::ClassNotFound
            | ReservationError::ClassNotUpcoming
            | ReservationError::ClassFull => ApiError::field("class_id", value.to_string()),
            ReservationError::InvalidEmail => ApiError::field("client_email", value.to_string()),
            ReservationError::InvalidName => ApiError::field("client_name", value.to_string()),
            ReservationError::DuplicateBooking => {
                ApiError::field("non_field_errors", value.to_string())
            }
            ReservationError::ReferenceExhausted(_) | ReservationError::Store(_) => {
                error!(error = %value, "booking creation failed");
                ApiError::Internal("Failed to create booking. Please try again.".into())
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        error!(error = %value, "storage error");
        ApiError::Internal("Something went wrong. Please try again.".into())
    }
}
