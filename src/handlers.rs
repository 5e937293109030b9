use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::{Json, http::StatusCode, response::IntoResponse};
use axum_extra::extract::TypedHeader;
use chrono::Utc;
use tracing::{info, warn};

use crate::{
    AppState,
    error::ApiError,
    models::{
        BookingCreatedResponse, BookingListResponse, BookingLookupResponse, BookingRequest,
        ClassListResponse, FitnessClassView,
    },
    timezone::{XTimezone, localize},
    validation::require_booking_fields,
};

#[derive(Debug, serde::Deserialize)]
pub struct BookingsQuery {
    pub email: Option<String>,
}

#[utoipa::path(get, path = "/", tag = "studio")]
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Fitness Studio Booking API",
        "endpoints": {
            "/classes/": "List upcoming classes",
            "/book/": "Book a slot in a class",
            "/bookings/?email=": "List bookings made with an email address"
        }
    }))
}

#[utoipa::path(get, path = "/healthz/live", tag = "studio")]
pub async fn healthz_live() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

#[utoipa::path(
    get,
    path = "/healthz/ready",
    responses(
        (status = 200, description = "Database reachable"),
        (status = 500, description = "Database unreachable")
    ),
    tag = "studio"
)]
pub async fn healthz_ready(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    sqlx::query("SELECT 1")
        .execute(&state.pool)
        .await
        .map_err(crate::db::StoreError::from)?;
    Ok(Json(serde_json::json!({"status": "ok"})))
}

#[utoipa::path(
    get,
    path = "/classes/",
    params(
        ("X-Timezone" = Option<String>, Header, description = "IANA zone for scheduled_datetime_local")
    ),
    responses(
        (status = 200, description = "Upcoming active classes", body = ClassListResponse),
        (status = 500, description = "Unexpected failure")
    ),
    tag = "classes"
)]
pub async fn list_classes(
    State(state): State<AppState>,
    zone: Option<TypedHeader<XTimezone>>,
) -> Result<impl IntoResponse, ApiError> {
    let zone = zone
        .map(|TypedHeader(XTimezone(zone))| zone)
        .filter(|zone| !zone.is_empty())
        .unwrap_or_else(|| state.settings.default_timezone.clone());

    let classes = state.catalog.list_upcoming_active(Utc::now()).await?;

    let mut fallback = None;
    let data: Vec<FitnessClassView> = classes
        .iter()
        .map(|class| {
            let local = localize(class.scheduled_datetime, &zone);
            if local.warning.is_some() {
                fallback = local.warning;
            }
            FitnessClassView::new(class, local.datetime)
        })
        .collect();
    if let Some(warning) = fallback {
        warn!(timezone = %zone, "{warning}");
    }

    Ok(Json(ClassListResponse {
        success: true,
        count: data.len(),
        data,
    }))
}

#[utoipa::path(
    post,
    path = "/book/",
    request_body = BookingRequest,
    responses(
        (status = 201, description = "Booking created", body = BookingCreatedResponse),
        (status = 400, description = "Validation failure, full class or duplicate booking"),
        (status = 500, description = "Unexpected failure")
    ),
    tag = "bookings"
)]
pub async fn create_booking(
    State(state): State<AppState>,
    body: Result<Json<BookingRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body.map_err(|rejection| {
        ApiError::field("non_field_errors", rejection.body_text())
    })?;
    let request = require_booking_fields(body)?;

    let reservation = state.engine.reserve(&request, Utc::now()).await?;

    Ok((
        StatusCode::CREATED,
        Json(BookingCreatedResponse {
            success: true,
            message: "Booking created successfully!".to_string(),
            data: reservation.details,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/bookings/",
    params(
        ("email" = String, Query, description = "Email address the bookings were made with")
    ),
    responses(
        (status = 200, description = "Bookings for the email, newest first", body = BookingListResponse),
        (status = 400, description = "Email parameter missing"),
        (status = 500, description = "Unexpected failure")
    ),
    tag = "bookings"
)]
pub async fn list_bookings(
    State(state): State<AppState>,
    query: Result<Query<BookingsQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let email = query
        .email
        .filter(|email| !email.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Email parameter is required".into()))?;

    let bookings = state.ledger.list_by_email(&email).await?;
    info!(count = bookings.len(), "bookings looked up");

    if bookings.is_empty() {
        return Ok(Json(BookingListResponse {
            success: true,
            data: Vec::new(),
            count: None,
            message: Some("No bookings found for this email".into()),
        }));
    }

    Ok(Json(BookingListResponse {
        success: true,
        count: Some(bookings.len()),
        data: bookings,
        message: None,
    }))
}

#[utoipa::path(
    get,
    path = "/bookings/{reference}/",
    params(
        ("reference" = String, Path, description = "8-character booking reference")
    ),
    responses(
        (status = 200, description = "Booking found", body = BookingLookupResponse),
        (status = 404, description = "No booking with this reference")
    ),
    tag = "bookings"
)]
pub async fn get_booking(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let booking = state
        .ledger
        .find_by_reference(&reference)
        .await?
        .ok_or_else(|| ApiError::NotFound("Booking not found".into()))?;

    Ok(Json(BookingLookupResponse {
        success: true,
        data: booking,
    }))
}
