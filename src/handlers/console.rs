use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{Booking, BookingStatus, StatusFilter};
use crate::services::console::{BookingRow, ConsoleStats, ConsoleView, Deletion, DELETE_PROMPT};
use crate::state::AppState;

fn check_auth(headers: &HeaderMap, expected_token: Option<&str>) -> Result<(), AppError> {
    let Some(expected) = expected_token else {
        return Ok(());
    };

    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if token != expected {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

#[derive(Serialize)]
pub struct ConsoleResponse {
    filter: StatusFilter,
    total: u64,
    stats: ConsoleStats,
    error: Option<String>,
    bookings: Vec<BookingRow>,
}

impl From<ConsoleView> for ConsoleResponse {
    fn from(view: ConsoleView) -> Self {
        Self {
            filter: view.filter,
            total: view.total,
            stats: view.stats(),
            bookings: view.rows(),
            error: view.error,
        }
    }
}

fn render(state: &AppState) -> Json<ConsoleResponse> {
    Json(state.console.snapshot().into())
}

// GET /api/console/bookings
#[derive(Deserialize)]
pub struct BookingsQuery {
    pub status: Option<String>,
}

/// Sets the console's status filter and re-fetches.
///
/// The filter is shared state: it changes what every operator (and
/// `POST /api/console/refresh`) sees until the next call. An absent or empty
/// `status` resets it to all bookings.
pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<ConsoleResponse>, AppError> {
    check_auth(&headers, state.config.admin_token.as_deref())?;

    let filter = match query.status.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(
            BookingStatus::try_parse(raw)
                .ok_or_else(|| AppError::Validation(format!("unknown status filter: {raw}")))?,
        ),
    };

    // A failed fetch is reported through the view's error field.
    let _ = state.console.set_filter(filter).await;
    Ok(render(&state))
}

// POST /api/console/refresh
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ConsoleResponse>, AppError> {
    check_auth(&headers, state.config.admin_token.as_deref())?;

    let _ = state.console.refresh().await;
    Ok(render(&state))
}

// GET /api/console/bookings/:id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Booking>, AppError> {
    check_auth(&headers, state.config.admin_token.as_deref())?;

    let booking = state.console.detail(id).await?;
    Ok(Json(booking))
}

// PUT /api/console/bookings/:id/status
#[derive(Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

pub async fn update_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<StatusUpdateRequest>,
) -> Result<Json<ConsoleResponse>, AppError> {
    check_auth(&headers, state.config.admin_token.as_deref())?;

    let target = BookingStatus::try_parse(&body.status)
        .ok_or_else(|| AppError::Validation(format!("unknown status: {}", body.status)))?;

    state.console.transition(id, target).await?;
    Ok(render(&state))
}

// DELETE /api/console/bookings/:id?confirm=true
#[derive(Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub confirm: bool,
}

pub async fn delete_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<ConsoleResponse>, AppError> {
    check_auth(&headers, state.config.admin_token.as_deref())?;

    match state.console.delete(id, |_| query.confirm).await? {
        Deletion::Declined => Err(AppError::ConfirmationRequired(DELETE_PROMPT)),
        Deletion::Deleted => Ok(render(&state)),
    }
}
