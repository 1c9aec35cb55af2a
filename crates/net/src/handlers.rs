//! HTTP handlers
//!
//! Each handler parses its inputs, runs one service call under the store
//! lock and serializes the result.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, Utc};

use studyspace_core::models::{BookingDetails, NoiseReportDetails, StudySpace, User};
use studyspace_core::validation::parse_id;
use studyspace_core::{
    service, CreateBookingRequest, CreateNoiseReportRequest, Error as CoreError, LoginRequest,
    Overview,
};

use crate::error::{ApiError, ApiResult};
use crate::protocol::{HealthStatus, OverviewQuery};
use crate::server::AppState;

pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus::ok())
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<User>> {
    let Json(req) = payload?;
    state
        .with_store(|store| service::login(store, &req))
        .map(|outcome| Json(outcome.user))
}

pub async fn show_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<User>> {
    let id = parse_id("user id", &id)?;
    state.with_store(|store| service::get_user(store, id)).map(Json)
}

pub async fn show_space_list(State(state): State<AppState>) -> ApiResult<Json<Vec<StudySpace>>> {
    state.with_store(|store| service::list_spaces(store)).map(Json)
}

pub async fn show_space(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<StudySpace>> {
    let id = parse_id("study space id", &id)?;
    state.with_store(|store| service::get_space(store, id)).map(Json)
}

pub async fn show_overview(
    State(state): State<AppState>,
    query: Result<Query<OverviewQuery>, QueryRejection>,
) -> ApiResult<Json<Overview>> {
    let Query(query) = query?;
    let date = match query.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
            CoreError::Validation(format!("date must be YYYY-MM-DD, got {raw}"))
        })?,
        None => Utc::now().date_naive(),
    };
    state
        .with_store(|store| service::admin_overview(store, date))
        .map(Json)
}

pub async fn register_booking(
    State(state): State<AppState>,
    payload: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<BookingDetails>)> {
    let Json(req) = payload?;
    state
        .with_store(|store| service::create_booking(store, &req))
        .map(|details| (StatusCode::CREATED, Json(details)))
}

pub async fn show_booking_list(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<BookingDetails>>> {
    state.with_store(|store| service::list_bookings(store)).map(Json)
}

pub async fn show_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<BookingDetails>> {
    let id = parse_id("booking id", &id)?;
    state.with_store(|store| service::get_booking(store, id)).map(Json)
}

pub async fn show_user_bookings(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<BookingDetails>>> {
    let user_id = parse_id("user id", &user_id)?;
    state
        .with_store(|store| service::list_bookings_for_user(store, user_id))
        .map(Json)
}

pub async fn check_in(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<BookingDetails>> {
    let id = parse_id("booking id", &id)?;
    state.with_store(|store| service::check_in(store, id)).map(Json)
}

pub async fn check_out(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<BookingDetails>> {
    let id = parse_id("booking id", &id)?;
    state.with_store(|store| service::check_out(store, id)).map(Json)
}

pub async fn cancel_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<BookingDetails>> {
    let id = parse_id("booking id", &id)?;
    state
        .with_store(|store| service::cancel_booking(store, id))
        .map(Json)
}

pub async fn register_noise_report(
    State(state): State<AppState>,
    payload: Result<Json<CreateNoiseReportRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<NoiseReportDetails>)> {
    let Json(req) = payload?;
    state
        .with_store(|store| service::create_noise_report(store, &req))
        .map(|details| (StatusCode::CREATED, Json(details)))
}

pub async fn show_noise_report_list(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<NoiseReportDetails>>> {
    state
        .with_store(|store| service::list_noise_reports(store))
        .map(Json)
}

pub async fn show_space_noise_reports(
    State(state): State<AppState>,
    Path(space_id): Path<String>,
) -> ApiResult<Json<Vec<NoiseReportDetails>>> {
    let space_id = parse_id("study space id", &space_id)?;
    state
        .with_store(|store| service::list_noise_reports_for_space(store, space_id))
        .map(Json)
}

pub async fn not_found() -> ApiError {
    ApiError::RouteNotFound
}
