//! Booking API handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;

use super::dto::{
    BookingDto, BookingStatusGroupDto, CreateBookingRequest, JobRunResponse, ListBookingsParams,
    UpdateBookingRequest,
};
use crate::application::bookings::{
    run_booking_jobs, BookingChanges, BookingJobsConfig, BookingRequest, BookingService,
};
use crate::domain::{BookingStatus, PaymentMethod, RepositoryProvider};
use crate::interfaces::http::common::{
    error_response, parse_choice, ApiError, ApiResponse, ApiResult, MessageResponse,
    PaginatedResponse, ValidatedJson,
};
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::shared::PaginationParams;

#[derive(Clone)]
pub struct BookingHandlerState {
    pub bookings: Arc<BookingService>,
    pub repos: Arc<dyn RepositoryProvider>,
    pub jobs_config: BookingJobsConfig,
}

fn payment_method(value: Option<&str>) -> Result<Option<PaymentMethod>, ApiError> {
    parse_choice("payment_method", value, PaymentMethod::parse)
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(ListBookingsParams),
    responses(
        (status = 200, description = "Bookings visible to the caller", body = ApiResponse<PaginatedResponse<BookingDto>>),
        (status = 400, description = "Unknown status")
    )
)]
pub async fn list_bookings(
    State(state): State<BookingHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(params): Query<ListBookingsParams>,
) -> ApiResult<PaginatedResponse<BookingDto>> {
    let status = parse_choice("status", params.status.as_deref(), BookingStatus::parse)?;

    let page = state
        .bookings
        .list(&user.actor(), status, PaginationParams::new(params.page, params.limit))
        .await
        .map_err(error_response)?;

    Ok(Json(ApiResponse::success(PaginatedResponse::from(page))))
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings/by-status",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Every status with its bookings", body = ApiResponse<Vec<BookingStatusGroupDto>>),
        (status = 403, description = "Staff only")
    )
)]
pub async fn bookings_by_status(
    State(state): State<BookingHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Vec<BookingStatusGroupDto>> {
    let groups = state
        .bookings
        .by_status(&user.actor())
        .await
        .map_err(error_response)?;

    Ok(Json(ApiResponse::success(
        groups.into_iter().map(BookingStatusGroupDto::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings/{id}",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking details", body = ApiResponse<BookingDto>),
        (status = 404, description = "Not found or not visible to the caller")
    )
)]
pub async fn get_booking(
    State(state): State<BookingHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> ApiResult<BookingDto> {
    let booking = state
        .bookings
        .get(&user.actor(), id)
        .await
        .map_err(error_response)?;

    Ok(Json(ApiResponse::success(BookingDto::from(booking))))
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking created as pending", body = ApiResponse<BookingDto>),
        (status = 400, description = "Invalid dates, incomplete profile or vehicle unavailable"),
        (status = 403, description = "Customer is blocked"),
        (status = 404, description = "Customer or vehicle not found"),
        (status = 409, description = "Vehicle already booked for these dates")
    )
)]
pub async fn create_booking(
    State(state): State<BookingHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<CreateBookingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BookingDto>>), ApiError> {
    let booking_request = BookingRequest {
        customer_id: request.customer_id,
        vehicle_id: request.vehicle_id,
        start_date: request.start_date,
        end_date: request.end_date,
        payment_method: payment_method(request.payment_method.as_deref())?.unwrap_or_default(),
        notes: request.notes,
        total_price: request.total_price,
    };

    let booking = state
        .bookings
        .create(&user.actor(), booking_request, Utc::now().date_naive())
        .await
        .map_err(error_response)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(BookingDto::from(booking))),
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/bookings/{id}",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Booking ID")),
    request_body = UpdateBookingRequest,
    responses(
        (status = 200, description = "Booking updated and repriced", body = ApiResponse<BookingDto>),
        (status = 404, description = "Not found"),
        (status = 409, description = "Booking is not pending or dates overlap")
    )
)]
pub async fn update_booking(
    State(state): State<BookingHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<UpdateBookingRequest>,
) -> ApiResult<BookingDto> {
    let changes = BookingChanges {
        vehicle_id: request.vehicle_id,
        start_date: request.start_date,
        end_date: request.end_date,
        payment_method: payment_method(request.payment_method.as_deref())?,
        notes: request.notes,
        total_price: request.total_price,
    };

    let booking = state
        .bookings
        .update(&user.actor(), id, changes, Utc::now().date_naive())
        .await
        .map_err(error_response)?;

    Ok(Json(ApiResponse::success(BookingDto::from(booking))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/bookings/{id}",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking deleted", body = ApiResponse<MessageResponse>),
        (status = 403, description = "Customers may only delete pending bookings"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_booking(
    State(state): State<BookingHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> ApiResult<MessageResponse> {
    state
        .bookings
        .delete(&user.actor(), id)
        .await
        .map_err(error_response)?;

    Ok(Json(ApiResponse::success(MessageResponse::new(format!(
        "Booking {} deleted",
        id
    )))))
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings/{id}/approve",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking confirmed", body = ApiResponse<BookingDto>),
        (status = 403, description = "Staff only"),
        (status = 409, description = "Booking is not pending")
    )
)]
pub async fn approve_booking(
    State(state): State<BookingHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> ApiResult<BookingDto> {
    let booking = state
        .bookings
        .approve(&user.actor(), id)
        .await
        .map_err(error_response)?;

    Ok(Json(ApiResponse::success(BookingDto::from(booking))))
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings/{id}/reject",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking cancelled", body = ApiResponse<BookingDto>),
        (status = 403, description = "Staff only"),
        (status = 409, description = "Booking is not pending")
    )
)]
pub async fn reject_booking(
    State(state): State<BookingHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> ApiResult<BookingDto> {
    let booking = state
        .bookings
        .reject(&user.actor(), id)
        .await
        .map_err(error_response)?;

    Ok(Json(ApiResponse::success(BookingDto::from(booking))))
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings/jobs/run",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Both status jobs ran once", body = ApiResponse<JobRunResponse>),
        (status = 403, description = "Staff only")
    )
)]
pub async fn run_jobs(
    State(state): State<BookingHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<JobRunResponse> {
    let actor = user.actor();
    actor.require_staff().map_err(error_response)?;

    let report = run_booking_jobs(state.repos.as_ref(), Utc::now(), &state.jobs_config)
        .await
        .map_err(error_response)?;

    tracing::info!(
        by = %actor.username,
        completed = report.completed,
        cancelled = report.cancelled,
        "Booking jobs triggered manually"
    );
    Ok(Json(ApiResponse::success(JobRunResponse::from(report))))
}
