//! Report API handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{Datelike, Utc};

use super::dto::{BookingReportParams, MonthlyRevenueParams, UtilizationParams};
use crate::application::reporting::{
    BookingsReport, DashboardSummary, MonthlyRevenue, ReportService, UtilizationReport,
};
use crate::interfaces::http::common::{error_response, ApiResponse, ApiResult};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct ReportHandlerState {
    pub reports: Arc<ReportService>,
}

#[utoipa::path(
    get,
    path = "/api/v1/reports/dashboard",
    tag = "Reports",
    security(("bearer_auth" = [])),
    params(BookingReportParams),
    responses(
        (status = 200, description = "Summary figures", body = ApiResponse<DashboardSummary>),
        (status = 403, description = "Staff only")
    )
)]
pub async fn dashboard(
    State(state): State<ReportHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(params): Query<BookingReportParams>,
) -> ApiResult<DashboardSummary> {
    let summary = state
        .reports
        .dashboard(&user.actor(), params.into())
        .await
        .map_err(error_response)?;

    Ok(Json(ApiResponse::success(summary)))
}

#[utoipa::path(
    get,
    path = "/api/v1/reports/bookings",
    tag = "Reports",
    security(("bearer_auth" = [])),
    params(BookingReportParams),
    responses(
        (status = 200, description = "Filtered bookings, newest start first", body = ApiResponse<BookingsReport>),
        (status = 403, description = "Staff only")
    )
)]
pub async fn bookings_report(
    State(state): State<ReportHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(params): Query<BookingReportParams>,
) -> ApiResult<BookingsReport> {
    let report = state
        .reports
        .bookings(&user.actor(), params.into())
        .await
        .map_err(error_response)?;

    Ok(Json(ApiResponse::success(report)))
}

#[utoipa::path(
    get,
    path = "/api/v1/reports/vehicle-utilization",
    tag = "Reports",
    security(("bearer_auth" = [])),
    params(UtilizationParams),
    responses(
        (status = 200, description = "Booked days per vehicle", body = ApiResponse<UtilizationReport>),
        (status = 400, description = "Month out of range"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn vehicle_utilization(
    State(state): State<ReportHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(params): Query<UtilizationParams>,
) -> ApiResult<UtilizationReport> {
    let today = Utc::now().date_naive();
    let report = state
        .reports
        .vehicle_utilization(
            &user.actor(),
            params.year.unwrap_or(today.year()),
            params.month.unwrap_or(today.month()),
        )
        .await
        .map_err(error_response)?;

    Ok(Json(ApiResponse::success(report)))
}

#[utoipa::path(
    get,
    path = "/api/v1/reports/monthly-revenue",
    tag = "Reports",
    security(("bearer_auth" = [])),
    params(MonthlyRevenueParams),
    responses(
        (status = 200, description = "Revenue for each month of the year", body = ApiResponse<Vec<MonthlyRevenue>>),
        (status = 403, description = "Staff only")
    )
)]
pub async fn monthly_revenue(
    State(state): State<ReportHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(params): Query<MonthlyRevenueParams>,
) -> ApiResult<Vec<MonthlyRevenue>> {
    let year = params.year.unwrap_or_else(|| Utc::now().year());
    let revenue = state
        .reports
        .monthly_revenue(&user.actor(), year)
        .await
        .map_err(error_response)?;

    Ok(Json(ApiResponse::success(revenue)))
}
