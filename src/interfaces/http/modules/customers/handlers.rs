//! Customer API handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::Utc;

use super::dto::{CustomerDto, ListCustomersParams, SetCustomerStatusRequest, UpdateProfileRequest};
use crate::application::CustomerService;
use crate::domain::customer::{CustomerFilter, CustomerStatus};
use crate::domain::DomainError;
use crate::interfaces::http::common::{
    error_response, parse_choice, ApiError, ApiResponse, ApiResult, PaginatedResponse,
    ValidatedJson,
};
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::shared::{non_blank, PaginationParams};

#[derive(Clone)]
pub struct CustomerHandlerState {
    pub customers: Arc<CustomerService>,
}

/// Profile endpoints belong to customer accounts only.
fn require_customer(user: &AuthenticatedUser) -> Result<(), ApiError> {
    if user.role.is_staff() {
        return Err(error_response(DomainError::Forbidden(
            "Staff accounts do not have a customer profile".into(),
        )));
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/v1/customers/profile",
    tag = "Customers",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own profile", body = ApiResponse<CustomerDto>),
        (status = 403, description = "Staff account")
    )
)]
pub async fn get_profile(
    State(state): State<CustomerHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<CustomerDto> {
    require_customer(&user)?;

    let profile = state
        .customers
        .own_profile(&user.actor())
        .await
        .map_err(error_response)?;

    Ok(Json(ApiResponse::success(CustomerDto::from(profile))))
}

#[utoipa::path(
    put,
    path = "/api/v1/customers/profile",
    tag = "Customers",
    security(("bearer_auth" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ApiResponse<CustomerDto>),
        (status = 400, description = "Invalid phone number or under-age date of birth"),
        (status = 409, description = "Driver license number already registered")
    )
)]
pub async fn update_profile(
    State(state): State<CustomerHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<UpdateProfileRequest>,
) -> ApiResult<CustomerDto> {
    require_customer(&user)?;

    let profile = state
        .customers
        .update_own_profile(&user.actor(), request.into(), Utc::now().date_naive())
        .await
        .map_err(error_response)?;

    Ok(Json(ApiResponse::success(CustomerDto::from(profile))))
}

#[utoipa::path(
    get,
    path = "/api/v1/customers",
    tag = "Customers",
    security(("bearer_auth" = [])),
    params(ListCustomersParams),
    responses(
        (status = 200, description = "Customer list", body = ApiResponse<PaginatedResponse<CustomerDto>>),
        (status = 403, description = "Staff only")
    )
)]
pub async fn list_customers(
    State(state): State<CustomerHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(params): Query<ListCustomersParams>,
) -> ApiResult<PaginatedResponse<CustomerDto>> {
    let filter = CustomerFilter {
        status: parse_choice("status", params.status.as_deref(), CustomerStatus::parse)?,
        search: non_blank(params.search),
    };

    let page = state
        .customers
        .list(&user.actor(), filter, PaginationParams::new(params.page, params.limit))
        .await
        .map_err(error_response)?;

    Ok(Json(ApiResponse::success(PaginatedResponse::from(page))))
}

#[utoipa::path(
    get,
    path = "/api/v1/customers/{id}",
    tag = "Customers",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Customer details", body = ApiResponse<CustomerDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_customer(
    State(state): State<CustomerHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> ApiResult<CustomerDto> {
    let actor = user.actor();
    actor.require_staff().map_err(error_response)?;

    let customer = state
        .customers
        .get(&actor, id)
        .await
        .map_err(error_response)?;

    Ok(Json(ApiResponse::success(CustomerDto::from(customer))))
}

#[utoipa::path(
    put,
    path = "/api/v1/customers/{id}/status",
    tag = "Customers",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Customer ID")),
    request_body = SetCustomerStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<CustomerDto>),
        (status = 400, description = "Unknown status"),
        (status = 404, description = "Not found")
    )
)]
pub async fn set_customer_status(
    State(state): State<CustomerHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<SetCustomerStatusRequest>,
) -> ApiResult<CustomerDto> {
    let actor = user.actor();
    actor.require_staff().map_err(error_response)?;

    let Some(status) = parse_choice("status", Some(&request.status), CustomerStatus::parse)? else {
        return Err(error_response(DomainError::Validation("status is required".into())));
    };

    let customer = state
        .customers
        .set_status(&actor, id, status)
        .await
        .map_err(error_response)?;

    Ok(Json(ApiResponse::success(CustomerDto::from(customer))))
}
