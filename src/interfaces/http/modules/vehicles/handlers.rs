//! Vehicle API handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{Datelike, NaiveDate, Utc};

use super::dto::{CreateVehicleRequest, ListVehiclesParams, UpdateVehicleRequest, VehicleDto};
use crate::application::VehicleService;
use crate::domain::vehicle::{NewVehicle, VehicleChanges, VehicleFilter, VehicleType};
use crate::interfaces::http::common::{
    bad_request, error_response, parse_choice, parse_date, ApiError, ApiResponse, ApiResult,
    MessageResponse, PaginatedResponse, ValidatedJson,
};
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::shared::{non_blank, PaginationParams};

#[derive(Clone)]
pub struct VehicleHandlerState {
    pub vehicles: Arc<VehicleService>,
}

impl ListVehiclesParams {
    fn filter(&self) -> Result<VehicleFilter, ApiError> {
        Ok(VehicleFilter {
            vehicle_type: parse_choice("vehicle_type", self.vehicle_type.as_deref(), VehicleType::parse)?,
            brand: non_blank(self.brand.clone()),
            model: non_blank(self.model.clone()),
            only_available: self.available.unwrap_or(false),
        })
    }

    /// Both dates or neither.
    fn date_range(&self) -> Result<Option<(NaiveDate, NaiveDate)>, ApiError> {
        let start = parse_date("start_date", self.start_date.as_deref())?;
        let end = parse_date("end_date", self.end_date.as_deref())?;
        match (start, end) {
            (Some(s), Some(e)) => Ok(Some((s, e))),
            (None, None) => Ok(None),
            _ => Err(bad_request(
                "start_date and end_date must be provided together",
            )),
        }
    }

    fn page(&self) -> PaginationParams {
        PaginationParams::new(self.page, self.limit)
    }
}

fn parse_vehicle_type(value: &str) -> Result<VehicleType, ApiError> {
    VehicleType::parse(value).ok_or_else(|| {
        bad_request(format!(
            "Invalid vehicle_type: {} (expected car, van, truck or motorbike)",
            value
        ))
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/vehicles",
    tag = "Vehicles",
    security(("bearer_auth" = [])),
    params(ListVehiclesParams),
    responses(
        (status = 200, description = "Vehicle list", body = ApiResponse<PaginatedResponse<VehicleDto>>),
        (status = 400, description = "Invalid filter")
    )
)]
pub async fn list_vehicles(
    State(state): State<VehicleHandlerState>,
    Query(params): Query<ListVehiclesParams>,
) -> ApiResult<PaginatedResponse<VehicleDto>> {
    let filter = params.filter()?;
    let result = match params.date_range()? {
        Some((start, end)) => {
            state
                .vehicles
                .available(filter, start, end, Utc::now().date_naive(), params.page())
                .await
        }
        None => state.vehicles.list(filter, params.page()).await,
    }
    .map_err(error_response)?;

    Ok(Json(ApiResponse::success(PaginatedResponse::from(result))))
}

#[utoipa::path(
    get,
    path = "/api/v1/vehicles/available",
    tag = "Vehicles",
    security(("bearer_auth" = [])),
    params(ListVehiclesParams),
    responses(
        (status = 200, description = "Vehicles free for the whole range", body = ApiResponse<PaginatedResponse<VehicleDto>>),
        (status = 400, description = "Missing, past or inverted dates")
    )
)]
pub async fn available_vehicles(
    State(state): State<VehicleHandlerState>,
    Query(params): Query<ListVehiclesParams>,
) -> ApiResult<PaginatedResponse<VehicleDto>> {
    let filter = params.filter()?;
    let Some((start, end)) = params.date_range()? else {
        return Err(bad_request("start_date and end_date are required"));
    };

    let result = state
        .vehicles
        .available(filter, start, end, Utc::now().date_naive(), params.page())
        .await
        .map_err(error_response)?;

    Ok(Json(ApiResponse::success(PaginatedResponse::from(result))))
}

#[utoipa::path(
    get,
    path = "/api/v1/vehicles/{id}",
    tag = "Vehicles",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Vehicle ID")),
    responses(
        (status = 200, description = "Vehicle details", body = ApiResponse<VehicleDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_vehicle(
    State(state): State<VehicleHandlerState>,
    Path(id): Path<i32>,
) -> ApiResult<VehicleDto> {
    let vehicle = state.vehicles.get(id).await.map_err(error_response)?;
    Ok(Json(ApiResponse::success(VehicleDto::from(vehicle))))
}

#[utoipa::path(
    post,
    path = "/api/v1/vehicles",
    tag = "Vehicles",
    security(("bearer_auth" = [])),
    request_body = CreateVehicleRequest,
    responses(
        (status = 201, description = "Vehicle created", body = ApiResponse<VehicleDto>),
        (status = 400, description = "Invalid year, rate or type"),
        (status = 403, description = "Staff only"),
        (status = 409, description = "Plate number already exists")
    )
)]
pub async fn create_vehicle(
    State(state): State<VehicleHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<CreateVehicleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<VehicleDto>>), ApiError> {
    let vehicle = NewVehicle {
        vehicle_type: parse_vehicle_type(&request.vehicle_type)?,
        brand: request.brand.trim().to_string(),
        model: request.model.trim().to_string(),
        year: request.year,
        daily_rate: request.daily_rate,
        plate_number: request.plate_number.trim().to_string(),
        description: non_blank(request.description),
        image: non_blank(request.image),
        is_available: request.is_available,
    };

    let created = state
        .vehicles
        .create(&user.actor(), vehicle, Utc::now().year())
        .await
        .map_err(error_response)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(VehicleDto::from(created))),
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/vehicles/{id}",
    tag = "Vehicles",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Vehicle ID")),
    request_body = UpdateVehicleRequest,
    responses(
        (status = 200, description = "Vehicle updated", body = ApiResponse<VehicleDto>),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Plate number already exists")
    )
)]
pub async fn update_vehicle(
    State(state): State<VehicleHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<UpdateVehicleRequest>,
) -> ApiResult<VehicleDto> {
    let vehicle_type = match request.vehicle_type.as_deref() {
        Some(raw) => Some(parse_vehicle_type(raw)?),
        None => None,
    };

    let changes = VehicleChanges {
        brand: request.brand.map(|b| b.trim().to_string()),
        model: request.model.map(|m| m.trim().to_string()),
        year: request.year,
        vehicle_type,
        daily_rate: request.daily_rate,
        plate_number: request.plate_number.map(|p| p.trim().to_string()),
        description: request.description,
        image: request.image,
        is_available: request.is_available,
    };

    let vehicle = state
        .vehicles
        .update(&user.actor(), id, changes, Utc::now().year())
        .await
        .map_err(error_response)?;

    Ok(Json(ApiResponse::success(VehicleDto::from(vehicle))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/vehicles/{id}",
    tag = "Vehicles",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Vehicle ID")),
    responses(
        (status = 200, description = "Vehicle deleted", body = ApiResponse<MessageResponse>),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_vehicle(
    State(state): State<VehicleHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> ApiResult<MessageResponse> {
    state
        .vehicles
        .delete(&user.actor(), id)
        .await
        .map_err(error_response)?;

    Ok(Json(ApiResponse::success(MessageResponse::new(format!(
        "Vehicle {} deleted",
        id
    )))))
}
