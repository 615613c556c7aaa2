//! Vehicle DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::vehicle::Vehicle;

#[derive(Debug, Serialize, ToSchema)]
pub struct VehicleDto {
    pub id: i32,
    pub brand: String,
    pub model: String,
    pub year: i32,
    /// car, van, truck or motorbike
    pub vehicle_type: String,
    pub daily_rate: Decimal,
    pub plate_number: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Vehicle> for VehicleDto {
    fn from(v: Vehicle) -> Self {
        Self {
            id: v.id,
            brand: v.brand,
            model: v.model,
            year: v.year,
            vehicle_type: v.vehicle_type.as_str().to_string(),
            daily_rate: v.daily_rate,
            plate_number: v.plate_number,
            description: v.description,
            image: v.image,
            is_available: v.is_available,
            created_at: v.created_at,
            updated_at: v.updated_at,
        }
    }
}

fn default_available() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateVehicleRequest {
    #[validate(length(min = 1, max = 100, message = "brand is required"))]
    pub brand: String,
    #[validate(length(min = 1, max = 100, message = "model is required"))]
    pub model: String,
    pub year: i32,
    /// car, van, truck or motorbike
    pub vehicle_type: String,
    pub daily_rate: Decimal,
    #[validate(length(min = 1, max = 20, message = "plate number must be 1-20 characters"))]
    pub plate_number: String,
    pub description: Option<String>,
    #[validate(length(max = 255, message = "image path is too long"))]
    pub image: Option<String>,
    #[serde(default = "default_available")]
    pub is_available: bool,
}

/// Partial update; omitted fields stay unchanged
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateVehicleRequest {
    #[validate(length(min = 1, max = 100, message = "brand cannot be empty"))]
    pub brand: Option<String>,
    #[validate(length(min = 1, max = 100, message = "model cannot be empty"))]
    pub model: Option<String>,
    pub year: Option<i32>,
    pub vehicle_type: Option<String>,
    pub daily_rate: Option<Decimal>,
    #[validate(length(min = 1, max = 20, message = "plate number must be 1-20 characters"))]
    pub plate_number: Option<String>,
    pub description: Option<String>,
    #[validate(length(max = 255, message = "image path is too long"))]
    pub image: Option<String>,
    pub is_available: Option<bool>,
}

/// Catalog filters. When both dates are given only vehicles free for the
/// whole range are listed.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListVehiclesParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub vehicle_type: Option<String>,
    /// Case-insensitive substring
    pub brand: Option<String>,
    /// Case-insensitive substring
    pub model: Option<String>,
    /// Only vehicles flagged as available
    pub available: Option<bool>,
    /// YYYY-MM-DD
    pub start_date: Option<String>,
    /// YYYY-MM-DD
    pub end_date: Option<String>,
}
