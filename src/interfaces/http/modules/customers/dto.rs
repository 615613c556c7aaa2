//! Customer DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::customer::{Customer, ProfileChanges};

/// Customer profile with its completeness
#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerDto {
    pub id: i32,
    pub username: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub driver_license_number: Option<String>,
    pub license_image: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    /// verified, unverified or blocked
    pub status: String,
    pub is_profile_complete: bool,
    /// Required fields still empty, in form order
    pub missing_fields: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Customer> for CustomerDto {
    fn from(c: Customer) -> Self {
        let missing_fields = c.missing_fields().into_iter().map(String::from).collect();
        Self {
            id: c.id,
            is_profile_complete: c.is_profile_complete(),
            status: c.status.as_str().to_string(),
            username: c.username,
            email: c.email,
            phone_number: c.phone_number,
            address: c.address,
            driver_license_number: c.driver_license_number,
            license_image: c.license_image,
            date_of_birth: c.date_of_birth,
            missing_fields,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// Partial profile update; omitted fields stay unchanged
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 20, message = "phone number is too long"))]
    pub phone_number: Option<String>,
    #[validate(length(max = 255, message = "address is too long"))]
    pub address: Option<String>,
    #[validate(length(max = 50, message = "driver license number is too long"))]
    pub driver_license_number: Option<String>,
    /// Stored path or URL of the license scan
    #[validate(length(max = 255, message = "license image path is too long"))]
    pub license_image: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

impl From<UpdateProfileRequest> for ProfileChanges {
    fn from(r: UpdateProfileRequest) -> Self {
        Self {
            phone_number: r.phone_number,
            address: r.address,
            driver_license_number: r.driver_license_number,
            license_image: r.license_image,
            date_of_birth: r.date_of_birth,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListCustomersParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// verified, unverified or blocked
    pub status: Option<String>,
    /// Case-insensitive match on username
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SetCustomerStatusRequest {
    /// verified, unverified or blocked
    #[validate(length(min = 1, message = "status is required"))]
    pub status: String,
}
