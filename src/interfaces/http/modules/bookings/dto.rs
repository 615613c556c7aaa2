//! Booking DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::bookings::{JobRunReport, StatusGroup};
use crate::domain::Booking;

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingDto {
    pub id: i32,
    pub customer_id: i32,
    pub vehicle_id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Rental days, both ends included
    pub days: i64,
    pub total_price: Decimal,
    /// pending, confirmed, cancelled or completed
    pub status: String,
    /// cash or cliq
    pub payment_method: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Booking> for BookingDto {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id,
            customer_id: b.customer_id,
            vehicle_id: b.vehicle_id,
            days: b.range().days(),
            start_date: b.start_date,
            end_date: b.end_date,
            total_price: b.total_price,
            status: b.status.as_str().to_string(),
            payment_method: b.payment_method.as_str().to_string(),
            notes: b.notes,
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBookingRequest {
    /// Required for staff, ignored for customers
    pub customer_id: Option<i32>,
    pub vehicle_id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// cash (default) or cliq
    pub payment_method: Option<String>,
    #[validate(length(max = 1000, message = "notes must be at most 1000 characters"))]
    pub notes: Option<String>,
    /// Price override, honoured for staff only
    pub total_price: Option<Decimal>,
}

/// Partial update of a Pending booking
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBookingRequest {
    pub vehicle_id: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub payment_method: Option<String>,
    #[validate(length(max = 1000, message = "notes must be at most 1000 characters"))]
    pub notes: Option<String>,
    pub total_price: Option<Decimal>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListBookingsParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// pending, confirmed, cancelled or completed
    pub status: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingStatusGroupDto {
    pub status: String,
    pub label: String,
    pub count: usize,
    pub bookings: Vec<BookingDto>,
}

impl From<StatusGroup> for BookingStatusGroupDto {
    fn from(g: StatusGroup) -> Self {
        Self {
            status: g.status.as_str().to_string(),
            label: g.status.label().to_string(),
            count: g.bookings.len(),
            bookings: g.bookings.into_iter().map(BookingDto::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct JobRunResponse {
    /// Confirmed bookings moved to completed
    pub completed: u64,
    /// Pending bookings moved to cancelled
    pub cancelled: u64,
}

impl From<JobRunReport> for JobRunResponse {
    fn from(r: JobRunReport) -> Self {
        Self {
            completed: r.completed,
            cancelled: r.cancelled,
        }
    }
}
