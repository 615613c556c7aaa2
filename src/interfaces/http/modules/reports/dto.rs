//! Report query parameters
//!
//! Report bodies are the application's report types, serialized as is.

use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::booking::{BookingReportFilter, BookingStatus};
use crate::interfaces::http::common::lenient_date;

/// Booking filters; values that do not parse are ignored.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct BookingReportParams {
    /// Bookings starting on or after this date (YYYY-MM-DD)
    pub start_date: Option<String>,
    /// Bookings ending on or before this date (YYYY-MM-DD)
    pub end_date: Option<String>,
    /// pending, confirmed, cancelled or completed
    pub status: Option<String>,
}

impl From<BookingReportParams> for BookingReportFilter {
    fn from(p: BookingReportParams) -> Self {
        Self {
            start_from: lenient_date(p.start_date.as_deref()),
            end_until: lenient_date(p.end_date.as_deref()),
            status: p.status.as_deref().and_then(BookingStatus::parse),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct UtilizationParams {
    /// 1-12, defaults to the current month
    pub month: Option<u32>,
    /// Defaults to the current year
    pub year: Option<i32>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct MonthlyRevenueParams {
    /// Defaults to the current year
    pub year: Option<i32>,
}
