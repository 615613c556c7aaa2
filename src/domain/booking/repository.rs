use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use super::{Booking, BookingDetails, BookingFilter, BookingReportFilter, BookingStatus, DateRange, NewBooking};
use crate::domain::DomainResult;
use crate::shared::{PaginatedResult, PaginationParams};

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create(&self, booking: NewBooking) -> DomainResult<Booking>;
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Booking>>;
    async fn update(&self, booking: Booking) -> DomainResult<Booking>;
    async fn delete(&self, id: i32) -> DomainResult<()>;

    /// Newest first.
    async fn list(
        &self,
        filter: BookingFilter,
        page: PaginationParams,
    ) -> DomainResult<PaginatedResult<Booking>>;

    async fn find_by_status(&self, status: BookingStatus) -> DomainResult<Vec<Booking>>;

    /// Pending or Confirmed bookings of `vehicle_id` overlapping `range`.
    async fn find_conflicting(
        &self,
        vehicle_id: i32,
        range: DateRange,
        exclude_id: Option<i32>,
    ) -> DomainResult<Vec<Booking>>;

    /// Bookings whose start date falls within `[from, to]`.
    async fn find_starting_between(&self, from: NaiveDate, to: NaiveDate) -> DomainResult<Vec<Booking>>;

    /// Report rows ordered by start date, newest first.
    async fn find_details(&self, filter: &BookingReportFilter) -> DomainResult<Vec<BookingDetails>>;

    /// Confirmed bookings ending before `today` become Completed.
    async fn complete_overdue(&self, today: NaiveDate) -> DomainResult<u64>;

    /// Pending bookings created before `cutoff` become Cancelled.
    async fn cancel_stale(&self, cutoff: DateTime<Utc>) -> DomainResult<u64>;

    async fn count(&self) -> DomainResult<u64>;
}
