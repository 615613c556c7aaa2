//! Booking domain entity and lifecycle

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::domain::{DomainError, DomainResult};

/// Booking lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BookingStatus {
    /// Created, waiting for staff approval
    Pending,
    /// Approved by staff
    Confirmed,
    /// Rejected by staff or cancelled as stale
    Cancelled,
    /// Rental period is over
    Completed,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 4] = [
        Self::Pending,
        Self::Confirmed,
        Self::Cancelled,
        Self::Completed,
    ];

    /// Statuses that hold a vehicle for their date range.
    pub const ACTIVE: [BookingStatus; 2] = [Self::Pending, Self::Confirmed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }

    /// Human readable name, e.g. for report headers.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Confirmed => "Confirmed",
            Self::Cancelled => "Cancelled",
            Self::Completed => "Completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "cancelled" => Some(Self::Cancelled),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        Self::ACTIVE.contains(self)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Completed)
    }

    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed)
                | (Self::Pending, Self::Cancelled)
                | (Self::Confirmed, Self::Completed)
        )
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaymentMethod {
    #[default]
    Cash,
    Cliq,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Cliq => "cliq",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cash" => Some(Self::Cash),
            "cliq" => Some(Self::Cliq),
            _ => None,
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Inclusive calendar date range; `end >= start` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> DomainResult<Self> {
        if end < start {
            return Err(DomainError::Validation(
                "end_date: End date must be on or after start date".to_string(),
            ));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of rental days, counting both ends.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Ranges that share at least one day overlap, including touching ends.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    pub fn ensure_not_past(&self, today: NaiveDate) -> DomainResult<()> {
        if self.start < today {
            return Err(DomainError::Validation(
                "start_date: Start date cannot be in the past".to_string(),
            ));
        }
        Ok(())
    }
}

/// Largest price the `bookings.total_price` column (10, 2) holds.
pub fn max_total_price() -> Decimal {
    Decimal::new(9_999_999_999, 2)
}

pub fn validate_total_price(price: Decimal) -> DomainResult<()> {
    if price < Decimal::ZERO {
        return Err(DomainError::Validation(
            "total_price: Total price cannot be negative".to_string(),
        ));
    }
    if price > max_total_price() {
        return Err(DomainError::Validation(format!(
            "total_price: Total price cannot exceed {}",
            max_total_price()
        )));
    }
    Ok(())
}

/// Price of renting for `range` at `daily_rate`.
pub fn compute_total_price(range: &DateRange, daily_rate: Decimal) -> DomainResult<Decimal> {
    let price = Decimal::from(range.days())
        .checked_mul(daily_rate)
        .ok_or_else(|| {
            DomainError::Validation("total_price: Booking is too long for this daily rate".to_string())
        })?;
    validate_total_price(price)?;
    Ok(price)
}

/// Rental of one vehicle by one customer
#[derive(Debug, Clone)]
pub struct Booking {
    pub id: i32,
    pub customer_id: i32,
    pub vehicle_id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_price: Decimal,
    pub status: BookingStatus,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn range(&self) -> DateRange {
        DateRange {
            start: self.start_date,
            end: self.end_date,
        }
    }

    pub fn set_range(&mut self, range: DateRange) {
        self.start_date = range.start();
        self.end_date = range.end();
    }

    pub fn transition(&mut self, next: BookingStatus) -> DomainResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::Conflict(format!(
                "Cannot change booking status from {} to {}",
                self.status, next
            )));
        }
        self.status = next;
        Ok(())
    }

    pub fn approve(&mut self) -> DomainResult<()> {
        self.transition(BookingStatus::Confirmed)
    }

    pub fn reject(&mut self) -> DomainResult<()> {
        self.transition(BookingStatus::Cancelled)
    }

    pub fn ensure_editable(&self) -> DomainResult<()> {
        if self.status != BookingStatus::Pending {
            return Err(DomainError::Conflict(format!(
                "Only pending bookings can be modified (current status: {})",
                self.status
            )));
        }
        Ok(())
    }
}

/// Input for creating a booking; the status always starts as Pending.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub customer_id: i32,
    pub vehicle_id: i32,
    pub range: DateRange,
    pub total_price: Decimal,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
}

/// Filters for the paginated booking list
#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    /// Restricts results to one customer's bookings
    pub customer_id: Option<i32>,
    pub status: Option<BookingStatus>,
}

/// Filters for the bookings report
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingReportFilter {
    /// Bookings starting on or after this date
    pub start_from: Option<NaiveDate>,
    /// Bookings ending on or before this date
    pub end_until: Option<NaiveDate>,
    pub status: Option<BookingStatus>,
}

/// Booking joined with display names for reporting
#[derive(Debug, Clone)]
pub struct BookingDetails {
    pub booking: Booking,
    pub customer_username: String,
    pub vehicle_label: String,
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn range(a: (i32, u32, u32), b: (i32, u32, u32)) -> DateRange {
        DateRange::new(date(a.0, a.1, a.2), date(b.0, b.1, b.2)).unwrap()
    }

    fn pending_booking() -> Booking {
        Booking {
            id: 1,
            customer_id: 1,
            vehicle_id: 1,
            start_date: date(2025, 1, 1),
            end_date: date(2025, 1, 3),
            total_price: Decimal::from(150),
            status: BookingStatus::Pending,
            payment_method: PaymentMethod::Cash,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn three_days_at_fifty_is_one_fifty() {
        let r = range((2025, 1, 1), (2025, 1, 3));
        assert_eq!(r.days(), 3);
        assert_eq!(compute_total_price(&r, Decimal::new(5000, 2)).unwrap(), Decimal::from(150));
    }

    #[test]
    fn oversized_price_is_a_validation_error() {
        let long = range((2030, 1, 1), (9999, 12, 31));
        assert!(matches!(
            compute_total_price(&long, Decimal::MAX),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            compute_total_price(&long, Decimal::new(99_999_999, 2)),
            Err(DomainError::Validation(_))
        ));

        assert!(validate_total_price(Decimal::new(9_999_999_999, 2)).is_ok());
        assert!(validate_total_price(Decimal::new(10_000_000_000, 2)).is_err());
        assert!(validate_total_price(Decimal::new(-1, 0)).is_err());
    }

    #[test]
    fn same_day_rental_is_one_day() {
        let r = range((2025, 1, 1), (2025, 1, 1));
        assert_eq!(compute_total_price(&r, Decimal::from(40)).unwrap(), Decimal::from(40));
    }

    #[test]
    fn end_before_start_is_rejected() {
        assert!(DateRange::new(date(2025, 1, 5), date(2025, 1, 4)).is_err());
    }

    #[test]
    fn touching_ranges_overlap() {
        let a = range((2025, 1, 1), (2025, 1, 5));
        let b = range((2025, 1, 5), (2025, 1, 8));
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn disjoint_ranges_do_not_overlap() {
        let a = range((2025, 1, 1), (2025, 1, 5));
        let b = range((2025, 1, 6), (2025, 1, 8));
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn contained_range_overlaps() {
        let a = range((2025, 1, 1), (2025, 1, 31));
        let b = range((2025, 1, 10), (2025, 1, 12));
        assert!(a.overlaps(&b));
    }

    #[test]
    fn past_start_is_rejected() {
        let r = range((2025, 1, 1), (2025, 1, 3));
        assert!(r.ensure_not_past(date(2025, 1, 2)).is_err());
        assert!(r.ensure_not_past(date(2025, 1, 1)).is_ok());
    }

    #[test]
    fn approve_then_complete() {
        let mut b = pending_booking();
        b.approve().unwrap();
        assert_eq!(b.status, BookingStatus::Confirmed);
        b.transition(BookingStatus::Completed).unwrap();
        assert_eq!(b.status, BookingStatus::Completed);
    }

    #[test]
    fn terminal_states_reject_transitions() {
        let mut b = pending_booking();
        b.reject().unwrap();
        assert!(b.status.is_terminal());
        assert!(matches!(b.approve(), Err(DomainError::Conflict(_))));
        assert_eq!(b.status, BookingStatus::Cancelled);
    }

    #[test]
    fn confirmed_cannot_be_rejected() {
        let mut b = pending_booking();
        b.approve().unwrap();
        assert!(b.reject().is_err());
        assert!(b.ensure_editable().is_err());
    }

    #[test]
    fn status_parse_accepts_labels() {
        assert_eq!(BookingStatus::parse("PENDING"), Some(BookingStatus::Pending));
        assert_eq!(BookingStatus::parse("Completed"), Some(BookingStatus::Completed));
        assert_eq!(BookingStatus::parse("archived"), None);
        assert_eq!(PaymentMethod::parse("CliQ"), Some(PaymentMethod::Cliq));
    }
}
