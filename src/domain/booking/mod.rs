//! Booking aggregate
//!
//! Lifecycle, date ranges, pricing and the repository interface.

pub mod model;
pub mod repository;

pub use model::{
    compute_total_price, max_total_price, validate_total_price, Booking, BookingDetails,
    BookingFilter, BookingReportFilter, BookingStatus, DateRange, NewBooking, PaymentMethod,
};
pub use repository::BookingRepository;
