//! Application layer: use-case services over the domain repositories.

pub mod bookings;
pub mod customers;
pub mod fleet;
pub mod identity;
pub mod reporting;

#[cfg(test)]
pub(crate) mod test_support;

pub use bookings::{BookingJobsConfig, BookingService};
pub use customers::CustomerService;
pub use fleet::VehicleService;
pub use identity::IdentityService;
pub use reporting::ReportService;
