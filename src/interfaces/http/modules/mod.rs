pub mod auth;
pub mod bookings;
pub mod customers;
pub mod health;
pub mod metrics;
pub mod reports;
pub mod request_id;
pub mod vehicles;
