//! Database entities module

pub mod booking;
pub mod customer;
pub mod user;
pub mod vehicle;

pub use booking::Entity as Booking;
pub use customer::Entity as Customer;
pub use user::Entity as User;
pub use vehicle::Entity as Vehicle;
