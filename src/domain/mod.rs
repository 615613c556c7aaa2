//! Domain layer: entities, business rules and repository interfaces.

pub mod account;
pub mod booking;
pub mod customer;
pub mod repositories;
pub mod vehicle;

pub use account::{Account, AccountRole, Actor};
pub use booking::{Booking, BookingStatus, DateRange, PaymentMethod};
pub use customer::{Customer, CustomerStatus};
pub use repositories::{DomainResult, RepositoryProvider};
pub use vehicle::{Vehicle, VehicleType};

pub use crate::shared::errors::DomainError;
