//! Customer aggregate

pub mod model;
pub mod repository;
pub mod status_provider;

pub use model::{Customer, CustomerFilter, CustomerStatus, ProfileChanges, MINIMUM_AGE};
pub use repository::CustomerRepository;
pub use status_provider::CustomerStatusProvider;
