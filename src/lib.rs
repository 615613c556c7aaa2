//! # Rentcar
//!
//! Vehicle rental backend: accounts, customer profiles, the vehicle
//! catalog, bookings with overlap checks and pricing, periodic booking
//! status jobs and staff reports.
//!
//! ## Architecture
//!
//! - **domain**: entities, business rules and repository traits
//! - **application**: use-case services and the booking jobs
//! - **infrastructure**: SeaORM persistence, JWT and password hashing
//! - **interfaces**: REST API with Swagger documentation
//! - **shared**: errors, pagination, validation helpers, shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

// Re-export database types for easy access
pub use infrastructure::{init_database, DatabaseConfig, SeaOrmRepositoryProvider};

pub use interfaces::http::create_api_router;
