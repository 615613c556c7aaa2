//! Vehicle catalog management and availability search.

pub mod service;

pub use service::VehicleService;
