//! Vehicle catalog aggregate

pub mod model;
pub mod repository;

pub use model::{
    validate_daily_rate, validate_year, NewVehicle, Vehicle, VehicleChanges, VehicleFilter,
    VehicleType, EARLIEST_MODEL_YEAR,
};
pub use repository::VehicleRepository;
