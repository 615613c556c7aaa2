//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::account::AccountRepository;
use crate::domain::booking::BookingRepository;
use crate::domain::customer::CustomerRepository;
use crate::domain::repositories::RepositoryProvider;
use crate::domain::vehicle::VehicleRepository;

use super::account_repository::SeaOrmAccountRepository;
use super::booking_repository::SeaOrmBookingRepository;
use super::customer_repository::SeaOrmCustomerRepository;
use super::vehicle_repository::SeaOrmVehicleRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let vehicle = repos.vehicles().find_by_plate("10-1111").await?;
/// let clashes = repos.bookings().find_conflicting(vehicle.id, range, None).await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    accounts: SeaOrmAccountRepository,
    customers: SeaOrmCustomerRepository,
    vehicles: SeaOrmVehicleRepository,
    bookings: SeaOrmBookingRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            accounts: SeaOrmAccountRepository::new(db.clone()),
            customers: SeaOrmCustomerRepository::new(db.clone()),
            vehicles: SeaOrmVehicleRepository::new(db.clone()),
            bookings: SeaOrmBookingRepository::new(db),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn accounts(&self) -> &dyn AccountRepository {
        &self.accounts
    }

    fn customers(&self) -> &dyn CustomerRepository {
        &self.customers
    }

    fn vehicles(&self) -> &dyn VehicleRepository {
        &self.vehicles
    }

    fn bookings(&self) -> &dyn BookingRepository {
        &self.bookings
    }
}
