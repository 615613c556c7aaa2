use async_trait::async_trait;

use super::{NewVehicle, Vehicle, VehicleFilter};
use crate::domain::booking::DateRange;
use crate::domain::DomainResult;
use crate::shared::{PaginatedResult, PaginationParams};

#[async_trait]
pub trait VehicleRepository: Send + Sync {
    async fn create(&self, vehicle: NewVehicle) -> DomainResult<Vehicle>;
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Vehicle>>;
    async fn find_by_plate(&self, plate_number: &str) -> DomainResult<Option<Vehicle>>;
    async fn find_all(&self) -> DomainResult<Vec<Vehicle>>;

    async fn list(
        &self,
        filter: VehicleFilter,
        page: PaginationParams,
    ) -> DomainResult<PaginatedResult<Vehicle>>;

    /// Available vehicles with no Pending/Confirmed booking overlapping `range`.
    async fn list_free(
        &self,
        filter: VehicleFilter,
        range: DateRange,
        page: PaginationParams,
    ) -> DomainResult<PaginatedResult<Vehicle>>;

    async fn update(&self, vehicle: Vehicle) -> DomainResult<Vehicle>;
    async fn delete(&self, id: i32) -> DomainResult<()>;

    async fn count(&self) -> DomainResult<u64>;
}
