use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use crate::domain::account::Actor;
use crate::domain::booking::DateRange;
use crate::domain::vehicle::{NewVehicle, Vehicle, VehicleChanges, VehicleFilter};
use crate::domain::{DomainError, DomainResult, RepositoryProvider};
use crate::shared::{PaginatedResult, PaginationParams};

pub struct VehicleService {
    repos: Arc<dyn RepositoryProvider>,
}

impl VehicleService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    // ── Queries ─────────────────────────────────────────────────

    pub async fn list(
        &self,
        filter: VehicleFilter,
        page: PaginationParams,
    ) -> DomainResult<PaginatedResult<Vehicle>> {
        self.repos.vehicles().list(filter, page).await
    }

    pub async fn get(&self, id: i32) -> DomainResult<Vehicle> {
        self.repos
            .vehicles()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Vehicle", "id", id))
    }

    /// Vehicles that can be booked for every day of `[start, end]`.
    pub async fn available(
        &self,
        filter: VehicleFilter,
        start: NaiveDate,
        end: NaiveDate,
        today: NaiveDate,
        page: PaginationParams,
    ) -> DomainResult<PaginatedResult<Vehicle>> {
        let range = DateRange::new(start, end)?;
        range.ensure_not_past(today)?;
        self.repos.vehicles().list_free(filter, range, page).await
    }

    // ── Commands ────────────────────────────────────────────────

    pub async fn create(
        &self,
        actor: &Actor,
        vehicle: NewVehicle,
        current_year: i32,
    ) -> DomainResult<Vehicle> {
        actor.require_staff()?;
        vehicle.validate(current_year)?;
        self.ensure_plate_free(&vehicle.plate_number, None).await?;

        let created = self.repos.vehicles().create(vehicle).await?;
        info!(vehicle_id = created.id, plate = %created.plate_number, "Vehicle added");
        Ok(created)
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: i32,
        changes: VehicleChanges,
        current_year: i32,
    ) -> DomainResult<Vehicle> {
        actor.require_staff()?;
        let mut vehicle = self.get(id).await?;

        if let Some(ref plate) = changes.plate_number {
            self.ensure_plate_free(plate, Some(id)).await?;
        }

        vehicle.apply(changes);
        vehicle.validate(current_year)?;
        self.repos.vehicles().update(vehicle).await
    }

    pub async fn delete(&self, actor: &Actor, id: i32) -> DomainResult<()> {
        actor.require_staff()?;
        self.repos.vehicles().delete(id).await?;
        info!(vehicle_id = id, "Vehicle removed");
        Ok(())
    }

    async fn ensure_plate_free(&self, plate: &str, own_id: Option<i32>) -> DomainResult<()> {
        match self.repos.vehicles().find_by_plate(plate).await? {
            Some(existing) if Some(existing.id) != own_id => Err(DomainError::Conflict(
                "A vehicle with this plate number already exists".into(),
            )),
            _ => Ok(()),
        }
    }
}
