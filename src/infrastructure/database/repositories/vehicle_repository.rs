//! SeaORM implementation of VehicleRepository

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set,
};

use super::{db_err, unique_err};
use crate::domain::booking::{BookingStatus, DateRange};
use crate::domain::vehicle::{NewVehicle, Vehicle, VehicleFilter, VehicleRepository, VehicleType};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{booking, vehicle};
use crate::shared::{PaginatedResult, PaginationParams};

pub struct SeaOrmVehicleRepository {
    db: DatabaseConnection,
}

impl SeaOrmVehicleRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn paginate(
        &self,
        query: Select<vehicle::Entity>,
        page: PaginationParams,
    ) -> DomainResult<PaginatedResult<Vehicle>> {
        let total = query.clone().count(&self.db).await.map_err(db_err)?;

        let models = query
            .order_by_asc(vehicle::Column::Brand)
            .order_by_asc(vehicle::Column::ModelName)
            .order_by_asc(vehicle::Column::Id)
            .offset(page.offset())
            .limit(page.limit as u64)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let items = models.into_iter().map(model_to_domain).collect();
        Ok(PaginatedResult::new(items, total, page.page, page.limit))
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: vehicle::Model) -> Vehicle {
    Vehicle {
        id: m.id,
        brand: m.brand,
        model: m.model_name,
        year: m.year,
        vehicle_type: VehicleType::parse(&m.vehicle_type).unwrap_or(VehicleType::Car),
        daily_rate: m.daily_rate,
        plate_number: m.plate_number,
        description: m.description,
        image: m.image,
        is_available: m.is_available,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

fn icontains(column: vehicle::Column, needle: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col((vehicle::Entity, column))))
        .like(format!("%{}%", needle.to_lowercase()))
}

fn filtered(filter: &VehicleFilter) -> Select<vehicle::Entity> {
    let mut query = vehicle::Entity::find();

    if let Some(vehicle_type) = filter.vehicle_type {
        query = query.filter(vehicle::Column::VehicleType.eq(vehicle_type.as_str()));
    }
    if let Some(ref brand) = filter.brand {
        query = query.filter(icontains(vehicle::Column::Brand, brand));
    }
    if let Some(ref model) = filter.model {
        query = query.filter(icontains(vehicle::Column::ModelName, model));
    }
    if filter.only_available {
        query = query.filter(vehicle::Column::IsAvailable.eq(true));
    }
    query
}

// ── VehicleRepository impl ──────────────────────────────────────

#[async_trait]
impl VehicleRepository for SeaOrmVehicleRepository {
    async fn create(&self, v: NewVehicle) -> DomainResult<Vehicle> {
        debug!("Creating vehicle: {}", v.plate_number);

        let now = Utc::now();
        let model = vehicle::ActiveModel {
            brand: Set(v.brand),
            model_name: Set(v.model),
            year: Set(v.year),
            vehicle_type: Set(v.vehicle_type.as_str().to_string()),
            daily_rate: Set(v.daily_rate),
            plate_number: Set(v.plate_number),
            description: Set(v.description),
            image: Set(v.image),
            is_available: Set(v.is_available),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(unique_err("A vehicle with this plate number already exists"))?;

        Ok(model_to_domain(model))
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Vehicle>> {
        let model = vehicle::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_by_plate(&self, plate_number: &str) -> DomainResult<Option<Vehicle>> {
        let model = vehicle::Entity::find()
            .filter(vehicle::Column::PlateNumber.eq(plate_number))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_all(&self) -> DomainResult<Vec<Vehicle>> {
        let models = vehicle::Entity::find()
            .order_by_asc(vehicle::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn list(
        &self,
        filter: VehicleFilter,
        page: PaginationParams,
    ) -> DomainResult<PaginatedResult<Vehicle>> {
        self.paginate(filtered(&filter), page).await
    }

    async fn list_free(
        &self,
        filter: VehicleFilter,
        range: DateRange,
        page: PaginationParams,
    ) -> DomainResult<PaginatedResult<Vehicle>> {
        let busy: Vec<i32> = booking::Entity::find()
            .select_only()
            .column(booking::Column::VehicleId)
            .distinct()
            .filter(booking::Column::Status.is_in(BookingStatus::ACTIVE.map(|s| s.as_str())))
            .filter(booking::Column::StartDate.lte(range.end()))
            .filter(booking::Column::EndDate.gte(range.start()))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let query = filtered(&filter)
            .filter(vehicle::Column::IsAvailable.eq(true))
            .filter(vehicle::Column::Id.is_not_in(busy));
        self.paginate(query, page).await
    }

    async fn update(&self, v: Vehicle) -> DomainResult<Vehicle> {
        debug!("Updating vehicle: {}", v.id);

        let existing = vehicle::Entity::find_by_id(v.id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Vehicle", "id", v.id))?;

        let mut active: vehicle::ActiveModel = existing.into();
        active.brand = Set(v.brand);
        active.model_name = Set(v.model);
        active.year = Set(v.year);
        active.vehicle_type = Set(v.vehicle_type.as_str().to_string());
        active.daily_rate = Set(v.daily_rate);
        active.plate_number = Set(v.plate_number);
        active.description = Set(v.description);
        active.image = Set(v.image);
        active.is_available = Set(v.is_available);
        active.updated_at = Set(Utc::now());

        let model = active
            .update(&self.db)
            .await
            .map_err(unique_err("A vehicle with this plate number already exists"))?;
        Ok(model_to_domain(model))
    }

    async fn delete(&self, id: i32) -> DomainResult<()> {
        let result = vehicle::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Vehicle", "id", id));
        }
        Ok(())
    }

    async fn count(&self) -> DomainResult<u64> {
        vehicle::Entity::find().count(&self.db).await.map_err(db_err)
    }
}
