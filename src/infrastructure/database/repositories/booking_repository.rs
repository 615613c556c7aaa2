//! SeaORM implementation of BookingRepository

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use log::debug;
use sea_orm::prelude::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use super::db_err;
use crate::domain::booking::{
    Booking, BookingDetails, BookingFilter, BookingReportFilter, BookingRepository,
    BookingStatus, DateRange, NewBooking, PaymentMethod,
};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{booking, customer, user, vehicle};
use crate::shared::{PaginatedResult, PaginationParams};

pub struct SeaOrmBookingRepository {
    db: DatabaseConnection,
}

impl SeaOrmBookingRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: booking::Model) -> Booking {
    Booking {
        id: m.id,
        customer_id: m.customer_id,
        vehicle_id: m.vehicle_id,
        start_date: m.start_date,
        end_date: m.end_date,
        total_price: m.total_price,
        status: BookingStatus::parse(&m.status).unwrap_or(BookingStatus::Pending),
        payment_method: PaymentMethod::parse(&m.payment_method).unwrap_or_default(),
        notes: m.notes,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

fn active_statuses() -> [&'static str; 2] {
    BookingStatus::ACTIVE.map(|s| s.as_str())
}

// ── BookingRepository impl ──────────────────────────────────────

#[async_trait]
impl BookingRepository for SeaOrmBookingRepository {
    async fn create(&self, b: NewBooking) -> DomainResult<Booking> {
        debug!(
            "Creating booking: vehicle={} customer={} {}..{}",
            b.vehicle_id,
            b.customer_id,
            b.range.start(),
            b.range.end()
        );

        let now = Utc::now();
        let model = booking::ActiveModel {
            customer_id: Set(b.customer_id),
            vehicle_id: Set(b.vehicle_id),
            start_date: Set(b.range.start()),
            end_date: Set(b.range.end()),
            total_price: Set(b.total_price),
            status: Set(BookingStatus::Pending.as_str().to_string()),
            payment_method: Set(b.payment_method.as_str().to_string()),
            notes: Set(b.notes),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;

        Ok(model_to_domain(model))
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Booking>> {
        let model = booking::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn update(&self, b: Booking) -> DomainResult<Booking> {
        debug!("Updating booking: {} ({})", b.id, b.status);

        let existing = booking::Entity::find_by_id(b.id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Booking", "id", b.id))?;

        let mut active: booking::ActiveModel = existing.into();
        active.vehicle_id = Set(b.vehicle_id);
        active.start_date = Set(b.start_date);
        active.end_date = Set(b.end_date);
        active.total_price = Set(b.total_price);
        active.status = Set(b.status.as_str().to_string());
        active.payment_method = Set(b.payment_method.as_str().to_string());
        active.notes = Set(b.notes);
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await.map_err(db_err)?;
        Ok(model_to_domain(model))
    }

    async fn delete(&self, id: i32) -> DomainResult<()> {
        let result = booking::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Booking", "id", id));
        }
        Ok(())
    }

    async fn list(
        &self,
        filter: BookingFilter,
        page: PaginationParams,
    ) -> DomainResult<PaginatedResult<Booking>> {
        let mut query = booking::Entity::find();

        if let Some(customer_id) = filter.customer_id {
            query = query.filter(booking::Column::CustomerId.eq(customer_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(booking::Column::Status.eq(status.as_str()));
        }

        let total = query.clone().count(&self.db).await.map_err(db_err)?;

        let models = query
            .order_by_desc(booking::Column::CreatedAt)
            .order_by_desc(booking::Column::Id)
            .offset(page.offset())
            .limit(page.limit as u64)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let items = models.into_iter().map(model_to_domain).collect();
        Ok(PaginatedResult::new(items, total, page.page, page.limit))
    }

    async fn find_by_status(&self, status: BookingStatus) -> DomainResult<Vec<Booking>> {
        let models = booking::Entity::find()
            .filter(booking::Column::Status.eq(status.as_str()))
            .order_by_desc(booking::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn find_conflicting(
        &self,
        vehicle_id: i32,
        range: DateRange,
        exclude_id: Option<i32>,
    ) -> DomainResult<Vec<Booking>> {
        let mut query = booking::Entity::find()
            .filter(booking::Column::VehicleId.eq(vehicle_id))
            .filter(booking::Column::Status.is_in(active_statuses()))
            .filter(booking::Column::StartDate.lte(range.end()))
            .filter(booking::Column::EndDate.gte(range.start()));

        if let Some(id) = exclude_id {
            query = query.filter(booking::Column::Id.ne(id));
        }

        let models = query.all(&self.db).await.map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn find_starting_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DomainResult<Vec<Booking>> {
        let models = booking::Entity::find()
            .filter(booking::Column::StartDate.gte(from))
            .filter(booking::Column::StartDate.lte(to))
            .order_by_asc(booking::Column::StartDate)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn find_details(&self, filter: &BookingReportFilter) -> DomainResult<Vec<BookingDetails>> {
        let mut query = booking::Entity::find();

        if let Some(from) = filter.start_from {
            query = query.filter(booking::Column::StartDate.gte(from));
        }
        if let Some(until) = filter.end_until {
            query = query.filter(booking::Column::EndDate.lte(until));
        }
        if let Some(status) = filter.status {
            query = query.filter(booking::Column::Status.eq(status.as_str()));
        }

        let rows = query
            .find_also_related(vehicle::Entity)
            .order_by_desc(booking::Column::StartDate)
            .order_by_desc(booking::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let customer_ids: Vec<i32> = rows.iter().map(|(b, _)| b.customer_id).collect();
        let usernames: HashMap<i32, String> = customer::Entity::find()
            .filter(customer::Column::Id.is_in(customer_ids))
            .find_also_related(user::Entity)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .filter_map(|(c, u)| u.map(|u| (c.id, u.username)))
            .collect();

        Ok(rows
            .into_iter()
            .map(|(b, v)| {
                let customer_username = usernames.get(&b.customer_id).cloned().unwrap_or_default();
                let vehicle_label = v
                    .map(|v| format!("{} {} ({})", v.brand, v.model_name, v.plate_number))
                    .unwrap_or_default();
                BookingDetails {
                    booking: model_to_domain(b),
                    customer_username,
                    vehicle_label,
                }
            })
            .collect())
    }

    async fn complete_overdue(&self, today: NaiveDate) -> DomainResult<u64> {
        let result = booking::Entity::update_many()
            .col_expr(
                booking::Column::Status,
                Expr::value(BookingStatus::Completed.as_str()),
            )
            .col_expr(booking::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(booking::Column::Status.eq(BookingStatus::Confirmed.as_str()))
            .filter(booking::Column::EndDate.lt(today))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected)
    }

    async fn cancel_stale(&self, cutoff: DateTime<Utc>) -> DomainResult<u64> {
        let result = booking::Entity::update_many()
            .col_expr(
                booking::Column::Status,
                Expr::value(BookingStatus::Cancelled.as_str()),
            )
            .col_expr(booking::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(booking::Column::Status.eq(BookingStatus::Pending.as_str()))
            .filter(booking::Column::CreatedAt.lt(cutoff))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected)
    }

    async fn count(&self) -> DomainResult<u64> {
        booking::Entity::find().count(&self.db).await.map_err(db_err)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::account::{AccountRepository, AccountRole, NewAccount};
    use crate::domain::vehicle::VehicleRepository;
    use crate::infrastructure::database::repositories::account_repository::SeaOrmAccountRepository;
    use crate::infrastructure::database::repositories::vehicle_repository::tests::new_vehicle;
    use crate::infrastructure::database::repositories::vehicle_repository::SeaOrmVehicleRepository;
    use crate::infrastructure::database::test_database;
    use rust_decimal::Decimal;
    use sea_orm::DatabaseConnection;

    /// Creates a customer account and returns its profile id.
    pub(crate) async fn insert_customer(db: &DatabaseConnection, username: &str) -> i32 {
        let account = SeaOrmAccountRepository::new(db.clone())
            .create(NewAccount {
                username: username.to_string(),
                email: None,
                password_hash: "hash".into(),
                role: AccountRole::Customer,
            })
            .await
            .unwrap();
        customer::Entity::find()
            .filter(customer::Column::UserId.eq(account.id))
            .one(db)
            .await
            .unwrap()
            .unwrap()
            .id
    }

    /// Inserts a booking with the given status for a fresh customer.
    pub(crate) async fn insert_booking(
        db: &DatabaseConnection,
        vehicle_id: i32,
        start: NaiveDate,
        end: NaiveDate,
        status: BookingStatus,
    ) -> i32 {
        let username = format!("renter-{}", uuid::Uuid::new_v4());
        let customer_id = insert_customer(db, &username).await;
        let now = Utc::now();
        booking::ActiveModel {
            customer_id: Set(customer_id),
            vehicle_id: Set(vehicle_id),
            start_date: Set(start),
            end_date: Set(end),
            total_price: Set(Decimal::from(100)),
            status: Set(status.as_str().to_string()),
            payment_method: Set("cash".into()),
            notes: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap()
        .id
    }

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, m, d).unwrap()
    }

    async fn setup() -> (DatabaseConnection, SeaOrmBookingRepository, i32, i32) {
        let db = test_database().await;
        let vehicle = SeaOrmVehicleRepository::new(db.clone())
            .create(new_vehicle("Toyota", "Corolla", "10-1111"))
            .await
            .unwrap();
        let customer_id = insert_customer(&db, "lina").await;
        (db.clone(), SeaOrmBookingRepository::new(db), vehicle.id, customer_id)
    }

    async fn status_of(repo: &SeaOrmBookingRepository, id: i32) -> BookingStatus {
        repo.find_by_id(id).await.unwrap().unwrap().status
    }

    fn new_booking(customer_id: i32, vehicle_id: i32, start: NaiveDate, end: NaiveDate) -> NewBooking {
        NewBooking {
            customer_id,
            vehicle_id,
            range: DateRange::new(start, end).unwrap(),
            total_price: Decimal::from(150),
            payment_method: PaymentMethod::Cliq,
            notes: Some("airport pickup".into()),
        }
    }

    #[tokio::test]
    async fn created_booking_is_pending() {
        let (_db, repo, vehicle_id, customer_id) = setup().await;
        let b = repo
            .create(new_booking(customer_id, vehicle_id, date(1, 1), date(1, 3)))
            .await
            .unwrap();
        assert_eq!(b.status, BookingStatus::Pending);
        assert_eq!(b.total_price, Decimal::from(150));
        assert_eq!(b.payment_method, PaymentMethod::Cliq);
    }

    #[tokio::test]
    async fn conflicts_are_inclusive_and_ignore_inactive() {
        let (db, repo, vehicle_id, customer_id) = setup().await;
        let existing = repo
            .create(new_booking(customer_id, vehicle_id, date(1, 1), date(1, 5)))
            .await
            .unwrap();
        insert_booking(&db, vehicle_id, date(2, 1), date(2, 5), BookingStatus::Cancelled).await;

        let touching = DateRange::new(date(1, 5), date(1, 8)).unwrap();
        let clashes = repo.find_conflicting(vehicle_id, touching, None).await.unwrap();
        assert_eq!(clashes.len(), 1);

        let self_excluded = repo
            .find_conflicting(vehicle_id, touching, Some(existing.id))
            .await
            .unwrap();
        assert!(self_excluded.is_empty());

        let over_cancelled = DateRange::new(date(2, 2), date(2, 3)).unwrap();
        assert!(repo
            .find_conflicting(vehicle_id, over_cancelled, None)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn complete_overdue_only_touches_confirmed_past_bookings() {
        let (db, repo, vehicle_id, _) = setup().await;
        let overdue = insert_booking(&db, vehicle_id, date(1, 1), date(1, 3), BookingStatus::Confirmed).await;
        let running = insert_booking(&db, vehicle_id, date(1, 4), date(1, 10), BookingStatus::Confirmed).await;
        let pending = insert_booking(&db, vehicle_id, date(1, 1), date(1, 2), BookingStatus::Pending).await;

        let completed = repo.complete_overdue(date(1, 5)).await.unwrap();
        assert_eq!(completed, 1);

        assert_eq!(status_of(&repo, overdue).await, BookingStatus::Completed);
        assert_eq!(status_of(&repo, running).await, BookingStatus::Confirmed);
        assert_eq!(status_of(&repo, pending).await, BookingStatus::Pending);

        assert_eq!(repo.complete_overdue(date(1, 5)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn cancel_stale_uses_creation_time() {
        let (db, repo, vehicle_id, _) = setup().await;
        let stale = insert_booking(&db, vehicle_id, date(6, 1), date(6, 2), BookingStatus::Pending).await;
        let fresh = insert_booking(&db, vehicle_id, date(7, 1), date(7, 2), BookingStatus::Pending).await;

        let mut active: booking::ActiveModel = booking::Entity::find_by_id(stale)
            .one(&db)
            .await
            .unwrap()
            .unwrap()
            .into();
        active.created_at = Set(Utc::now() - chrono::Duration::hours(25));
        active.update(&db).await.unwrap();

        let cancelled = repo
            .cancel_stale(Utc::now() - chrono::Duration::hours(24))
            .await
            .unwrap();
        assert_eq!(cancelled, 1);
        assert_eq!(status_of(&repo, stale).await, BookingStatus::Cancelled);
        assert_eq!(status_of(&repo, fresh).await, BookingStatus::Pending);
    }

    #[tokio::test]
    async fn list_scopes_by_customer_and_status() {
        let (db, repo, vehicle_id, customer_id) = setup().await;
        repo.create(new_booking(customer_id, vehicle_id, date(1, 1), date(1, 2)))
            .await
            .unwrap();
        insert_booking(&db, vehicle_id, date(3, 1), date(3, 2), BookingStatus::Confirmed).await;

        let mine = repo
            .list(
                BookingFilter {
                    customer_id: Some(customer_id),
                    status: None,
                },
                PaginationParams::default(),
            )
            .await
            .unwrap();
        assert_eq!(mine.total, 1);

        let confirmed = repo
            .list(
                BookingFilter {
                    customer_id: None,
                    status: Some(BookingStatus::Confirmed),
                },
                PaginationParams::default(),
            )
            .await
            .unwrap();
        assert_eq!(confirmed.total, 1);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn details_join_names_and_order_by_start() {
        let (_db, repo, vehicle_id, customer_id) = setup().await;
        repo.create(new_booking(customer_id, vehicle_id, date(1, 1), date(1, 2)))
            .await
            .unwrap();
        repo.create(new_booking(customer_id, vehicle_id, date(2, 1), date(2, 2)))
            .await
            .unwrap();

        let rows = repo
            .find_details(&BookingReportFilter::default())
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].booking.start_date, date(2, 1));
        assert_eq!(rows[0].customer_username, "lina");
        assert_eq!(rows[0].vehicle_label, "Toyota Corolla (10-1111)");

        let filtered = repo
            .find_details(&BookingReportFilter {
                start_from: Some(date(1, 15)),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);
    }
}
