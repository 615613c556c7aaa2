//! Booking service
//!
//! Owns every rule that decides whether a booking may be created or
//! changed: profile completeness, vehicle availability, date-range
//! overlap and the status state machine.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;

use crate::domain::account::Actor;
use crate::domain::booking::{
    compute_total_price, validate_total_price, Booking, BookingFilter, BookingStatus, DateRange,
    NewBooking, PaymentMethod,
};
use crate::domain::customer::Customer;
use crate::domain::vehicle::Vehicle;
use crate::domain::{DomainError, DomainResult, RepositoryProvider};
use crate::shared::{PaginatedResult, PaginationParams};

/// Input for creating a booking
#[derive(Debug, Clone)]
pub struct BookingRequest {
    /// Required when staff books on behalf of a customer; ignored otherwise
    pub customer_id: Option<i32>,
    pub vehicle_id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    /// Staff-only price override
    pub total_price: Option<Decimal>,
}

/// Partial update of a pending booking
#[derive(Debug, Clone, Default)]
pub struct BookingChanges {
    pub vehicle_id: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub payment_method: Option<PaymentMethod>,
    pub notes: Option<String>,
    pub total_price: Option<Decimal>,
}

/// Bookings sharing one status
#[derive(Debug, Clone)]
pub struct StatusGroup {
    pub status: BookingStatus,
    pub bookings: Vec<Booking>,
}

pub struct BookingService {
    repos: Arc<dyn RepositoryProvider>,
}

impl BookingService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    // ── Queries ─────────────────────────────────────────────────

    /// Staff see every booking; customers only their own.
    pub async fn list(
        &self,
        actor: &Actor,
        status: Option<BookingStatus>,
        page: PaginationParams,
    ) -> DomainResult<PaginatedResult<Booking>> {
        let mut filter = BookingFilter {
            customer_id: None,
            status,
        };

        if !actor.is_staff() {
            match self.caller_profile(actor).await? {
                Some(profile) => filter.customer_id = Some(profile.id),
                None => return Ok(PaginatedResult::new(Vec::new(), 0, page.page, page.limit)),
            }
        }

        self.repos.bookings().list(filter, page).await
    }

    /// Bookings the caller cannot see are reported as missing.
    pub async fn get(&self, actor: &Actor, id: i32) -> DomainResult<Booking> {
        let booking = self
            .repos
            .bookings()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Booking", "id", id))?;

        if actor.is_staff() {
            return Ok(booking);
        }

        match self.caller_profile(actor).await? {
            Some(profile) if profile.id == booking.customer_id => Ok(booking),
            _ => Err(DomainError::not_found("Booking", "id", id)),
        }
    }

    /// Every status with its bookings, in lifecycle order.
    pub async fn by_status(&self, actor: &Actor) -> DomainResult<Vec<StatusGroup>> {
        actor.require_staff()?;

        let mut groups = Vec::with_capacity(BookingStatus::ALL.len());
        for status in BookingStatus::ALL {
            let bookings = self.repos.bookings().find_by_status(status).await?;
            groups.push(StatusGroup { status, bookings });
        }
        Ok(groups)
    }

    // ── Commands ────────────────────────────────────────────────

    pub async fn create(
        &self,
        actor: &Actor,
        req: BookingRequest,
        today: NaiveDate,
    ) -> DomainResult<Booking> {
        let customer = self.resolve_customer(actor, req.customer_id).await?;
        customer.ensure_can_book()?;

        let vehicle = self.bookable_vehicle(req.vehicle_id).await?;

        let range = DateRange::new(req.start_date, req.end_date)?;
        range.ensure_not_past(today)?;
        self.ensure_no_overlap(vehicle.id, range, None).await?;

        let total_price = self.price_for(actor, req.total_price, &range, &vehicle)?;

        let booking = self
            .repos
            .bookings()
            .create(NewBooking {
                customer_id: customer.id,
                vehicle_id: vehicle.id,
                range,
                total_price,
                payment_method: req.payment_method,
                notes: req.notes.filter(|n| !n.trim().is_empty()),
            })
            .await?;

        info!(
            booking_id = booking.id,
            customer_id = customer.id,
            vehicle_id = vehicle.id,
            total_price = %booking.total_price,
            "Booking created"
        );
        Ok(booking)
    }

    /// Only Pending bookings may change; overlap and price are re-evaluated.
    pub async fn update(
        &self,
        actor: &Actor,
        id: i32,
        changes: BookingChanges,
        today: NaiveDate,
    ) -> DomainResult<Booking> {
        let mut booking = self.get(actor, id).await?;
        booking.ensure_editable()?;

        let original_start = booking.start_date;
        let vehicle = match changes.vehicle_id {
            Some(vehicle_id) if vehicle_id != booking.vehicle_id => {
                self.bookable_vehicle(vehicle_id).await?
            }
            _ => self.vehicle(booking.vehicle_id).await?,
        };

        let range = DateRange::new(
            changes.start_date.unwrap_or(booking.start_date),
            changes.end_date.unwrap_or(booking.end_date),
        )?;
        if range.start() != original_start {
            range.ensure_not_past(today)?;
        }
        self.ensure_no_overlap(vehicle.id, range, Some(booking.id)).await?;

        // An untouched range and vehicle keep the stored price, override included.
        let price_override = changes.total_price.filter(|_| actor.is_staff());
        let reprice = price_override.is_some()
            || range != booking.range()
            || vehicle.id != booking.vehicle_id;

        booking.vehicle_id = vehicle.id;
        booking.set_range(range);
        if reprice {
            booking.total_price = self.price_for(actor, price_override, &range, &vehicle)?;
        }
        if let Some(method) = changes.payment_method {
            booking.payment_method = method;
        }
        if let Some(notes) = changes.notes {
            booking.notes = Some(notes).filter(|n| !n.trim().is_empty());
        }

        self.repos.bookings().update(booking).await
    }

    /// Staff may delete any booking; customers only their own Pending ones.
    pub async fn delete(&self, actor: &Actor, id: i32) -> DomainResult<()> {
        let booking = self.get(actor, id).await?;

        if !actor.is_staff() && booking.status != BookingStatus::Pending {
            return Err(DomainError::Forbidden(
                "Only pending bookings can be deleted".into(),
            ));
        }

        self.repos.bookings().delete(id).await?;
        info!(booking_id = id, by = %actor.username, "Booking deleted");
        Ok(())
    }

    pub async fn approve(&self, actor: &Actor, id: i32) -> DomainResult<Booking> {
        self.change_status(actor, id, BookingStatus::Confirmed).await
    }

    pub async fn reject(&self, actor: &Actor, id: i32) -> DomainResult<Booking> {
        self.change_status(actor, id, BookingStatus::Cancelled).await
    }

    async fn change_status(
        &self,
        actor: &Actor,
        id: i32,
        next: BookingStatus,
    ) -> DomainResult<Booking> {
        actor.require_staff()?;

        let mut booking = self
            .repos
            .bookings()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Booking", "id", id))?;

        booking.transition(next)?;
        let saved = self.repos.bookings().update(booking).await?;

        info!(booking_id = id, status = %saved.status, by = %actor.username, "Booking status changed");
        Ok(saved)
    }

    // ── Helpers ─────────────────────────────────────────────────

    async fn caller_profile(&self, actor: &Actor) -> DomainResult<Option<Customer>> {
        self.repos
            .customers()
            .find_by_account_id(&actor.account_id)
            .await
    }

    async fn resolve_customer(
        &self,
        actor: &Actor,
        customer_id: Option<i32>,
    ) -> DomainResult<Customer> {
        if actor.is_staff() {
            let id = customer_id.ok_or_else(|| {
                DomainError::Validation("customer_id: Staff must provide a customer id".into())
            })?;
            return self
                .repos
                .customers()
                .find_by_id(id)
                .await?
                .ok_or_else(|| DomainError::not_found("Customer", "id", id));
        }

        self.caller_profile(actor).await?.ok_or_else(|| {
            DomainError::Validation("User does not have a customer profile".into())
        })
    }

    async fn vehicle(&self, id: i32) -> DomainResult<Vehicle> {
        self.repos
            .vehicles()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Vehicle", "id", id))
    }

    async fn bookable_vehicle(&self, id: i32) -> DomainResult<Vehicle> {
        let vehicle = self.vehicle(id).await?;
        if !vehicle.is_available {
            return Err(DomainError::Validation(
                "vehicle_id: Vehicle is not available for booking".into(),
            ));
        }
        Ok(vehicle)
    }

    async fn ensure_no_overlap(
        &self,
        vehicle_id: i32,
        range: DateRange,
        exclude_id: Option<i32>,
    ) -> DomainResult<()> {
        let clashes = self
            .repos
            .bookings()
            .find_conflicting(vehicle_id, range, exclude_id)
            .await?;
        if !clashes.is_empty() {
            return Err(DomainError::Conflict(
                "Vehicle is already booked for the selected dates".into(),
            ));
        }
        Ok(())
    }

    fn price_for(
        &self,
        actor: &Actor,
        requested: Option<Decimal>,
        range: &DateRange,
        vehicle: &Vehicle,
    ) -> DomainResult<Decimal> {
        match requested {
            Some(price) if actor.is_staff() => {
                validate_total_price(price)?;
                Ok(price)
            }
            _ => compute_total_price(range, vehicle.daily_rate),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{customer, date, repos, staff, today, vehicle};
    use crate::domain::customer::CustomerStatus;
    use crate::domain::vehicle::VehicleChanges;

    fn request(vehicle_id: i32, start: NaiveDate, end: NaiveDate) -> BookingRequest {
        BookingRequest {
            customer_id: None,
            vehicle_id,
            start_date: start,
            end_date: end,
            payment_method: PaymentMethod::Cash,
            notes: None,
            total_price: None,
        }
    }

    #[tokio::test]
    async fn three_day_booking_costs_three_daily_rates() {
        let repos = repos().await;
        let (actor, _) = customer(&repos, "lina", true).await;
        let v = vehicle(&repos, "30-1000", 50).await;
        let service = BookingService::new(repos);

        let booking = service
            .create(&actor, request(v.id, date(2030, 3, 1), date(2030, 3, 3)), today())
            .await
            .unwrap();
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.total_price, Decimal::from(150));
    }

    #[tokio::test]
    async fn touching_booking_is_rejected() {
        let repos = repos().await;
        let (lina, _) = customer(&repos, "lina", true).await;
        let (omar, _) = customer(&repos, "omar", true).await;
        let v = vehicle(&repos, "30-1000", 50).await;
        let service = BookingService::new(repos);

        service
            .create(&lina, request(v.id, date(2030, 3, 1), date(2030, 3, 5)), today())
            .await
            .unwrap();
        let clash = service
            .create(&omar, request(v.id, date(2030, 3, 5), date(2030, 3, 8)), today())
            .await;
        assert!(matches!(clash, Err(DomainError::Conflict(_))));

        let after = service
            .create(&omar, request(v.id, date(2030, 3, 6), date(2030, 3, 8)), today())
            .await;
        assert!(after.is_ok());
    }

    #[tokio::test]
    async fn rejected_booking_frees_the_dates() {
        let repos = repos().await;
        let admin = staff(&repos, "admin").await;
        let (lina, _) = customer(&repos, "lina", true).await;
        let v = vehicle(&repos, "30-1000", 50).await;
        let service = BookingService::new(repos);

        let first = service
            .create(&lina, request(v.id, date(2030, 3, 1), date(2030, 3, 5)), today())
            .await
            .unwrap();
        service.reject(&admin, first.id).await.unwrap();

        assert!(service
            .create(&lina, request(v.id, date(2030, 3, 2), date(2030, 3, 4)), today())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn incomplete_profile_cannot_book() {
        let repos = repos().await;
        let (actor, _) = customer(&repos, "lina", false).await;
        let v = vehicle(&repos, "30-1000", 50).await;
        let service = BookingService::new(repos);

        let result = service
            .create(&actor, request(v.id, date(2030, 3, 1), date(2030, 3, 3)), today())
            .await;
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn blocked_customer_cannot_book() {
        let repos = repos().await;
        let (actor, profile) = customer(&repos, "lina", true).await;
        repos
            .customers()
            .set_status(profile.id, CustomerStatus::Blocked)
            .await
            .unwrap();
        let v = vehicle(&repos, "30-1000", 50).await;
        let service = BookingService::new(repos);

        let result = service
            .create(&actor, request(v.id, date(2030, 3, 1), date(2030, 3, 3)), today())
            .await;
        assert!(matches!(result, Err(DomainError::Forbidden(_))));
    }

    #[tokio::test]
    async fn unavailable_vehicle_and_past_dates_are_rejected() {
        let repos = repos().await;
        let (actor, _) = customer(&repos, "lina", true).await;
        let mut v = vehicle(&repos, "30-1000", 50).await;
        let service = BookingService::new(repos.clone());

        let past = service
            .create(&actor, request(v.id, date(2030, 2, 27), date(2030, 3, 3)), today())
            .await;
        assert!(matches!(past, Err(DomainError::Validation(_))));

        v.apply(VehicleChanges {
            is_available: Some(false),
            ..Default::default()
        });
        repos.vehicles().update(v.clone()).await.unwrap();
        let parked = service
            .create(&actor, request(v.id, date(2030, 3, 1), date(2030, 3, 3)), today())
            .await;
        assert!(matches!(parked, Err(DomainError::Validation(_))));

        let missing = service
            .create(&actor, request(999, date(2030, 3, 1), date(2030, 3, 3)), today())
            .await;
        assert!(matches!(missing, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn staff_books_for_customer_with_price_override() {
        let repos = repos().await;
        let admin = staff(&repos, "admin").await;
        let (_, profile) = customer(&repos, "lina", true).await;
        let v = vehicle(&repos, "30-1000", 50).await;
        let service = BookingService::new(repos);

        let missing_customer = service
            .create(&admin, request(v.id, date(2030, 3, 1), date(2030, 3, 3)), today())
            .await;
        assert!(matches!(missing_customer, Err(DomainError::Validation(_))));

        let mut req = request(v.id, date(2030, 3, 1), date(2030, 3, 3));
        req.customer_id = Some(profile.id);
        req.total_price = Some(Decimal::from(120));
        let booking = service.create(&admin, req, today()).await.unwrap();
        assert_eq!(booking.customer_id, profile.id);
        assert_eq!(booking.total_price, Decimal::from(120));
    }

    #[tokio::test]
    async fn customer_price_override_is_ignored() {
        let repos = repos().await;
        let (actor, _) = customer(&repos, "lina", true).await;
        let v = vehicle(&repos, "30-1000", 50).await;
        let service = BookingService::new(repos);

        let mut req = request(v.id, date(2030, 3, 1), date(2030, 3, 2));
        req.total_price = Some(Decimal::ONE);
        let booking = service.create(&actor, req, today()).await.unwrap();
        assert_eq!(booking.total_price, Decimal::from(100));
    }

    #[tokio::test]
    async fn update_recomputes_price_and_locks_after_approval() {
        let repos = repos().await;
        let admin = staff(&repos, "admin").await;
        let (actor, _) = customer(&repos, "lina", true).await;
        let v = vehicle(&repos, "30-1000", 50).await;
        let service = BookingService::new(repos);

        let booking = service
            .create(&actor, request(v.id, date(2030, 3, 1), date(2030, 3, 3)), today())
            .await
            .unwrap();

        let extended = service
            .update(
                &actor,
                booking.id,
                BookingChanges {
                    end_date: Some(date(2030, 3, 4)),
                    ..Default::default()
                },
                today(),
            )
            .await
            .unwrap();
        assert_eq!(extended.total_price, Decimal::from(200));

        service.approve(&admin, booking.id).await.unwrap();
        let locked = service
            .update(
                &actor,
                booking.id,
                BookingChanges {
                    end_date: Some(date(2030, 3, 5)),
                    ..Default::default()
                },
                today(),
            )
            .await;
        assert!(matches!(locked, Err(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn editing_notes_keeps_staff_price() {
        let repos = repos().await;
        let admin = staff(&repos, "admin").await;
        let (actor, profile) = customer(&repos, "lina", true).await;
        let v = vehicle(&repos, "30-1000", 50).await;
        let service = BookingService::new(repos);

        let mut req = request(v.id, date(2030, 3, 1), date(2030, 3, 3));
        req.customer_id = Some(profile.id);
        req.total_price = Some(Decimal::from(120));
        let booking = service.create(&admin, req, today()).await.unwrap();

        let edited = service
            .update(
                &actor,
                booking.id,
                BookingChanges {
                    notes: Some("late pickup".into()),
                    payment_method: Some(PaymentMethod::Cliq),
                    ..Default::default()
                },
                today(),
            )
            .await
            .unwrap();
        assert_eq!(edited.total_price, Decimal::from(120));
        assert_eq!(edited.notes.as_deref(), Some("late pickup"));

        // Same dates sent back explicitly are not a change either.
        let resent = service
            .update(
                &actor,
                booking.id,
                BookingChanges {
                    start_date: Some(date(2030, 3, 1)),
                    end_date: Some(date(2030, 3, 3)),
                    vehicle_id: Some(v.id),
                    total_price: Some(Decimal::ONE),
                    ..Default::default()
                },
                today(),
            )
            .await
            .unwrap();
        assert_eq!(resent.total_price, Decimal::from(120));

        let moved = service
            .update(
                &actor,
                booking.id,
                BookingChanges {
                    end_date: Some(date(2030, 3, 2)),
                    ..Default::default()
                },
                today(),
            )
            .await
            .unwrap();
        assert_eq!(moved.total_price, Decimal::from(100));

        let repriced = service
            .update(
                &admin,
                booking.id,
                BookingChanges {
                    total_price: Some(Decimal::from(90)),
                    ..Default::default()
                },
                today(),
            )
            .await
            .unwrap();
        assert_eq!(repriced.total_price, Decimal::from(90));
    }

    #[tokio::test]
    async fn oversized_prices_are_rejected() {
        let repos = repos().await;
        let admin = staff(&repos, "admin").await;
        let (actor, profile) = customer(&repos, "lina", true).await;
        let v = vehicle(&repos, "30-1000", 999_999).await;
        let service = BookingService::new(repos);

        let long = service
            .create(&actor, request(v.id, date(2030, 3, 1), date(9999, 12, 31)), today())
            .await;
        assert!(matches!(long, Err(DomainError::Validation(_))));

        let mut req = request(v.id, date(2030, 3, 1), date(2030, 3, 2));
        req.customer_id = Some(profile.id);
        req.total_price = Some(Decimal::new(10_000_000_000, 2));
        let override_too_big = service.create(&admin, req, today()).await;
        assert!(matches!(override_too_big, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn customers_only_see_their_own_bookings() {
        let repos = repos().await;
        let admin = staff(&repos, "admin").await;
        let (lina, _) = customer(&repos, "lina", true).await;
        let (omar, _) = customer(&repos, "omar", true).await;
        let v = vehicle(&repos, "30-1000", 50).await;
        let service = BookingService::new(repos);

        let booking = service
            .create(&lina, request(v.id, date(2030, 3, 1), date(2030, 3, 3)), today())
            .await
            .unwrap();

        assert!(matches!(
            service.get(&omar, booking.id).await,
            Err(DomainError::NotFound { .. })
        ));
        assert_eq!(
            service
                .list(&omar, None, PaginationParams::default())
                .await
                .unwrap()
                .total,
            0
        );
        assert_eq!(
            service
                .list(&admin, None, PaginationParams::default())
                .await
                .unwrap()
                .total,
            1
        );
    }

    #[tokio::test]
    async fn approval_rules() {
        let repos = repos().await;
        let admin = staff(&repos, "admin").await;
        let (lina, _) = customer(&repos, "lina", true).await;
        let v = vehicle(&repos, "30-1000", 50).await;
        let service = BookingService::new(repos);

        let booking = service
            .create(&lina, request(v.id, date(2030, 3, 1), date(2030, 3, 3)), today())
            .await
            .unwrap();

        assert!(matches!(
            service.approve(&lina, booking.id).await,
            Err(DomainError::Forbidden(_))
        ));
        let approved = service.approve(&admin, booking.id).await.unwrap();
        assert_eq!(approved.status, BookingStatus::Confirmed);
        assert!(matches!(
            service.reject(&admin, booking.id).await,
            Err(DomainError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn customer_deletes_only_pending() {
        let repos = repos().await;
        let admin = staff(&repos, "admin").await;
        let (lina, _) = customer(&repos, "lina", true).await;
        let v = vehicle(&repos, "30-1000", 50).await;
        let service = BookingService::new(repos);

        let pending = service
            .create(&lina, request(v.id, date(2030, 3, 1), date(2030, 3, 2)), today())
            .await
            .unwrap();
        let confirmed = service
            .create(&lina, request(v.id, date(2030, 3, 10), date(2030, 3, 12)), today())
            .await
            .unwrap();
        service.approve(&admin, confirmed.id).await.unwrap();

        service.delete(&lina, pending.id).await.unwrap();
        assert!(matches!(
            service.delete(&lina, confirmed.id).await,
            Err(DomainError::Forbidden(_))
        ));
        service.delete(&admin, confirmed.id).await.unwrap();
    }

    #[tokio::test]
    async fn by_status_lists_every_status() {
        let repos = repos().await;
        let admin = staff(&repos, "admin").await;
        let (lina, _) = customer(&repos, "lina", true).await;
        let v = vehicle(&repos, "30-1000", 50).await;
        let service = BookingService::new(repos);

        service
            .create(&lina, request(v.id, date(2030, 3, 1), date(2030, 3, 2)), today())
            .await
            .unwrap();

        let groups = service.by_status(&admin).await.unwrap();
        assert_eq!(groups.len(), 4);
        assert_eq!(groups[0].status, BookingStatus::Pending);
        assert_eq!(groups[0].bookings.len(), 1);
        assert!(groups[1].bookings.is_empty());
        assert!(service.by_status(&lina).await.is_err());
    }
}
