//! SeaORM implementation of CustomerRepository
//!
//! Profiles are always loaded together with their account so that
//! username and email are available to callers.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, SelectTwo, Set,
};

use super::{db_err, unique_err};
use crate::domain::customer::{Customer, CustomerFilter, CustomerRepository, CustomerStatus};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{customer, user};
use crate::shared::{PaginatedResult, PaginationParams};

pub struct SeaOrmCustomerRepository {
    db: DatabaseConnection,
}

impl SeaOrmCustomerRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn with_account(query: Select<customer::Entity>) -> SelectTwo<customer::Entity, user::Entity> {
        query.find_also_related(user::Entity)
    }

    async fn one(&self, query: Select<customer::Entity>) -> DomainResult<Option<Customer>> {
        let row = Self::with_account(query)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(row.map(|(c, u)| model_to_domain(c, u)))
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: customer::Model, account: Option<user::Model>) -> Customer {
    let (username, email) = account
        .map(|u| (u.username, u.email))
        .unwrap_or_default();

    Customer {
        id: m.id,
        account_id: m.user_id,
        username,
        email,
        phone_number: m.phone_number,
        address: m.address,
        driver_license_number: m.driver_license_number,
        license_image: m.license_image,
        date_of_birth: m.date_of_birth,
        status: CustomerStatus::parse(&m.status).unwrap_or(CustomerStatus::Unverified),
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

// ── CustomerRepository impl ─────────────────────────────────────

#[async_trait]
impl CustomerRepository for SeaOrmCustomerRepository {
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Customer>> {
        self.one(customer::Entity::find_by_id(id)).await
    }

    async fn find_by_account_id(&self, account_id: &str) -> DomainResult<Option<Customer>> {
        self.one(customer::Entity::find().filter(customer::Column::UserId.eq(account_id)))
            .await
    }

    async fn find_by_license_number(&self, license: &str) -> DomainResult<Option<Customer>> {
        self.one(
            customer::Entity::find().filter(customer::Column::DriverLicenseNumber.eq(license)),
        )
        .await
    }

    async fn list(
        &self,
        filter: CustomerFilter,
        page: PaginationParams,
    ) -> DomainResult<PaginatedResult<Customer>> {
        let mut query = Self::with_account(customer::Entity::find());

        if let Some(status) = filter.status {
            query = query.filter(customer::Column::Status.eq(status.as_str()));
        }
        if let Some(ref search) = filter.search {
            query = query.filter(
                Expr::expr(Func::lower(Expr::col((user::Entity, user::Column::Username))))
                    .like(format!("%{}%", search.to_lowercase())),
            );
        }

        let total = query.clone().count(&self.db).await.map_err(db_err)?;

        let rows = query
            .order_by_desc(customer::Column::CreatedAt)
            .order_by_desc(customer::Column::Id)
            .offset(page.offset())
            .limit(page.limit as u64)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let items = rows
            .into_iter()
            .map(|(c, u)| model_to_domain(c, u))
            .collect();
        Ok(PaginatedResult::new(items, total, page.page, page.limit))
    }

    async fn update(&self, c: Customer) -> DomainResult<Customer> {
        let existing = customer::Entity::find_by_id(c.id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Customer", "id", c.id))?;

        let mut active: customer::ActiveModel = existing.into();
        active.phone_number = Set(c.phone_number);
        active.address = Set(c.address);
        active.driver_license_number = Set(c.driver_license_number);
        active.license_image = Set(c.license_image);
        active.date_of_birth = Set(c.date_of_birth);
        active.status = Set(c.status.as_str().to_string());
        active.updated_at = Set(Utc::now());
        active
            .update(&self.db)
            .await
            .map_err(unique_err("Driver license number is already registered"))?;

        self.find_by_id(c.id)
            .await?
            .ok_or_else(|| DomainError::not_found("Customer", "id", c.id))
    }

    async fn set_status(&self, id: i32, status: CustomerStatus) -> DomainResult<Customer> {
        let existing = customer::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Customer", "id", id))?;

        let mut active: customer::ActiveModel = existing.into();
        active.status = Set(status.as_str().to_string());
        active.updated_at = Set(Utc::now());
        active.update(&self.db).await.map_err(db_err)?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Customer", "id", id))
    }

    async fn count(&self) -> DomainResult<u64> {
        customer::Entity::find().count(&self.db).await.map_err(db_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::{AccountRepository, AccountRole, NewAccount};
    use crate::infrastructure::database::repositories::account_repository::SeaOrmAccountRepository;
    use crate::infrastructure::database::test_database;

    async fn setup() -> (SeaOrmAccountRepository, SeaOrmCustomerRepository) {
        let db = test_database().await;
        (
            SeaOrmAccountRepository::new(db.clone()),
            SeaOrmCustomerRepository::new(db),
        )
    }

    async fn register(accounts: &SeaOrmAccountRepository, name: &str) -> String {
        accounts
            .create(NewAccount {
                username: name.to_string(),
                email: None,
                password_hash: "hash".to_string(),
                role: AccountRole::Customer,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn profile_carries_account_username() {
        let (accounts, customers) = setup().await;
        let account_id = register(&accounts, "lina").await;

        let profile = customers.find_by_account_id(&account_id).await.unwrap().unwrap();
        assert_eq!(profile.username, "lina");
        assert_eq!(profile.status, CustomerStatus::Unverified);
        assert_eq!(customers.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn update_persists_profile_fields() {
        let (accounts, customers) = setup().await;
        let account_id = register(&accounts, "lina").await;

        let mut profile = customers.find_by_account_id(&account_id).await.unwrap().unwrap();
        profile.phone_number = Some("+962790000000".into());
        profile.driver_license_number = Some("DL-100".into());
        let saved = customers.update(profile).await.unwrap();

        assert_eq!(saved.phone_number.as_deref(), Some("+962790000000"));
        let by_license = customers.find_by_license_number("DL-100").await.unwrap().unwrap();
        assert_eq!(by_license.id, saved.id);
    }

    #[tokio::test]
    async fn duplicate_license_is_conflict() {
        let (accounts, customers) = setup().await;
        let first = register(&accounts, "lina").await;
        let second = register(&accounts, "omar").await;

        let mut a = customers.find_by_account_id(&first).await.unwrap().unwrap();
        a.driver_license_number = Some("DL-1".into());
        customers.update(a).await.unwrap();

        let mut b = customers.find_by_account_id(&second).await.unwrap().unwrap();
        b.driver_license_number = Some("DL-1".into());
        assert!(matches!(customers.update(b).await, Err(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn list_filters_by_status_and_username() {
        let (accounts, customers) = setup().await;
        register(&accounts, "lina").await;
        let omar = register(&accounts, "Omar").await;

        let omar_profile = customers.find_by_account_id(&omar).await.unwrap().unwrap();
        customers
            .set_status(omar_profile.id, CustomerStatus::Blocked)
            .await
            .unwrap();

        let blocked = customers
            .list(
                CustomerFilter {
                    status: Some(CustomerStatus::Blocked),
                    search: None,
                },
                PaginationParams::default(),
            )
            .await
            .unwrap();
        assert_eq!(blocked.total, 1);
        assert_eq!(blocked.items[0].username, "Omar");

        let search = customers
            .list(
                CustomerFilter {
                    status: None,
                    search: Some("oma".into()),
                },
                PaginationParams::default(),
            )
            .await
            .unwrap();
        assert_eq!(search.total, 1);
    }
}
