use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use crate::domain::account::Actor;
use crate::domain::customer::{Customer, CustomerFilter, CustomerStatus, ProfileChanges};
use crate::domain::{DomainError, DomainResult, RepositoryProvider};
use crate::shared::{PaginatedResult, PaginationParams};

pub struct CustomerService {
    repos: Arc<dyn RepositoryProvider>,
}

impl CustomerService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    /// Profile of the calling account.
    pub async fn own_profile(&self, actor: &Actor) -> DomainResult<Customer> {
        self.repos
            .customers()
            .find_by_account_id(&actor.account_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Customer profile", "account_id", &actor.account_id))
    }

    pub async fn update_own_profile(
        &self,
        actor: &Actor,
        changes: ProfileChanges,
        today: NaiveDate,
    ) -> DomainResult<Customer> {
        let mut profile = self.own_profile(actor).await?;

        if let Some(license) = changes
            .driver_license_number
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
        {
            if let Some(holder) = self.repos.customers().find_by_license_number(license).await? {
                if holder.id != profile.id {
                    return Err(DomainError::Conflict(
                        "Driver license number is already registered".into(),
                    ));
                }
            }
        }

        profile.apply(changes, today)?;
        let saved = self.repos.customers().update(profile).await?;

        info!(
            customer_id = saved.id,
            complete = saved.is_profile_complete(),
            "Customer profile updated"
        );
        Ok(saved)
    }

    pub async fn list(
        &self,
        actor: &Actor,
        filter: CustomerFilter,
        page: PaginationParams,
    ) -> DomainResult<PaginatedResult<Customer>> {
        actor.require_staff()?;
        self.repos.customers().list(filter, page).await
    }

    /// Staff see any profile; customers only their own.
    pub async fn get(&self, actor: &Actor, id: i32) -> DomainResult<Customer> {
        let customer = self
            .repos
            .customers()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Customer", "id", id))?;

        if !actor.is_staff() && customer.account_id != actor.account_id {
            return Err(DomainError::not_found("Customer", "id", id));
        }
        Ok(customer)
    }

    pub async fn set_status(
        &self,
        actor: &Actor,
        id: i32,
        status: CustomerStatus,
    ) -> DomainResult<Customer> {
        actor.require_staff()?;
        let customer = self.repos.customers().set_status(id, status).await?;
        info!(customer_id = id, status = %status, by = %actor.username, "Customer status changed");
        Ok(customer)
    }
}
