use async_trait::async_trait;

use super::{Customer, CustomerFilter, CustomerStatus};
use crate::domain::DomainResult;
use crate::shared::{PaginatedResult, PaginationParams};

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Customer>>;
    async fn find_by_account_id(&self, account_id: &str) -> DomainResult<Option<Customer>>;
    async fn find_by_license_number(&self, license: &str) -> DomainResult<Option<Customer>>;

    async fn list(
        &self,
        filter: CustomerFilter,
        page: PaginationParams,
    ) -> DomainResult<PaginatedResult<Customer>>;

    /// Persists the profile fields; account-derived fields are ignored.
    async fn update(&self, customer: Customer) -> DomainResult<Customer>;
    async fn set_status(&self, id: i32, status: CustomerStatus) -> DomainResult<Customer>;

    async fn count(&self) -> DomainResult<u64>;
}
