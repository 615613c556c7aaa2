use async_trait::async_trait;

use super::{Customer, CustomerStatus};
use crate::domain::DomainResult;

/// External verification source for customer statuses.
#[async_trait]
pub trait CustomerStatusProvider: Send + Sync {
    /// `None` leaves the stored status untouched.
    async fn status_for(&self, customer: &Customer) -> DomainResult<Option<CustomerStatus>>;
}
