use async_trait::async_trait;

use super::{Account, NewAccount};
use crate::domain::DomainResult;

#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Inserts the account; customer accounts get an empty profile in the same transaction.
    async fn create(&self, account: NewAccount) -> DomainResult<Account>;

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Account>>;
    async fn find_by_username(&self, username: &str) -> DomainResult<Option<Account>>;
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<Account>>;

    async fn update_password(&self, id: &str, password_hash: &str) -> DomainResult<()>;
    async fn touch_last_login(&self, id: &str) -> DomainResult<()>;
}
