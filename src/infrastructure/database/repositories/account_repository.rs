//! SeaORM implementation of AccountRepository

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};

use super::{db_err, unique_err};
use crate::domain::account::{Account, AccountRepository, AccountRole, NewAccount};
use crate::domain::{CustomerStatus, DomainError, DomainResult};
use crate::infrastructure::database::entities::{customer, user};

pub struct SeaOrmAccountRepository {
    db: DatabaseConnection,
}

impl SeaOrmAccountRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

pub(crate) fn role_to_domain(role: user::Role) -> AccountRole {
    match role {
        user::Role::Admin => AccountRole::Admin,
        user::Role::Staff => AccountRole::Staff,
        user::Role::Customer => AccountRole::Customer,
    }
}

fn role_to_entity(role: AccountRole) -> user::Role {
    match role {
        AccountRole::Admin => user::Role::Admin,
        AccountRole::Staff => user::Role::Staff,
        AccountRole::Customer => user::Role::Customer,
    }
}

fn model_to_domain(m: user::Model) -> Account {
    Account {
        id: m.id,
        username: m.username,
        email: m.email,
        password_hash: m.password_hash,
        role: role_to_domain(m.role),
        is_active: m.is_active,
        created_at: m.created_at,
        updated_at: m.updated_at,
        last_login_at: m.last_login_at,
    }
}

// ── AccountRepository impl ──────────────────────────────────────

#[async_trait]
impl AccountRepository for SeaOrmAccountRepository {
    async fn create(&self, account: NewAccount) -> DomainResult<Account> {
        debug!("Creating account: {}", account.username);

        let now = Utc::now();
        let id = uuid::Uuid::new_v4().to_string();
        let txn = self.db.begin().await.map_err(db_err)?;

        let model = user::ActiveModel {
            id: Set(id.clone()),
            username: Set(account.username),
            email: Set(account.email),
            password_hash: Set(account.password_hash),
            role: Set(role_to_entity(account.role)),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            last_login_at: Set(None),
        }
        .insert(&txn)
        .await
        .map_err(unique_err("Username or email already exists"))?;

        if account.role == AccountRole::Customer {
            customer::ActiveModel {
                user_id: Set(id),
                status: Set(CustomerStatus::Unverified.as_str().to_string()),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(db_err)?;
        }

        txn.commit().await.map_err(db_err)?;
        Ok(model_to_domain(model))
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Account>> {
        let model = user::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_by_username(&self, username: &str) -> DomainResult<Option<Account>> {
        let model = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<Account>> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn update_password(&self, id: &str, password_hash: &str) -> DomainResult<()> {
        let model = user::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Account", "id", id))?;

        let mut active: user::ActiveModel = model.into();
        active.password_hash = Set(password_hash.to_string());
        active.updated_at = Set(Utc::now());
        active.update(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn touch_last_login(&self, id: &str) -> DomainResult<()> {
        let model = user::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Account", "id", id))?;

        let mut active: user::ActiveModel = model.into();
        active.last_login_at = Set(Some(Utc::now()));
        active.update(&self.db).await.map_err(db_err)?;
        Ok(())
    }
}
