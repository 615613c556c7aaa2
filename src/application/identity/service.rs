//! Account and authentication service
//!
//! HTTP handlers are thin wrappers that delegate to this service.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::account::{Account, AccountRole, Actor, NewAccount};
use crate::domain::{DomainError, DomainResult, RepositoryProvider};
use crate::infrastructure::crypto::jwt::{create_token, verify_token, JwtConfig, TokenKind};
use crate::infrastructure::crypto::password::{hash_password, verify_password};

pub const MIN_PASSWORD_LEN: usize = 8;

/// Tokens issued after a successful login
#[derive(Debug, Clone)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
    pub account: Account,
}

/// Fresh access token issued from a refresh token
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Debug, Clone)]
pub struct RegisterAccount {
    pub username: String,
    pub email: Option<String>,
    pub password: String,
    pub confirm_password: String,
}

pub struct IdentityService {
    repos: Arc<dyn RepositoryProvider>,
    jwt_config: JwtConfig,
}

impl IdentityService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, jwt_config: JwtConfig) -> Self {
        Self { repos, jwt_config }
    }

    // ── Registration ────────────────────────────────────────────

    /// Creates a customer account together with its empty profile.
    pub async fn register(&self, cmd: RegisterAccount) -> DomainResult<Account> {
        let username = cmd.username.trim().to_string();
        validate_username(&username)?;
        validate_password(&cmd.password)?;
        if cmd.password != cmd.confirm_password {
            return Err(DomainError::Validation("Passwords do not match".into()));
        }

        let email = cmd
            .email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());
        if let Some(ref email) = email {
            if !email.contains('@') {
                return Err(DomainError::Validation("Invalid email address".into()));
            }
            if self.repos.accounts().find_by_email(email).await?.is_some() {
                return Err(DomainError::Conflict("Email already exists".into()));
            }
        }

        if self.repos.accounts().find_by_username(&username).await?.is_some() {
            return Err(DomainError::Conflict("Username already exists".into()));
        }

        let password_hash = hash(&cmd.password)?;
        let account = self
            .repos
            .accounts()
            .create(NewAccount {
                username,
                email,
                password_hash,
                role: AccountRole::Customer,
            })
            .await?;

        info!(account_id = %account.id, username = %account.username, "New customer registered");
        Ok(account)
    }

    // ── Authentication ──────────────────────────────────────────

    /// Authenticate by username or email and issue an access/refresh pair.
    pub async fn login(&self, username_or_email: &str, password: &str) -> DomainResult<AuthTokens> {
        let accounts = self.repos.accounts();
        let account = match accounts.find_by_username(username_or_email).await? {
            Some(a) => Some(a),
            None => accounts.find_by_email(username_or_email).await?,
        };

        let Some(account) = account else {
            return Err(DomainError::Unauthorized("Invalid credentials".into()));
        };

        if !verify_password(password, &account.password_hash) {
            warn!(username = %account.username, "Failed login attempt");
            return Err(DomainError::Unauthorized("Invalid credentials".into()));
        }

        if !account.is_active {
            return Err(DomainError::Unauthorized("Account is disabled".into()));
        }

        accounts.touch_last_login(&account.id).await?;

        let access_token = self.issue(&account, TokenKind::Access)?;
        let refresh_token = self.issue(&account, TokenKind::Refresh)?;

        Ok(AuthTokens {
            access_token,
            refresh_token,
            token_type: "Bearer".into(),
            expires_in: self.jwt_config.access_token_minutes * 60,
            account,
        })
    }

    /// Exchange a valid refresh token for a new access token.
    pub async fn refresh(&self, refresh_token: &str) -> DomainResult<AccessToken> {
        let claims = verify_token(refresh_token, TokenKind::Refresh, &self.jwt_config)
            .map_err(|_| DomainError::Unauthorized("Invalid or expired refresh token".into()))?;

        let account = self
            .repos
            .accounts()
            .find_by_id(&claims.sub)
            .await?
            .filter(|a| a.is_active)
            .ok_or_else(|| DomainError::Unauthorized("Account no longer active".into()))?;

        Ok(AccessToken {
            access_token: self.issue(&account, TokenKind::Access)?,
            token_type: "Bearer".into(),
            expires_in: self.jwt_config.access_token_minutes * 60,
        })
    }

    fn issue(&self, account: &Account, kind: TokenKind) -> DomainResult<String> {
        create_token(
            &account.id,
            &account.username,
            account.role.as_str(),
            kind,
            &self.jwt_config,
        )
        .map_err(|e| DomainError::Database(format!("Failed to create token: {}", e)))
    }

    // ── Queries ─────────────────────────────────────────────────

    pub async fn current_account(&self, actor: &Actor) -> DomainResult<Account> {
        self.repos
            .accounts()
            .find_by_id(&actor.account_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Account", "id", &actor.account_id))
    }

    // ── Commands ────────────────────────────────────────────────

    /// Change the caller's password after checking the current one.
    pub async fn change_password(
        &self,
        actor: &Actor,
        current_password: &str,
        new_password: &str,
    ) -> DomainResult<()> {
        validate_password(new_password)?;

        let account = self.current_account(actor).await?;
        if !verify_password(current_password, &account.password_hash) {
            return Err(DomainError::Unauthorized("Invalid current password".into()));
        }

        let new_hash = hash(new_password)?;
        self.repos.accounts().update_password(&account.id, &new_hash).await?;

        info!(account_id = %account.id, "Password changed");
        Ok(())
    }

    /// Creates the bootstrap admin unless an account with that username exists.
    /// Returns `true` when an account was created.
    pub async fn ensure_admin(
        &self,
        username: &str,
        email: Option<String>,
        password: &str,
    ) -> DomainResult<bool> {
        if self.repos.accounts().find_by_username(username).await?.is_some() {
            return Ok(false);
        }

        let password_hash = hash(password)?;
        self.repos
            .accounts()
            .create(NewAccount {
                username: username.to_string(),
                email,
                password_hash,
                role: AccountRole::Admin,
            })
            .await?;

        info!(username, "Default admin account created");
        Ok(true)
    }
}

fn hash(password: &str) -> DomainResult<String> {
    hash_password(password)
        .map_err(|e| DomainError::Database(format!("Failed to hash password: {}", e)))
}

fn validate_username(username: &str) -> DomainResult<()> {
    let len = username.chars().count();
    if !(3..=50).contains(&len) {
        return Err(DomainError::Validation(
            "Username must be 3-50 characters".into(),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || "@.+-_".contains(c))
    {
        return Err(DomainError::Validation(
            "Username may contain only letters, digits and @/./+/-/_".into(),
        ));
    }
    Ok(())
}

fn validate_password(password: &str) -> DomainResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(DomainError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{jwt_config, repos};

    fn registration(username: &str) -> RegisterAccount {
        RegisterAccount {
            username: username.into(),
            email: Some(format!("{}@example.com", username)),
            password: "correct-horse".into(),
            confirm_password: "correct-horse".into(),
        }
    }

    #[tokio::test]
    async fn register_creates_customer_with_profile() {
        let repos = repos().await;
        let service = IdentityService::new(repos.clone(), jwt_config());

        let account = service.register(registration("lina")).await.unwrap();
        assert_eq!(account.role, AccountRole::Customer);
        assert!(repos
            .customers()
            .find_by_account_id(&account.id)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn register_rejects_mismatched_passwords() {
        let service = IdentityService::new(repos().await, jwt_config());
        let mut cmd = registration("lina");
        cmd.confirm_password = "something-else".into();

        match service.register(cmd).await {
            Err(DomainError::Validation(msg)) => assert_eq!(msg, "Passwords do not match"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn register_rejects_taken_username() {
        let service = IdentityService::new(repos().await, jwt_config());
        service.register(registration("lina")).await.unwrap();

        let mut again = registration("lina");
        again.email = None;
        assert!(matches!(
            service.register(again).await,
            Err(DomainError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn short_password_is_rejected() {
        let service = IdentityService::new(repos().await, jwt_config());
        let mut cmd = registration("lina");
        cmd.password = "short".into();
        cmd.confirm_password = "short".into();
        assert!(matches!(
            service.register(cmd).await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn login_issues_distinct_token_kinds() {
        let config = jwt_config();
        let service = IdentityService::new(repos().await, config.clone());
        service.register(registration("lina")).await.unwrap();

        let tokens = service.login("lina", "correct-horse").await.unwrap();
        assert_eq!(tokens.token_type, "Bearer");
        assert!(verify_token(&tokens.access_token, TokenKind::Access, &config).is_ok());
        assert!(verify_token(&tokens.refresh_token, TokenKind::Refresh, &config).is_ok());

        let by_email = service.login("lina@example.com", "correct-horse").await;
        assert!(by_email.is_ok());
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_unauthorized() {
        let service = IdentityService::new(repos().await, jwt_config());
        service.register(registration("lina")).await.unwrap();

        match service.login("lina", "nope-nope-nope").await {
            Err(DomainError::Unauthorized(msg)) => assert_eq!(msg, "Invalid credentials"),
            other => panic!("unexpected: {:?}", other.map(|t| t.token_type)),
        }
    }

    #[tokio::test]
    async fn refresh_accepts_only_refresh_tokens() {
        let service = IdentityService::new(repos().await, jwt_config());
        service.register(registration("lina")).await.unwrap();
        let tokens = service.login("lina", "correct-horse").await.unwrap();

        assert!(service.refresh(&tokens.refresh_token).await.is_ok());
        assert!(matches!(
            service.refresh(&tokens.access_token).await,
            Err(DomainError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn change_password_requires_current_password() {
        let service = IdentityService::new(repos().await, jwt_config());
        let account = service.register(registration("lina")).await.unwrap();
        let actor = account.actor();

        assert!(service
            .change_password(&actor, "wrong-current", "brand-new-pass")
            .await
            .is_err());
        service
            .change_password(&actor, "correct-horse", "brand-new-pass")
            .await
            .unwrap();
        assert!(service.login("lina", "brand-new-pass").await.is_ok());
    }

    #[tokio::test]
    async fn ensure_admin_is_idempotent() {
        let service = IdentityService::new(repos().await, jwt_config());
        assert!(service.ensure_admin("admin", None, "admin-pass-123").await.unwrap());
        assert!(!service.ensure_admin("admin", None, "admin-pass-123").await.unwrap());

        let tokens = service.login("admin", "admin-pass-123").await.unwrap();
        assert_eq!(tokens.account.role, AccountRole::Admin);
    }
}
