//! Account domain entity

use chrono::{DateTime, Utc};

/// Role attached to every account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountRole {
    Admin,
    Staff,
    Customer,
}

impl AccountRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Staff => "staff",
            Self::Customer => "customer",
        }
    }

    /// Unknown values fall back to the least privileged role.
    pub fn from_str(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Self::Admin,
            "staff" => Self::Staff,
            _ => Self::Customer,
        }
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, Self::Admin | Self::Staff)
    }
}

impl std::fmt::Display for AccountRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Login identity
#[derive(Debug, Clone)]
pub struct Account {
    /// UUID string
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub role: AccountRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl Account {
    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }

    pub fn actor(&self) -> Actor {
        Actor {
            account_id: self.id.clone(),
            username: self.username.clone(),
            role: self.role,
        }
    }
}

/// The authenticated caller of an application operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub account_id: String,
    pub username: String,
    pub role: AccountRole,
}

impl Actor {
    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }

    pub fn require_staff(&self) -> crate::domain::DomainResult<()> {
        if self.is_staff() {
            Ok(())
        } else {
            Err(crate::domain::DomainError::Forbidden(
                "Staff privileges required".to_string(),
            ))
        }
    }
}

/// Input for creating an account
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub role: AccountRole,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staff_roles() {
        assert!(AccountRole::Admin.is_staff());
        assert!(AccountRole::Staff.is_staff());
        assert!(!AccountRole::Customer.is_staff());
    }

    #[test]
    fn unknown_role_is_customer() {
        assert_eq!(AccountRole::from_str("Root"), AccountRole::Customer);
        assert_eq!(AccountRole::from_str("ADMIN"), AccountRole::Admin);
    }

    #[test]
    fn customer_actor_is_forbidden_staff_actions() {
        let actor = Actor {
            account_id: "a-1".into(),
            username: "sam".into(),
            role: AccountRole::Customer,
        };
        assert!(matches!(
            actor.require_staff(),
            Err(crate::domain::DomainError::Forbidden(_))
        ));
    }
}
