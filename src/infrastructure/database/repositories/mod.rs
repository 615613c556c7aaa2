//! Database repository implementations
//!
//! Per-aggregate SeaORM repositories + unified RepositoryProvider.

pub mod account_repository;
pub mod booking_repository;
pub mod customer_repository;
pub mod repository_provider;
pub mod vehicle_repository;

pub use repository_provider::SeaOrmRepositoryProvider;

use crate::domain::DomainError;

pub(crate) fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Database(e.to_string())
}

/// Maps unique-constraint violations to a conflict with `message`.
pub(crate) fn unique_err(message: &'static str) -> impl Fn(sea_orm::DbErr) -> DomainError {
    move |e| {
        let text = e.to_string();
        if text.contains("UNIQUE") || text.contains("duplicate") {
            DomainError::Conflict(message.to_string())
        } else {
            db_err(e)
        }
    }
}
