//! Repository traits for the domain layer
//!
//! Contains:
//! - `RepositoryProvider`: unified access to all per-aggregate repositories
//! - `DomainResult`: standard result type for domain operations

use super::account::AccountRepository;
use super::booking::BookingRepository;
use super::customer::CustomerRepository;
use super::vehicle::VehicleRepository;
use crate::shared::errors::DomainError;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

// ── RepositoryProvider ──────────────────────────────────────────

/// Provides access to all domain repositories.
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let vehicle = repos.vehicles().find_by_id(7).await?;
///     let clashes = repos.bookings().find_conflicting(7, range, None).await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn accounts(&self) -> &dyn AccountRepository;
    fn customers(&self) -> &dyn CustomerRepository;
    fn vehicles(&self) -> &dyn VehicleRepository;
    fn bookings(&self) -> &dyn BookingRepository;
}
