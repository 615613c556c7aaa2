//! Account aggregate
//!
//! Login identities, roles and the repository interface.

pub mod model;
pub mod repository;

pub use model::{Account, AccountRole, Actor, NewAccount};
pub use repository::AccountRepository;
