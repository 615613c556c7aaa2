//! Identity: registration, login, token refresh and password changes.

pub mod service;

pub use service::{AccessToken, AuthTokens, IdentityService, RegisterAccount};
