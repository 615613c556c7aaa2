//! Customer profiles: self-service and staff administration

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
