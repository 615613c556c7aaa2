//! REST interface (Axum)

pub mod common;
pub mod middleware;
pub mod modules;
pub mod router;

pub use common::{ApiResponse, PaginatedResponse};
pub use router::{create_api_router, ApiDoc};
