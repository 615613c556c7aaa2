//! Customer profiles: self-service editing and staff administration.

pub mod service;
pub mod sync;

pub use service::CustomerService;
pub use sync::{start_customer_status_sync, sync_customer_status, sync_customer_statuses};
