//! Shared HTTP building blocks: response envelope, error mapping, extractors.

pub mod errors;
pub mod query;
pub mod response;
pub mod validated_json;

pub use errors::*;
pub use query::*;
pub use response::*;
pub use validated_json::ValidatedJson;
