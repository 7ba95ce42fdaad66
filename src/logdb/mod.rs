//! Log storage service
//!
//! Repos here are full-text indexed with a retention window. Logs are sent
//! as JSON arrays and searched with query-string syntax.

mod api;
mod models;

pub use api::LogDb;
pub use models::*;
