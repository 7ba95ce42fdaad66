//! Pipeline service
//!
//! Groups provide compute, repos hold schema-typed data, transforms derive
//! one repo from another, and exports forward a repo's data to a downstream
//! backend (time series, Mongo, log storage, object storage or HTTP).
//!
//! ```rust,ignore
//! use pandora_sdk::pipeline::{CreateRepoInput, Pipeline, RepoSchemaEntry};
//! use pandora_sdk::{Config, ValueType};
//!
//! let client = Pipeline::new(Config::from_env())?;
//! client
//!     .create_repo(&CreateRepoInput {
//!         repo_name: "access_log".into(),
//!         region: "nb".into(),
//!         schema: vec![RepoSchemaEntry::new("ip", ValueType::String).required()],
//!         ..Default::default()
//!     })
//!     .await?;
//! ```

mod api;
mod export;
mod models;
mod point;

pub use api::Pipeline;
pub(crate) use api::mint;
pub use export::*;
pub use models::*;
pub use point::{Point, PointField, Points};
