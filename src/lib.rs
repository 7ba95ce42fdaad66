// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Pandora SDK
//!
//! Typed async clients for the Pandora data pipeline and log storage
//! services.
//!
//! ## Features
//!
//! - **Resource model**: groups, repos, transforms, exports, plugins and points
//! - **Local validation**: every input is checked before any network I/O
//! - **Typed export specs**: one enum variant per backend, tagged on the wire
//! - **Scoped tokens**: mint time-limited credentials bound to one request shape
//! - **Streaming uploads**: ingest points and plugins from files or readers
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pandora_sdk::pipeline::{Pipeline, Point, PostDataInput};
//! use pandora_sdk::{Config, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = Pipeline::new(
//!         Config::new()
//!             .with_endpoint("https://pipeline.qiniu.com")
//!             .with_access_key_secret_key("ak", "sk"),
//!     )?;
//!
//!     client
//!         .post_data(&PostDataInput {
//!             token: None,
//!             repo_name: "access_log".into(),
//!             points: vec![Point::new().field("ip", "10.0.0.1").field("bytes", 512)].into(),
//!         })
//!         .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │          Service clients: Pipeline, LogDb                 │
//! │   input.validate() → Operation::route() → RequestBuilder  │
//! └───────────────────────────────────────────────────────────┘
//!                              │
//! ┌────────────┬───────────────┼───────────────┬──────────────┐
//! │ Validation │   Registry    │     HTTP      │     Auth     │
//! ├────────────┼───────────────┼───────────────┼──────────────┤
//! │ Names      │ Method + path │ JSON / bytes  │ Key pair     │
//! │ Schema     │ per operation │ Streamed body │ Scoped token │
//! │ Retention  │               │ Content-MD5   │ HMAC-SHA1    │
//! └────────────┴───────────────┴───────────────┴──────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the SDK
pub mod error;

/// Common types and type aliases
pub mod types;

/// Client configuration
pub mod config;

/// Input validation rules
pub mod validation;

/// Operation registry
pub mod operation;

/// Request signing and scoped tokens
pub mod auth;

/// HTTP transport and request builder
pub mod http;

/// Pipeline service client and resource model
pub mod pipeline;

/// Log storage service client and resource model
pub mod logdb;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, ErrorKind, RequestError, Result};
pub use types::*;

// Re-export commonly used types
pub use auth::{make_token, TokenDesc};
pub use config::Config;
pub use logdb::LogDb;
pub use operation::{Operation, Route};
pub use pipeline::Pipeline;
pub use validation::{Validate, ValueType, Whence};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
