//! CLI module
//!
//! Command-line interface for the pipeline and log storage services.
//!
//! # Commands
//!
//! - `token` - Mint a scoped token
//! - `groups`, `repos`, `repo`, `plugins`, `transforms`, `exports` - Inspect resources
//! - `post-data` - Stream point lines from a file into a repo
//! - `upload-plugin` - Upload a plugin jar
//! - `delete-export` - Delete an export
//! - `verify-export` - Dry-run an export definition

mod commands;
mod runner;

pub use commands::{Cli, Commands, Service, TokenMethod};
pub use runner::Runner;
