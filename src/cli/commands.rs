//! CLI commands and argument parsing

use crate::types::Method;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Pandora pipeline and log storage CLI
#[derive(Parser, Debug)]
#[command(name = "pandora")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML); falls back to PANDORA_* environment variables
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Service endpoint, overrides the configuration
    #[arg(short, long, global = true)]
    pub endpoint: Option<String>,

    /// Target service
    #[arg(short, long, global = true, value_enum, default_value = "pipeline")]
    pub service: Service,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Mint a scoped token for one method, path and content type
    Token {
        /// HTTP method the token grants
        #[arg(short, long, value_enum, default_value = "post")]
        method: TokenMethod,

        /// Request path the token grants, e.g. /v2/repos/my_repo/data
        #[arg(short, long)]
        path: String,

        /// Content type the request will carry
        #[arg(long, default_value = "")]
        content_type: String,

        /// Seconds until the token expires
        #[arg(long, default_value = "3600")]
        ttl: u64,
    },

    /// List compute groups
    Groups,

    /// List repos
    Repos,

    /// Show one repo
    Repo {
        /// Repo name
        name: String,
    },

    /// List uploaded plugins
    Plugins,

    /// List transforms reading from a repo
    Transforms {
        /// Source repo name
        repo: String,
    },

    /// List exports of a repo
    Exports {
        /// Repo name
        repo: String,
    },

    /// Stream a file of point lines into a repo
    PostData {
        /// Repo name
        repo: String,

        /// File of tab-separated key=value lines
        file: PathBuf,

        /// Scoped token to use instead of the key pair
        #[arg(long)]
        token: Option<String>,
    },

    /// Upload a plugin jar
    UploadPlugin {
        /// Plugin name
        name: String,

        /// Jar file
        file: PathBuf,
    },

    /// Delete an export
    DeleteExport {
        /// Repo name
        repo: String,

        /// Export name
        name: String,

        /// Also drop the export's consumption offset
        #[arg(long)]
        del_offset: bool,
    },

    /// Dry-run an export definition against a schema
    VerifyExport {
        /// JSON file with `schema`, `type`, `spec` and optional `whence`
        #[arg(short, long)]
        file: PathBuf,
    },
}

/// Service selected with `--service`
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Service {
    /// Pipeline service
    Pipeline,
    /// Log storage service
    Logdb,
}

/// HTTP method accepted by `token --method`
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TokenMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl From<TokenMethod> for Method {
    fn from(method: TokenMethod) -> Self {
        match method {
            TokenMethod::Get => Method::GET,
            TokenMethod::Post => Method::POST,
            TokenMethod::Put => Method::PUT,
            TokenMethod::Delete => Method::DELETE,
        }
    }
}
