//! CLI runner - executes commands

use crate::auth::TokenDesc;
use crate::cli::commands::{Cli, Commands, Service};
use crate::config::{Config, DEFAULT_LOGDB_ENDPOINT, DEFAULT_PIPELINE_ENDPOINT};
use crate::error::{Error, Result, ResultExt};
use crate::logdb::{self, LogDb};
use crate::pipeline::{
    DeleteExportInput, ListInput, Pipeline, PostDataFromFileInput, RepoInput,
    UploadPluginFromFileInput, VerifyExportInput,
};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
    config: Config,
}

impl Runner {
    /// Create a runner, resolving the configuration from the file,
    /// environment and command-line overrides
    pub fn new(cli: Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Config::from_yaml_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => Config::from_env(),
        };
        if let Some(endpoint) = &cli.endpoint {
            config.endpoint.clone_from(endpoint);
        }
        if config.endpoint.is_empty() {
            config.endpoint = match cli.service {
                Service::Pipeline => DEFAULT_PIPELINE_ENDPOINT,
                Service::Logdb => DEFAULT_LOGDB_ENDPOINT,
            }
            .to_string();
        }
        Ok(Self { cli, config })
    }

    /// Resolved configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Level for the tracing subscriber
    pub fn log_level(&self) -> tracing::Level {
        if self.cli.verbose {
            tracing::Level::DEBUG
        } else {
            self.config.log_level.into()
        }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        debug!("Using endpoint {}", self.config.endpoint);
        match &self.cli.command {
            Commands::Token {
                method,
                path,
                content_type,
                ttl,
            } => {
                let desc = TokenDesc::new((*method).into(), path.as_str(), content_type.as_str())
                    .expires_in(Duration::from_secs(*ttl));
                let token = match self.cli.service {
                    Service::Pipeline => self.pipeline()?.make_token(&desc)?,
                    Service::Logdb => self.logdb()?.make_token(&desc)?,
                };
                println!("{token}");
                Ok(())
            }
            Commands::Groups => {
                let output = self.pipeline()?.list_groups(&ListInput::default()).await?;
                print_json(&output)
            }
            Commands::Repos => match self.cli.service {
                Service::Pipeline => {
                    let output = self.pipeline()?.list_repos(&ListInput::default()).await?;
                    print_json(&output)
                }
                Service::Logdb => {
                    let output = self
                        .logdb()?
                        .list_repos(&logdb::ListReposInput::default())
                        .await?;
                    print_json(&output)
                }
            },
            Commands::Repo { name } => match self.cli.service {
                Service::Pipeline => {
                    let output = self.pipeline()?.get_repo(&RepoInput::new(name)).await?;
                    print_json(&output)
                }
                Service::Logdb => {
                    let output = self.logdb()?.get_repo(&logdb::RepoInput::new(name)).await?;
                    print_json(&output)
                }
            },
            Commands::Plugins => {
                let output = self.pipeline()?.list_plugins(&ListInput::default()).await?;
                print_json(&output)
            }
            Commands::Transforms { repo } => {
                let output = self.pipeline()?.list_transforms(&RepoInput::new(repo)).await?;
                print_json(&output)
            }
            Commands::Exports { repo } => {
                let output = self.pipeline()?.list_exports(&RepoInput::new(repo)).await?;
                print_json(&output)
            }
            Commands::PostData { repo, file, token } => {
                self.pipeline()?
                    .post_data_from_file(&PostDataFromFileInput {
                        token: token.clone(),
                        repo_name: repo.clone(),
                        file_path: file.clone(),
                    })
                    .await?;
                info!("Posted {} to repo {}", file.display(), repo);
                Ok(())
            }
            Commands::UploadPlugin { name, file } => {
                self.pipeline()?
                    .upload_plugin_from_file(&UploadPluginFromFileInput {
                        token: None,
                        plugin_name: name.clone(),
                        file_path: file.clone(),
                    })
                    .await?;
                info!("Uploaded plugin {}", name);
                Ok(())
            }
            Commands::DeleteExport {
                repo,
                name,
                del_offset,
            } => {
                self.pipeline()?
                    .delete_export(&DeleteExportInput {
                        token: None,
                        repo_name: repo.clone(),
                        export_name: name.clone(),
                        delete_offset: *del_offset,
                    })
                    .await?;
                info!("Deleted export {} of repo {}", name, repo);
                Ok(())
            }
            Commands::VerifyExport { file } => {
                let contents = std::fs::read_to_string(file)
                    .with_context(|| format!("Failed to read {}", file.display()))?;
                let input = VerifyExportInput::from_json(&contents)?;
                self.pipeline()?.verify_export(&input).await?;
                info!("Export definition in {} is valid", file.display());
                Ok(())
            }
        }
    }

    fn pipeline(&self) -> Result<Pipeline> {
        if self.cli.service != Service::Pipeline {
            return Err(Error::config(
                "this command is only available on the pipeline service",
            ));
        }
        Pipeline::new(self.config.clone())
    }

    fn logdb(&self) -> Result<LogDb> {
        LogDb::new(self.config.clone())
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
