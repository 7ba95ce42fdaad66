//! Pipeline service client

use super::export::{
    CreateExportInput, DeleteExportInput, ExportInput, GetExportOutput, ListExportsOutput,
    VerifyExportInput,
};
use super::models::*;
use crate::auth::{make_token, TokenDesc};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::operation::Operation;
use crate::types::content_type;
use crate::validation::Validate;
use tokio::io::AsyncRead;
use tracing::debug;

/// Typed client for the pipeline service
///
/// Every method validates its input before any network I/O and issues
/// exactly one request.
#[derive(Debug, Clone)]
pub struct Pipeline {
    http: HttpClient,
    config: Config,
}

impl Pipeline {
    pub fn new(config: Config) -> Result<Self> {
        let http = HttpClient::new(&config)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Mint a scoped token for a single method, path and content type
    pub fn make_token(&self, desc: &TokenDesc) -> Result<String> {
        mint(&self.config, desc)
    }

    // ========================================================================
    // Groups
    // ========================================================================

    pub async fn create_group(&self, input: &CreateGroupInput) -> Result<()> {
        input.validate()?;
        let route = Operation::CreateGroup.route(&[input.group_name.as_str()])?;
        self.http
            .request(route)
            .token(input.token.as_deref())
            .json(input)?
            .send()
            .await
    }

    pub async fn update_group(&self, input: &UpdateGroupInput) -> Result<()> {
        input.validate()?;
        let route = Operation::UpdateGroup.route(&[input.group_name.as_str()])?;
        self.http
            .request(route)
            .token(input.token.as_deref())
            .json(input)?
            .send()
            .await
    }

    pub async fn start_group_task(&self, input: &StartGroupTaskInput) -> Result<()> {
        let route = Operation::StartGroupTask.route(&[input.group_name.as_str()])?;
        self.http.request(route).token(input.token.as_deref()).send().await
    }

    pub async fn stop_group_task(&self, input: &StopGroupTaskInput) -> Result<()> {
        let route = Operation::StopGroupTask.route(&[input.group_name.as_str()])?;
        self.http.request(route).token(input.token.as_deref()).send().await
    }

    pub async fn list_groups(&self, input: &ListGroupsInput) -> Result<ListGroupsOutput> {
        let route = Operation::ListGroups.route(&[])?;
        self.http
            .request(route)
            .token(input.token.as_deref())
            .send_json()
            .await
    }

    pub async fn get_group(&self, input: &GetGroupInput) -> Result<GetGroupOutput> {
        let route = Operation::GetGroup.route(&[input.group_name.as_str()])?;
        self.http
            .request(route)
            .token(input.token.as_deref())
            .send_json()
            .await
    }

    pub async fn delete_group(&self, input: &DeleteGroupInput) -> Result<()> {
        let route = Operation::DeleteGroup.route(&[input.group_name.as_str()])?;
        self.http.request(route).token(input.token.as_deref()).send().await
    }

    // ========================================================================
    // Repos
    // ========================================================================

    pub async fn create_repo(&self, input: &CreateRepoInput) -> Result<()> {
        input.validate()?;
        let route = Operation::CreateRepo.route(&[input.repo_name.as_str()])?;
        self.http
            .request(route)
            .token(input.token.as_deref())
            .json(input)?
            .send()
            .await
    }

    pub async fn get_repo(&self, input: &GetRepoInput) -> Result<GetRepoOutput> {
        let route = Operation::GetRepo.route(&[input.repo_name.as_str()])?;
        self.http
            .request(route)
            .token(input.token.as_deref())
            .send_json()
            .await
    }

    pub async fn list_repos(&self, input: &ListReposInput) -> Result<ListReposOutput> {
        let route = Operation::ListRepos.route(&[])?;
        self.http
            .request(route)
            .token(input.token.as_deref())
            .send_json()
            .await
    }

    pub async fn delete_repo(&self, input: &DeleteRepoInput) -> Result<()> {
        let route = Operation::DeleteRepo.route(&[input.repo_name.as_str()])?;
        self.http.request(route).token(input.token.as_deref()).send().await
    }

    // ========================================================================
    // Ingestion
    // ========================================================================

    pub async fn post_data(&self, input: &PostDataInput) -> Result<()> {
        input.validate()?;
        debug!("Posting {} points to repo {}", input.points.len(), input.repo_name);
        let route = Operation::PostData.route(&[input.repo_name.as_str()])?;
        self.http
            .request(route)
            .token(input.token.as_deref())
            .bytes(input.points.to_buffer(), content_type::TEXT)
            .send()
            .await
    }

    pub async fn post_data_from_bytes(&self, input: &PostDataFromBytesInput) -> Result<()> {
        input.validate()?;
        let route = Operation::PostData.route(&[input.repo_name.as_str()])?;
        self.http
            .request(route)
            .token(input.token.as_deref())
            .bytes(input.buffer.clone(), content_type::TEXT)
            .send()
            .await
    }

    pub async fn post_data_from_file(&self, input: &PostDataFromFileInput) -> Result<()> {
        input.validate()?;
        let route = Operation::PostData.route(&[input.repo_name.as_str()])?;
        let file = tokio::fs::File::open(&input.file_path).await?;
        self.http
            .request(route)
            .token(input.token.as_deref())
            .reader(file, content_type::TEXT)
            .send()
            .await
    }

    pub async fn post_data_from_reader<R>(&self, input: PostDataFromReaderInput<R>) -> Result<()>
    where
        R: AsyncRead + Send + Sync + 'static,
    {
        input.validate()?;
        let route = Operation::PostData.route(&[input.repo_name.as_str()])?;
        self.http
            .request(route)
            .token(input.token.as_deref())
            .reader(input.reader, content_type::TEXT)
            .send()
            .await
    }

    // ========================================================================
    // Plugins
    // ========================================================================

    pub async fn upload_plugin(&self, input: &UploadPluginInput) -> Result<()> {
        input.validate()?;
        let route = Operation::UploadPlugin.route(&[input.plugin_name.as_str()])?;
        self.http
            .request(route)
            .token(input.token.as_deref())
            .content_md5()
            .bytes(input.buffer.clone(), content_type::JAR)
            .send()
            .await
    }

    pub async fn upload_plugin_from_file(&self, input: &UploadPluginFromFileInput) -> Result<()> {
        input.validate()?;
        let route = Operation::UploadPlugin.route(&[input.plugin_name.as_str()])?;
        let file = tokio::fs::File::open(&input.file_path).await?;
        self.http
            .request(route)
            .token(input.token.as_deref())
            .content_md5()
            .reader(file, content_type::JAR)
            .send()
            .await
    }

    pub async fn upload_plugin_from_reader<R>(
        &self,
        input: UploadPluginFromReaderInput<R>,
    ) -> Result<()>
    where
        R: AsyncRead + Send + Sync + 'static,
    {
        input.validate()?;
        let route = Operation::UploadPlugin.route(&[input.plugin_name.as_str()])?;
        self.http
            .request(route)
            .token(input.token.as_deref())
            .content_md5()
            .reader(input.reader, content_type::JAR)
            .send()
            .await
    }

    pub async fn list_plugins(&self, input: &ListPluginsInput) -> Result<ListPluginsOutput> {
        let route = Operation::ListPlugins.route(&[])?;
        self.http
            .request(route)
            .token(input.token.as_deref())
            .send_json()
            .await
    }

    pub async fn get_plugin(&self, input: &GetPluginInput) -> Result<GetPluginOutput> {
        let route = Operation::GetPlugin.route(&[input.plugin_name.as_str()])?;
        self.http
            .request(route)
            .token(input.token.as_deref())
            .send_json()
            .await
    }

    pub async fn delete_plugin(&self, input: &DeletePluginInput) -> Result<()> {
        let route = Operation::DeletePlugin.route(&[input.plugin_name.as_str()])?;
        self.http.request(route).token(input.token.as_deref()).send().await
    }

    // ========================================================================
    // Transforms
    // ========================================================================

    pub async fn create_transform(&self, input: &CreateTransformInput) -> Result<()> {
        input.validate()?;
        let route = Operation::CreateTransform.route(&[
            input.src_repo_name.as_str(),
            input.transform_name.as_str(),
            input.dest_repo_name.as_str(),
        ])?;
        self.http
            .request(route)
            .token(input.token.as_deref())
            .json(&input.spec)?
            .send()
            .await
    }

    pub async fn list_transforms(
        &self,
        input: &ListTransformsInput,
    ) -> Result<ListTransformsOutput> {
        let route = Operation::ListTransforms.route(&[input.repo_name.as_str()])?;
        self.http
            .request(route)
            .token(input.token.as_deref())
            .send_json()
            .await
    }

    pub async fn get_transform(&self, input: &GetTransformInput) -> Result<GetTransformOutput> {
        let route = Operation::GetTransform
            .route(&[input.repo_name.as_str(), input.transform_name.as_str()])?;
        self.http
            .request(route)
            .token(input.token.as_deref())
            .send_json()
            .await
    }

    pub async fn delete_transform(&self, input: &DeleteTransformInput) -> Result<()> {
        let route = Operation::DeleteTransform
            .route(&[input.repo_name.as_str(), input.transform_name.as_str()])?;
        self.http.request(route).token(input.token.as_deref()).send().await
    }

    // ========================================================================
    // Exports
    // ========================================================================

    pub async fn create_export(&self, input: &CreateExportInput) -> Result<()> {
        input.validate()?;
        let route = Operation::CreateExport
            .route(&[input.repo_name.as_str(), input.export_name.as_str()])?;
        self.http
            .request(route)
            .token(input.token.as_deref())
            .json(input)?
            .send()
            .await
    }

    pub async fn list_exports(&self, input: &ListExportsInput) -> Result<ListExportsOutput> {
        let route = Operation::ListExports.route(&[input.repo_name.as_str()])?;
        self.http
            .request(route)
            .token(input.token.as_deref())
            .send_json()
            .await
    }

    pub async fn get_export(&self, input: &ExportInput) -> Result<GetExportOutput> {
        let route = Operation::GetExport
            .route(&[input.repo_name.as_str(), input.export_name.as_str()])?;
        self.http
            .request(route)
            .token(input.token.as_deref())
            .send_json()
            .await
    }

    pub async fn delete_export(&self, input: &DeleteExportInput) -> Result<()> {
        let route = Operation::DeleteExport.route(&[
            input.repo_name.as_str(),
            input.export_name.as_str(),
            input.del_offset_param(),
        ])?;
        self.http.request(route).token(input.token.as_deref()).send().await
    }

    // ========================================================================
    // Dry runs
    // ========================================================================

    pub async fn verify_transform(
        &self,
        input: &VerifyTransformInput,
    ) -> Result<VerifyTransformOutput> {
        input.validate()?;
        let route = Operation::VerifyTransform.route(&[])?;
        self.http
            .request(route)
            .token(input.token.as_deref())
            .json(input)?
            .send_json()
            .await
    }

    pub async fn verify_export(&self, input: &VerifyExportInput) -> Result<()> {
        input.validate()?;
        let route = Operation::VerifyExport.route(&[])?;
        self.http
            .request(route)
            .token(input.token.as_deref())
            .json(input)?
            .send()
            .await
    }
}

/// Mint a token with the key pair from `config`
pub(crate) fn mint(config: &Config, desc: &TokenDesc) -> Result<String> {
    if !config.has_credentials() {
        return Err(Error::config(
            "access key and secret key are required to mint tokens",
        ));
    }
    make_token(&config.access_key, &config.secret_key, desc)
}
