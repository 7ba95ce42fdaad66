//! Log storage service client

use super::models::*;
use crate::auth::TokenDesc;
use crate::config::Config;
use crate::error::Result;
use crate::http::HttpClient;
use crate::operation::Operation;
use crate::pipeline::mint;
use crate::validation::Validate;
use tracing::debug;
use url::form_urlencoded::byte_serialize;

/// Percent-encode a query string value
fn encode(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}

/// Typed client for the log storage service
#[derive(Debug, Clone)]
pub struct LogDb {
    http: HttpClient,
    config: Config,
}

impl LogDb {
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

    pub async fn create_repo(&self, input: &CreateRepoInput) -> Result<()> {
        input.validate()?;
        let route = Operation::LogdbCreateRepo.route(&[input.repo_name.as_str()])?;
        self.http
            .request(route)
            .token(input.token.as_deref())
            .json(input)?
            .send()
            .await
    }

    pub async fn update_repo(&self, input: &UpdateRepoInput) -> Result<()> {
        input.validate()?;
        let route = Operation::LogdbUpdateRepo.route(&[input.repo_name.as_str()])?;
        self.http
            .request(route)
            .token(input.token.as_deref())
            .json(input)?
            .send()
            .await
    }

    pub async fn get_repo(&self, input: &GetRepoInput) -> Result<GetRepoOutput> {
        let route = Operation::LogdbGetRepo.route(&[input.repo_name.as_str()])?;
        self.http
            .request(route)
            .token(input.token.as_deref())
            .send_json()
            .await
    }

    pub async fn list_repos(&self, input: &ListReposInput) -> Result<ListReposOutput> {
        let route = Operation::LogdbListRepos.route(&[])?;
        self.http
            .request(route)
            .token(input.token.as_deref())
            .send_json()
            .await
    }

    pub async fn delete_repo(&self, input: &DeleteRepoInput) -> Result<()> {
        let route = Operation::LogdbDeleteRepo.route(&[input.repo_name.as_str()])?;
        self.http.request(route).token(input.token.as_deref()).send().await
    }

    pub async fn send_log(&self, input: &SendLogInput) -> Result<SendLogOutput> {
        input.validate()?;
        debug!("Sending {} logs to repo {}", input.logs.len(), input.repo_name);
        let omit = input.omit_invalid_log.to_string();
        let route = Operation::LogdbSendLog.route(&[input.repo_name.as_str(), omit.as_str()])?;
        self.http
            .request(route)
            .token(input.token.as_deref())
            .json(&input.logs)?
            .send_json()
            .await
    }

    /// Search logs. A query with highlighting is sent as a POST body.
    pub async fn query_log(&self, input: &QueryLogInput) -> Result<QueryLogOutput> {
        input.validate()?;
        if input.highlight.is_some() {
            let route =
                Operation::LogdbQueryLogHighlight.route(&[input.repo_name.as_str()])?;
            return self
                .http
                .request(route)
                .token(input.token.as_deref())
                .json(input)?
                .send_json()
                .await;
        }

        let query = encode(&input.query);
        let sort = encode(&input.sort);
        let from = input.from.to_string();
        let size = input.size.to_string();
        let route = Operation::LogdbQueryLog.route(&[
            input.repo_name.as_str(),
            query.as_str(),
            sort.as_str(),
            from.as_str(),
            size.as_str(),
        ])?;
        self.http
            .request(route)
            .token(input.token.as_deref())
            .send_json()
            .await
    }

    pub async fn query_histogram_log(
        &self,
        input: &QueryHistogramLogInput,
    ) -> Result<QueryHistogramLogOutput> {
        input.validate()?;
        let query = encode(&input.query);
        let from = input.from.to_string();
        let to = input.to.to_string();
        let field = encode(&input.field);
        let route = Operation::LogdbQueryHistogram.route(&[
            input.repo_name.as_str(),
            query.as_str(),
            from.as_str(),
            to.as_str(),
            field.as_str(),
        ])?;
        self.http
            .request(route)
            .token(input.token.as_deref())
            .send_json()
            .await
    }

    pub async fn put_repo_config(&self, input: &PutRepoConfigInput) -> Result<()> {
        input.validate()?;
        let route = Operation::LogdbPutRepoConfig.route(&[input.repo_name.as_str()])?;
        self.http
            .request(route)
            .token(input.token.as_deref())
            .json(input)?
            .send()
            .await
    }

    pub async fn get_repo_config(&self, input: &GetRepoConfigInput) -> Result<GetRepoConfigOutput> {
        let route = Operation::LogdbGetRepoConfig.route(&[input.repo_name.as_str()])?;
        self.http
            .request(route)
            .token(input.token.as_deref())
            .send_json()
            .await
    }
}
