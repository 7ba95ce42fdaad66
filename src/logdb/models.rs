//! Log storage resource model

use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};
use crate::validation::{
    check_retention, validate_repo_name, validate_schema, validate_schema_key, Validate, ValueType,
};
use serde::{Deserialize, Serialize};

// ============================================================================
// Repos
// ============================================================================

/// One indexed field of a log repo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoSchemaEntry {
    pub key: String,
    #[serde(rename = "valtype")]
    pub value_type: ValueType,
}

impl RepoSchemaEntry {
    pub fn new(key: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            key: key.into(),
            value_type,
        }
    }
}

impl Validate for RepoSchemaEntry {
    fn validate(&self) -> Result<()> {
        validate_schema_key(&self.key)
    }
}

/// Body of repo create and update
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateRepoInput {
    #[serde(skip)]
    pub token: Option<String>,
    #[serde(skip)]
    pub repo_name: String,
    pub region: String,
    /// Days to keep logs, e.g. `7d`
    pub retention: String,
    pub schema: Vec<RepoSchemaEntry>,
}

pub type UpdateRepoInput = CreateRepoInput;

impl Validate for CreateRepoInput {
    fn validate(&self) -> Result<()> {
        validate_repo_name(&self.repo_name)?;
        validate_schema("Schema", &self.schema)?;
        check_retention(&self.retention)
    }
}

/// Input for operations addressing a log repo by name only
#[derive(Debug, Clone, Default)]
pub struct RepoInput {
    pub token: Option<String>,
    pub repo_name: String,
}

impl RepoInput {
    pub fn new(repo_name: impl Into<String>) -> Self {
        Self {
            token: None,
            repo_name: repo_name.into(),
        }
    }
}

pub type GetRepoInput = RepoInput;
pub type DeleteRepoInput = RepoInput;
pub type GetRepoConfigInput = RepoInput;

#[derive(Debug, Clone, Default)]
pub struct ListReposInput {
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetRepoOutput {
    pub region: String,
    pub retention: String,
    pub schema: Vec<RepoSchemaEntry>,
    pub create_time: String,
    pub update_time: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RepoDesc {
    #[serde(rename = "name")]
    pub repo_name: String,
    pub region: String,
    pub retention: String,
    pub create_time: String,
    pub update_time: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListReposOutput {
    pub repos: Vec<RepoDesc>,
}

// ============================================================================
// Logs
// ============================================================================

/// A single log record
pub type Log = JsonObject;

/// A batch of log records, sent as a JSON array
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Logs(pub Vec<Log>);

impl Logs {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, log: Log) {
        self.0.push(log);
    }
}

impl From<Vec<Log>> for Logs {
    fn from(logs: Vec<Log>) -> Self {
        Logs(logs)
    }
}

impl FromIterator<Log> for Logs {
    fn from_iter<I: IntoIterator<Item = Log>>(iter: I) -> Self {
        Logs(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Default)]
pub struct SendLogInput {
    pub token: Option<String>,
    pub repo_name: String,
    /// Drop records that do not match the schema instead of failing the batch
    pub omit_invalid_log: bool,
    pub logs: Logs,
}

impl Validate for SendLogInput {
    fn validate(&self) -> Result<()> {
        validate_repo_name(&self.repo_name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SendLogOutput {
    pub success: u64,
    pub failed: u64,
    pub total: u64,
}

// ============================================================================
// Queries
// ============================================================================

/// Highlighting options passed through to the search engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    #[serde(default)]
    pub pre_tags: Vec<String>,
    #[serde(default)]
    pub post_tags: Vec<String>,
    #[serde(default)]
    pub fields: JsonObject,
    #[serde(default)]
    pub require_field_match: bool,
    #[serde(default)]
    pub fragment_size: u32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryLogInput {
    #[serde(skip)]
    pub token: Option<String>,
    #[serde(skip)]
    pub repo_name: String,
    pub query: String,
    pub sort: String,
    pub from: u64,
    pub size: u64,
    /// Highlighted queries are sent as a POST body instead of a query string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<Highlight>,
}

impl Validate for QueryLogInput {
    fn validate(&self) -> Result<()> {
        validate_repo_name(&self.repo_name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryLogOutput {
    pub total: u64,
    pub partial_success: bool,
    pub data: Vec<JsonObject>,
    /// Present on highlighted queries
    pub highlight: Option<JsonValue>,
}

#[derive(Debug, Clone, Default)]
pub struct QueryHistogramLogInput {
    pub token: Option<String>,
    pub repo_name: String,
    pub query: String,
    pub field: String,
    /// Range start, Unix milliseconds
    pub from: i64,
    /// Range end, Unix milliseconds
    pub to: i64,
}

impl Validate for QueryHistogramLogInput {
    fn validate(&self) -> Result<()> {
        validate_repo_name(&self.repo_name)?;
        if self.from > self.to {
            return Err(Error::invalid_args(
                "From",
                "histogram range start should not be after its end",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogHistogramDesc {
    pub key: i64,
    pub count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryHistogramLogOutput {
    pub total: u64,
    pub partial_success: bool,
    pub buckets: Vec<LogHistogramDesc>,
}

// ============================================================================
// Repo config
// ============================================================================

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PutRepoConfigInput {
    #[serde(skip)]
    pub token: Option<String>,
    #[serde(skip)]
    pub repo_name: String,
    /// Schema field used as the log timestamp
    pub time_field_name: String,
}

impl Validate for PutRepoConfigInput {
    fn validate(&self) -> Result<()> {
        validate_repo_name(&self.repo_name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetRepoConfigOutput {
    pub time_field_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn repo(retention: &str) -> CreateRepoInput {
        CreateRepoInput {
            repo_name: "logs".to_string(),
            region: "nb".to_string(),
            retention: retention.to_string(),
            schema: vec![RepoSchemaEntry::new("msg", ValueType::String)],
            ..CreateRepoInput::default()
        }
    }

    #[test]
    fn test_create_repo_checks_retention_last() {
        assert!(repo("7d").validate().is_ok());

        let err = repo("0d").validate().unwrap_err();
        assert_eq!(err.invalid_field(), Some("Retention"));

        let mut input = repo("abc");
        input.schema.clear();
        assert_eq!(input.validate().unwrap_err().invalid_field(), Some("Schema"));
    }

    #[test]
    fn test_create_repo_wire_body() {
        assert_eq!(
            serde_json::to_value(repo("30d")).unwrap(),
            json!({
                "region": "nb",
                "retention": "30d",
                "schema": [{"key": "msg", "valtype": "string"}]
            })
        );
    }

    #[test]
    fn test_logs_serialize_as_array() {
        let mut log = Log::new();
        log.insert("msg".to_string(), json!("hello"));
        let logs: Logs = vec![log].into();
        assert_eq!(serde_json::to_value(&logs).unwrap(), json!([{"msg": "hello"}]));
    }

    #[test]
    fn test_highlight_query_body() {
        let input = QueryLogInput {
            repo_name: "logs".to_string(),
            query: "msg:error".to_string(),
            size: 10,
            highlight: Some(Highlight {
                pre_tags: vec!["<em>".to_string()],
                post_tags: vec!["</em>".to_string()],
                ..Highlight::default()
            }),
            ..QueryLogInput::default()
        };
        assert_eq!(
            serde_json::to_value(&input).unwrap(),
            json!({
                "query": "msg:error",
                "sort": "",
                "from": 0,
                "size": 10,
                "highlight": {
                    "pre_tags": ["<em>"],
                    "post_tags": ["</em>"],
                    "fields": {},
                    "require_field_match": false,
                    "fragment_size": 0
                }
            })
        );
    }

    #[test]
    fn test_histogram_range_order() {
        let input = QueryHistogramLogInput {
            repo_name: "logs".to_string(),
            from: 10,
            to: 5,
            ..QueryHistogramLogInput::default()
        };
        assert_eq!(input.validate().unwrap_err().invalid_field(), Some("From"));
    }
}
