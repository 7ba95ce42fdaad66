//! Export specs
//!
//! An export forwards a repo's data to one downstream backend. The backend
//! is a closed set, so the spec is an enum whose variant decides both the
//! wire `type` tag and which required-field checks run. Create and verify
//! requests share [`ExportSpec::validate`].

use super::models::RepoSchemaEntry;
use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue, StringMap};
use crate::validation::{validate_repo_name, validate_schema, Validate, Whence};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

const SPEC_FIELD: &str = "ExportSpec";

fn require(value: &str, message: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::invalid_args(SPEC_FIELD, message));
    }
    Ok(())
}

// ============================================================================
// Filter
// ============================================================================

/// Row filter applied before export: field -> operator -> value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFilter {
    #[serde(default)]
    pub rules: HashMap<String, HashMap<String, String>>,
    #[serde(default)]
    pub to_default: bool,
}

impl ExportFilter {
    /// Add a single `field <op> value` rule
    #[must_use]
    pub fn rule(
        mut self,
        field: impl Into<String>,
        op: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.rules
            .entry(field.into())
            .or_default()
            .insert(op.into(), value.into());
        self
    }
}

impl Validate for ExportFilter {
    fn validate(&self) -> Result<()> {
        if self.rules.is_empty() {
            return Err(Error::invalid_args(
                "ExportFilter",
                "rules in filter should not be empty",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Backend specs
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportTsdbSpec {
    #[serde(rename = "destRepoName")]
    pub dest_repo_name: String,
    #[serde(rename = "series")]
    pub series_name: String,
    #[serde(default)]
    pub tags: StringMap,
    #[serde(default)]
    pub fields: StringMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<ExportFilter>,
}

impl Validate for ExportTsdbSpec {
    fn validate(&self) -> Result<()> {
        require(&self.dest_repo_name, "dest repo name should not be empty")?;
        require(&self.series_name, "series name should not be empty")?;
        self.filter.validate()
    }
}

/// Write mode of a Mongo export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MongoMode {
    #[default]
    Upsert,
    Insert,
    Update,
}

impl MongoMode {
    pub fn as_str(self) -> &'static str {
        match self {
            MongoMode::Upsert => "UPSERT",
            MongoMode::Insert => "INSERT",
            MongoMode::Update => "UPDATE",
        }
    }
}

impl fmt::Display for MongoMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MongoMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "UPSERT" => Ok(MongoMode::Upsert),
            "INSERT" => Ok(MongoMode::Insert),
            "UPDATE" => Ok(MongoMode::Update),
            other => Err(Error::invalid_args(
                SPEC_FIELD,
                format!(
                    "invalid mode: {other}, mode should be one of \"UPSERT\", \"INSERT\" and \"UPDATE\""
                ),
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMongoSpec {
    pub host: String,
    pub db_name: String,
    pub coll_name: String,
    pub mode: MongoMode,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub update_key: Vec<String>,
    #[serde(default)]
    pub doc: JsonObject,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<ExportFilter>,
}

impl Validate for ExportMongoSpec {
    fn validate(&self) -> Result<()> {
        require(&self.host, "host should not be empty")?;
        require(&self.db_name, "dbname should not be empty")?;
        require(&self.coll_name, "collection name should not be empty")?;
        self.filter.validate()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportLogDbSpec {
    #[serde(rename = "destRepoName")]
    pub dest_repo_name: String,
    #[serde(default)]
    pub doc: JsonObject,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<ExportFilter>,
}

impl Validate for ExportLogDbSpec {
    fn validate(&self) -> Result<()> {
        require(&self.dest_repo_name, "dest repo name should not be empty")?;
        self.filter.validate()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportKodoSpec {
    pub bucket: String,
    #[serde(default)]
    pub key_prefix: String,
    #[serde(default)]
    pub fields: StringMap,
    /// Seconds between object rotations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotate_interval: Option<u32>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub access_key: String,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub compress: bool,
    /// Days to keep exported objects
    #[serde(default)]
    pub retention: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<ExportFilter>,
}

impl Validate for ExportKodoSpec {
    fn validate(&self) -> Result<()> {
        require(&self.bucket, "bucket should not be empty")?;
        self.filter.validate()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportHttpSpec {
    pub host: String,
    pub uri: String,
}

impl Validate for ExportHttpSpec {
    fn validate(&self) -> Result<()> {
        require(&self.host, "host should not be empty")?;
        require(&self.uri, "uri should not be empty")
    }
}

// ============================================================================
// Dispatch
// ============================================================================

/// Wire tag of an export backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportKind {
    Tsdb,
    Mongo,
    LogDb,
    Kodo,
    Http,
}

impl ExportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ExportKind::Tsdb => "tsdb",
            ExportKind::Mongo => "mongo",
            ExportKind::LogDb => "logdb",
            ExportKind::Kodo => "kodo",
            ExportKind::Http => "http",
        }
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "tsdb" => Ok(ExportKind::Tsdb),
            "mongo" => Ok(ExportKind::Mongo),
            "logdb" => Ok(ExportKind::LogDb),
            "kodo" => Ok(ExportKind::Kodo),
            "http" => Ok(ExportKind::Http),
            other => Err(Error::invalid_args(
                SPEC_FIELD,
                format!("invalid export spec type: {other}"),
            )),
        }
    }
}

/// Backend-specific export spec, serialized as `{"type": ..., "spec": {...}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "spec", rename_all = "lowercase")]
pub enum ExportSpec {
    Tsdb(ExportTsdbSpec),
    Mongo(ExportMongoSpec),
    #[serde(rename = "logdb")]
    LogDb(ExportLogDbSpec),
    Kodo(ExportKodoSpec),
    Http(ExportHttpSpec),
}

impl ExportSpec {
    pub fn kind(&self) -> ExportKind {
        match self {
            ExportSpec::Tsdb(_) => ExportKind::Tsdb,
            ExportSpec::Mongo(_) => ExportKind::Mongo,
            ExportSpec::LogDb(_) => ExportKind::LogDb,
            ExportSpec::Kodo(_) => ExportKind::Kodo,
            ExportSpec::Http(_) => ExportKind::Http,
        }
    }

    /// Resolve a spec from a wire tag and an untyped payload
    pub fn from_parts(kind: &str, spec: JsonValue) -> Result<Self> {
        let kind: ExportKind = kind.parse()?;
        let decoded = match kind {
            ExportKind::Tsdb => serde_json::from_value(spec).map(ExportSpec::Tsdb),
            ExportKind::Mongo => serde_json::from_value(spec).map(ExportSpec::Mongo),
            ExportKind::LogDb => serde_json::from_value(spec).map(ExportSpec::LogDb),
            ExportKind::Kodo => serde_json::from_value(spec).map(ExportSpec::Kodo),
            ExportKind::Http => serde_json::from_value(spec).map(ExportSpec::Http),
        };
        decoded.map_err(|e| Error::invalid_args(SPEC_FIELD, format!("invalid {kind} export spec: {e}")))
    }

    pub fn filter(&self) -> Option<&ExportFilter> {
        match self {
            ExportSpec::Tsdb(s) => s.filter.as_ref(),
            ExportSpec::Mongo(s) => s.filter.as_ref(),
            ExportSpec::LogDb(s) => s.filter.as_ref(),
            ExportSpec::Kodo(s) => s.filter.as_ref(),
            ExportSpec::Http(_) => None,
        }
    }
}

impl Validate for ExportSpec {
    fn validate(&self) -> Result<()> {
        match self {
            ExportSpec::Tsdb(s) => s.validate(),
            ExportSpec::Mongo(s) => s.validate(),
            ExportSpec::LogDb(s) => s.validate(),
            ExportSpec::Kodo(s) => s.validate(),
            ExportSpec::Http(s) => s.validate(),
        }
    }
}

macro_rules! impl_from_spec {
    ($($spec:ty => $variant:ident,)+) => {
        $(
            impl From<$spec> for ExportSpec {
                fn from(spec: $spec) -> Self {
                    ExportSpec::$variant(spec)
                }
            }
        )+
    };
}

impl_from_spec! {
    ExportTsdbSpec => Tsdb,
    ExportMongoSpec => Mongo,
    ExportLogDbSpec => LogDb,
    ExportKodoSpec => Kodo,
    ExportHttpSpec => Http,
}

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct CreateExportInput {
    #[serde(skip)]
    pub token: Option<String>,
    #[serde(skip)]
    pub repo_name: String,
    #[serde(skip)]
    pub export_name: String,
    #[serde(flatten)]
    pub spec: ExportSpec,
    #[serde(skip_serializing_if = "Whence::is_default")]
    pub whence: Whence,
}

impl CreateExportInput {
    pub fn new(
        repo_name: impl Into<String>,
        export_name: impl Into<String>,
        spec: impl Into<ExportSpec>,
    ) -> Self {
        Self {
            token: None,
            repo_name: repo_name.into(),
            export_name: export_name.into(),
            spec: spec.into(),
            whence: Whence::Default,
        }
    }
}

impl Validate for CreateExportInput {
    fn validate(&self) -> Result<()> {
        validate_repo_name(&self.repo_name)?;
        require(&self.export_name, "export name should not be empty")?;
        self.spec.validate()
    }
}

/// Input for operations addressing an export within a repo
#[derive(Debug, Clone, Default)]
pub struct ExportInput {
    pub token: Option<String>,
    pub repo_name: String,
    pub export_name: String,
}

pub type GetExportInput = ExportInput;

#[derive(Debug, Clone, Default)]
pub struct DeleteExportInput {
    pub token: Option<String>,
    pub repo_name: String,
    pub export_name: String,
    /// Also drop the export's consumption offset
    pub delete_offset: bool,
}

impl DeleteExportInput {
    /// Query value the service expects for `delOffset`
    pub fn del_offset_param(&self) -> &'static str {
        if self.delete_offset {
            "True"
        } else {
            "False"
        }
    }
}

/// Export as reported by the service, with an untyped spec
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportDesc {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub spec: JsonObject,
    pub whence: String,
}

impl ExportDesc {
    /// Decode the spec into its typed backend variant
    pub fn typed_spec(&self) -> Result<ExportSpec> {
        ExportSpec::from_parts(&self.kind, JsonValue::Object(self.spec.clone()))
    }
}

pub type GetExportOutput = ExportDesc;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListExportsOutput {
    pub exports: Vec<ExportDesc>,
}

/// Dry-run an export spec against a source schema
#[derive(Debug, Clone, Serialize)]
pub struct VerifyExportInput {
    #[serde(skip)]
    pub token: Option<String>,
    pub schema: Vec<RepoSchemaEntry>,
    #[serde(flatten)]
    pub spec: ExportSpec,
    #[serde(skip_serializing_if = "Whence::is_default")]
    pub whence: Whence,
}

#[derive(Deserialize)]
struct RawVerifyExport {
    #[serde(default)]
    schema: Vec<RepoSchemaEntry>,
    #[serde(rename = "type")]
    kind: String,
    spec: JsonValue,
    #[serde(default)]
    whence: String,
}

impl VerifyExportInput {
    pub fn new(schema: Vec<RepoSchemaEntry>, spec: impl Into<ExportSpec>) -> Self {
        Self {
            token: None,
            schema,
            spec: spec.into(),
            whence: Whence::Default,
        }
    }

    /// Parse a `{schema, type, spec, whence}` document
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawVerifyExport = serde_json::from_str(json)?;
        Ok(Self {
            token: None,
            schema: raw.schema,
            spec: ExportSpec::from_parts(&raw.kind, raw.spec)?,
            whence: raw.whence.parse()?,
        })
    }
}

impl Validate for VerifyExportInput {
    fn validate(&self) -> Result<()> {
        validate_schema("VerifyExportSpec", &self.schema)?;
        self.spec.validate()
    }
}
