//! Pipeline resource model: groups, repos, plugins and transforms

use super::point::Points;
use crate::error::{Error, Result};
use crate::validation::{
    validate_group_name, validate_repo_name, validate_schema, validate_schema_key, Validate,
    ValueType,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

fn is_false(v: &bool) -> bool {
    !*v
}

fn is_blank(v: &Option<String>) -> bool {
    v.as_deref().map_or(true, str::is_empty)
}

// ============================================================================
// Containers
// ============================================================================

pub const MIN_CONTAINER_COUNT: u32 = 1;
pub const MAX_CONTAINER_COUNT: u32 = 128;

/// Container SKU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ContainerType {
    /// 16 GB memory, 4 cores
    #[default]
    #[serde(rename = "M16C4")]
    SmallQuad,
    /// 32 GB memory, 8 cores
    #[serde(rename = "M32C8")]
    LargeOcta,
}

impl ContainerType {
    /// Wire name of the SKU
    pub fn as_str(self) -> &'static str {
        match self {
            ContainerType::SmallQuad => "M16C4",
            ContainerType::LargeOcta => "M32C8",
        }
    }
}

impl fmt::Display for ContainerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContainerType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "M16C4" | "SmallQuad" => Ok(ContainerType::SmallQuad),
            "M32C8" | "LargeOcta" => Ok(ContainerType::LargeOcta),
            other => Err(Error::invalid_args(
                "ContainerType",
                format!(
                    "invalid container type: {other}, should be one of \"M16C4\" and \"M32C8\""
                ),
            )),
        }
    }
}

/// Compute allocation for a group or transform
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Container {
    #[serde(rename = "type")]
    pub container_type: ContainerType,
    pub count: u32,
    /// Server-reported state; ignored on create
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Container {
    pub fn new(container_type: ContainerType, count: u32) -> Self {
        Self {
            container_type,
            count,
            status: None,
        }
    }
}

impl Validate for Container {
    fn validate(&self) -> Result<()> {
        if !(MIN_CONTAINER_COUNT..=MAX_CONTAINER_COUNT).contains(&self.count) {
            return Err(Error::invalid_args(
                "ContainerCount",
                format!("invalid container count: {}", self.count),
            ));
        }
        Ok(())
    }
}

fn require_container(container: &Option<Container>) -> Result<()> {
    match container {
        Some(c) => c.validate(),
        None => Err(Error::invalid_args(
            "Container",
            "container should not be empty",
        )),
    }
}

// ============================================================================
// Groups
// ============================================================================

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupInput {
    #[serde(skip)]
    pub token: Option<String>,
    #[serde(skip)]
    pub group_name: String,
    pub region: String,
    pub container: Option<Container>,
    #[serde(skip_serializing_if = "is_false")]
    pub allocate_on_start: bool,
}

impl Validate for CreateGroupInput {
    fn validate(&self) -> Result<()> {
        validate_group_name(&self.group_name)?;
        if self.region.is_empty() {
            return Err(Error::invalid_args("Region", "region should not be empty"));
        }
        require_container(&self.container)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateGroupInput {
    #[serde(skip)]
    pub token: Option<String>,
    #[serde(skip)]
    pub group_name: String,
    pub container: Option<Container>,
}

impl Validate for UpdateGroupInput {
    fn validate(&self) -> Result<()> {
        validate_group_name(&self.group_name)?;
        require_container(&self.container)
    }
}

/// Input for operations addressing a group by name only
#[derive(Debug, Clone, Default)]
pub struct GroupInput {
    pub token: Option<String>,
    pub group_name: String,
}

impl GroupInput {
    pub fn new(group_name: impl Into<String>) -> Self {
        Self {
            token: None,
            group_name: group_name.into(),
        }
    }
}

pub type StartGroupTaskInput = GroupInput;
pub type StopGroupTaskInput = GroupInput;
pub type GetGroupInput = GroupInput;
pub type DeleteGroupInput = GroupInput;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetGroupOutput {
    pub region: String,
    pub container: Option<Container>,
    pub create_time: String,
    pub update_time: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupDesc {
    #[serde(rename = "name")]
    pub group_name: String,
    pub region: String,
    pub container: Option<Container>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListGroupsOutput {
    pub groups: Vec<GroupDesc>,
}

// ============================================================================
// Repos
// ============================================================================

/// One field of a repo schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoSchemaEntry {
    pub key: String,
    #[serde(rename = "valtype")]
    pub value_type: ValueType,
    #[serde(default)]
    pub required: bool,
}

impl RepoSchemaEntry {
    pub fn new(key: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            key: key.into(),
            value_type,
            required: false,
        }
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

impl Validate for RepoSchemaEntry {
    fn validate(&self) -> Result<()> {
        validate_schema_key(&self.key)
    }
}

impl fmt::Display for RepoSchemaEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => Err(fmt::Error),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateRepoInput {
    #[serde(skip)]
    pub token: Option<String>,
    #[serde(skip)]
    pub repo_name: String,
    pub region: String,
    pub schema: Vec<RepoSchemaEntry>,
    #[serde(rename = "group", skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
}

impl Validate for CreateRepoInput {
    fn validate(&self) -> Result<()> {
        validate_repo_name(&self.repo_name)?;
        validate_schema("Schema", &self.schema)?;
        if let Some(group) = self.group_name.as_deref().filter(|g| !g.is_empty()) {
            validate_group_name(group)?;
        }
        if self.region.is_empty() {
            return Err(Error::invalid_args("Region", "region should not be empty"));
        }
        Ok(())
    }
}

/// Input for operations addressing a repo by name only
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
pub type ListTransformsInput = RepoInput;
pub type ListExportsInput = RepoInput;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetRepoOutput {
    pub region: String,
    pub schema: Vec<RepoSchemaEntry>,
    #[serde(rename = "group")]
    pub group_name: String,
    /// Source repo when this repo is a transform output
    #[serde(rename = "derivedFrom")]
    pub derived_from: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoDesc {
    #[serde(rename = "name")]
    pub repo_name: String,
    pub region: String,
    #[serde(rename = "group")]
    pub group_name: String,
    #[serde(rename = "derivedFrom")]
    pub derived_from: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListReposOutput {
    pub repos: Vec<RepoDesc>,
}

/// Input for operations that need no arguments besides auth
#[derive(Debug, Clone, Default)]
pub struct ListInput {
    pub token: Option<String>,
}

pub type ListGroupsInput = ListInput;
pub type ListReposInput = ListInput;
pub type ListPluginsInput = ListInput;

// ============================================================================
// Ingestion
// ============================================================================

/// Points encoded by the client
pub struct PostDataInput {
    pub token: Option<String>,
    pub repo_name: String,
    pub points: Points,
}

/// Pre-encoded point lines
pub struct PostDataFromBytesInput {
    pub token: Option<String>,
    pub repo_name: String,
    pub buffer: Bytes,
}

/// Point lines streamed from a local file
pub struct PostDataFromFileInput {
    pub token: Option<String>,
    pub repo_name: String,
    pub file_path: PathBuf,
}

/// Point lines streamed from any async reader
pub struct PostDataFromReaderInput<R> {
    pub token: Option<String>,
    pub repo_name: String,
    pub reader: R,
}

impl Validate for PostDataInput {
    fn validate(&self) -> Result<()> {
        validate_repo_name(&self.repo_name)
    }
}

impl Validate for PostDataFromBytesInput {
    fn validate(&self) -> Result<()> {
        validate_repo_name(&self.repo_name)
    }
}

impl Validate for PostDataFromFileInput {
    fn validate(&self) -> Result<()> {
        validate_repo_name(&self.repo_name)
    }
}

impl<R> Validate for PostDataFromReaderInput<R> {
    fn validate(&self) -> Result<()> {
        validate_repo_name(&self.repo_name)
    }
}

// ============================================================================
// Plugins
// ============================================================================

pub struct UploadPluginInput {
    pub token: Option<String>,
    pub plugin_name: String,
    pub buffer: Bytes,
}

pub struct UploadPluginFromFileInput {
    pub token: Option<String>,
    pub plugin_name: String,
    pub file_path: PathBuf,
}

pub struct UploadPluginFromReaderInput<R> {
    pub token: Option<String>,
    pub plugin_name: String,
    pub reader: R,
}

fn validate_plugin_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invalid_args(
            "PluginName",
            "plugin name should not be empty",
        ));
    }
    Ok(())
}

impl Validate for UploadPluginInput {
    fn validate(&self) -> Result<()> {
        validate_plugin_name(&self.plugin_name)
    }
}

impl Validate for UploadPluginFromFileInput {
    fn validate(&self) -> Result<()> {
        validate_plugin_name(&self.plugin_name)
    }
}

impl<R> Validate for UploadPluginFromReaderInput<R> {
    fn validate(&self) -> Result<()> {
        validate_plugin_name(&self.plugin_name)
    }
}

/// Input for operations addressing a plugin by name only
#[derive(Debug, Clone, Default)]
pub struct PluginInput {
    pub token: Option<String>,
    pub plugin_name: String,
}

impl PluginInput {
    pub fn new(plugin_name: impl Into<String>) -> Self {
        Self {
            token: None,
            plugin_name: plugin_name.into(),
        }
    }
}

pub type GetPluginInput = PluginInput;
pub type DeletePluginInput = PluginInput;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PluginDesc {
    #[serde(rename = "name")]
    pub plugin_name: String,
    pub create_time: String,
}

pub type GetPluginOutput = PluginDesc;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListPluginsOutput {
    pub plugins: Vec<PluginDesc>,
}

// ============================================================================
// Transforms
// ============================================================================

/// One output field declared by a transform plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformPluginOutputEntry {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "is_blank")]
    pub value_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformPlugin {
    pub name: String,
    #[serde(default)]
    pub output: Vec<TransformPluginOutputEntry>,
}

/// How a transform computes its output: SQL (`mode`, `code`, `interval`)
/// or a named plugin
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin: Option<TransformPlugin>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub interval: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<Container>,
}

impl TransformSpec {
    /// SQL transform run every `interval` (e.g. `5m`)
    pub fn sql(code: impl Into<String>, interval: impl Into<String>) -> Self {
        Self {
            mode: Some("sql".to_string()),
            code: Some(code.into()),
            interval: Some(interval.into()),
            ..Self::default()
        }
    }

    /// Transform backed by an uploaded plugin
    pub fn plugin(plugin: TransformPlugin) -> Self {
        Self {
            plugin: Some(plugin),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_container(mut self, container: Container) -> Self {
        self.container = Some(container);
        self
    }
}

impl Validate for TransformSpec {
    fn validate(&self) -> Result<()> {
        if is_blank(&self.mode) && is_blank(&self.code) && self.plugin.is_none() {
            return Err(Error::invalid_args(
                "TransformSpec",
                "all mode, code and plugin can not be empty",
            ));
        }
        self.container.validate()
    }
}

pub struct CreateTransformInput {
    pub token: Option<String>,
    pub src_repo_name: String,
    pub transform_name: String,
    pub dest_repo_name: String,
    pub spec: TransformSpec,
}

impl Validate for CreateTransformInput {
    fn validate(&self) -> Result<()> {
        validate_repo_name(&self.src_repo_name)?;
        validate_repo_name(&self.dest_repo_name)?;
        if self.transform_name.is_empty() {
            return Err(Error::invalid_args(
                "TransformName",
                "transform name should not be empty",
            ));
        }
        if self.src_repo_name == self.dest_repo_name {
            return Err(Error::invalid_args(
                "DestRepoName",
                "dest repo name should be different to src repo name",
            ));
        }
        self.spec.validate()
    }
}

/// Input for operations addressing a transform within a repo
#[derive(Debug, Clone, Default)]
pub struct TransformInput {
    pub token: Option<String>,
    pub repo_name: String,
    pub transform_name: String,
}

pub type GetTransformInput = TransformInput;
pub type DeleteTransformInput = TransformInput;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformDesc {
    #[serde(rename = "name")]
    pub transform_name: String,
    #[serde(rename = "to")]
    pub dest_repo_name: String,
    pub spec: TransformSpec,
}

pub type GetTransformOutput = TransformDesc;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListTransformsOutput {
    pub transforms: Vec<TransformDesc>,
}

/// Dry-run a transform spec against a source schema
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifyTransformInput {
    #[serde(skip)]
    pub token: Option<String>,
    pub schema: Vec<RepoSchemaEntry>,
    pub spec: TransformSpec,
}

impl Validate for VerifyTransformInput {
    fn validate(&self) -> Result<()> {
        validate_schema("Schema", &self.schema)?;
        self.spec.validate()
    }
}

/// Schema the transform would produce
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyTransformOutput {
    pub schema: Vec<RepoSchemaEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn schema() -> Vec<RepoSchemaEntry> {
        vec![
            RepoSchemaEntry::new("f1", ValueType::String).required(),
            RepoSchemaEntry::new("f2", ValueType::Float).required(),
        ]
    }

    #[test]
    fn test_container_count_bounds() {
        assert!(Container::new(ContainerType::SmallQuad, 1).validate().is_ok());
        assert!(Container::new(ContainerType::LargeOcta, 128).validate().is_ok());

        for count in [0, 129] {
            let err = Container::new(ContainerType::SmallQuad, count)
                .validate()
                .unwrap_err();
            assert_eq!(err.invalid_field(), Some("ContainerCount"));
        }
    }

    #[test]
    fn test_container_type_wire_names() {
        let json = serde_json::to_value(Container::new(ContainerType::LargeOcta, 2)).unwrap();
        assert_eq!(json, json!({"type": "M32C8", "count": 2}));

        assert_eq!("M16C4".parse::<ContainerType>().unwrap(), ContainerType::SmallQuad);
        assert_eq!("LargeOcta".parse::<ContainerType>().unwrap(), ContainerType::LargeOcta);
        let err = "M64C16".parse::<ContainerType>().unwrap_err();
        assert_eq!(err.invalid_field(), Some("ContainerType"));
    }

    #[test]
    fn test_create_group_validation_order() {
        let mut input = CreateGroupInput {
            group_name: "g".to_string(),
            ..CreateGroupInput::default()
        };
        assert_eq!(input.validate().unwrap_err().invalid_field(), Some("GroupName"));

        input.group_name = "group1".to_string();
        assert_eq!(input.validate().unwrap_err().invalid_field(), Some("Region"));

        input.region = "nb".to_string();
        assert_eq!(input.validate().unwrap_err().invalid_field(), Some("Container"));

        input.container = Some(Container::new(ContainerType::SmallQuad, 0));
        assert_eq!(
            input.validate().unwrap_err().invalid_field(),
            Some("ContainerCount")
        );

        input.container = Some(Container::new(ContainerType::SmallQuad, 1));
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_create_group_wire_body() {
        let input = CreateGroupInput {
            token: Some("t".to_string()),
            group_name: "group1".to_string(),
            region: "nb".to_string(),
            container: Some(Container::new(ContainerType::SmallQuad, 1)),
            allocate_on_start: true,
        };
        assert_eq!(
            serde_json::to_value(&input).unwrap(),
            json!({
                "region": "nb",
                "container": {"type": "M16C4", "count": 1},
                "allocateOnStart": true
            })
        );
    }

    #[test]
    fn test_create_repo_validation() {
        let mut input = CreateRepoInput {
            repo_name: "repo".to_string(),
            region: "nb".to_string(),
            schema: schema(),
            group_name: None,
            ..CreateRepoInput::default()
        };
        assert!(input.validate().is_ok());

        input.group_name = Some(String::new());
        assert!(input.validate().is_ok());

        input.group_name = Some("9bad".to_string());
        assert_eq!(input.validate().unwrap_err().invalid_field(), Some("GroupName"));

        input.group_name = None;
        input.schema.clear();
        assert_eq!(input.validate().unwrap_err().invalid_field(), Some("Schema"));

        input.schema = vec![RepoSchemaEntry::new("bad key", ValueType::Long)];
        assert_eq!(input.validate().unwrap_err().invalid_field(), Some("Schema"));

        input.schema = schema();
        input.region.clear();
        assert_eq!(input.validate().unwrap_err().invalid_field(), Some("Region"));
    }

    #[test]
    fn test_create_repo_wire_body() {
        let input = CreateRepoInput {
            repo_name: "repo".to_string(),
            region: "nb".to_string(),
            schema: schema(),
            group_name: Some("group1".to_string()),
            ..CreateRepoInput::default()
        };
        assert_eq!(
            serde_json::to_value(&input).unwrap(),
            json!({
                "region": "nb",
                "schema": [
                    {"key": "f1", "valtype": "string", "required": true},
                    {"key": "f2", "valtype": "float", "required": true}
                ],
                "group": "group1"
            })
        );
    }

    #[test]
    fn test_schema_entry_display_is_json() {
        let entry = RepoSchemaEntry::new("f1", ValueType::Date);
        assert_eq!(
            entry.to_string(),
            r#"{"key":"f1","valtype":"date","required":false}"#
        );
    }

    #[test]
    fn test_unknown_value_type_is_rejected_on_decode() {
        let result: std::result::Result<RepoSchemaEntry, _> =
            serde_json::from_value(json!({"key": "f1", "valtype": "int"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_transform_spec_requires_mode_code_or_plugin() {
        let err = TransformSpec::default().validate().unwrap_err();
        assert_eq!(err.invalid_field(), Some("TransformSpec"));

        let blank = TransformSpec {
            mode: Some(String::new()),
            code: Some(String::new()),
            ..TransformSpec::default()
        };
        assert!(blank.validate().is_err());

        assert!(TransformSpec::sql("select * from stream", "5m").validate().is_ok());
        assert!(TransformSpec::plugin(TransformPlugin {
            name: "p1".to_string(),
            output: vec![],
        })
        .validate()
        .is_ok());
    }

    #[test]
    fn test_transform_spec_validates_container() {
        let spec = TransformSpec::sql("select 1", "1m")
            .with_container(Container::new(ContainerType::SmallQuad, 200));
        assert_eq!(
            spec.validate().unwrap_err().invalid_field(),
            Some("ContainerCount")
        );
    }

    #[test]
    fn test_create_transform_validation() {
        let mut input = CreateTransformInput {
            token: None,
            src_repo_name: "src".to_string(),
            transform_name: "t1".to_string(),
            dest_repo_name: "src".to_string(),
            spec: TransformSpec::sql("select * from stream", "5m"),
        };
        assert_eq!(
            input.validate().unwrap_err().invalid_field(),
            Some("DestRepoName")
        );

        input.dest_repo_name = "dest".to_string();
        assert!(input.validate().is_ok());

        input.transform_name.clear();
        assert_eq!(
            input.validate().unwrap_err().invalid_field(),
            Some("TransformName")
        );
    }

    #[test]
    fn test_transform_spec_wire_shape() {
        let spec = TransformSpec::plugin(TransformPlugin {
            name: "p1".to_string(),
            output: vec![
                TransformPluginOutputEntry {
                    name: "f1".to_string(),
                    value_type: Some("string".to_string()),
                },
                TransformPluginOutputEntry {
                    name: "f2".to_string(),
                    value_type: None,
                },
            ],
        });
        assert_eq!(
            serde_json::to_value(&spec).unwrap(),
            json!({"plugin": {"name": "p1", "output": [{"name": "f1", "type": "string"}, {"name": "f2"}]}})
        );
    }

    #[test]
    fn test_decode_get_group_output() {
        let output: GetGroupOutput = serde_json::from_value(json!({
            "region": "nb",
            "container": {"type": "M16C4", "count": 1, "status": "running"},
            "createTime": "2017-01-01T00:00:00Z",
            "updateTime": "2017-01-02T00:00:00Z"
        }))
        .unwrap();
        let container = output.container.unwrap();
        assert_eq!(container.container_type, ContainerType::SmallQuad);
        assert_eq!(container.status.as_deref(), Some("running"));
        assert_eq!(output.update_time, "2017-01-02T00:00:00Z");
    }
}
