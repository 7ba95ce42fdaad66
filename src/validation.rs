//! Pre-send validation rules
//!
//! Name patterns, the schema value-type table, and the retention rule shared
//! by the pipeline and log storage models. All checks are pure and return
//! [`Error::InvalidArgs`] naming the offending field.

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Group and repo names: 3 to 128 word characters, not starting with a digit
static NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]{2,127}$").unwrap());

/// Schema keys: 1 to 100 word characters, not starting with a digit
static SCHEMA_KEY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]{0,99}$").unwrap());

/// Retention in days. `-1d` and `0d` match here but fail the range check.
static RETENTION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(-1|0|[1-9][0-9]*)d$").unwrap());

pub const MIN_RETENTION_DAYS: i64 = 1;
pub const MAX_RETENTION_DAYS: i64 = 30;

/// Implemented by every request payload with user-supplied fields
pub trait Validate {
    /// Check the payload without touching the network
    fn validate(&self) -> Result<()>;
}

impl<T: Validate> Validate for Option<T> {
    fn validate(&self) -> Result<()> {
        match self {
            Some(v) => v.validate(),
            None => Ok(()),
        }
    }
}

pub fn validate_group_name(name: &str) -> Result<()> {
    if NAME_REGEX.is_match(name) {
        Ok(())
    } else {
        Err(Error::invalid_args(
            "GroupName",
            format!("invalid group name: {name}"),
        ))
    }
}

pub fn validate_repo_name(name: &str) -> Result<()> {
    if NAME_REGEX.is_match(name) {
        Ok(())
    } else {
        Err(Error::invalid_args(
            "RepoName",
            format!("invalid repo name: {name}"),
        ))
    }
}

pub fn validate_schema_key(key: &str) -> Result<()> {
    if SCHEMA_KEY_REGEX.is_match(key) {
        Ok(())
    } else {
        Err(Error::invalid_args(
            "Schema",
            format!("invalid field key: {key}"),
        ))
    }
}

/// Validate a non-empty schema, entry by entry
pub fn validate_schema<T: Validate>(field: &str, schema: &[T]) -> Result<()> {
    if schema.is_empty() {
        return Err(Error::invalid_args(field, "schema should not be empty"));
    }
    schema.iter().try_for_each(Validate::validate)
}

/// Check a log storage retention such as `7d`.
///
/// The pattern admits `-1d` and `0d`, but only `1d..=30d` pass the range
/// check, so those two forms are always rejected.
pub fn check_retention(retention: &str) -> Result<()> {
    if !RETENTION_REGEX.is_match(retention) {
        return Err(Error::invalid_args(
            "Retention",
            "invalid retention time format",
        ));
    }
    let days: i64 = retention
        .trim_end_matches('d')
        .parse()
        .map_err(|_| Error::invalid_args("Retention", "invalid retention time format"))?;

    if !(MIN_RETENTION_DAYS..=MAX_RETENTION_DAYS).contains(&days) {
        return Err(Error::invalid_args("Retention", "invalid retention range"));
    }
    Ok(())
}

// ============================================================================
// Schema Value Types
// ============================================================================

/// Allowed schema field types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Float,
    String,
    Long,
    Date,
}

impl ValueType {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::Float => "float",
            ValueType::String => "string",
            ValueType::Long => "long",
            ValueType::Date => "date",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "float" => Ok(ValueType::Float),
            "string" => Ok(ValueType::String),
            "long" => Ok(ValueType::Long),
            "date" => Ok(ValueType::Date),
            other => Err(Error::invalid_args(
                "Schema",
                format!(
                    "invalid field type: {other}, invalid field type should be one of \"float\", \"string\", \"date\" and \"long\""
                ),
            )),
        }
    }
}

// ============================================================================
// Whence
// ============================================================================

/// Starting offset of an export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Whence {
    /// Server default (serialized as an empty string)
    #[default]
    #[serde(rename = "")]
    Default,
    #[serde(rename = "oldest")]
    Oldest,
    #[serde(rename = "newest")]
    Newest,
}

impl Whence {
    pub fn as_str(self) -> &'static str {
        match self {
            Whence::Default => "",
            Whence::Oldest => "oldest",
            Whence::Newest => "newest",
        }
    }

    pub fn is_default(&self) -> bool {
        *self == Whence::Default
    }
}

impl FromStr for Whence {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "" => Ok(Whence::Default),
            "oldest" => Ok(Whence::Oldest),
            "newest" => Ok(Whence::Newest),
            _ => Err(Error::invalid_args(
                "ExportSpec",
                "whence must be empty, \"oldest\" or \"newest\"",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("abc" ; "three chars")]
    #[test_case("repo" ; "plain")]
    #[test_case("_private" ; "leading underscore")]
    #[test_case("Repo_2024" ; "mixed case with digits")]
    fn test_valid_repo_names(name: &str) {
        assert!(validate_repo_name(name).is_ok());
        assert!(validate_group_name(name).is_ok());
    }

    #[test_case("" ; "empty")]
    #[test_case("ab" ; "too short")]
    #[test_case("1repo" ; "leading digit")]
    #[test_case("repo-name" ; "dash")]
    #[test_case("repo name" ; "space")]
    fn test_invalid_repo_names(name: &str) {
        let err = validate_repo_name(name).unwrap_err();
        assert_eq!(err.invalid_field(), Some("RepoName"));
    }

    #[test]
    fn test_repo_name_length_limit() {
        let longest = format!("r{}", "a".repeat(127));
        assert!(validate_repo_name(&longest).is_ok());

        let too_long = format!("r{}", "a".repeat(128));
        assert!(validate_repo_name(&too_long).is_err());
    }

    #[test]
    fn test_group_name_error_field() {
        let err = validate_group_name("9g").unwrap_err();
        assert_eq!(err.invalid_field(), Some("GroupName"));
    }

    #[test_case("f" ; "single char")]
    #[test_case("_f1" ; "leading underscore")]
    fn test_valid_schema_keys(key: &str) {
        assert!(validate_schema_key(key).is_ok());
    }

    #[test]
    fn test_schema_key_limits() {
        assert!(validate_schema_key("").is_err());
        assert!(validate_schema_key("1f").is_err());
        assert!(validate_schema_key(&"k".repeat(100)).is_ok());
        assert!(validate_schema_key(&"k".repeat(101)).is_err());
    }

    #[test_case("1d" ; "min")]
    #[test_case("7d" ; "week")]
    #[test_case("30d" ; "max")]
    fn test_retention_accepted(retention: &str) {
        assert!(check_retention(retention).is_ok());
    }

    #[test_case("0d" ; "zero matches pattern but out of range")]
    #[test_case("-1d" ; "minus one matches pattern but out of range")]
    #[test_case("31d" ; "above max")]
    #[test_case("abcd" ; "not numeric")]
    #[test_case("7" ; "missing unit")]
    #[test_case("07d" ; "leading zero")]
    #[test_case("" ; "empty")]
    fn test_retention_rejected(retention: &str) {
        let err = check_retention(retention).unwrap_err();
        assert_eq!(err.invalid_field(), Some("Retention"));
    }

    #[test]
    fn test_retention_range_vs_format_messages() {
        assert!(check_retention("0d")
            .unwrap_err()
            .to_string()
            .contains("invalid retention range"));
        assert!(check_retention("abcd")
            .unwrap_err()
            .to_string()
            .contains("invalid retention time format"));
    }

    #[test]
    fn test_value_type_parse() {
        assert_eq!("float".parse::<ValueType>().unwrap(), ValueType::Float);
        assert_eq!("date".parse::<ValueType>().unwrap(), ValueType::Date);
        let err = "int".parse::<ValueType>().unwrap_err();
        assert_eq!(err.invalid_field(), Some("Schema"));
    }

    #[test]
    fn test_whence() {
        assert_eq!("".parse::<Whence>().unwrap(), Whence::Default);
        assert_eq!("oldest".parse::<Whence>().unwrap(), Whence::Oldest);
        assert_eq!("newest".parse::<Whence>().unwrap(), Whence::Newest);
        assert!("latest".parse::<Whence>().is_err());
        assert_eq!(serde_json::to_string(&Whence::Newest).unwrap(), "\"newest\"");
    }
}
