//! Error types for the Pandora SDK
//!
//! Every public API returns `Result<T, Error>`. Local validation failures
//! never reach the network; server rejections carry the HTTP status and the
//! server-declared error kind.

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// The main error type for the Pandora SDK
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Local Validation Errors
    // ============================================================================
    #[error("Invalid argument '{field}': {message}")]
    InvalidArgs { field: String, message: String },

    // ============================================================================
    // Server Errors
    // ============================================================================
    #[error("{0}")]
    Request(RequestError),

    // ============================================================================
    // Transport and Encoding Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to encode or decode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("No response within {0:?}")]
    Timeout(std::time::Duration),

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Registry Invariant Violations
    // ============================================================================
    #[error("Unknown operation: {name}")]
    UnknownOperation { name: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an invalid argument error
    pub fn invalid_args(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgs {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an internal invariant error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Server error kind, if this error came from a non-2xx response
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Error::Request(e) => Some(e.kind),
            _ => None,
        }
    }

    /// HTTP status code, if this error came from a non-2xx response
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Request(e) => Some(e.status),
            _ => None,
        }
    }

    /// Whether the server rejected the signature or scoped token
    pub fn is_unauthorized(&self) -> bool {
        self.kind() == Some(ErrorKind::Unauthorized)
    }

    /// Name of the offending field for local validation failures
    pub fn invalid_field(&self) -> Option<&str> {
        match self {
            Error::InvalidArgs { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl From<RequestError> for Error {
    fn from(e: RequestError) -> Self {
        Error::Request(e)
    }
}

// ============================================================================
// Server-Reported Errors
// ============================================================================

/// Classification of a non-2xx server response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad signature, or an expired/mismatched scoped token (401)
    Unauthorized,
    /// Request rejected as malformed (400)
    BadRequest,
    /// Access denied (403)
    Forbidden,
    /// Resource does not exist (404)
    NotFound,
    /// Resource already exists or is in use (409)
    Conflict,
    /// Body exceeds the server limit (413)
    PayloadTooLarge,
    /// Server-side failure (5xx)
    Server,
    /// Any other non-2xx status
    Other,
}

impl ErrorKind {
    /// Classify an HTTP status code
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => ErrorKind::Unauthorized,
            400 => ErrorKind::BadRequest,
            403 => ErrorKind::Forbidden,
            404 => ErrorKind::NotFound,
            409 => ErrorKind::Conflict,
            413 => ErrorKind::PayloadTooLarge,
            500..=599 => ErrorKind::Server,
            _ => ErrorKind::Other,
        }
    }
}

/// A decoded non-2xx response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestError {
    pub kind: ErrorKind,
    pub status: u16,
    /// Server error code such as `E18102`, when the message carries one
    pub code: Option<String>,
    pub message: String,
    pub request_id: Option<String>,
}

/// Wire shape of an error body
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: String,
}

impl RequestError {
    /// Build an error from a response status, raw body and request id.
    ///
    /// The body is expected to be `{"error": "E18102: message"}`; anything else
    /// is kept verbatim as the message.
    pub fn from_response(status: u16, body: &str, request_id: Option<String>) -> Self {
        let raw = serde_json::from_str::<ErrorBody>(body)
            .map(|b| b.error)
            .unwrap_or_else(|_| body.trim().to_string());

        let (code, message) = split_error_code(&raw);

        Self {
            kind: ErrorKind::from_status(status),
            status,
            code,
            message,
            request_id,
        }
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {} ({:?})", self.status, self.kind)?;
        if let Some(code) = &self.code {
            write!(f, " {code}")?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(id) = &self.request_id {
            write!(f, " [reqid: {id}]")?;
        }
        Ok(())
    }
}

/// Split `E18102: message` into its code and message
fn split_error_code(raw: &str) -> (Option<String>, String) {
    if let Some((code, rest)) = raw.split_once(':') {
        let code = code.trim();
        let is_code = code.len() > 1
            && code.starts_with('E')
            && code[1..].chars().all(|c| c.is_ascii_digit());
        if is_code {
            return (Some(code.to_string()), rest.trim().to_string());
        }
    }
    (None, raw.to_string())
}

/// Result type alias for the Pandora SDK
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::invalid_args("RepoName", "invalid repo name: 1abc");
        assert_eq!(
            err.to_string(),
            "Invalid argument 'RepoName': invalid repo name: 1abc"
        );

        let err = Error::config("endpoint should not end with '/'");
        assert_eq!(
            err.to_string(),
            "Configuration error: endpoint should not end with '/'"
        );
    }

    #[test]
    fn test_request_error_from_body_with_code() {
        let err = RequestError::from_response(
            404,
            r#"{"error":"E18102: repo not found"}"#,
            Some("abc".to_string()),
        );
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(err.code.as_deref(), Some("E18102"));
        assert_eq!(err.message, "repo not found");
        assert_eq!(err.request_id.as_deref(), Some("abc"));
    }

    #[test]
    fn test_request_error_from_plain_body() {
        let err = RequestError::from_response(401, "token expired\n", None);
        assert_eq!(err.kind, ErrorKind::Unauthorized);
        assert!(err.code.is_none());
        assert_eq!(err.message, "token expired");
    }

    #[test]
    fn test_error_kind_from_status() {
        assert_eq!(ErrorKind::from_status(401), ErrorKind::Unauthorized);
        assert_eq!(ErrorKind::from_status(409), ErrorKind::Conflict);
        assert_eq!(ErrorKind::from_status(503), ErrorKind::Server);
        assert_eq!(ErrorKind::from_status(418), ErrorKind::Other);
    }

    #[test]
    fn test_is_unauthorized() {
        let err: Error = RequestError::from_response(401, "", None).into();
        assert!(err.is_unauthorized());
        assert_eq!(err.status(), Some(401));

        assert!(!Error::invalid_args("Schema", "empty").is_unauthorized());
        assert_eq!(Error::invalid_args("Schema", "empty").status(), None);
    }

    #[test]
    fn test_message_with_colon_but_no_code() {
        let err = RequestError::from_response(400, r#"{"error":"bad input: f1"}"#, None);
        assert!(err.code.is_none());
        assert_eq!(err.message, "bad input: f1");
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::config("inner"));
        let with_context = result.context("outer");
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: Configuration error: inner"));
    }
}
