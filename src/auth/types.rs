//! Auth configuration types

use crate::types::Method;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How a request is authenticated
#[derive(Clone, Default, PartialEq, Eq)]
pub enum AuthConfig {
    /// No Authorization header
    #[default]
    None,

    /// Sign each request with a long-lived key pair
    KeyPair {
        /// Public access key
        access_key: String,
        /// Secret key used for HMAC signing
        secret_key: String,
    },

    /// Send a pre-minted scoped token verbatim
    ScopedToken {
        /// The opaque token string
        token: String,
    },
}

impl AuthConfig {
    /// Key-pair auth when both keys are present, otherwise none
    pub fn from_keys(access_key: &str, secret_key: &str) -> Self {
        if access_key.is_empty() || secret_key.is_empty() {
            AuthConfig::None
        } else {
            AuthConfig::KeyPair {
                access_key: access_key.to_string(),
                secret_key: secret_key.to_string(),
            }
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthConfig::None => f.write_str("None"),
            AuthConfig::KeyPair { access_key, .. } => f
                .debug_struct("KeyPair")
                .field("access_key", access_key)
                .finish_non_exhaustive(),
            AuthConfig::ScopedToken { .. } => f.write_str("ScopedToken(..)"),
        }
    }
}

/// What a scoped token grants: one method on one path with one content
/// type, until `expires` (unix seconds).
///
/// Field order is part of the signed payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDesc {
    pub url: String,
    pub expires: i64,
    #[serde(rename = "contentType")]
    pub content_type: String,
    pub method: String,
}

impl TokenDesc {
    /// Create a descriptor that expires immediately; set the expiry with
    /// [`TokenDesc::expires_at`] or [`TokenDesc::expires_in`].
    pub fn new(method: Method, url: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            expires: Utc::now().timestamp(),
            content_type: content_type.into(),
            method: method.as_str().to_string(),
        }
    }

    /// Expire at an absolute unix timestamp (seconds)
    #[must_use]
    pub fn expires_at(mut self, unix_seconds: i64) -> Self {
        self.expires = unix_seconds;
        self
    }

    /// Expire `ttl` from now, saturating at `i64::MAX`
    #[must_use]
    pub fn expires_in(mut self, ttl: Duration) -> Self {
        self.expires = i64::try_from(ttl.as_secs())
            .ok()
            .and_then(|secs| Utc::now().timestamp().checked_add(secs))
            .unwrap_or(i64::MAX);
        self
    }
}
