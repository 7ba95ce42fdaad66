//! Authenticator implementation
//!
//! Attaches the `Authorization` header to an outgoing request, either by
//! signing it with the key pair or by forwarding a scoped token.

use super::token::{hmac_sha1_base64, AUTH_SCHEME};
use super::types::AuthConfig;
use crate::error::{Error, Result};
use crate::types::header;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Request;

/// Authenticator applies authentication to built HTTP requests
#[derive(Debug, Clone, Default)]
pub struct Authenticator {
    config: AuthConfig,
}

impl Authenticator {
    /// Create a new authenticator with the given config
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Authenticator for one request: a caller-supplied scoped token takes
    /// precedence over the client's own credentials
    pub fn for_token(&self, token: Option<&str>) -> Authenticator {
        match token {
            Some(token) if !token.is_empty() => Authenticator::new(AuthConfig::ScopedToken {
                token: token.to_string(),
            }),
            _ => self.clone(),
        }
    }

    /// Set the `Authorization` header on a fully built request.
    ///
    /// Must run after every signed header (`Content-Type`, `Content-MD5`,
    /// `Date`) is in place.
    pub fn apply(&self, request: &mut Request) -> Result<()> {
        let value = match &self.config {
            AuthConfig::None => return Ok(()),
            AuthConfig::ScopedToken { token } => token.clone(),
            AuthConfig::KeyPair {
                access_key,
                secret_key,
            } => {
                let string_to_sign = string_to_sign(request);
                let signature = hmac_sha1_base64(secret_key.as_bytes(), string_to_sign.as_bytes())?;
                format!("{AUTH_SCHEME} {access_key}:{signature}")
            }
        };

        let value = HeaderValue::from_str(&value)
            .map_err(|e| Error::invalid_args("Token", format!("invalid authorization value: {e}")))?;
        request.headers_mut().insert(header::AUTHORIZATION, value);
        Ok(())
    }

    /// Get the current auth config
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }
}

/// Canonical request text covered by the key-pair signature:
///
/// ```text
/// METHOD\nContent-MD5\nContent-Type\nDate\n<x-qiniu-* headers><path[?sorted query]>
/// ```
pub fn string_to_sign(request: &Request) -> String {
    let headers = request.headers();
    let mut out = String::new();

    out.push_str(request.method().as_str());
    out.push('\n');
    out.push_str(header_str(headers, header::CONTENT_MD5));
    out.push('\n');
    out.push_str(header_str(headers, header::CONTENT_TYPE));
    out.push('\n');
    out.push_str(header_str(headers, header::DATE));
    out.push('\n');
    out.push_str(&canonical_headers(headers));
    out.push_str(&canonical_resource(request.url()));
    out
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

/// Signed platform headers as sorted `name:value\n` lines
fn canonical_headers(headers: &HeaderMap) -> String {
    let mut signed: Vec<(String, &str)> = headers
        .iter()
        .filter(|(name, _)| name.as_str().starts_with(header::SIGNED_PREFIX))
        .map(|(name, value)| (name.as_str().to_string(), value.to_str().unwrap_or("")))
        .collect();
    signed.sort();

    signed
        .into_iter()
        .map(|(name, value)| format!("{name}:{value}\n"))
        .collect()
}

/// Path plus query pairs sorted by key
fn canonical_resource(url: &url::Url) -> String {
    let mut pairs: Vec<&str> = url.query().map(|q| q.split('&').collect()).unwrap_or_default();
    pairs.retain(|p| !p.is_empty());
    if pairs.is_empty() {
        return url.path().to_string();
    }
    pairs.sort_unstable();
    format!("{}?{}", url.path(), pairs.join("&"))
}
