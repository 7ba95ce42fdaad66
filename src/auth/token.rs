//! Scoped token minting
//!
//! A token is `Pandora <access_key>:<signature>:<encoded_desc>` where
//! `encoded_desc` is the URL-safe base64 of the JSON [`TokenDesc`] and
//! `signature` is the URL-safe base64 HMAC-SHA1 of `encoded_desc` under the
//! secret key. Anyone holding the secret can re-derive the signature, so the
//! server verifies a token without contacting the client.

use super::types::TokenDesc;
use crate::error::{Error, Result};
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use sha1::Sha1;

/// Authorization scheme shared by signatures and tokens
pub const AUTH_SCHEME: &str = "Pandora";

/// Mint a scoped token. No local expiry check is made.
pub fn make_token(access_key: &str, secret_key: &str, desc: &TokenDesc) -> Result<String> {
    let desc_json = serde_json::to_vec(desc)?;
    let encoded_desc = URL_SAFE.encode(desc_json);
    let signature = hmac_sha1_base64(secret_key.as_bytes(), encoded_desc.as_bytes())?;
    Ok(format!("{AUTH_SCHEME} {access_key}:{signature}:{encoded_desc}"))
}

/// The decoded parts of a scoped token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedToken {
    pub access_key: String,
    pub signature: String,
    pub encoded_desc: String,
    pub desc: TokenDesc,
}

impl ScopedToken {
    /// Split a token into its parts and decode the descriptor.
    ///
    /// This does not check the signature.
    pub fn parse(token: &str) -> Result<Self> {
        let invalid = || Error::invalid_args("Token", "malformed scoped token");

        let body = token
            .strip_prefix(AUTH_SCHEME)
            .and_then(|rest| rest.strip_prefix(' '))
            .ok_or_else(invalid)?;

        let mut parts = body.splitn(3, ':');
        let (Some(access_key), Some(signature), Some(encoded_desc)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };

        let desc_json = URL_SAFE.decode(encoded_desc).map_err(|_| invalid())?;
        let desc: TokenDesc = serde_json::from_slice(&desc_json)?;

        Ok(Self {
            access_key: access_key.to_string(),
            signature: signature.to_string(),
            encoded_desc: encoded_desc.to_string(),
            desc,
        })
    }

    /// Whether `signature` was produced by `secret_key`
    pub fn is_signed_by(&self, secret_key: &str) -> bool {
        hmac_sha1_base64(secret_key.as_bytes(), self.encoded_desc.as_bytes())
            .is_ok_and(|expected| expected == self.signature)
    }
}

/// URL-safe base64 of HMAC-SHA1(key, data)
pub(crate) fn hmac_sha1_base64(key: &[u8], data: &[u8]) -> Result<String> {
    let mut mac = <Hmac<Sha1> as Mac>::new_from_slice(key)
        .map_err(|e| Error::internal(format!("hmac key rejected: {e}")))?;
    mac.update(data);
    Ok(URL_SAFE.encode(mac.finalize().into_bytes()))
}
