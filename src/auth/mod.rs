//! Authentication module
//!
//! Two ways to authenticate a request:
//!
//! - **Key pair**: each request is signed with HMAC-SHA1 over its method,
//!   `Content-MD5`, `Content-Type`, `Date`, signed headers and resource.
//! - **Scoped token**: a token minted by [`make_token`] is forwarded verbatim.
//!   It grants one method on one path with one content type until it expires.

mod authenticator;
mod token;
mod types;

pub use authenticator::{string_to_sign, Authenticator};
pub use token::{make_token, ScopedToken, AUTH_SCHEME};
pub use types::{AuthConfig, TokenDesc};
