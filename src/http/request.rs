//! Request builder
//!
//! Assembles one outbound request from a [`Route`], an optional scoped
//! token and a body, signs it, sends it, and decodes the response.

use super::client::HttpClient;
use crate::error::Result;
use crate::operation::Route;
use crate::types::{content_type, header};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::{Bytes, BytesMut};
use chrono::Utc;
use futures::stream::{self, Stream};
use md5::{Digest, Md5};
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::pin::Pin;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::Notify;

const READ_CHUNK_SIZE: usize = 64 * 1024;

/// Streaming request body source
pub type BodyReader = Pin<Box<dyn AsyncRead + Send + Sync>>;

/// Request body
#[derive(Default)]
pub enum Body {
    #[default]
    Empty,
    /// Serialized JSON document
    Json(Bytes),
    /// Raw payload sent as-is
    Bytes(Bytes),
    /// Payload streamed from a reader
    Reader(BodyReader),
}

impl std::fmt::Debug for Body {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Body::Empty => f.write_str("Empty"),
            Body::Json(b) => write!(f, "Json({} bytes)", b.len()),
            Body::Bytes(b) => write!(f, "Bytes({} bytes)", b.len()),
            Body::Reader(_) => f.write_str("Reader(..)"),
        }
    }
}

/// Builder for a single service call
#[derive(Debug)]
pub struct RequestBuilder<'a> {
    client: &'a HttpClient,
    route: Route,
    token: Option<String>,
    body: Body,
    content_type: Option<&'static str>,
    content_md5: bool,
}

impl<'a> RequestBuilder<'a> {
    pub(crate) fn new(client: &'a HttpClient, route: Route) -> Self {
        Self {
            client,
            route,
            token: None,
            body: Body::Empty,
            content_type: None,
            content_md5: false,
        }
    }

    /// Authenticate with a pre-minted scoped token instead of the key pair
    #[must_use]
    pub fn token(mut self, token: Option<&str>) -> Self {
        self.token = token.map(String::from);
        self
    }

    /// Serialize `body` as the JSON request body
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.body = Body::Json(Bytes::from(serde_json::to_vec(body)?));
        self.content_type = Some(content_type::JSON);
        Ok(self)
    }

    /// Send a raw byte payload
    #[must_use]
    pub fn bytes(mut self, body: impl Into<Bytes>, content_type: &'static str) -> Self {
        self.body = Body::Bytes(body.into());
        self.content_type = Some(content_type);
        self
    }

    /// Stream the payload from a reader
    #[must_use]
    pub fn reader<R>(mut self, reader: R, content_type: &'static str) -> Self
    where
        R: AsyncRead + Send + Sync + 'static,
    {
        self.body = Body::Reader(Box::pin(reader));
        self.content_type = Some(content_type);
        self
    }

    /// Add a `Content-MD5` integrity header. A reader body is buffered
    /// to compute it.
    #[must_use]
    pub fn content_md5(mut self) -> Self {
        self.content_md5 = true;
        self
    }

    /// Send and discard any response body
    pub async fn send(self) -> Result<()> {
        self.execute().await?;
        Ok(())
    }

    /// Send and decode the JSON response body
    pub async fn send_json<T: DeserializeOwned>(self) -> Result<T> {
        let response = self.execute().await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn execute(self) -> Result<Response> {
        let Self {
            client,
            route,
            token,
            body,
            content_type,
            content_md5,
        } = self;

        let body = match body {
            Body::Reader(mut reader) if content_md5 => {
                let mut buf = Vec::new();
                reader.read_to_end(&mut buf).await?;
                Body::Bytes(Bytes::from(buf))
            }
            other => other,
        };

        let mut body_sent = None;
        let url = client.build_url(&route.path);
        let mut req = client
            .inner()
            .request(route.method.into(), url)
            .header(header::DATE, http_date());

        if let Some(ct) = content_type {
            req = req.header(header::CONTENT_TYPE, ct);
        }

        req = match body {
            Body::Empty => req,
            Body::Json(bytes) | Body::Bytes(bytes) => {
                if content_md5 {
                    req = req.header(header::CONTENT_MD5, md5_base64(&bytes));
                }
                req.body(bytes)
            }
            Body::Reader(reader) => {
                let sent = Arc::new(Notify::new());
                body_sent = Some(Arc::clone(&sent));
                req.body(reqwest::Body::wrap_stream(reader_stream(reader, sent)))
            }
        };

        let mut request = req.build()?;
        client
            .authenticator()
            .for_token(token.as_deref())
            .apply(&mut request)?;

        client.execute(request, body_sent).await
    }
}

/// RFC 7231 date for the `Date` header
fn http_date() -> String {
    Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Base64 MD5 digest for `Content-MD5`
pub fn md5_base64(data: &[u8]) -> String {
    STANDARD.encode(Md5::digest(data))
}

/// Chunked byte stream over an async reader. `sent` is notified once the
/// reader is exhausted or fails.
fn reader_stream(
    reader: BodyReader,
    sent: Arc<Notify>,
) -> impl Stream<Item = std::io::Result<Bytes>> + Send + Sync {
    stream::unfold(Some(reader), move |state| {
        let sent = Arc::clone(&sent);
        async move {
            let mut reader = state?;
            let mut buf = BytesMut::with_capacity(READ_CHUNK_SIZE);
            match reader.read_buf(&mut buf).await {
                Ok(0) => {
                    sent.notify_one();
                    None
                }
                Ok(_) => Some((Ok(buf.freeze()), Some(reader))),
                Err(e) => {
                    sent.notify_one();
                    Some((Err(e), None))
                }
            }
        }
    })
}
