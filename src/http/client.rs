//! Shared HTTP transport
//!
//! One [`HttpClient`] per service client. It owns the connection pool, the
//! endpoint and the default authenticator, and turns non-2xx responses into
//! [`Error::Request`].

use super::request::RequestBuilder;
use crate::auth::{AuthConfig, Authenticator};
use crate::config::Config;
use crate::error::{Error, RequestError, Result};
use crate::operation::Route;
use crate::types::header;
use reqwest::{Client, Request, Response};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{debug, warn};

/// HTTP client bound to one service endpoint
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    endpoint: String,
    authenticator: Authenticator,
    response_timeout: Duration,
}

impl HttpClient {
    /// Build a client from a validated config
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .connect_timeout(config.dial_timeout())
            .tcp_keepalive(Duration::from_secs(30))
            .user_agent(format!("pandora-sdk/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            authenticator: Authenticator::new(AuthConfig::from_keys(
                &config.access_key,
                &config.secret_key,
            )),
            response_timeout: config.response_timeout(),
        })
    }

    /// Start a request for a resolved route
    pub fn request(&self, route: Route) -> RequestBuilder<'_> {
        RequestBuilder::new(self, route)
    }

    /// Get the underlying reqwest client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    /// Build full URL from path
    pub(crate) fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    /// Send a signed request and classify the response status.
    ///
    /// The response timeout bounds the wait for response headers. For a
    /// streamed body it starts once `body_sent` is notified, so a slow but
    /// progressing upload is never cut off.
    pub(crate) async fn execute(
        &self,
        request: Request,
        body_sent: Option<Arc<Notify>>,
    ) -> Result<Response> {
        let method = request.method().clone();
        let url = request.url().clone();
        debug!("Sending request: {} {}", method, url.path());

        let timeout = self.response_timeout;
        let deadline = async move {
            if let Some(sent) = body_sent {
                sent.notified().await;
            }
            tokio::time::sleep(timeout).await;
        };
        let response = tokio::select! {
            result = self.client.execute(request) => result.map_err(Error::Http)?,
            () = deadline => {
                warn!("No response within {:?}: {} {}", timeout, method, url.path());
                return Err(Error::Timeout(timeout));
            }
        };
        let status = response.status();

        if status.is_success() {
            debug!("Request succeeded: {} {} ({})", method, url.path(), status.as_u16());
            return Ok(response);
        }

        let request_id = response
            .headers()
            .get(header::REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                debug!("Failed to read error body: {} {}: {}", method, url.path(), e);
                String::new()
            }
        };
        let err = RequestError::from_response(status.as_u16(), &body, request_id);

        warn!("Request failed: {} {}: {}", method, url.path(), err);
        Err(Error::Request(err))
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("endpoint", &self.endpoint)
            .field("authenticator", &self.authenticator)
            .finish_non_exhaustive()
    }
}
