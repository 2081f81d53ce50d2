//! HTTP transport used by the client.
//!
//! The client only needs three things from the network: a GET, a form
//! POST, and a look into the cookie jar. They sit behind a trait so the
//! facade can be driven by an in-memory transport in tests.

use crate::config::ClientConfig;
use crate::error::ClientError;
use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Status, final URL (after redirects) and body of a response.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub url: Url,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Maps 429 to [`ClientError::RateLimited`] and any other non-2xx status
    /// to [`ClientError::Transport`].
    pub fn check_status(self) -> Result<Self, ClientError> {
        match self.status {
            200..=299 => Ok(self),
            429 => {
                tracing::warn!(url = %self.url, "rate limited by site");
                Err(ClientError::RateLimited(self.url.to_string()))
            }
            status => Err(ClientError::Transport {
                status,
                url: self.url.to_string(),
            }),
        }
    }
}

/// Network capability the client is built on.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issues a GET and follows redirects.
    async fn get(&self, url: &Url) -> Result<RawResponse, ClientError>;

    /// POSTs an already percent-encoded form body.
    async fn post_form(&self, url: &Url, body: String) -> Result<RawResponse, ClientError>;

    /// Returns the value of cookie `name` that would be sent to `url`.
    fn cookie(&self, url: &Url, name: &str) -> Option<String>;
}

/// [`Transport`] backed by a reqwest client with a cookie jar.
pub struct HttpTransport {
    client: reqwest::Client,
    jar: Arc<Jar>,
}

impl HttpTransport {
    /// Builds the transport from client settings.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let jar = Arc::new(Jar::default());
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .cookie_provider(jar.clone())
            .timeout(Duration::from_secs(config.timeout_sec))
            .build()?;

        Ok(Self { client, jar })
    }

    async fn into_raw(response: reqwest::Response) -> Result<RawResponse, ClientError> {
        let status = response.status().as_u16();
        let url = response.url().clone();
        let body = response.bytes().await?.to_vec();
        Ok(RawResponse { status, url, body })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<RawResponse, ClientError> {
        tracing::debug!(%url, "GET");
        let response = self.client.get(url.clone()).send().await?;
        Self::into_raw(response).await
    }

    async fn post_form(&self, url: &Url, body: String) -> Result<RawResponse, ClientError> {
        tracing::debug!(%url, "POST");
        let response = self
            .client
            .post(url.clone())
            .header(
                CONTENT_TYPE,
                HeaderValue::from_static("application/x-www-form-urlencoded"),
            )
            .body(body)
            .send()
            .await?;
        Self::into_raw(response).await
    }

    fn cookie(&self, url: &Url, name: &str) -> Option<String> {
        let header = self.jar.cookies(url)?;
        find_cookie(header.to_str().ok()?, name)
    }
}

/// Picks one cookie out of a `Cookie:` header value.
fn find_cookie(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}
