//! [`HttpClient`] over reqwest, for talking to a real registry server.
//!
//! Enabled with the `http` feature.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Result, StoreError};
use crate::remote::{HttpClient, HttpResponse};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

impl From<reqwest::Error> for StoreError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value.to_string())
    }
}

/// A reqwest-backed HTTP client.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    inner: reqwest::Client,
}

impl ReqwestClient {
    /// Build a client with the default timeouts.
    pub fn new() -> Result<Self> {
        Self::with_timeouts(CONNECT_TIMEOUT, REQUEST_TIMEOUT)
    }

    /// Build a client with explicit connect and overall request timeouts.
    pub fn with_timeouts(connect: Duration, request: Duration) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .connect_timeout(connect)
            .timeout(request)
            .user_agent(concat!("grafeo/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { inner })
    }

    /// Wrap an already configured reqwest client.
    pub fn from_client(inner: reqwest::Client) -> Self {
        Self { inner }
    }

    async fn finish(response: reqwest::Response) -> Result<HttpResponse> {
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        Ok(HttpResponse { status, body })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        let response = self
            .inner
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?;
        Self::finish(response).await
    }

    async fn post_json(&self, url: &str, body: Vec<u8>) -> Result<HttpResponse> {
        let response = self
            .inner
            .post(url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .body(body)
            .send()
            .await?;
        Self::finish(response).await
    }
}
