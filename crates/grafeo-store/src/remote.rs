//! Remote store speaking the registry's HTTP/JSON contract.
//!
//! The wire itself sits behind [`HttpClient`], so any HTTP stack can be
//! plugged in. The contract is:
//!
//! - `GET <base>/producer/<public_key>` / `GET <base>/product/<public_key>`
//!   answer with the flat JSON projection of the record.
//! - `POST <base>/producer/` / `POST <base>/product/` accept the same
//!   projection as the request body.
//!
//! Records are checked against [`RemoteConfig::protocol`] on both sides of
//! the wire. An invalid record is refused with [`StoreError::InvalidRecord`]
//! before anything is sent, and a GET whose record does not decode or does
//! not validate is "not found", as is one that fails at the HTTP level. A POST
//! answered with a non-2xx status is [`StoreError::Rejected`]. Transport
//! failures propagate as [`StoreError::Transport`].

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use grafeo_core::{check_public_key, Producer, Product, ProtocolConfig, Record, RecordKind};

use crate::error::{Result, StoreError};
use crate::traits::{InsertResult, Store};

/// A minimal HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Raw response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The HTTP operations a [`RemoteStore`] needs.
///
/// Implementations must be thread-safe (Send + Sync). Errors are for
/// failures to complete the exchange at all; HTTP error statuses come back
/// as ordinary responses.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Issue a GET to `url`.
    async fn get(&self, url: &str) -> Result<HttpResponse>;

    /// POST `body` as `application/json` to `url`.
    async fn post_json(&self, url: &str, body: Vec<u8>) -> Result<HttpResponse>;
}

/// Where the remote registry lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    /// Base URL, including any API prefix. A trailing `/` is ignored.
    pub base_url: String,
    /// Version records must carry to be sent or accepted.
    pub protocol: ProtocolConfig,
}

impl RemoteConfig {
    /// Create a config for `base_url` at the current protocol version.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            protocol: ProtocolConfig::default(),
        }
    }

    /// Check records against `protocol` instead.
    pub fn with_protocol(mut self, protocol: ProtocolConfig) -> Self {
        self.protocol = protocol;
        self
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self::new("http://localhost:8000/api")
    }
}

/// Store backed by a remote registry.
///
/// Inserts are forwarded as POSTs; the remote side decides about duplicates,
/// so a successful POST always reports [`InsertResult::Inserted`].
pub struct RemoteStore<C> {
    config: RemoteConfig,
    client: C,
}

impl<C: HttpClient> RemoteStore<C> {
    /// Create a remote store using `client` for the wire.
    pub fn new(config: RemoteConfig, client: C) -> Self {
        let config = RemoteConfig::new(config.base_url).with_protocol(config.protocol);
        Self { config, client }
    }

    /// The normalized base URL.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// The underlying client.
    pub fn client(&self) -> &C {
        &self.client
    }

    fn record_url(&self, kind: RecordKind, public_key: &str) -> String {
        format!("{}/{}/{}", self.config.base_url, kind, public_key)
    }

    fn collection_url(&self, kind: RecordKind) -> String {
        format!("{}/{}/", self.config.base_url, kind)
    }

    async fn fetch<T: DeserializeOwned + Record>(
        &self,
        kind: RecordKind,
        public_key: &str,
    ) -> Result<Option<T>> {
        if !check_public_key(public_key) {
            return Ok(None);
        }

        let url = self.record_url(kind, public_key);
        let response = self.client.get(&url).await?;
        if !response.is_success() {
            tracing::debug!(%url, status = response.status, "remote lookup missed");
            return Ok(None);
        }

        let record: T = match serde_json::from_slice(&response.body) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(%url, error = %e, "undecodable record from remote store");
                return Ok(None);
            }
        };

        match record.check(&self.config.protocol) {
            Ok(()) => Ok(Some(record)),
            Err(reason) => {
                tracing::warn!(%url, %reason, "invalid record from remote store");
                Ok(None)
            }
        }
    }

    async fn submit<T: Serialize + Record>(&self, record: &T) -> Result<InsertResult> {
        let kind = record.kind();
        record
            .check(&self.config.protocol)
            .map_err(|reason| StoreError::InvalidRecord { kind, reason })?;

        let url = self.collection_url(kind);
        let body = serde_json::to_vec(record)?;
        let response = self.client.post_json(&url, body).await?;
        if !response.is_success() {
            return Err(StoreError::Rejected {
                status: response.status,
            });
        }
        tracing::debug!(%url, status = response.status, "posted record");
        Ok(InsertResult::Inserted)
    }
}

#[async_trait]
impl<C: HttpClient> Store for RemoteStore<C> {
    async fn insert_producer(&self, producer: &Producer) -> Result<InsertResult> {
        self.submit(producer).await
    }

    async fn insert_product(&self, product: &Product) -> Result<InsertResult> {
        self.submit(product).await
    }

    async fn get_producer(&self, public_key: &str) -> Result<Option<Producer>> {
        self.fetch(RecordKind::Producer, public_key).await
    }

    async fn get_product(&self, public_key: &str) -> Result<Option<Product>> {
        self.fetch(RecordKind::Product, public_key).await
    }
}

/// An in-process registry server for testing.
///
/// Holds raw JSON bodies keyed by URL, so tests can plant arbitrary
/// (including malformed or tampered) responses.
pub mod memory {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// A request the server received.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Request {
        /// A GET to the URL.
        Get(String),
        /// A POST to the URL with the body.
        Post(String, Vec<u8>),
    }

    /// Shared server state.
    #[derive(Default)]
    pub struct MemoryServer {
        bodies: RwLock<HashMap<String, Vec<u8>>>,
        log: RwLock<Vec<Request>>,
        reject_posts: AtomicBool,
        offline: AtomicBool,
    }

    impl MemoryServer {
        /// Create a new empty server.
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        /// Create a client connected to this server.
        pub fn client(self: &Arc<Self>) -> MemoryClient {
            MemoryClient {
                server: Arc::clone(self),
            }
        }

        /// Serve `body` for GETs of `url`.
        pub async fn plant(&self, url: impl Into<String>, body: impl Into<Vec<u8>>) {
            self.bodies.write().await.insert(url.into(), body.into());
        }

        /// Answer every POST with 400.
        pub fn set_reject_posts(&self, reject: bool) {
            self.reject_posts.store(reject, Ordering::SeqCst);
        }

        /// Fail every request at the transport level.
        pub fn set_offline(&self, offline: bool) {
            self.offline.store(offline, Ordering::SeqCst);
        }

        /// Every request received so far.
        pub async fn requests(&self) -> Vec<Request> {
            self.log.read().await.clone()
        }

        /// Number of POSTs received so far.
        pub async fn post_count(&self) -> usize {
            self.log
                .read()
                .await
                .iter()
                .filter(|r| matches!(r, Request::Post(..)))
                .count()
        }

        fn check_online(&self) -> Result<()> {
            if self.offline.load(Ordering::SeqCst) {
                return Err(StoreError::Transport("connection refused".into()));
            }
            Ok(())
        }
    }

    /// Client half of a [`MemoryServer`].
    #[derive(Clone)]
    pub struct MemoryClient {
        server: Arc<MemoryServer>,
    }

    #[async_trait]
    impl HttpClient for MemoryClient {
        async fn get(&self, url: &str) -> Result<HttpResponse> {
            self.server.check_online()?;
            self.server.log.write().await.push(Request::Get(url.to_string()));

            let response = match self.server.bodies.read().await.get(url) {
                Some(body) => HttpResponse {
                    status: 200,
                    body: body.clone(),
                },
                None => HttpResponse {
                    status: 404,
                    body: Vec::new(),
                },
            };
            Ok(response)
        }

        async fn post_json(&self, url: &str, body: Vec<u8>) -> Result<HttpResponse> {
            self.server.check_online()?;
            self.server
                .log
                .write()
                .await
                .push(Request::Post(url.to_string(), body.clone()));

            if self.server.reject_posts.load(Ordering::SeqCst) {
                return Ok(HttpResponse {
                    status: 400,
                    body: Vec::new(),
                });
            }

            // Posted records become readable at `<collection><public_key>`.
            let key = serde_json::from_slice::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("public_key").and_then(|k| k.as_str()).map(str::to_string));
            match key {
                Some(key) => {
                    self.server
                        .bodies
                        .write()
                        .await
                        .insert(format!("{}{}", url, key), body);
                    Ok(HttpResponse {
                        status: 201,
                        body: Vec::new(),
                    })
                }
                None => Ok(HttpResponse {
                    status: 422,
                    body: Vec::new(),
                }),
            }
        }
    }
}
