//! Shared backend client.
//!
//! # Responsibilities
//! - Resolve the backend base URL once, before the first request
//! - Own the single pooled connection pool used by every proxied request
//! - Bound every backend call with a timeout
//!
//! # Design Decisions
//! - One client for the whole process; cloning shares the pool
//! - Connect timeout lives on the connector, request timeout on the call
//! - No retries: a failed attempt is reported to the caller as-is

use std::error::Error as StdError;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response, Uri};
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::{TokioExecutor, TokioTimer},
};
use url::Url;

use crate::config::{BackendConfig, TimeoutConfig};

/// Errors from a single backend call.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("invalid backend request: {0}")]
    Build(#[from] axum::http::Error),

    #[error("{}", error_chain(.0))]
    Transport(#[from] hyper_util::client::legacy::Error),

    #[error("backend did not respond within {0:?}")]
    Timeout(Duration),
}

/// Render an error and its sources as `outer: inner: root`.
fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Pooled HTTP client bound to one backend base URL.
#[derive(Clone)]
pub struct BackendClient {
    client: Client<HttpConnector, Body>,
    base_url: String,
    request_timeout: Duration,
}

impl BackendClient {
    /// Build the client. Fails if the base URL does not parse.
    pub fn new(backend: &BackendConfig, timeouts: &TimeoutConfig) -> Result<Self, url::ParseError> {
        let parsed = Url::parse(&backend.base_url)?;
        let base_url = parsed.as_str().trim_end_matches('/').to_string();

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));

        let client = Client::builder(TokioExecutor::new())
            .pool_timer(TokioTimer::new())
            .pool_idle_timeout(Duration::from_secs(timeouts.pool_idle_secs))
            .pool_max_idle_per_host(timeouts.pool_max_idle)
            .build(connector);

        tracing::debug!(
            base_url = %base_url,
            pool_max_idle = timeouts.pool_max_idle,
            request_timeout_secs = timeouts.request_secs,
            "Backend client ready"
        );

        Ok(Self {
            client,
            base_url,
            request_timeout: Duration::from_secs(timeouts.request_secs),
        })
    }

    /// The resolved base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Budget for one backend call, response body included.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Absolute backend URL for `path`, carrying `query` verbatim.
    pub fn url_for(&self, path: &str, query: Option<&str>) -> String {
        match query {
            Some(q) if !q.is_empty() => format!("{}{}?{}", self.base_url, path, q),
            _ => format!("{}{}", self.base_url, path),
        }
    }

    /// Parse a target produced by [`url_for`](Self::url_for).
    pub fn uri_for(&self, path: &str, query: Option<&str>) -> Result<Uri, ProxyError> {
        self.url_for(path, query)
            .parse::<Uri>()
            .map_err(|e| ProxyError::Build(e.into()))
    }

    /// Send with the configured per-request timeout.
    pub async fn send(&self, request: Request<Body>) -> Result<Response<Incoming>, ProxyError> {
        self.send_with_timeout(request, self.request_timeout).await
    }

    pub async fn send_with_timeout(
        &self,
        request: Request<Body>,
        timeout: Duration,
    ) -> Result<Response<Incoming>, ProxyError> {
        match tokio::time::timeout(timeout, self.client.request(request)).await {
            Ok(result) => result.map_err(ProxyError::from),
            Err(_) => Err(ProxyError::Timeout(timeout)),
        }
    }
}
