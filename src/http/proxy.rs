//! Proxy dispatcher for handler routes.
//!
//! # Responsibilities
//! - Relay one inbound request to its backend dispatch path
//! - Strip hop-by-hop headers in both directions
//! - Re-encode urlencoded form bodies on POST
//! - Translate transport failures into the 503 fragment
//! - Stream the backend response back without buffering it
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → buffer body (bounded)
//!     → method + base URL + dispatch path + raw query
//!     → headers minus hop-by-hop, form re-encode
//!     → BackendClient::send (timeout)
//!         ├─ Err  → 503 fragment
//!         └─ Ok   → status + headers minus hop-by-hop + streamed body
//!                   (cut off at the same deadline)
//! ```
//!
//! # Design Decisions
//! - Exactly one attempt per request; no retries
//! - Errors after the status line is committed are logged, never re-signaled
//! - The request timeout is measured from dispatch start and covers the
//!   body; a stalled body ends the stream with an error
//! - The dispatch path is fixed when the route is registered

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::{Body, BodyDataStream, Bytes},
    http::{header, request::Parts, HeaderValue, Method, Request, Response},
    BoxError,
};
use futures_util::{stream, StreamExt};
use url::form_urlencoded;

use crate::http::client::{BackendClient, ProxyError};
use crate::http::headers::copy_headers;
use crate::http::response;
use crate::observability::metrics;

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// A handler route bound to its backend path.
#[derive(Clone)]
pub struct ProxyTarget {
    client: BackendClient,
    backend_path: Arc<str>,
    max_body_bytes: usize,
}

impl ProxyTarget {
    pub fn new(client: BackendClient, backend_path: &str, max_body_bytes: usize) -> Self {
        Self {
            client,
            backend_path: Arc::from(backend_path),
            max_body_bytes,
        }
    }

    /// Relay `request` to the backend and return whatever the caller should see.
    pub async fn dispatch(&self, request: Request<Body>) -> Response<Body> {
        let start = Instant::now();
        let method = request.method().clone();
        let path = request.uri().path().to_string();

        let (parts, body) = request.into_parts();
        let body = match axum::body::to_bytes(body, self.max_body_bytes).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(method = %method, path = %path, error = %e, "Failed to read request body");
                return response::bad_request(&format!("Failed to read request body: {}", e));
            }
        };

        let outbound = match self.build_request(&parts, body) {
            Ok(req) => req,
            Err(e) => {
                tracing::error!(method = %method, path = %path, error = %e, "Failed to build backend request");
                return response::internal_error(&e.to_string());
            }
        };
        let target = outbound.uri().to_string();

        tracing::debug!(method = %method, path = %path, url = %target, "Proxying request");

        match self.client.send(outbound).await {
            Ok(backend_response) => {
                let status = backend_response.status();
                metrics::record_proxy_request(method.as_str(), status.as_u16(), start);
                tracing::debug!(
                    method = %method,
                    path = %path,
                    url = %target,
                    status = status.as_u16(),
                    latency_ms = start.elapsed().as_millis() as u64,
                    "Backend responded"
                );
                let timeout = self.client.request_timeout();
                let deadline = tokio::time::Instant::from_std(start) + timeout;
                relay_response(backend_response, target, deadline, timeout)
            }
            Err(e) => {
                metrics::record_backend_unavailable();
                metrics::record_proxy_request(method.as_str(), 503, start);
                tracing::warn!(
                    method = %method,
                    path = %path,
                    url = %target,
                    error = %e,
                    "Backend unavailable"
                );
                response::backend_unavailable(self.client.base_url(), &e.to_string())
            }
        }
    }

    fn build_request(&self, parts: &Parts, body: Bytes) -> Result<Request<Body>, ProxyError> {
        let uri = self.client.uri_for(&self.backend_path, parts.uri.query())?;

        let mut builder = Request::builder().method(parts.method.clone()).uri(uri);
        if let Some(headers) = builder.headers_mut() {
            copy_headers(&parts.headers, headers);
            // The backend sees its own authority, not the gateway's.
            headers.remove(header::HOST);
        }

        let body = if is_form_post(parts) {
            let encoded = reencode_form(&body);
            if let Some(headers) = builder.headers_mut() {
                headers.insert(header::CONTENT_LENGTH, HeaderValue::from(encoded.len()));
            }
            Bytes::from(encoded)
        } else {
            body
        };

        Ok(builder.body(Body::from(body))?)
    }
}

/// POST with a Content-Type of exactly `application/x-www-form-urlencoded`.
fn is_form_post(parts: &Parts) -> bool {
    parts.method == Method::POST
        && parts
            .headers
            .get(header::CONTENT_TYPE)
            .is_some_and(|v| v.as_bytes() == FORM_URLENCODED.as_bytes())
}

/// Parse and re-serialize a urlencoded body. Fields are ordered by key;
/// repeated keys keep their relative order.
pub fn reencode_form(body: &[u8]) -> String {
    let mut pairs: Vec<(String, String)> = form_urlencoded::parse(body).into_owned().collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

fn relay_response(
    backend_response: Response<hyper::body::Incoming>,
    target: String,
    deadline: tokio::time::Instant,
    timeout: Duration,
) -> Response<Body> {
    let (parts, incoming) = backend_response.into_parts();
    let body = bounded_stream(Body::new(incoming).into_data_stream(), target, deadline, timeout);

    let mut relayed = Response::new(Body::from_stream(body));
    *relayed.status_mut() = parts.status;
    copy_headers(&parts.headers, relayed.headers_mut());
    relayed
}

struct Relay {
    inner: BodyDataStream,
    target: String,
    deadline: tokio::time::Instant,
    timeout: Duration,
    done: bool,
}

/// Forward body frames until `deadline`, then end the stream with an error.
fn bounded_stream(
    inner: BodyDataStream,
    target: String,
    deadline: tokio::time::Instant,
    timeout: Duration,
) -> impl futures_util::Stream<Item = Result<Bytes, BoxError>> + Send + 'static {
    let relay = Relay {
        inner,
        target,
        deadline,
        timeout,
        done: false,
    };

    stream::unfold(relay, |mut relay| async move {
        if relay.done {
            return None;
        }
        match tokio::time::timeout_at(relay.deadline, relay.inner.next()).await {
            Ok(Some(Ok(chunk))) => Some((Ok(chunk), relay)),
            Ok(Some(Err(e))) => {
                tracing::error!(url = %relay.target, error = %e, "Response body stream failed");
                relay.done = true;
                Some((Err(BoxError::from(e)), relay))
            }
            Ok(None) => None,
            Err(_) => {
                metrics::record_backend_unavailable();
                tracing::warn!(
                    url = %relay.target,
                    timeout_ms = relay.timeout.as_millis() as u64,
                    "Response body exceeded request timeout"
                );
                relay.done = true;
                let err = ProxyError::Timeout(relay.timeout);
                Some((Err(BoxError::from(err)), relay))
            }
        }
    })
}
