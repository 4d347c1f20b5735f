//! Single-shot backend probe.

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};

use crate::http::client::{BackendClient, ProxyError};

/// Why a probe failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HealthError {
    #[error("health request failed: {0}")]
    Request(String),

    #[error("health check returned status {0}")]
    Status(u16),

    #[error("health check timed out after {0:?}")]
    Timeout(Duration),
}

impl From<ProxyError> for HealthError {
    fn from(err: ProxyError) -> Self {
        match err {
            ProxyError::Timeout(after) => HealthError::Timeout(after),
            other => HealthError::Request(other.to_string()),
        }
    }
}

/// `GET {base_url}{path}`; healthy only on 200.
pub async fn check_backend(
    client: &BackendClient,
    path: &str,
    timeout: Duration,
) -> Result<(), HealthError> {
    let request = Request::builder()
        .uri(client.uri_for(path, None)?)
        .header(header::USER_AGENT, "htmlnojs-health-check")
        .body(Body::empty())
        .map_err(|e| HealthError::Request(e.to_string()))?;

    let response = client.send_with_timeout(request, timeout).await.map_err(|e| {
        tracing::warn!(backend = %client.base_url(), error = %e, "Health check failed");
        HealthError::from(e)
    })?;

    let status = response.status();
    if status != StatusCode::OK {
        tracing::warn!(backend = %client.base_url(), status = status.as_u16(), "Health check failed: non-200 status");
        return Err(HealthError::Status(status.as_u16()));
    }

    tracing::debug!(backend = %client.base_url(), "Health check passed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeouts_keep_their_duration() {
        let err = HealthError::from(ProxyError::Timeout(Duration::from_secs(2)));
        assert_eq!(err, HealthError::Timeout(Duration::from_secs(2)));
        assert_eq!(HealthError::Status(500).to_string(), "health check returned status 500");
    }
}
