//! Route table entries.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use axum::http::Method;
use serde::Serialize;

/// HTTP methods a synthesized route can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    pub fn to_http(self) -> Method {
        match self {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unsupported method name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported HTTP method: {0}")]
pub struct UnknownMethod(pub String);

impl FromStr for HttpMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            _ => Err(UnknownMethod(s.to_string())),
        }
    }
}

/// What serving a route means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Relay to the backend at this path (never exposed to callers).
    Proxy { backend_path: String },
    /// Render this markup file.
    Static { file: PathBuf },
}

/// Coarse route classification used for counts and introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteKind {
    Dynamic,
    Static,
}

/// Source-specific details kept alongside a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RouteMetadata {
    Handler {
        /// Handler name as declared, prefix included.
        function: String,
        /// Handler file path relative to the handler root, extension removed.
        base_path: String,
        parameters: Vec<String>,
        return_annotation: Option<String>,
        line: usize,
    },
    Page {
        admin_required: bool,
        /// Page name starts with `api_`.
        is_api: bool,
    },
}

/// One entry of the route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    /// Handler name without its prefix, or the page name.
    pub name: String,
    pub source_file: PathBuf,
    pub url_path: String,
    pub method: HttpMethod,
    pub requires_auth: bool,
    /// Requests allowed per interval; 0 means unlimited.
    pub rate_limit: u32,
    /// Cache hint in seconds; 0 means no caching directive.
    pub cache_timeout_secs: u32,
    pub documentation: String,
    /// Style sheets (relative to the style root, `/`-separated) linked
    /// into a page. May contain duplicates.
    pub style_files: Vec<String>,
    pub dispatch: Dispatch,
    pub metadata: RouteMetadata,
}

impl RouteEntry {
    pub fn kind(&self) -> RouteKind {
        match self.dispatch {
            Dispatch::Proxy { .. } => RouteKind::Dynamic,
            Dispatch::Static { .. } => RouteKind::Static,
        }
    }

    pub fn requires_admin(&self) -> bool {
        matches!(
            self.metadata,
            RouteMetadata::Page {
                admin_required: true,
                ..
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_round_trips_through_text() {
        for method in [HttpMethod::Get, HttpMethod::Post, HttpMethod::Put, HttpMethod::Delete] {
            assert_eq!(method.as_str().parse::<HttpMethod>(), Ok(method));
            assert_eq!(method.to_http().as_str(), method.as_str());
        }
        assert_eq!("delete".parse::<HttpMethod>(), Ok(HttpMethod::Delete));
        assert!("PATCH".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn method_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&HttpMethod::Put).unwrap(), "\"PUT\"");
    }
}
