//! Responses produced by the gateway itself.
//!
//! # Responsibilities
//! - HTML fragments for every gateway-originated failure (503, 404, 500, 400)
//! - JSON payloads for the introspection and health endpoints
//!
//! # Design Decisions
//! - User-visible failures are HTML fragments so they can be swapped into
//!   a page like any handler output
//! - The 503 fragment names the backend URL and the transport error; nothing
//!   else about the failure leaks
//! - Introspection never exposes backend dispatch paths

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::routing::{RouteEntry, RouteKind, RouteMetadata, RouteRegistry};
use crate::routing::route::HttpMethod;

/// Escape text for inclusion in HTML element content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn fragment(status: StatusCode, title: &str, lines: &[String]) -> Response {
    let mut body = format!(
        "<div class=\"htmx-error\" style=\"color: red; padding: 10px; border: 1px solid red;\">\
         <strong>{}</strong>",
        escape_html(title)
    );
    for line in lines {
        body.push_str("<br>");
        body.push_str(line);
    }
    body.push_str("</div>");

    (
        status,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        body,
    )
        .into_response()
}

/// 503: the backend could not be reached or did not answer in time.
pub fn backend_unavailable(base_url: &str, error: &str) -> Response {
    fragment(
        StatusCode::SERVICE_UNAVAILABLE,
        "Service Unavailable",
        &[
            format!("The handler server is not running on {}", escape_html(base_url)),
            format!("<small>Error: {}</small>", escape_html(error)),
        ],
    )
}

/// 404: no route for this path.
pub fn not_found(path: &str) -> Response {
    fragment(
        StatusCode::NOT_FOUND,
        "Not Found",
        &[format!("No route matches {}", escape_html(path))],
    )
}

/// 500: the gateway failed while producing a response.
pub fn internal_error(message: &str) -> Response {
    fragment(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal Server Error",
        &[escape_html(message)],
    )
}

/// 400: the inbound request could not be read.
pub fn bad_request(message: &str) -> Response {
    fragment(StatusCode::BAD_REQUEST, "Bad Request", &[escape_html(message)])
}

/// Public view of one route.
#[derive(Debug, Clone, Serialize)]
pub struct RouteSummary {
    pub name: String,
    pub method: HttpMethod,
    pub path: String,
    pub kind: RouteKind,
    pub source_file: String,
    pub requires_auth: bool,
    pub rate_limit: u32,
    pub cache_timeout_secs: u32,
    pub documentation: String,
    pub style_files: Vec<String>,
    pub metadata: RouteMetadata,
}

impl From<&RouteEntry> for RouteSummary {
    fn from(route: &RouteEntry) -> Self {
        Self {
            name: route.name.clone(),
            method: route.method,
            path: route.url_path.clone(),
            kind: route.kind(),
            source_file: route.source_file.display().to_string(),
            requires_auth: route.requires_auth,
            rate_limit: route.rate_limit,
            cache_timeout_secs: route.cache_timeout_secs,
            documentation: route.documentation.clone(),
            style_files: route.style_files.clone(),
            metadata: route.metadata.clone(),
        }
    }
}

/// Payload of `GET /_routes`.
#[derive(Debug, Clone, Serialize)]
pub struct RouteListing {
    pub total: usize,
    pub dynamic: usize,
    #[serde(rename = "static")]
    pub pages: usize,
    pub routes: Vec<RouteSummary>,
}

impl RouteListing {
    pub fn from_registry(registry: &RouteRegistry) -> Self {
        Self {
            total: registry.len(),
            dynamic: registry.count(RouteKind::Dynamic),
            pages: registry.count(RouteKind::Static),
            routes: registry.routes().iter().map(RouteSummary::from).collect(),
        }
    }
}

/// Backend section of the health payload.
#[derive(Debug, Clone, Serialize)]
pub struct BackendStatus {
    pub url: String,
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Payload of `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub routes: usize,
    pub backend: BackendStatus,
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::routing::Dispatch;

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn unavailable_fragment_names_backend_and_error() {
        let response = backend_unavailable("http://127.0.0.1:8081", "connection refused <os error 111>");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/html; charset=utf-8"
        );

        let body = body_text(response).await;
        assert!(body.contains("http://127.0.0.1:8081"));
        assert!(body.contains("connection refused &lt;os error 111&gt;"));
        assert!(body.starts_with("<div class=\"htmx-error\""));
    }

    #[tokio::test]
    async fn not_found_escapes_path() {
        let response = not_found("/<script>");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_text(response).await.contains("/&lt;script&gt;"));
    }

    #[test]
    fn listing_hides_dispatch_path() {
        let route = RouteEntry {
            name: "profile".into(),
            source_file: PathBuf::from("py_htmx/users.py"),
            url_path: "/api/users/profile".into(),
            method: HttpMethod::Get,
            requires_auth: false,
            rate_limit: 0,
            cache_timeout_secs: 0,
            documentation: String::new(),
            style_files: Vec::new(),
            dispatch: Dispatch::Proxy {
                backend_path: "/users/profile".into(),
            },
            metadata: RouteMetadata::Handler {
                function: "htmx_get_profile".into(),
                base_path: "users".into(),
                parameters: vec!["request".into()],
                return_annotation: None,
                line: 1,
            },
        };
        let listing = RouteListing::from_registry(&RouteRegistry::from_routes(vec![route]));
        let json = serde_json::to_value(&listing).unwrap();

        assert_eq!(json["total"], 1);
        assert_eq!(json["dynamic"], 1);
        assert_eq!(json["static"], 0);
        assert_eq!(json["routes"][0]["method"], "GET");
        assert_eq!(json["routes"][0]["kind"], "dynamic");
        assert_eq!(json["routes"][0]["metadata"]["type"], "handler");
        assert_eq!(json["routes"][0]["metadata"]["function"], "htmx_get_profile");
        assert!(!json.to_string().contains("\"/users/profile\""));
    }

    #[test]
    fn health_report_omits_missing_error() {
        let report = HealthReport {
            status: "ok",
            routes: 3,
            backend: BackendStatus {
                url: "http://127.0.0.1:8081".into(),
                healthy: true,
                error: None,
            },
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["backend"]["healthy"], true);
        assert!(json["backend"].get("error").is_none());
    }
}
