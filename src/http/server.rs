//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Turn the route registry into an Axum router
//! - Serve introspection (`/_routes`), liveness (`/health`) and style sheets
//! - Wire up middleware (tracing, request ID, timeout, body limit)
//! - Run until the shutdown signal fires
//!
//! # Design Decisions
//! - Registry order is registration order; a repeated (path, method) keeps
//!   the first entry and logs the rest
//! - Routes sharing a path share one method router, so a wrong method is 405
//! - Unknown paths get an HTML fragment, not an empty 404
//! - The server-wide timeout sits above the backend timeout so a slow
//!   backend surfaces as 503, not 408

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, Uri},
    response::{IntoResponse, Response},
    routing::{get, on, MethodFilter, MethodRouter},
    Json, Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::health::check_backend;
use crate::http::client::BackendClient;
use crate::http::pages::{PageTarget, STYLE_MOUNT};
use crate::http::proxy::ProxyTarget;
use crate::http::response::{self, BackendStatus, HealthReport, RouteListing};
use crate::observability::metrics;
use crate::routing::{Dispatch, HttpMethod, RouteKind, RouteRegistry};

/// Gateway-owned paths that synthesized routes may not shadow.
const RESERVED_PATHS: [&str; 3] = ["/_routes", "/health", STYLE_MOUNT];

/// Added on top of the backend timeout for the whole-request deadline.
const SERVER_TIMEOUT_GRACE: Duration = Duration::from_secs(5);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<RouteRegistry>,
    pub client: BackendClient,
    pub health_path: String,
    pub health_timeout: Duration,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create the server for an already built registry.
    pub fn new(config: GatewayConfig, registry: RouteRegistry) -> Result<Self, url::ParseError> {
        let client = BackendClient::new(&config.backend, &config.timeouts)?;

        metrics::set_routes_registered("dynamic", registry.count(RouteKind::Dynamic));
        metrics::set_routes_registered("static", registry.count(RouteKind::Static));

        let state = AppState {
            registry: Arc::new(registry),
            client,
            health_path: config.backend.health_path.clone(),
            health_timeout: Duration::from_secs(config.timeouts.health_secs),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let mut router = Router::new();
        for (path, method_router) in route_table(&state, config.limits.max_body_bytes) {
            router = router.route(&path, method_router);
        }

        let request_timeout = Duration::from_secs(config.timeouts.request_secs) + SERVER_TIMEOUT_GRACE;

        router
            .route("/_routes", get(list_routes))
            .route("/health", get(health))
            .nest_service(STYLE_MOUNT, ServeDir::new(config.styles_path()))
            .fallback(not_found)
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_bytes))
            .layer(TimeoutLayer::new(request_timeout))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The assembled router, for embedding or in-process testing.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            backend = %self.config.backend.base_url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// One method router per distinct path, in registry order.
fn route_table(state: &AppState, max_body_bytes: usize) -> Vec<(String, MethodRouter<AppState>)> {
    let mut table: Vec<(String, MethodRouter<AppState>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut seen: HashSet<(String, HttpMethod)> = HashSet::new();

    for route in state.registry.routes() {
        if !is_registrable(&route.url_path) {
            tracing::warn!(
                path = %route.url_path,
                source = %route.source_file.display(),
                "Skipping route with reserved or unsupported path"
            );
            continue;
        }
        if !seen.insert((route.url_path.clone(), route.method)) {
            tracing::warn!(
                method = %route.method,
                path = %route.url_path,
                source = %route.source_file.display(),
                "Duplicate route ignored; first registration wins"
            );
            continue;
        }

        let filter = method_filter(route.method);
        let method_router: MethodRouter<AppState> = match &route.dispatch {
            Dispatch::Proxy { backend_path } => {
                let target = ProxyTarget::new(state.client.clone(), backend_path, max_body_bytes);
                on(filter, move |request: Request<Body>| {
                    let target = target.clone();
                    async move { target.dispatch(request).await }
                })
            }
            Dispatch::Static { file } => {
                let page = PageTarget::new(file.clone(), &route.style_files);
                on(filter, move || {
                    let page = page.clone();
                    async move { page.render().await }
                })
            }
        };

        match index.get(&route.url_path) {
            Some(&at) => {
                let (path, existing) = table.remove(at);
                table.insert(at, (path, existing.merge(method_router)));
            }
            None => {
                index.insert(route.url_path.clone(), table.len());
                table.push((route.url_path.clone(), method_router));
            }
        }
    }

    table
}

fn method_filter(method: HttpMethod) -> MethodFilter {
    match method {
        HttpMethod::Get => MethodFilter::GET,
        HttpMethod::Post => MethodFilter::POST,
        HttpMethod::Put => MethodFilter::PUT,
        HttpMethod::Delete => MethodFilter::DELETE,
    }
}

/// Paths Axum accepts literally and that do not collide with gateway routes.
fn is_registrable(path: &str) -> bool {
    if RESERVED_PATHS.contains(&path) || path.starts_with("/css/") {
        return false;
    }
    !path.contains(['{', '}'])
        && path
            .split('/')
            .all(|segment| !segment.starts_with(':') && !segment.starts_with('*'))
}

async fn list_routes(State(state): State<AppState>) -> Json<RouteListing> {
    Json(RouteListing::from_registry(&state.registry))
}

async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    let result = check_backend(&state.client, &state.health_path, state.health_timeout).await;
    metrics::set_backend_health(result.is_ok());

    Json(HealthReport {
        status: "ok",
        routes: state.registry.len(),
        backend: BackendStatus {
            url: state.client.base_url().to_string(),
            healthy: result.is_ok(),
            error: result.err().map(|e| e.to_string()),
        },
    })
}

async fn not_found(uri: Uri) -> Response {
    response::not_found(uri.path()).into_response()
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use axum::http::StatusCode;
    use tower::ServiceExt;

    use super::*;
    use crate::routing::{RouteEntry, RouteMetadata};

    fn page(name: &str, url_path: &str, file: &Path) -> RouteEntry {
        RouteEntry {
            name: name.into(),
            source_file: file.to_path_buf(),
            url_path: url_path.into(),
            method: HttpMethod::Get,
            requires_auth: false,
            rate_limit: 0,
            cache_timeout_secs: 0,
            documentation: String::new(),
            style_files: Vec::new(),
            dispatch: Dispatch::Static {
                file: PathBuf::from(file),
            },
            metadata: RouteMetadata::Page {
                admin_required: false,
                is_api: false,
            },
        }
    }

    async fn get(router: Router, uri: &str) -> (StatusCode, String) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn first_registration_wins_and_reserved_paths_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("about.html");
        let second = dir.path().join("nested_about.html");
        let health_page = dir.path().join("health.html");
        std::fs::write(&first, "first").unwrap();
        std::fs::write(&second, "second").unwrap();
        std::fs::write(&health_page, "page").unwrap();

        let registry = RouteRegistry::from_routes(vec![
            page("about", "/about", &first),
            page("about", "/about", &second),
            page("health", "/health", &health_page),
        ]);
        let mut config = GatewayConfig::default();
        config.project.root = dir.path().to_path_buf();
        let router = HttpServer::new(config, registry).unwrap().into_router();

        assert_eq!(get(router.clone(), "/about").await, (StatusCode::OK, "first".into()));

        let (status, body) = get(router.clone(), "/_routes").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("\"total\":3"));

        let (status, body) = get(router, "/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("/missing"));
    }

    #[test]
    fn reserved_and_pattern_paths_are_rejected() {
        assert!(is_registrable("/"));
        assert!(is_registrable("/api/users/get_profile"));
        assert!(is_registrable("/dashboard_admin"));
        assert!(!is_registrable("/health"));
        assert!(!is_registrable("/_routes"));
        assert!(!is_registrable("/css"));
        assert!(!is_registrable("/css/main.css"));
        assert!(!is_registrable("/{id}"));
        assert!(!is_registrable("/:id"));
        assert!(!is_registrable("/api/*rest"));
    }
}
