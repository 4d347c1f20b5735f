//! The route registry.
//!
//! # Responsibilities
//! - Build the complete route table once from a discovered file set
//! - Answer lookups by method, source file, auth requirement and name
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Registration order is handler routes (file order, then source order)
//!   followed by page routes (file order)
//! - O(n) scans for every lookup (tables hold hundreds of routes at most)

use std::path::Path;

use crate::discovery::{read_handlers, DiscoveryError, FileSet};
use crate::routing::route::{HttpMethod, RouteEntry, RouteKind};
use crate::routing::{dynamic, static_routes};

/// The complete, read-only route table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteRegistry {
    routes: Vec<RouteEntry>,
}

impl RouteRegistry {
    /// Read every handler file and page in `files` and synthesize the table.
    ///
    /// Any unreadable file aborts the build.
    pub fn build(files: &FileSet) -> Result<Self, DiscoveryError> {
        let mut routes = Vec::new();

        for file in &files.handler_files {
            let handlers = read_handlers(file)?;
            tracing::debug!(
                file = %file.relative.display(),
                handlers = handlers.len(),
                "Extracted handlers"
            );
            routes.extend(handlers.iter().map(|h| dynamic::synthesize(h, file)));
        }

        for page in &files.markup_files {
            routes.push(static_routes::synthesize(page, &files.style_files));
        }

        let registry = Self::from_routes(routes);
        tracing::info!(
            dynamic = registry.count(RouteKind::Dynamic),
            pages = registry.count(RouteKind::Static),
            "Route registry built"
        );
        Ok(registry)
    }

    /// Wrap an already synthesized, ordered route list.
    pub fn from_routes(routes: Vec<RouteEntry>) -> Self {
        for route in &routes {
            tracing::debug!(
                method = %route.method,
                path = %route.url_path,
                name = %route.name,
                auth = route.requires_auth,
                "Registered route"
            );
        }
        Self { routes }
    }

    /// All routes in registration order.
    pub fn routes(&self) -> &[RouteEntry] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Number of routes of the given kind.
    pub fn count(&self, kind: RouteKind) -> usize {
        self.routes.iter().filter(|r| r.kind() == kind).count()
    }

    pub fn by_method(&self, method: HttpMethod) -> Vec<&RouteEntry> {
        self.filter(|r| r.method == method)
    }

    pub fn by_source_file(&self, path: &Path) -> Vec<&RouteEntry> {
        self.filter(|r| r.source_file == path)
    }

    /// Routes whose policy requires an authenticated caller.
    pub fn requiring_auth(&self) -> Vec<&RouteEntry> {
        self.filter(|r| r.requires_auth)
    }

    /// First route with exactly this name.
    pub fn find_by_name(&self, name: &str) -> Option<&RouteEntry> {
        self.routes.iter().find(|r| r.name == name)
    }

    /// Routes whose name contains `pattern`.
    pub fn matching(&self, pattern: &str) -> Vec<&RouteEntry> {
        self.filter(|r| r.name.contains(pattern))
    }

    fn filter(&self, predicate: impl Fn(&RouteEntry) -> bool) -> Vec<&RouteEntry> {
        self.routes.iter().filter(|&r| predicate(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::discovery::collect_files;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn fixture() -> (tempfile::TempDir, FileSet) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(
            root,
            "py_htmx/users.py",
            "def htmx_get_profile(request):\n    return ''\n\n\
             def htmx_delete_account(request):\n    \"\"\"login required\"\"\"\n",
        );
        write(
            root,
            "py_htmx/shop/orders.py",
            "def htmx_create_order(request):\n    \"\"\"Requires auth. @rate_limit(5)\"\"\"\n",
        );
        write(root, "py_htmx/helpers.py", "def helper():\n    pass\n");
        write(root, "templates/index.html", "<html></html>");
        write(root, "templates/dashboard_admin.html", "<html></html>");
        write(root, "css/main.css", "");

        let files = FileSet {
            handler_root: root.join("py_htmx"),
            handler_files: collect_files(&root.join("py_htmx"), "py").unwrap(),
            style_files: collect_files(&root.join("css"), "css").unwrap(),
            markup_files: collect_files(&root.join("templates"), "html").unwrap(),
        };
        (dir, files)
    }

    #[test]
    fn builds_handler_routes_then_pages_in_order() {
        let (_dir, files) = fixture();
        let registry = RouteRegistry::build(&files).unwrap();

        let paths: Vec<_> = registry.routes().iter().map(|r| r.url_path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "/api/shop/orders/create_order",
                "/api/users/get_profile",
                "/api/users/delete_account",
                "/dashboard_admin",
                "/",
            ]
        );
        assert_eq!(registry.count(RouteKind::Dynamic), 3);
        assert_eq!(registry.count(RouteKind::Static), 2);
        assert_eq!(registry.routes()[4].style_files, vec!["main.css"]);
    }

    #[test]
    fn rebuilding_yields_identical_table() {
        let (_dir, files) = fixture();
        assert_eq!(
            RouteRegistry::build(&files).unwrap(),
            RouteRegistry::build(&files).unwrap()
        );
    }

    #[test]
    fn lookups() {
        let (dir, files) = fixture();
        let registry = RouteRegistry::build(&files).unwrap();

        let gets: Vec<_> = registry.by_method(HttpMethod::Get).iter().map(|r| r.name.as_str()).collect();
        assert_eq!(gets, vec!["get_profile", "dashboard_admin", "index"]);
        assert_eq!(registry.by_method(HttpMethod::Put).len(), 0);

        let users = registry.by_source_file(&dir.path().join("py_htmx").join("users.py"));
        assert_eq!(users.len(), 2);

        let auth: Vec<_> = registry.requiring_auth().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(auth, vec!["create_order", "delete_account", "dashboard_admin"]);

        assert_eq!(registry.find_by_name("create_order").unwrap().rate_limit, 5);
        assert!(registry.find_by_name("missing").is_none());
        assert_eq!(registry.matching("o").len(), 4);
    }

    #[test]
    fn unreadable_handler_file_aborts_build() {
        let (dir, files) = fixture();
        fs::remove_file(dir.path().join("py_htmx/users.py")).unwrap();
        let err = RouteRegistry::build(&files).unwrap_err();
        assert!(matches!(err, DiscoveryError::ReadFile { .. }));
    }
}
