//! Route synthesis for backend handlers.
//!
//! # Responsibilities
//! - Turn a handler descriptor and its file location into a route entry
//! - Compute the public `/api/...` path and the backend dispatch path
//! - Apply method inference and documentation policies
//!
//! # Design Decisions
//! - Pure function of (descriptor, relative path): no I/O, no clock
//! - The dispatch path is computed here once, never per request

use std::path::{Component, Path};

use crate::discovery::{DiscoveredFile, HandlerDescriptor, HANDLER_PREFIX};
use crate::routing::policy;
use crate::routing::route::{Dispatch, RouteEntry, RouteMetadata};

/// Public prefix of every dynamic route.
pub const API_PREFIX: &str = "/api";

/// Relative handler file path with its extension removed and `/` separators.
pub fn base_path(relative: &Path) -> String {
    let without_ext = relative.with_extension("");
    without_ext
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Handler name with the naming-convention prefix removed.
pub fn route_name(handler_name: &str) -> &str {
    handler_name
        .strip_prefix(HANDLER_PREFIX)
        .unwrap_or(handler_name)
}

/// Backend dispatch path: `/<route>` or `/<base>/<route>`.
pub fn backend_path(base_path: &str, route_name: &str) -> String {
    if base_path.is_empty() || base_path == "." {
        format!("/{}", route_name)
    } else {
        format!("/{}/{}", base_path, route_name)
    }
}

/// Public URL path: the dispatch path under [`API_PREFIX`].
pub fn url_path(base_path: &str, route_name: &str) -> String {
    format!("{}{}", API_PREFIX, backend_path(base_path, route_name))
}

/// Build the route entry for one handler declared in `file`.
pub fn synthesize(descriptor: &HandlerDescriptor, file: &DiscoveredFile) -> RouteEntry {
    let base = base_path(&file.relative);
    let name = route_name(&descriptor.name);
    let doc = &descriptor.documentation;

    RouteEntry {
        name: name.to_string(),
        source_file: file.path.clone(),
        url_path: url_path(&base, name),
        method: policy::infer_method(&descriptor.name),
        requires_auth: policy::requires_auth(doc),
        rate_limit: policy::rate_limit(doc),
        cache_timeout_secs: policy::cache_timeout(doc),
        documentation: doc.clone(),
        style_files: Vec::new(),
        dispatch: Dispatch::Proxy {
            backend_path: backend_path(&base, name),
        },
        metadata: RouteMetadata::Handler {
            function: descriptor.name.clone(),
            base_path: base,
            parameters: descriptor.parameters.clone(),
            return_annotation: descriptor.return_annotation.clone(),
            line: descriptor.line,
        },
    }
}
