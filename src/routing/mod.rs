//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     handler files → extractor → dynamic.rs  (policy.rs) ─┐
//!     markup files + style files → static_routes.rs ───────┤
//!                                                          ▼
//!                                             registry.rs (frozen table)
//!
//! Per request:
//!     axum matches (method, path) → RouteEntry.dispatch
//!     → proxy to backend path | render markup file
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: the same files always produce the same table
//! - First registration wins when (path, method) repeats

pub mod dynamic;
pub mod policy;
pub mod registry;
pub mod route;
pub mod static_routes;

pub use registry::RouteRegistry;
pub use route::{Dispatch, HttpMethod, RouteEntry, RouteKind, RouteMetadata};
