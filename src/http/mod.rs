//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace, timeout, body limit)
//!     → route matched by (method, path)
//!         ├─ handler route → proxy.rs → client.rs → backend
//!         │                   (headers.rs filters both directions)
//!         └─ page route    → pages.rs (read markup, link styles)
//!     → response.rs (fragments for gateway-originated failures)
//!     → Send to client
//! ```

pub mod client;
pub mod headers;
pub mod pages;
pub mod proxy;
pub mod response;
pub mod server;

pub use client::{BackendClient, ProxyError};
pub use server::HttpServer;
