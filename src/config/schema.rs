//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files, and
//! every section is defaulted so an empty file is a valid configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Project directory layout and file extensions.
    pub project: ProjectConfig,

    /// Backend handler service location.
    pub backend: BackendConfig,

    /// Timeout and connection pool configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Where the project's handler, style and markup files live.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Project root; the other directories are resolved against it.
    pub root: PathBuf,

    /// Handler source directory, scanned recursively.
    pub handlers_dir: PathBuf,

    /// Style sheet directory.
    pub styles_dir: PathBuf,

    /// Markup page directory.
    pub templates_dir: PathBuf,

    /// Extension of handler source files (without the dot).
    pub handler_extension: String,

    /// Extension of markup files.
    pub markup_extension: String,

    /// Extension of style files.
    pub style_extension: String,

    /// Create missing project directories at startup.
    pub create_missing: bool,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            handlers_dir: PathBuf::from("py_htmx"),
            styles_dir: PathBuf::from("css"),
            templates_dir: PathBuf::from("templates"),
            handler_extension: "py".to_string(),
            markup_extension: "html".to_string(),
            style_extension: "css".to_string(),
            create_missing: false,
        }
    }
}

/// Backend handler service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the backend (e.g., "http://127.0.0.1:8081").
    pub base_url: String,

    /// Path probed by the health prober.
    pub health_path: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8081".to_string(),
            health_path: "/health".to_string(),
        }
    }
}

/// Timeout configuration for backend traffic.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total time allowed for one proxied request, in seconds.
    pub request_secs: u64,

    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// How long an idle pooled connection is kept, in seconds.
    pub pool_idle_secs: u64,

    /// Maximum idle pooled connections kept per backend host.
    pub pool_max_idle: usize,

    /// Health probe timeout in seconds.
    pub health_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            connect_secs: 5,
            pool_idle_secs: 30,
            pool_max_idle: 10,
            health_secs: 5,
        }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum inbound body size buffered by the proxy, in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format: "pretty" or "json".
    pub log_format: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

impl GatewayConfig {
    /// Handler directory resolved against the project root.
    pub fn handlers_path(&self) -> PathBuf {
        self.project.root.join(&self.project.handlers_dir)
    }

    /// Style directory resolved against the project root.
    pub fn styles_path(&self) -> PathBuf {
        self.project.root.join(&self.project.styles_dir)
    }

    /// Markup directory resolved against the project root.
    pub fn templates_path(&self) -> PathBuf {
        self.project.root.join(&self.project.templates_dir)
    }
}
