//! Startup orchestration.
//!
//! # Responsibilities
//! - Discover the project's files and compile the route table
//!
//! # Design Decisions
//! - Fail fast: any discovery error is fatal
//! - Runs before the listener binds, so traffic only arrives when ready

use crate::config::GatewayConfig;
use crate::discovery::{self, DiscoveryError};
use crate::routing::RouteRegistry;

/// Discover files under the configured project and build the frozen route table.
pub fn compile_routes(config: &GatewayConfig) -> Result<RouteRegistry, DiscoveryError> {
    let files = discovery::discover(config)?;
    RouteRegistry::build(&files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaffolds_and_compiles_an_empty_project() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = GatewayConfig::default();
        config.project.root = dir.path().to_path_buf();
        config.project.create_missing = true;

        let registry = compile_routes(&config).unwrap();
        assert!(registry.is_empty());
        assert!(dir.path().join("py_htmx").is_dir());
    }

    #[test]
    fn missing_directories_abort_without_scaffolding() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = GatewayConfig::default();
        config.project.root = dir.path().to_path_buf();

        let err = compile_routes(&config).unwrap_err();
        assert!(matches!(err, DiscoveryError::MissingDirectory(_)));
    }
}
