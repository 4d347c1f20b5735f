//! Project directory layout.
//!
//! # Responsibilities
//! - Resolve the handler, style and markup directories from configuration
//! - Optionally scaffold missing directories (first run of a new project)
//! - Refuse to start discovery against a directory that does not exist

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::GatewayConfig;
use crate::discovery::DiscoveryError;

/// The three directories a project is made of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub handlers: PathBuf,
    pub styles: PathBuf,
    pub templates: PathBuf,
}

impl ProjectLayout {
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self {
            handlers: config.handlers_path(),
            styles: config.styles_path(),
            templates: config.templates_path(),
        }
    }

    fn dirs(&self) -> [&Path; 3] {
        [&self.handlers, &self.styles, &self.templates]
    }

    /// Make sure every project directory exists, creating them when
    /// `create_missing` is set.
    pub fn prepare(&self, create_missing: bool) -> Result<(), DiscoveryError> {
        for dir in self.dirs() {
            if dir.is_dir() {
                continue;
            }
            if !create_missing {
                return Err(DiscoveryError::MissingDirectory(dir.to_path_buf()));
            }
            fs::create_dir_all(dir).map_err(|source| DiscoveryError::CreateDirectory {
                path: dir.to_path_buf(),
                source,
            })?;
            tracing::info!(path = %dir.display(), "Created project directory");
        }
        Ok(())
    }
}
