//! File discovery subsystem.
//!
//! # Data Flow
//! ```text
//! GatewayConfig
//!     → project.rs (resolve directories, optional scaffolding)
//!     → walker.rs (collect handler / style / markup files, sorted)
//!     → extractor.rs (handler declarations per handler file)
//!     → FileSet handed to the route synthesizers
//! ```
//!
//! # Design Decisions
//! - Runs once, synchronously, before the server accepts traffic
//! - Any filesystem error aborts startup; the server never runs with a
//!   partial route set
//! - Extraction non-matches are not errors

pub mod extractor;
pub mod project;
pub mod walker;

use std::path::PathBuf;

use thiserror::Error;

use crate::config::GatewayConfig;

pub use extractor::{extract_handlers, HandlerDescriptor, HANDLER_PREFIX};
pub use project::ProjectLayout;
pub use walker::{collect_files, DiscoveredFile};

/// Errors raised while discovering project files. All of them are fatal.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("failed to read directory {}: {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read file {}: {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("required directory missing: {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("failed to create directory {}: {source}", .path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Every input file the route synthesizers consume.
#[derive(Debug, Clone, Default)]
pub struct FileSet {
    pub handler_root: PathBuf,
    pub handler_files: Vec<DiscoveredFile>,
    pub style_files: Vec<DiscoveredFile>,
    pub markup_files: Vec<DiscoveredFile>,
}

/// Prepare the project layout and collect its files.
pub fn discover(config: &GatewayConfig) -> Result<FileSet, DiscoveryError> {
    let layout = ProjectLayout::from_config(config);
    layout.prepare(config.project.create_missing)?;

    let project = &config.project;
    let handler_files = collect_files(&layout.handlers, &project.handler_extension)?
        .into_iter()
        .filter(|f| !f.file_name().starts_with("__"))
        .collect::<Vec<_>>();
    let style_files = collect_files(&layout.styles, &project.style_extension)?;
    let markup_files = collect_files(&layout.templates, &project.markup_extension)?;

    tracing::info!(
        handlers = handler_files.len(),
        styles = style_files.len(),
        pages = markup_files.len(),
        "Discovered project files"
    );

    Ok(FileSet {
        handler_root: layout.handlers,
        handler_files,
        style_files,
        markup_files,
    })
}

/// Read one handler file and extract its declarations.
pub fn read_handlers(file: &DiscoveredFile) -> Result<Vec<HandlerDescriptor>, DiscoveryError> {
    let source = std::fs::read_to_string(&file.path).map_err(|source| DiscoveryError::ReadFile {
        path: file.path.clone(),
        source,
    })?;
    Ok(extract_handlers(&source))
}
