//! Recursive file collection.
//!
//! Files are returned relative to the scanned root and sorted, so the route
//! table built from them does not depend on directory iteration order.
//! Hidden entries (names starting with `.`) are skipped.

use std::fs;
use std::path::{Path, PathBuf};

use crate::discovery::DiscoveryError;

/// A file found under a scanned root.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DiscoveredFile {
    /// Path as seen from the process (root joined with `relative`).
    pub path: PathBuf,
    /// Path relative to the scanned root.
    pub relative: PathBuf,
}

impl DiscoveredFile {
    /// File name without its extension.
    pub fn stem(&self) -> &str {
        self.relative
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
    }

    /// File name including its extension.
    pub fn file_name(&self) -> &str {
        self.relative
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
    }

    /// Relative path with forward slashes, regardless of platform.
    pub fn relative_slash(&self) -> String {
        self.relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Recursively collect every file under `root` whose extension matches
/// `extension` (case-insensitive, without the dot).
pub fn collect_files(root: &Path, extension: &str) -> Result<Vec<DiscoveredFile>, DiscoveryError> {
    let mut files = Vec::new();
    walk(root, root, extension, &mut files)?;
    files.sort();
    Ok(files)
}

fn walk(
    root: &Path,
    dir: &Path,
    extension: &str,
    files: &mut Vec<DiscoveredFile>,
) -> Result<(), DiscoveryError> {
    let read_dir_err = |source| DiscoveryError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    for entry in fs::read_dir(dir).map_err(read_dir_err)? {
        let entry = entry.map_err(read_dir_err)?;
        let entry_path = entry.path();

        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }

        let file_type = entry.file_type().map_err(read_dir_err)?;
        if file_type.is_dir() {
            walk(root, &entry_path, extension, files)?;
        } else if has_extension(&entry_path, extension) {
            let relative = entry_path
                .strip_prefix(root)
                .unwrap_or(&entry_path)
                .to_path_buf();
            files.push(DiscoveredFile {
                path: entry_path,
                relative,
            });
        }
    }

    Ok(())
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension.trim_start_matches('.')))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn collects_sorted_relative_paths_recursively() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "users.py");
        touch(dir.path(), "admin/reports.py");
        touch(dir.path(), "admin/notes.txt");
        touch(dir.path(), "billing.PY");
        touch(dir.path(), ".hidden/secret.py");
        touch(dir.path(), ".swap.py");

        let files = collect_files(dir.path(), "py").unwrap();
        let relative: Vec<_> = files.iter().map(|f| f.relative_slash()).collect();
        assert_eq!(relative, vec!["admin/reports.py", "billing.PY", "users.py"]);
        assert_eq!(files[0].path, dir.path().join("admin").join("reports.py"));
        assert_eq!(files[0].stem(), "reports");
        assert_eq!(files[0].file_name(), "reports.py");
    }

    #[test]
    fn empty_directory_yields_no_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(collect_files(dir.path(), ".css").unwrap().is_empty());
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = collect_files(&dir.path().join("nope"), "py").unwrap_err();
        assert!(matches!(err, DiscoveryError::ReadDir { .. }));
    }
}
