//! Source tree scanning for Go files.

use crate::error::{EzenumError, Result};
use crate::golang::GO_SOURCE_SUFFIX;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;

/// Walks a directory tree and yields the Go source files in it.
#[derive(Debug, Clone)]
pub struct SourceScanner {
    root: PathBuf,
    exclude: Vec<String>,
    generated_suffix: Option<String>,
}

impl SourceScanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            exclude: Vec::new(),
            generated_suffix: None,
        }
    }

    /// Directory names that are not descended into.
    pub fn with_exclude(mut self, exclude: Vec<String>) -> Self {
        self.exclude = exclude;
        self
    }

    /// Files ending with this suffix are our own output and are skipped.
    pub fn skip_generated(mut self, suffix: impl Into<String>) -> Self {
        self.generated_suffix = Some(suffix.into());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Starts the walk.
    ///
    /// Fails up front when the root is missing or not a directory. Entries
    /// that cannot be read further down are yielded as
    /// [`EzenumError::Walk`] items and the walk carries on with their
    /// siblings. Paths come out sorted by file name within each directory.
    pub fn scan(&self) -> Result<impl Iterator<Item = Result<PathBuf>> + '_> {
        if !self.root.is_dir() {
            return Err(EzenumError::RootNotFound {
                path: self.root.clone(),
            });
        }
        debug!("Scanning {:?} for Go sources", self.root);

        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !(entry.depth() > 0 && entry.file_type().is_dir() && self.is_excluded(entry.file_name())));

        Ok(walker.filter_map(move |entry| match entry {
            Ok(entry) => {
                let path = entry.path();
                if !entry.file_type().is_file() || !self.is_source_file(path) {
                    return None;
                }
                trace!("Found source file {:?}", path);
                Some(Ok(entry.into_path()))
            }
            Err(err) => {
                let path = err
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| self.root.clone());
                let message = match err.io_error() {
                    Some(io) => io.to_string(),
                    None => err.to_string(),
                };
                Some(Err(EzenumError::walk(path, message)))
            }
        }))
    }

    fn is_excluded(&self, name: &std::ffi::OsStr) -> bool {
        self.exclude.iter().any(|excluded| name == excluded.as_str())
    }

    fn is_source_file(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        if !name.ends_with(GO_SOURCE_SUFFIX) {
            return false;
        }
        match &self.generated_suffix {
            Some(suffix) if name.ends_with(suffix.as_str()) => {
                trace!("Skipping generated file {:?}", path);
                false
            }
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "package p\n").unwrap();
    }

    fn relative_paths(root: &Path, scanner: &SourceScanner) -> Vec<String> {
        scanner
            .scan()
            .unwrap()
            .map(|p| {
                p.unwrap()
                    .strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn test_scan_filters_go_files_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(root, "b.go");
        touch(root, "a.go");
        touch(root, "notes.txt");
        touch(root, "pkg/z.go");
        touch(root, "pkg/inner/y.go");
        touch(root, "go.mod");

        let scanner = SourceScanner::new(root);
        assert_eq!(
            relative_paths(root, &scanner),
            vec!["a.go", "b.go", "pkg/inner/y.go", "pkg/z.go"]
        );
    }

    #[test]
    fn test_scan_skips_generated_and_excluded() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(root, "codes.go");
        touch(root, "codes_ezenum_gen.go");
        touch(root, "vendor/lib/lib.go");
        touch(root, "internal/vendor.go");

        let scanner = SourceScanner::new(root)
            .with_exclude(vec!["vendor".to_string()])
            .skip_generated("_ezenum_gen.go");
        assert_eq!(
            relative_paths(root, &scanner),
            vec!["codes.go", "internal/vendor.go"]
        );
    }

    #[test]
    fn test_scan_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let scanner = SourceScanner::new(temp_dir.path().join("missing"));
        assert!(matches!(
            scanner.scan().err(),
            Some(EzenumError::RootNotFound { .. })
        ));
    }

    #[test]
    fn test_scan_root_is_file() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "single.go");
        let scanner = SourceScanner::new(temp_dir.path().join("single.go"));
        assert!(scanner.scan().is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_is_reported_and_walk_continues() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(root, "a.go");
        touch(root, "locked/hidden.go");
        touch(root, "z.go");

        let locked = root.join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read_dir(&locked).is_ok() {
            // Running with privileges that ignore permissions.
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let results: Vec<_> = SourceScanner::new(root).scan().unwrap().collect();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let ok: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        let errors: Vec<_> = results.iter().filter_map(|r| r.as_ref().err()).collect();
        assert_eq!(ok, vec![&root.join("a.go"), &root.join("z.go")]);
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], EzenumError::Walk { path, .. } if path == &locked));
    }
}
