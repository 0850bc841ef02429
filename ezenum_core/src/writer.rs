//! Output paths and writing of generated files.

use crate::error::{EzenumError, Result};
use crate::golang::GO_SOURCE_SUFFIX;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Path of the file generated for `source`: same directory, `.go` replaced
/// by `suffix`.
pub fn generated_path(source: &Path, suffix: &str) -> PathBuf {
    let name = source
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();
    let base = name.strip_suffix(GO_SOURCE_SUFFIX).unwrap_or(&*name);
    source.with_file_name(format!("{base}{suffix}"))
}

/// Creates or truncates `path` and writes `text` to it. Returns the number
/// of bytes written.
pub fn write(path: &Path, text: &str) -> Result<usize> {
    fs::write(path, text).map_err(|source| EzenumError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Wrote {} bytes to {:?}", text.len(), path);
    Ok(text.len())
}
