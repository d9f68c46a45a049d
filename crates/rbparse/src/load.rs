//! Reading sources from disk.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LoadError {
    /// The file that could not be loaded.
    pub fn path(&self) -> &Path {
        match self {
            LoadError::Io { path, .. } => path,
        }
    }
}

/// Read a whole source file. Ruby source need not be UTF-8, so bytes are
/// returned as-is.
pub fn read_source(path: impl AsRef<Path>) -> Result<Vec<u8>, LoadError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = bytes.len(), "loaded source");
    Ok(bytes)
}
