use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{MapError, Result};

/// Create each directory (and parents) if absent. Safe to call repeatedly.
pub fn ensure_dirs<P: AsRef<Path>>(dirs: &[P]) -> Result<()> {
    for dir in dirs {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|source| MapError::Output {
            path: dir.to_path_buf(),
            source,
        })?;
        debug!(dir = %dir.display(), "output directory ready");
    }
    Ok(())
}

pub(crate) fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        Some(parent) => ensure_dirs(&[parent]),
        None => Ok(()),
    }
}

/// Write the whole buffer in one go.
pub fn write_file(path: &Path, contents: &[u8]) -> Result<PathBuf> {
    ensure_parent(path)?;
    fs::write(path, contents).map_err(|source| MapError::Output {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(path.to_path_buf())
}
