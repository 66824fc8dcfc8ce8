//! Filesystem utilities.

use std::fs;
use std::path::Path;

use crate::error::ProvisionError;

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<(), ProvisionError> {
    if !path.is_dir() {
        fs::create_dir_all(path).map_err(|e| ProvisionError::fs("create directory", path, e))?;
    }
    Ok(())
}

/// Remove a directory and all its contents, if it exists.
///
/// Returns whether anything was removed.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<bool, ProvisionError> {
    if path.exists() {
        fs::remove_dir_all(path).map_err(|e| ProvisionError::fs("remove directory", path, e))?;
        return Ok(true);
    }
    Ok(false)
}

/// Remove a single file, if it exists.
///
/// Returns whether anything was removed.
pub fn remove_file_if_exists(path: &Path) -> Result<bool, ProvisionError> {
    if path.exists() {
        fs::remove_file(path).map_err(|e| ProvisionError::fs("remove file", path, e))?;
        return Ok(true);
    }
    Ok(false)
}

/// Remove a file that is expected to be present.
pub fn remove_file(path: &Path) -> Result<(), ProvisionError> {
    fs::remove_file(path).map_err(|e| ProvisionError::fs("remove file", path, e))
}

/// Rename `from` to `to`, replacing whatever already sits at `to`.
pub fn replace_dir(from: &Path, to: &Path) -> Result<(), ProvisionError> {
    remove_dir_all_if_exists(to)?;
    fs::rename(from, to).map_err(|e| ProvisionError::fs("rename", from, e))
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> Result<(), ProvisionError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents).map_err(|e| ProvisionError::fs("write", path, e))
}
