//! Version markers.
//!
//! A marker is a file named exactly after a version string, stored inside a
//! dependency's install directory, whose content is the version followed by
//! a newline. Its presence is the only proof that the directory holds a
//! complete install of that version. Nothing checks the actual library
//! contents, so a marker goes stale if the directory is damaged by hand.

use std::path::Path;

use crate::error::ProvisionError;
use crate::util::fs::{ensure_dir, write_string};

/// Whether `install_dir` carries a marker for exactly `version`.
pub fn is_satisfied(install_dir: &Path, version: &str) -> bool {
    !version.is_empty() && install_dir.join(version).is_file()
}

/// Write the marker for `version`, creating `install_dir` if needed.
///
/// An existing marker is overwritten.
pub fn write(install_dir: &Path, version: &str) -> Result<(), ProvisionError> {
    ensure_dir(install_dir)?;
    write_string(&install_dir.join(version), &format!("{}\n", version))
}
