//! Removal of every managed install location.
//!
//! Teardown ignores version markers: whatever is at a managed location is
//! deleted, and a location that is already gone is skipped silently.

use std::path::PathBuf;

use serde::Serialize;

use crate::core::dependency::Dependency;
use crate::error::ProvisionError;
use crate::util::config::Config;
use crate::util::fs::{remove_dir_all_if_exists, remove_file_if_exists};

/// Paths removed by a teardown.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TeardownReport {
    pub removed: Vec<PathBuf>,
}

/// Delete the install location of every managed dependency.
pub fn teardown(config: &Config) -> Result<TeardownReport, ProvisionError> {
    let mut report = TeardownReport::default();

    for dep in Dependency::standard_set(config) {
        let path = dep.install_path();
        let removed = match dep {
            Dependency::StaticData(_) => remove_file_if_exists(path)?,
            _ => remove_dir_all_if_exists(path)?,
        };

        if removed {
            tracing::info!("Removed {}", path.display());
            report.removed.push(path.to_path_buf());
        } else {
            tracing::debug!("{} not present", path.display());
        }
    }

    Ok(report)
}
