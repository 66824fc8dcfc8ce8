//! Read-only view of what is installed.

use std::path::PathBuf;

use serde::Serialize;

use crate::core::dependency::{Dependency, DependencyKind};
use crate::util::config::Config;

/// Install state of one managed dependency.
#[derive(Debug, Clone, Serialize)]
pub struct DependencyStatus {
    pub name: String,
    pub kind: DependencyKind,
    /// Pinned version; `None` for unversioned data files
    pub version: Option<String>,
    pub path: PathBuf,
    /// Marker present (or, for data files, the file exists)
    pub installed: bool,
}

/// Report the state of every managed dependency, in provisioning order.
pub fn status(config: &Config) -> Vec<DependencyStatus> {
    Dependency::standard_set(config)
        .iter()
        .map(|dep| DependencyStatus {
            name: dep.name().to_string(),
            kind: dep.kind(),
            version: dep.version().map(str::to_string),
            path: dep.install_path().to_path_buf(),
            installed: dep.is_satisfied(),
        })
        .collect()
}
