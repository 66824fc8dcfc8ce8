//! Managed dependency specifications.
//!
//! Each dependency is one of four recipes, fixed at construction time. All
//! paths are derived from [`Config`] when the set is built; nothing below
//! hardcodes a location.

use std::path::{Path, PathBuf};

use serde::Serialize;
use url::Url;

use crate::core::marker;
use crate::error::ProvisionError;
use crate::util::config::Config;

/// Placeholder substituted with the pinned version in URL templates.
pub const VERSION_PLACEHOLDER: &str = "{version}";

/// Which recipe a dependency uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DependencyKind {
    Header,
    Archive,
    Buildable,
    StaticData,
}

impl std::fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DependencyKind::Header => "header",
            DependencyKind::Archive => "archive",
            DependencyKind::Buildable => "buildable",
            DependencyKind::StaticData => "static-data",
        };
        f.pad(s)
    }
}

/// A single header downloaded straight into its directory.
#[derive(Debug, Clone)]
pub struct HeaderAsset {
    pub name: String,
    pub version: String,
    pub url_template: String,
    pub install_dir: PathBuf,
    /// Name the downloaded file is stored under
    pub file_name: String,
}

/// A header-only library distributed as a tarball.
#[derive(Debug, Clone)]
pub struct ArchiveLibrary {
    pub name: String,
    pub version: String,
    pub url_template: String,
    /// Directory the tarball is extracted into
    pub extract_root: PathBuf,
    /// Canonical directory the extracted tree is renamed to
    pub install_dir: PathBuf,
    /// Scratch directory for the downloaded archive
    pub tmp_dir: PathBuf,
    /// Stem of the archive's top-level directory, before `-<version>`
    pub archive_stem: String,
}

/// A source library built with autotools.
#[derive(Debug, Clone)]
pub struct BuildableLibrary {
    pub name: String,
    pub version: String,
    pub url_template: String,
    /// `make install` prefix
    pub install_dir: PathBuf,
    /// Scratch directory for the archive and the source tree
    pub tmp_dir: PathBuf,
    /// Stem of the archive's top-level directory, before `-<version>`
    pub archive_stem: String,
    /// Extra `configure` flags for the accelerator profile
    pub accelerator_configure_flags: Vec<String>,
    /// Accelerator compute capabilities to generate code for
    pub accelerator_archs: Vec<String>,
}

/// A data file with no version of its own; present means done.
#[derive(Debug, Clone)]
pub struct StaticDataAsset {
    pub name: String,
    pub url: String,
    pub path: PathBuf,
}

/// One managed dependency.
#[derive(Debug, Clone)]
pub enum Dependency {
    Header(HeaderAsset),
    Archive(ArchiveLibrary),
    Buildable(BuildableLibrary),
    StaticData(StaticDataAsset),
}

impl Dependency {
    /// The managed dependencies in provisioning order.
    pub fn standard_set(config: &Config) -> Vec<Dependency> {
        let ext_dir = config.ext_dir();
        let tmp_dir = config.tmp_dir();

        vec![
            Dependency::Header(HeaderAsset {
                name: "nlohmann".to_string(),
                version: config.versions.nlohmann_json.clone(),
                url_template: config.sources.nlohmann_json.clone(),
                install_dir: ext_dir.join("nlohmann"),
                file_name: "json.hpp".to_string(),
            }),
            Dependency::Archive(ArchiveLibrary {
                name: "eigen".to_string(),
                version: config.versions.eigen.clone(),
                url_template: config.sources.eigen.clone(),
                extract_root: ext_dir.clone(),
                install_dir: ext_dir.join("eigen"),
                tmp_dir: tmp_dir.clone(),
                archive_stem: "eigen".to_string(),
            }),
            Dependency::Buildable(BuildableLibrary {
                name: "libxc".to_string(),
                version: config.versions.libxc.clone(),
                url_template: config.sources.libxc.clone(),
                install_dir: ext_dir.join("libxc"),
                tmp_dir,
                archive_stem: "libxc".to_string(),
                accelerator_configure_flags: vec!["--enable-cuda".to_string()],
                accelerator_archs: config.toolchain.accelerator_archs.clone(),
            }),
            Dependency::StaticData(StaticDataAsset {
                name: "sto-3g".to_string(),
                url: config.sources.basis_set.clone(),
                path: config.basis_set_dir().join("sto-3g.json"),
            }),
        ]
    }

    /// Dependency name.
    pub fn name(&self) -> &str {
        match self {
            Dependency::Header(d) => &d.name,
            Dependency::Archive(d) => &d.name,
            Dependency::Buildable(d) => &d.name,
            Dependency::StaticData(d) => &d.name,
        }
    }

    /// Recipe kind.
    pub fn kind(&self) -> DependencyKind {
        match self {
            Dependency::Header(_) => DependencyKind::Header,
            Dependency::Archive(_) => DependencyKind::Archive,
            Dependency::Buildable(_) => DependencyKind::Buildable,
            Dependency::StaticData(_) => DependencyKind::StaticData,
        }
    }

    /// Pinned version, if the recipe has one.
    pub fn version(&self) -> Option<&str> {
        match self {
            Dependency::Header(d) => Some(&d.version),
            Dependency::Archive(d) => Some(&d.version),
            Dependency::Buildable(d) => Some(&d.version),
            Dependency::StaticData(_) => None,
        }
    }

    /// The location this dependency occupies once installed.
    pub fn install_path(&self) -> &Path {
        match self {
            Dependency::Header(d) => &d.install_dir,
            Dependency::Archive(d) => &d.install_dir,
            Dependency::Buildable(d) => &d.install_dir,
            Dependency::StaticData(d) => &d.path,
        }
    }

    /// Whether the dependency is already at its target state.
    pub fn is_satisfied(&self) -> bool {
        match self {
            Dependency::StaticData(d) => d.path.exists(),
            _ => match self.version() {
                Some(version) => marker::is_satisfied(self.install_path(), version),
                None => false,
            },
        }
    }
}

impl ArchiveLibrary {
    /// Top-level directory name the archive is expected to contain.
    pub fn extracted_dir_name(&self) -> String {
        format!("{}-{}", self.archive_stem, self.version)
    }
}

impl BuildableLibrary {
    /// Top-level directory name the archive is expected to contain.
    pub fn extracted_dir_name(&self) -> String {
        format!("{}-{}", self.archive_stem, self.version)
    }
}

/// Substitute `version` into `template` and check the result is a valid URL.
pub fn render_url(template: &str, version: &str) -> Result<String, ProvisionError> {
    let rendered = template.replace(VERSION_PLACEHOLDER, version);
    Url::parse(&rendered)
        .map_err(|e| ProvisionError::Config(format!("invalid URL `{}`: {}", rendered, e)))?;
    Ok(rendered)
}
