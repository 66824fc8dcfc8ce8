//! Configuration for a provisioning run.
//!
//! The configuration is read once from an optional `depot.toml` in the root
//! directory. Every field has a default, so an empty or missing file yields
//! the stock dependency set:
//!
//! ```toml
//! [paths]
//! ext_dir = "external"
//! tmp_dir = "tmp"
//!
//! [versions]
//! nlohmann_json = "3.11.3"
//! eigen = "3.4.0"
//! libxc = "6.2.2"
//!
//! [toolchain]
//! cc = "clang"
//! accelerator = "nvcc"
//! ```
//!
//! After loading, the only fields that change are the accelerator invocation
//! and the accelerator test flags, both merged in by [`Config::apply_discovery`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ProvisionError;
use crate::toolchain::CompilerDiscoveryResult;

/// Name of the configuration file looked up in the root directory.
pub const CONFIG_FILE: &str = "depot.toml";

/// Provisioning configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project root; every relative path below is resolved against it.
    #[serde(skip)]
    pub root_dir: PathBuf,

    /// Directory layout
    pub paths: PathsConfig,

    /// Pinned dependency versions
    pub versions: VersionsConfig,

    /// Download locations
    pub sources: SourcesConfig,

    /// Compiler names and accelerator settings
    pub toolchain: ToolchainSettings,

    /// Full accelerator compiler invocation, set once discovery finds one.
    #[serde(skip)]
    pub accelerator_invocation: Option<String>,

    /// Accelerator include and link flags, set once discovery finds one.
    #[serde(skip)]
    pub accelerator_flags: Option<String>,
}

/// Directory layout relative to the root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// External dependencies directory
    pub ext_dir: PathBuf,

    /// Scratch directory for downloads and source trees
    pub tmp_dir: PathBuf,

    /// Directory holding basis-set data files
    pub basis_set_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        PathsConfig {
            ext_dir: PathBuf::from("external"),
            tmp_dir: PathBuf::from("tmp"),
            basis_set_dir: PathBuf::from("basis-set"),
        }
    }
}

/// Pinned version per dependency.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionsConfig {
    pub nlohmann_json: String,
    pub eigen: String,
    pub libxc: String,
}

impl Default for VersionsConfig {
    fn default() -> Self {
        VersionsConfig {
            nlohmann_json: "3.11.3".to_string(),
            eigen: "3.4.0".to_string(),
            libxc: "6.2.2".to_string(),
        }
    }
}

impl VersionsConfig {
    /// Reject versions that cannot name a marker file.
    ///
    /// The version becomes a file name inside the install directory, so it
    /// must be non-empty and must not contain path separators or be a
    /// relative path component.
    pub fn validate(&self) -> Result<(), ProvisionError> {
        for (key, version) in [
            ("nlohmann_json", &self.nlohmann_json),
            ("eigen", &self.eigen),
            ("libxc", &self.libxc),
        ] {
            let invalid = version.trim().is_empty()
                || version.contains(['/', '\\'])
                || version == "."
                || version == "..";
            if invalid {
                return Err(ProvisionError::Config(format!(
                    "invalid version for `{}`: {:?}",
                    key, version
                )));
            }
        }
        Ok(())
    }
}

/// Download URLs. `{version}` is replaced with the pinned version.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub nlohmann_json: String,
    pub eigen: String,
    pub libxc: String,
    pub basis_set: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        SourcesConfig {
            nlohmann_json:
                "https://github.com/nlohmann/json/releases/download/v{version}/json.hpp"
                    .to_string(),
            eigen: "https://gitlab.com/libeigen/eigen/-/archive/{version}/eigen-{version}.tar.gz"
                .to_string(),
            libxc: "https://gitlab.com/libxc/libxc/-/archive/{version}/libxc-{version}.tar.gz"
                .to_string(),
            basis_set: "https://www.basissetexchange.org/api/basis/sto-3g/format/json/"
                .to_string(),
        }
    }
}

/// Toolchain settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainSettings {
    /// C compiler binary name
    pub cc: String,

    /// C++ compiler binary name
    pub cxx: String,

    /// Accelerator compiler binary name
    pub accelerator: String,

    /// Accelerator SDK installation root (headers and libraries)
    pub accelerator_home: PathBuf,

    /// Compute capabilities to generate accelerator code for
    pub accelerator_archs: Vec<String>,

    /// Base flags handed to the downstream project's module tests
    pub test_flags: String,
}

impl Default for ToolchainSettings {
    fn default() -> Self {
        ToolchainSettings {
            cc: "clang".to_string(),
            cxx: "clang++".to_string(),
            accelerator: "nvcc".to_string(),
            accelerator_home: PathBuf::from("/usr/local/cuda"),
            accelerator_archs: vec!["80".to_string(), "70".to_string()],
            test_flags: String::new(),
        }
    }
}

impl Config {
    /// Default configuration rooted at `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Config {
            root_dir: root.into(),
            ..Config::default()
        }
    }

    /// Load `depot.toml` from `root`, falling back to defaults when absent.
    pub fn load(root: &Path) -> Result<Self, ProvisionError> {
        let path = root.join(CONFIG_FILE);
        if !path.exists() {
            tracing::debug!("no {} in {}, using defaults", CONFIG_FILE, root.display());
            return Ok(Config::with_root(root));
        }

        let contents = std::fs::read_to_string(&path)
            .map_err(|e| ProvisionError::fs("read", &path, e))?;
        let mut config: Config = toml::from_str(&contents).map_err(|e| {
            ProvisionError::Config(format!("failed to parse {}: {}", path.display(), e))
        })?;
        config.root_dir = root.to_path_buf();
        config.versions.validate()?;
        Ok(config)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root_dir.join(path)
        }
    }

    /// External dependencies directory.
    pub fn ext_dir(&self) -> PathBuf {
        self.resolve(&self.paths.ext_dir)
    }

    /// Scratch directory for downloads.
    pub fn tmp_dir(&self) -> PathBuf {
        self.resolve(&self.paths.tmp_dir)
    }

    /// Basis-set data directory.
    pub fn basis_set_dir(&self) -> PathBuf {
        self.resolve(&self.paths.basis_set_dir)
    }

    /// Merge what compiler discovery found into this configuration.
    ///
    /// Replaces the results of any earlier discovery, so applying the same
    /// result twice leaves the configuration unchanged.
    pub fn apply_discovery(&mut self, result: &CompilerDiscoveryResult) {
        match result.accelerator {
            Some(ref accel) => {
                self.accelerator_invocation = Some(accel.invocation.clone());
                self.accelerator_flags =
                    Some(format!("{} {}", accel.include_flags, accel.link_flags));
            }
            None => {
                self.accelerator_invocation = None;
                self.accelerator_flags = None;
            }
        }
    }

    /// Flags for the downstream module tests, including accelerator flags.
    pub fn test_flags(&self) -> String {
        match (&self.accelerator_flags, self.toolchain.test_flags.is_empty()) {
            (Some(extra), true) => extra.clone(),
            (Some(extra), false) => format!("{} {}", self.toolchain.test_flags, extra),
            (None, _) => self.toolchain.test_flags.clone(),
        }
    }
}
