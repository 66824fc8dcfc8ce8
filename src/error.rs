//! Provisioning error types.
//!
//! Every step of a provisioning run reports failure through [`ProvisionError`].
//! The engine stops at the first error it sees and hands it back unchanged,
//! so the variant tells the caller which stage of the pipeline broke.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Error raised while provisioning or tearing down dependencies.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// A required tool could not be located on `PATH`.
    #[error("`{tool}` could not be found on PATH")]
    Resolution { tool: String },

    /// A download returned a non-success status or its destination could not be written.
    #[error("failed to download {url}: {message}")]
    Transfer { url: String, message: String },

    /// A bootstrap, configure, compile or install command exited unsuccessfully.
    #[error("`{command}` failed with exit code {code:?}\n{stderr}")]
    Build {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// A directory could not be created, renamed or removed.
    #[error("failed to {action} {}: {source}", path.display())]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An archive could not be unpacked.
    #[error("failed to extract {}: {message}", archive.display())]
    Extract { archive: PathBuf, message: String },

    /// Configuration could not be loaded or produced an invalid value.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ProvisionError {
    /// Wrap an I/O error raised while touching `path`.
    pub fn fs(action: &'static str, path: &Path, source: io::Error) -> Self {
        ProvisionError::Filesystem {
            action,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Build a transfer error for `url`.
    pub fn transfer(url: &str, message: impl Into<String>) -> Self {
        ProvisionError::Transfer {
            url: url.to_string(),
            message: message.into(),
        }
    }
}
