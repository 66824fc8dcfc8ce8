//! Dependency fetchers.
//!
//! Every recipe goes through the same protocol:
//!
//! ```text
//! CHECK_MARKER -> (satisfied)   -> DONE
//!              -> (unsatisfied) -> FETCH -> TRANSFORM -> INSTALL -> WRITE_MARKER -> DONE
//! ```
//!
//! The marker check and marker write live in the [`Fetcher`] impl for
//! [`Dependency`]; the per-recipe modules only implement the
//! fetch/transform/install steps in between. A failing step returns its
//! error immediately and nothing is cleaned up.

mod archive;
mod buildable;
mod header;
mod static_asset;

use crate::core::dependency::Dependency;
use crate::core::marker;
use crate::error::ProvisionError;
use crate::sources::http::Downloader;
use crate::toolchain::CompilerDiscoveryResult;
use crate::util::config::Config;
use crate::util::process::CommandRunner;

pub use buildable::{BuildProfile, ACCELERATOR_CFLAGS};

/// Everything a fetcher may touch during a run.
pub struct FetchContext<'a> {
    pub config: &'a Config,
    pub downloader: &'a dyn Downloader,
    pub runner: &'a dyn CommandRunner,
    pub toolchain: &'a CompilerDiscoveryResult,
    /// Whether buildable libraries should use the accelerator profile
    pub accelerator: bool,
}

/// How a fetcher reached its terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Already at the target state; no work was done.
    Skipped,
    /// Fetched and installed during this run.
    Installed,
}

/// Brings one dependency to its target state.
pub trait Fetcher {
    /// Name used in logs and reports.
    fn name(&self) -> &str;

    /// Run the fetch protocol.
    fn fetch(&self, ctx: &FetchContext<'_>) -> Result<FetchOutcome, ProvisionError>;
}

impl Fetcher for Dependency {
    fn name(&self) -> &str {
        Dependency::name(self)
    }

    fn fetch(&self, ctx: &FetchContext<'_>) -> Result<FetchOutcome, ProvisionError> {
        if self.is_satisfied() {
            tracing::info!(
                "{} {} already installed",
                self.name(),
                self.version().unwrap_or("(unversioned)")
            );
            return Ok(FetchOutcome::Skipped);
        }

        match self {
            Dependency::Header(dep) => header::install(dep, ctx)?,
            Dependency::Archive(dep) => archive::install(dep, ctx)?,
            Dependency::Buildable(dep) => buildable::install(dep, ctx)?,
            Dependency::StaticData(dep) => static_asset::install(dep, ctx)?,
        }

        if let Some(version) = self.version() {
            marker::write(self.install_path(), version)?;
        }

        tracing::info!("{} installed", self.name());
        Ok(FetchOutcome::Installed)
    }
}
