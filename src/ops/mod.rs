//! High-level operations.
//!
//! This module contains the implementation of the `depot` commands.

pub mod build_tools;
pub mod provision;
pub mod status;
pub mod teardown;

pub use build_tools::{install_build_tools, BUILD_TOOLS};
pub use provision::{run_fetchers, DependencyOutcome, ProvisionReport, ProvisioningEngine};
pub use status::{status, DependencyStatus};
pub use teardown::{teardown, TeardownReport};
