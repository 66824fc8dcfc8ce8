//! Depot - idempotent provisioning of native third-party dependencies
//!
//! This crate provides the library behind the `depot` binary: compiler
//! discovery, the per-dependency fetch recipes, and the engine that runs
//! them in order against a pinned configuration.

pub mod core;
pub mod error;
pub mod fetch;
pub mod ops;
pub mod sources;
pub mod toolchain;
pub mod util;

/// Test utilities and mocks for Depot unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides mock implementations for downloads,
/// process execution, and executable lookup.
#[cfg(test)]
pub mod test_support;

pub use core::dependency::Dependency;
pub use error::ProvisionError;
pub use ops::{ProvisionReport, ProvisioningEngine, TeardownReport};
pub use util::config::Config;
