//! Compiler discovery.
//!
//! Locates the host C and C++ compilers plus an optional accelerator
//! compiler. Nothing here is fatal: a missing host compiler is reported and
//! recorded, and a missing accelerator compiler simply disables the
//! accelerator build profile for the run.

mod detect;

use std::path::PathBuf;

use crate::error::ProvisionError;

pub use detect::discover;
pub(crate) use detect::host_compiler;

/// Resolves a binary name to an absolute path.
pub trait ExecutableResolver {
    /// Look up `name`, returning `None` when it cannot be found.
    fn resolve(&self, name: &str) -> Option<PathBuf>;
}

/// Resolves binaries against the host's `PATH`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PathResolver;

impl ExecutableResolver for PathResolver {
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        crate::util::process::find_executable(name)
    }
}

/// What discovery found on the host.
///
/// Computed once per provisioning run and never persisted.
#[derive(Debug, Clone, Default)]
pub struct CompilerDiscoveryResult {
    /// Resolved C compiler
    pub cc: Option<PathBuf>,

    /// Resolved C++ compiler
    pub cxx: Option<PathBuf>,

    /// Accelerator toolchain, when its compiler was found
    pub accelerator: Option<AcceleratorToolchain>,

    /// Names of required compilers that could not be resolved
    pub missing: Vec<String>,
}

impl CompilerDiscoveryResult {
    /// Whether the accelerator compiler was found.
    pub fn accelerator_available(&self) -> bool {
        self.accelerator.is_some()
    }

    /// One resolution error per required compiler that was not found.
    ///
    /// These are reported, not raised: a build that needs the compiler
    /// fails later with its own error.
    pub fn resolution_errors(&self) -> Vec<ProvisionError> {
        self.missing
            .iter()
            .map(|tool| ProvisionError::Resolution { tool: tool.clone() })
            .collect()
    }
}

/// A resolved accelerator compiler and the flags it contributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceleratorToolchain {
    /// Absolute path to the accelerator compiler
    pub compiler: PathBuf,

    /// Compiler invocation bound to the host compiler
    pub invocation: String,

    /// Preprocessor and include flags for code using the accelerator runtime
    pub include_flags: String,

    /// Linker flags for the accelerator runtime
    pub link_flags: String,
}
