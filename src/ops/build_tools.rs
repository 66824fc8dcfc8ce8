//! Host build-tool installation.

use crate::error::ProvisionError;
use crate::util::process::{CommandRunner, ProcessBuilder};

/// System packages the dependency builds need.
pub const BUILD_TOOLS: &[&str] = &["build-essential", "gfortran", "clang", "ninja-build"];

/// Install the build tools with the system package manager.
///
/// Runs through `sudo`, so the runner should pass the terminal through.
pub fn install_build_tools(runner: &dyn CommandRunner) -> Result<(), ProvisionError> {
    tracing::info!("Installing build tools: {}", BUILD_TOOLS.join(" "));
    let cmd = ProcessBuilder::new("sudo")
        .args(["apt", "install", "-y"])
        .args(BUILD_TOOLS);
    runner.run(&cmd)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockRunner;

    #[test]
    fn test_single_package_manager_call() {
        let runner = MockRunner::new();
        install_build_tools(&runner).unwrap();

        assert_eq!(
            runner.calls(),
            vec!["sudo apt install -y build-essential gfortran clang ninja-build"]
        );
    }

    #[test]
    fn test_failure_is_build_error() {
        let runner = MockRunner::new().failing("apt");
        let err = install_build_tools(&runner).unwrap_err();
        assert!(matches!(err, ProvisionError::Build { .. }));
    }
}
