//! Toolchain detection functions.

use std::path::{Path, PathBuf};

use crate::util::config::ToolchainSettings;

use super::{AcceleratorToolchain, CompilerDiscoveryResult, ExecutableResolver};

/// Detect the host compilers and the optional accelerator compiler.
///
/// The C and C++ compilers are looked up by the fixed names in `settings`.
/// Failing to find either is logged and recorded in
/// [`CompilerDiscoveryResult::missing`] but does not stop discovery.
pub fn discover(
    settings: &ToolchainSettings,
    resolver: &dyn ExecutableResolver,
) -> CompilerDiscoveryResult {
    let mut result = CompilerDiscoveryResult::default();

    result.cc = resolve_compiler(resolver, &settings.cc, "C", &mut result.missing);
    result.cxx = resolve_compiler(resolver, &settings.cxx, "C++", &mut result.missing);

    match resolver.resolve(&settings.accelerator) {
        Some(compiler) => {
            tracing::info!(
                "Accelerator compiler found at {}, accelerator support is enabled",
                compiler.display()
            );
            let host = host_compiler(result.cc.as_deref(), &settings.cc);
            result.accelerator = Some(accelerator_toolchain(compiler, &host, settings));
        }
        None => {
            tracing::warn!(
                "`{}` cannot be found, accelerator support is disabled",
                settings.accelerator
            );
        }
    }

    result
}

fn resolve_compiler(
    resolver: &dyn ExecutableResolver,
    name: &str,
    language: &str,
    missing: &mut Vec<String>,
) -> Option<PathBuf> {
    match resolver.resolve(name) {
        Some(path) => {
            tracing::info!("{} compiler: {}", language, path.display());
            Some(path)
        }
        None => {
            tracing::error!("{} compiler `{}` cannot be found", language, name);
            missing.push(name.to_string());
            None
        }
    }
}

/// The host compiler the accelerator compiler delegates to.
///
/// Falls back to the bare binary name when the C compiler was not resolved.
pub(crate) fn host_compiler(cc: Option<&Path>, fallback: &str) -> String {
    cc.map(|p| p.display().to_string())
        .unwrap_or_else(|| fallback.to_string())
}

fn accelerator_toolchain(
    compiler: PathBuf,
    host: &str,
    settings: &ToolchainSettings,
) -> AcceleratorToolchain {
    let home = &settings.accelerator_home;
    let invocation = format!(
        "{} -ccbin {} --allow-unsupported-compiler -Xnvlink --suppress-stack-size-warning",
        compiler.display(),
        host
    );

    AcceleratorToolchain {
        invocation,
        include_flags: format!("-DUSE_CUDA -I{}", home.join("include").display()),
        link_flags: format!("-L{} -lcudart -lcuda", home.join("lib64").display()),
        compiler,
    }
}
