//! Autotools source libraries.
//!
//! The tarball is unpacked into the scratch directory and built there; the
//! install directory is only written by `make install` once the compile has
//! succeeded. A failed build leaves the source tree behind for inspection.

use std::path::{Path, PathBuf};

use crate::core::dependency::{render_url, BuildableLibrary};
use crate::error::ProvisionError;
use crate::sources::archive::extract_tarball;
use crate::toolchain::host_compiler;
use crate::util::fs::{ensure_dir, remove_dir_all_if_exists, remove_file};
use crate::util::process::{parallel_jobs, ProcessBuilder};

use super::FetchContext;

/// Compile flags for the accelerator profile, after the code-generation flags.
pub const ACCELERATOR_CFLAGS: &str = "-O3 --std=c++14 --compiler-options \
     -Wall,-Wfatal-errors,-Wno-unused-variable,-Wno-unused-but-set-variable";

/// How the library is configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildProfile {
    /// Plain `configure --prefix`.
    Cpu,
    /// `configure` with the compiler replaced by the accelerator compiler
    /// wrapping the host compiler.
    Accelerator {
        compiler: PathBuf,
        host: String,
        archs: Vec<String>,
    },
}

impl BuildProfile {
    /// Pick the profile for this run.
    ///
    /// `accelerator` is the caller's decision; asking for the accelerator
    /// profile without a discovered accelerator compiler is an error.
    pub fn select(
        accelerator: bool,
        dep: &BuildableLibrary,
        ctx: &FetchContext<'_>,
    ) -> Result<Self, ProvisionError> {
        if !accelerator {
            return Ok(BuildProfile::Cpu);
        }

        let accel = ctx
            .toolchain
            .accelerator
            .as_ref()
            .ok_or_else(|| ProvisionError::Resolution {
                tool: ctx.config.toolchain.accelerator.clone(),
            })?;

        Ok(BuildProfile::Accelerator {
            compiler: accel.compiler.clone(),
            host: host_compiler(ctx.toolchain.cc.as_deref(), &ctx.config.toolchain.cc),
            archs: dep.accelerator_archs.clone(),
        })
    }

    /// Short name for logs and reports.
    pub fn label(&self) -> &'static str {
        match self {
            BuildProfile::Cpu => "cpu",
            BuildProfile::Accelerator { .. } => "accelerator",
        }
    }

    /// The `configure` invocation for this profile.
    pub fn configure_command(&self, dep: &BuildableLibrary, src_dir: &Path) -> ProcessBuilder {
        let prefix = format!("--prefix={}", dep.install_dir.display());
        let cmd = ProcessBuilder::new(src_dir.join("configure")).cwd(src_dir);

        match self {
            BuildProfile::Cpu => cmd.arg(prefix),
            BuildProfile::Accelerator {
                compiler,
                host,
                archs,
            } => {
                let compiler = compiler.display();
                let codegen: Vec<String> = archs
                    .iter()
                    .map(|arch| {
                        format!(
                            "--generate-code=arch=compute_{0},code=[compute_{0},sm_{0}]",
                            arch
                        )
                    })
                    .collect();

                cmd.env(
                    "CC",
                    format!(
                        "{} -x cu -ccbin {} --allow-unsupported-compiler",
                        compiler, host
                    ),
                )
                .env(
                    "CFLAGS",
                    format!("{} {}", codegen.join(" "), ACCELERATOR_CFLAGS),
                )
                .env(
                    "CCLD",
                    format!("{} -ccbin {} --allow-unsupported-compiler", compiler, host),
                )
                .args(&dep.accelerator_configure_flags)
                .arg(prefix)
            }
        }
    }
}

/// Download, bootstrap, configure, compile and install the library.
pub(super) fn install(
    dep: &BuildableLibrary,
    ctx: &FetchContext<'_>,
) -> Result<(), ProvisionError> {
    let url = render_url(&dep.url_template, &dep.version)?;
    let profile = BuildProfile::select(ctx.accelerator, dep, ctx)?;
    ensure_dir(&dep.tmp_dir)?;

    let extracted = dep.extracted_dir_name();
    let archive = dep.tmp_dir.join(format!("{}.tar.gz", extracted));
    let src_dir = dep.tmp_dir.join(&extracted);

    tracing::info!("Fetching {} {}", dep.name, dep.version);
    ctx.downloader.download(&url, &archive)?;
    extract_tarball(&archive, &dep.tmp_dir)?;

    tracing::info!(
        "Building {} {} ({} profile)",
        dep.name,
        dep.version,
        profile.label()
    );
    ctx.runner
        .run(&ProcessBuilder::new("autoreconf").arg("-i").cwd(&src_dir))?;
    ctx.runner.run(&profile.configure_command(dep, &src_dir))?;
    ctx.runner.run(
        &ProcessBuilder::new("make")
            .arg("-j")
            .arg(parallel_jobs().to_string())
            .cwd(&src_dir),
    )?;

    // Only a successful compile may touch the previous install.
    remove_dir_all_if_exists(&dep.install_dir)?;
    ensure_dir(&dep.install_dir)?;
    ctx.runner
        .run(&ProcessBuilder::new("make").arg("install").cwd(&src_dir))?;

    remove_file(&archive)?;
    remove_dir_all_if_exists(&src_dir)?;
    Ok(())
}
