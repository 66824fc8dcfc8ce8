//! `depot provision` command

use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::ProvisionArgs;
use depot::fetch::FetchOutcome;
use depot::ops::{install_build_tools, ProvisioningEngine};
use depot::util::config::Config;
use depot::util::process::SystemRunner;

pub fn execute(root: &Path, args: ProvisionArgs) -> Result<()> {
    let config = Config::load(root)?;

    if args.install_build_tools {
        install_build_tools(&SystemRunner::streaming())
            .context("failed to install build tools")?;
    }

    let mut engine = ProvisioningEngine::for_host(config)?;
    let report = engine.provision(args.accelerator)?;

    for outcome in &report.outcomes {
        let status = match outcome.outcome {
            FetchOutcome::Installed => "Installed",
            FetchOutcome::Skipped => "Fresh",
        };
        eprintln!("{:>12} {}", status, outcome.name);
    }

    let profile = if report.accelerator { "accelerator" } else { "cpu" };
    eprintln!(
        "    Finished {} dependencies ({} installed, {} profile)",
        report.outcomes.len(),
        report.installed_count(),
        profile
    );

    for err in report.toolchain.resolution_errors() {
        eprintln!("warning: {}", err);
    }

    Ok(())
}
