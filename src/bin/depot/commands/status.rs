//! `depot status` command

use std::path::Path;

use anyhow::Result;

use crate::cli::StatusArgs;
use depot::ops::status;
use depot::util::config::Config;

pub fn execute(root: &Path, args: StatusArgs) -> Result<()> {
    let config = Config::load(root)?;
    let report = status(&config);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for dep in &report {
        let state = if dep.installed { "installed" } else { "missing" };
        println!(
            "{:<10} {:<12} {:<10} {:<9} {}",
            dep.name,
            dep.kind,
            dep.version.as_deref().unwrap_or("-"),
            state,
            dep.path.display()
        );
    }

    Ok(())
}
