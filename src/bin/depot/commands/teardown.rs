//! `depot teardown` command

use std::path::Path;

use anyhow::Result;

use depot::ops::teardown;
use depot::util::config::Config;

pub fn execute(root: &Path) -> Result<()> {
    let config = Config::load(root)?;

    let report = teardown(&config)?;
    if report.removed.is_empty() {
        eprintln!("     Nothing to remove");
    }
    for path in &report.removed {
        eprintln!("     Removed {}", path.display());
    }

    Ok(())
}
