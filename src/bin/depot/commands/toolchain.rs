//! `depot toolchain` command

use std::path::Path;

use anyhow::Result;

use depot::toolchain::{discover, PathResolver};
use depot::util::config::Config;

pub fn execute(root: &Path) -> Result<()> {
    let mut config = Config::load(root)?;
    let result = discover(&config.toolchain, &PathResolver);
    config.apply_discovery(&result);

    println!("Toolchain:");
    println!();

    match result.cc {
        Some(ref cc) => println!("  CC:          {}", cc.display()),
        None => println!("  CC:          not found ({})", config.toolchain.cc),
    }
    match result.cxx {
        Some(ref cxx) => println!("  CXX:         {}", cxx.display()),
        None => println!("  CXX:         not found ({})", config.toolchain.cxx),
    }
    match result.accelerator {
        Some(ref accel) => {
            println!("  Accelerator: {}", accel.compiler.display());
            println!("  Invocation:  {}", accel.invocation);
        }
        None => println!("  Accelerator: not found ({})", config.toolchain.accelerator),
    }

    if !result.missing.is_empty() {
        println!();
        println!("Missing:     {}", result.missing.join(", "));
    }

    println!();
    println!("Test flags: {}", config.test_flags());

    Ok(())
}
