//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// Depot - provisions the native dependencies of a C++ project
#[derive(Parser)]
#[command(name = "depot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project root holding depot.toml and the managed directories
    #[arg(long, global = true, env = "DEPOT_ROOT", default_value = ".")]
    pub root: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch, build and install every pinned dependency
    Provision(ProvisionArgs),

    /// Remove every managed dependency
    Teardown,

    /// Show the discovered compilers and the flags derived from them
    Toolchain,

    /// Show which dependencies are installed
    Status(StatusArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct ProvisionArgs {
    /// Build libraries with the accelerator compiler when it is available
    #[arg(long)]
    pub accelerator: bool,

    /// Install the system build tools first (uses sudo)
    #[arg(long)]
    pub install_build_tools: bool,
}

#[derive(Args)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
