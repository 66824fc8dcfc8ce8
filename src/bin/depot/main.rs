//! Depot CLI - provisions native dependencies idempotently

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("depot=debug")
    } else {
        EnvFilter::new("depot=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    // Execute command
    match cli.command {
        Commands::Provision(args) => commands::provision::execute(&cli.root, args),
        Commands::Teardown => commands::teardown::execute(&cli.root),
        Commands::Toolchain => commands::toolchain::execute(&cli.root),
        Commands::Status(args) => commands::status::execute(&cli.root, args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
