//! memsync CLI
//!
//! Reconciles the memberships declared in memsync.toml against the
//! file-backed membership store.

mod cli;
mod commands;
mod error;
mod store;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing if verbose
    if cli.verbose {
        if let Err(e) = memsync_core::logging::init_with_default("debug") {
            eprintln!("{}: failed to set up logging: {}", "warning".yellow(), e);
        }
        tracing::debug!("Verbose mode enabled");
    }

    match cli.command {
        Commands::Plan { json } => commands::run_plan(&cli.manifest, &cli.store, json),
        Commands::Apply { json } => commands::run_apply(&cli.manifest, &cli.store, json),
        Commands::Find { container, member } => {
            commands::run_find(&cli.manifest, &cli.store, &container, &member)
        }
    }
}
