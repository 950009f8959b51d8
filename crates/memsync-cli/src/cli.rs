//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// memsync - Reconcile declared memberships against a paginated store
#[derive(Parser, Debug)]
#[command(name = "memsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the membership manifest
    #[arg(long, global = true, env = "MEMSYNC_MANIFEST", default_value = "memsync.toml")]
    pub manifest: PathBuf,

    /// Path to the membership store
    #[arg(long, global = true, env = "MEMSYNC_STORE", default_value = "memsync-store.toml")]
    pub store: PathBuf,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Preview the changes apply would make
    Plan {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Reconcile every declared membership
    ///
    /// Adds run before removes. A rejected change does not stop the others;
    /// the partial result is saved and the command exits non-zero.
    Apply {
        /// Output as JSON for CI/CD integration
        #[arg(long)]
        json: bool,
    },

    /// Resolve exactly one member of a container
    ///
    /// Examples:
    ///   memsync find tag:production checkout
    Find {
        /// Container to search
        container: String,

        /// Member identity to resolve
        member: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_paths_after_subcommand() {
        let cli = Cli::parse_from(["memsync", "plan", "--json", "--store", "other.toml"]);
        assert_eq!(cli.command, Commands::Plan { json: true });
        assert_eq!(cli.store, PathBuf::from("other.toml"));
        assert_eq!(cli.manifest, PathBuf::from("memsync.toml"));
    }

    #[test]
    fn find_takes_container_and_member() {
        let cli = Cli::parse_from(["memsync", "find", "team:ops", "VIEW_PORTFOLIO"]);
        assert_eq!(
            cli.command,
            Commands::Find {
                container: "team:ops".to_string(),
                member: "VIEW_PORTFOLIO".to_string(),
            }
        );
    }
}
