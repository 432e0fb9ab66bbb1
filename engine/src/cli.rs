//! CLI interface for Warden
//!
//! This module provides the command-line interface using clap's derive API.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Warden trust-annotating agent engine
///
/// Plans multi-step tool use, runs independent steps in parallel and gates
/// identity data behind trust checks.
#[derive(Parser, Debug)]
#[command(name = "warden")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the execution levels of a plan file
    Levels {
        /// Path to a JSON plan
        plan: PathBuf,
    },

    /// Ask the configured reasoner to plan a request, without running it
    Plan {
        /// The request to plan
        request: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Print the configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["warden", "levels", "plan.json"]);
        assert!(!cli.json);
        match cli.command {
            Command::Levels { plan } => assert_eq!(plan, PathBuf::from("plan.json")),
            other => panic!("Expected Levels command, got {other:?}"),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from([
            "warden", "--json", "--log", "debug", "--config", "/tmp/w.toml", "config", "show",
        ]);
        assert!(cli.json);
        assert_eq!(cli.log.as_deref(), Some("debug"));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/w.toml")));
        assert!(matches!(
            cli.command,
            Command::Config {
                action: ConfigAction::Show
            }
        ));
    }

    #[test]
    fn test_plan_command() {
        let cli = Cli::parse_from(["warden", "plan", "who sells bikes?"]);
        if let Command::Plan { request } = cli.command {
            assert_eq!(request, "who sells bikes?");
        } else {
            panic!("Expected Plan command");
        }
    }

    #[test]
    fn test_missing_subcommand_is_error() {
        assert!(Cli::try_parse_from(["warden"]).is_err());
    }
}
