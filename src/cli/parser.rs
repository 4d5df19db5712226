//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use crate::config::{Config, Overrides};
use crate::error::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// cluekit: graded hints for coding problems.
///
/// Extracts a problem statement from a saved page snapshot, requests a hint
/// at the chosen level and renders it.
#[derive(Parser, Debug)]
#[command(name = "cluekit")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the session database.
    ///
    /// Defaults to `.cluekit/session.db` in the current directory.
    #[arg(short, long, env = "CLUEKIT_DB_PATH", global = true)]
    pub db_path: Option<PathBuf>,

    /// Path to a TOML config file.
    ///
    /// Defaults to `.cluekit/config.toml` when it exists.
    #[arg(short, long, env = "CLUEKIT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// URL hint requests are posted to (normally the local proxy).
    #[arg(long, env = "CLUEKIT_ENDPOINT", global = true)]
    pub endpoint: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Enable verbose (debug) logging on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract the problem statement from a page snapshot (JSON).
    Detect {
        /// Snapshot file: `{"meta": {...}, "containers": {...}}`.
        snapshot: PathBuf,
    },

    /// Set the problem text by hand.
    Problem {
        /// Problem text. Read from stdin when omitted.
        text: Option<String>,
    },

    /// Request a hint for the current problem.
    Hint {
        /// Hint level (high-level, algorithm-focus, detailed-insight).
        #[arg(short, long)]
        level: Option<String>,

        /// Replace the problem text before requesting.
        #[arg(short, long)]
        problem: Option<String>,

        /// Print the hint as plain text instead of markup.
        #[arg(long)]
        plain: bool,
    },

    /// Show the saved session.
    Show {
        /// Print the hint as plain text instead of markup.
        #[arg(long)]
        plain: bool,
    },

    /// Clear problem, hint and level.
    #[command(alias = "new")]
    Reset,

    /// Copy the current hint as plain text.
    ///
    /// On Linux the command keeps running until another application takes
    /// the clipboard over.
    Copy {
        /// Write to this file instead of the system clipboard.
        #[arg(long)]
        to: Option<PathBuf>,
    },

    /// Render markdown hint text to markup.
    Render {
        /// Input file. Read from stdin when omitted.
        file: Option<PathBuf>,

        /// Print the plain-text projection instead of markup.
        #[arg(long)]
        plain: bool,
    },

    /// List hint levels and their instructions.
    Levels,

    /// Run the credential-holding proxy.
    Serve {
        /// Address to listen on.
        #[arg(long)]
        listen: Option<String>,

        /// Upstream generation endpoint.
        #[arg(long)]
        upstream: Option<String>,
    },
}

impl Cli {
    /// Returns the values given on the command line or through their
    /// environment variables.
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        Overrides {
            db_path: self.db_path.clone(),
            endpoint: self.endpoint.clone(),
            timeout_secs: self.timeout,
        }
    }

    /// Resolves the full configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed.
    pub fn resolve_config(&self) -> Result<Config> {
        Ok(Config::load(self.config.as_deref())?.apply_overrides(self.overrides()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_hint_flags() {
        let cli = Cli::try_parse_from([
            "cluekit",
            "--format",
            "json",
            "hint",
            "--level",
            "algorithm-focus",
            "-p",
            "Two Sum",
        ])
        .unwrap();
        assert_eq!(cli.format, "json");
        match cli.command {
            Commands::Hint { level, problem, plain } => {
                assert_eq!(level.as_deref(), Some("algorithm-focus"));
                assert_eq!(problem.as_deref(), Some("Two Sum"));
                assert!(!plain);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_reset_alias() {
        let cli = Cli::try_parse_from(["cluekit", "new"]).unwrap();
        assert!(matches!(cli.command, Commands::Reset));
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "cluekit",
            "--db-path",
            "/custom/path.db",
            "--timeout",
            "7",
            "levels",
        ])
        .unwrap();
        let config = Config::default().apply_overrides(cli.overrides());
        assert_eq!(config.db_path, PathBuf::from("/custom/path.db"));
        assert_eq!(config.timeout_secs, 7);
    }
}
