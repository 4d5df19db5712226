//! CLI layer for cluekit.
//!
//! Provides the command-line interface using clap, with commands for
//! detecting a problem, requesting and rendering hints, and managing the
//! saved session.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::{Cli, Commands};
