//! # cluekit
//!
//! Graded hints for coding problems.
//!
//! cluekit extracts a problem statement from a LeetCode or CodeChef page
//! snapshot, asks a text-generation service for a hint at one of several
//! verbosity levels, and renders the markdown-flavoured reply to markup.
//!
//! ## Features
//!
//! - **Extraction**: site adapters tried in priority order over an injected page
//! - **Rendering**: fenced and inline code, bold, italic, flat lists, line breaks
//! - **`SQLite` Session**: the last problem, hint and level survive restarts
//! - **Proxy**: `cluekit serve` keeps the API key out of the client

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod extract;
pub mod hint;
#[cfg(feature = "proxy")]
pub mod proxy;
pub mod render;
pub mod session;

// Re-export commonly used types at crate root
pub use error::{Error, Result};

pub use config::{Config, DEFAULT_DB_PATH};
pub use controller::{Clipboard, Controller, CopyFeedback, Phase, SessionView};
pub use extract::{Extractor, PageContent, PageSnapshot, SiteAdapter};
pub use hint::{ClueLevel, HintClient, HttpTransport, Transport};
pub use render::{RenderedHint, render_markdown};
pub use session::{KeyValueStore, SessionState, SessionStore, SqliteKeyValueStore};

// Re-export CLI types
pub use cli::{Cli, Commands, OutputFormat};
