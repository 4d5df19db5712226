//! Session controller.
//!
//! Drives one session through `Idle`, `Detecting`, `AwaitingHint`,
//! `HintShown` and `Error`, wiring user actions to the extractor, hint
//! client, renderer, session store and clipboard.

pub mod clipboard;
pub mod machine;
pub mod state;

#[cfg(feature = "system-clipboard")]
pub use clipboard::SystemClipboard;
pub use clipboard::{Clipboard, FileClipboard, MemoryClipboard};
pub use machine::Controller;
pub use state::{CopyFeedback, Phase, SessionView};
