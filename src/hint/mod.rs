//! Hint requests against a text-generation service.
//!
//! A hint is requested by concatenating the level's fixed instruction with
//! the problem text, posting it once to the configured endpoint and reading
//! `candidates[0].content.parts[0].text` from the reply.

pub mod client;
pub mod level;
pub mod prompt;
pub mod transport;
pub mod wire;

pub use client::HintClient;
pub use level::ClueLevel;
pub use prompt::build_prompt;
pub use transport::{DEFAULT_TIMEOUT, HttpTransport, Transport, TransportResponse};
pub use wire::{GenerateRequest, GenerateResponse};
