//! Hint verbosity levels.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How much a hint may give away.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClueLevel {
    /// Core concept or general direction only.
    #[default]
    HighLevel,
    /// Suggests an algorithm or data structure.
    AlgorithmFocus,
    /// Pitfalls, edge cases or a specific technique.
    DetailedInsight,
    /// Anything else: a concise generic clue.
    #[serde(other)]
    Generic,
}

impl ClueLevel {
    /// All levels in selector order.
    pub const ALL: [Self; 4] = [
        Self::HighLevel,
        Self::AlgorithmFocus,
        Self::DetailedInsight,
        Self::Generic,
    ];

    /// Parses a level name; unrecognized names map to [`ClueLevel::Generic`].
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "high-level" => Self::HighLevel,
            "algorithm-focus" => Self::AlgorithmFocus,
            "detailed-insight" => Self::DetailedInsight,
            _ => Self::Generic,
        }
    }

    /// Returns the wire/storage name of the level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HighLevel => "high-level",
            Self::AlgorithmFocus => "algorithm-focus",
            Self::DetailedInsight => "detailed-insight",
            Self::Generic => "generic",
        }
    }

    /// Returns the fixed instruction sent with this level.
    #[must_use]
    pub const fn instruction(self) -> &'static str {
        match self {
            Self::HighLevel => {
                "Provide a very high-level, subtle hint focusing on the core concept or a general \
                 direction, without mentioning specific algorithms or data structures."
            }
            Self::AlgorithmFocus => {
                "Provide a hint that suggests a suitable algorithm or data structure, explaining \
                 why it's a good fit without giving away the full implementation."
            }
            Self::DetailedInsight => {
                "Provide a more detailed insight, including common pitfalls, edge cases, or a \
                 specific technique that might be useful, but still avoid giving the complete \
                 solution."
            }
            Self::Generic => "Provide a simple, optimal, and concise coding clue.",
        }
    }
}

impl fmt::Display for ClueLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
