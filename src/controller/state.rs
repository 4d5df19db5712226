//! Controller phases and the view exposed to front ends.

use crate::hint::ClueLevel;
use serde::Serialize;
use std::fmt;

/// Where the controller is in its action cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    /// No action in flight, no hint shown.
    #[default]
    Idle,
    /// Extraction in progress.
    Detecting,
    /// Hint request in flight.
    AwaitingHint,
    /// A rendered hint is shown.
    HintShown,
    /// The last action failed; a user message is available.
    Error,
}

impl Phase {
    /// Returns whether an action is in flight. New actions are refused
    /// while busy.
    #[must_use]
    pub const fn is_busy(self) -> bool {
        matches!(self, Self::Detecting | Self::AwaitingHint)
    }

    /// Returns the lowercase phase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Detecting => "detecting",
            Self::AwaitingHint => "awaiting-hint",
            Self::HintShown => "hint-shown",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transient result of a copy action. Never changes the phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CopyFeedback {
    /// Text reached the clipboard.
    Copied,
    /// The clipboard refused the text.
    Failed,
}

impl CopyFeedback {
    /// Short label shown after a copy attempt.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Copied => "Copied!",
            Self::Failed => "Error!",
        }
    }
}

/// Snapshot of everything a front end displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    /// Current phase.
    pub phase: Phase,
    /// Problem text (possibly empty).
    pub problem: String,
    /// Selected level.
    pub level: ClueLevel,
    /// Raw hint text.
    pub hint: Option<String>,
    /// Rendered hint markup.
    pub rendered: Option<String>,
    /// User-facing message of the last failed action.
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Phase::Idle, false)]
    #[test_case(Phase::Detecting, true)]
    #[test_case(Phase::AwaitingHint, true)]
    #[test_case(Phase::HintShown, false)]
    #[test_case(Phase::Error, false)]
    fn test_is_busy(phase: Phase, busy: bool) {
        assert_eq!(phase.is_busy(), busy);
    }

    #[test]
    fn test_phase_serializes_like_display() {
        for phase in [Phase::Idle, Phase::AwaitingHint, Phase::HintShown] {
            assert_eq!(
                serde_json::to_value(phase).unwrap(),
                serde_json::Value::from(phase.to_string())
            );
        }
    }

    #[test]
    fn test_copy_feedback_labels() {
        assert_eq!(CopyFeedback::Copied.label(), "Copied!");
        assert_eq!(CopyFeedback::Failed.label(), "Error!");
    }
}
