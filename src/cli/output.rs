//! Output formatting for CLI commands.
//!
//! Supports text and JSON output formats.

use crate::controller::{CopyFeedback, SessionView};
use crate::error::Error;
use crate::hint::ClueLevel;
use crate::render::RenderedHint;
use serde::Serialize;
use std::fmt::Write;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output.
    Json,
}

impl OutputFormat {
    /// Parses format from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Formats the session view.
#[must_use]
pub fn format_view(view: &SessionView, plain: bool, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_view_text(view, plain),
        OutputFormat::Json => format_json(view),
    }
}

fn format_view_text(view: &SessionView, plain: bool) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Phase:   {}", view.phase);
    let _ = writeln!(output, "Level:   {}", view.level);
    if view.problem.is_empty() {
        output.push_str("Problem: (none)\n");
    } else {
        output.push_str("Problem:\n");
        for line in view.problem.lines() {
            let _ = writeln!(output, "  {line}");
        }
    }
    if let Some(rendered) = &view.rendered {
        output.push_str("Hint:\n");
        let _ = writeln!(output, "{}", hint_body(rendered, plain));
    }
    if let Some(error) = &view.error {
        let _ = writeln!(output, "Error:   {error}");
    }
    output
}

/// Formats a freshly received hint.
#[must_use]
pub fn format_hint(view: &SessionView, plain: bool, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => view
            .rendered
            .as_deref()
            .map(|html| format!("{}\n", hint_body(html, plain)))
            .unwrap_or_default(),
        OutputFormat::Json => format_json(view),
    }
}

fn hint_body(html: &str, plain: bool) -> String {
    if plain {
        RenderedHint::new(html.to_string()).plain_text()
    } else {
        html.to_string()
    }
}

/// Formats the problem text after detection or manual entry.
#[must_use]
pub fn format_problem(problem: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format!("{problem}\n"),
        OutputFormat::Json => format_json(&serde_json::json!({ "problem": problem })),
    }
}

/// Formats a rendered hint.
#[must_use]
pub fn format_rendered(rendered: &RenderedHint, plain: bool, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format!("{}\n", hint_body(rendered.as_str(), plain)),
        OutputFormat::Json => format_json(&serde_json::json!({
            "html": rendered.as_str(),
            "plain": rendered.plain_text(),
        })),
    }
}

/// Formats the level list.
#[must_use]
pub fn format_levels(format: OutputFormat) -> String {
    #[derive(Serialize)]
    struct LevelInfo {
        name: &'static str,
        instruction: &'static str,
    }

    match format {
        OutputFormat::Text => {
            let mut output = String::new();
            for level in ClueLevel::ALL {
                let _ = writeln!(output, "{:<17} {}", level.as_str(), level.instruction());
            }
            output
        }
        OutputFormat::Json => {
            let levels: Vec<LevelInfo> = ClueLevel::ALL
                .iter()
                .map(|l| LevelInfo {
                    name: l.as_str(),
                    instruction: l.instruction(),
                })
                .collect();
            format_json(&levels)
        }
    }
}

/// Formats copy feedback.
#[must_use]
pub fn format_copy(feedback: CopyFeedback, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format!("{}\n", feedback.label()),
        OutputFormat::Json => format_json(&serde_json::json!({ "copy": feedback })),
    }
}

/// Formats a plain status message.
#[must_use]
pub fn format_message(message: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format!("{message}\n"),
        OutputFormat::Json => format_json(&serde_json::json!({ "message": message })),
    }
}

/// Formats an error for display: the short user message as text, or an
/// object carrying both the user message and the full detail as JSON.
#[must_use]
pub fn format_error(error: &Error, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => error.user_message(),
        OutputFormat::Json => format_json(&serde_json::json!({
            "error": error.user_message(),
            "detail": error.to_string(),
        })),
    }
}

fn format_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::Phase;
    use crate::error::HintError;

    fn view() -> SessionView {
        SessionView {
            phase: Phase::HintShown,
            problem: "Two Sum\n\nFind indices.".to_string(),
            level: ClueLevel::AlgorithmFocus,
            hint: Some("Use a **map**.".to_string()),
            rendered: Some("Use a <strong>map</strong>.".to_string()),
            error: None,
        }
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::parse("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("yaml"), OutputFormat::Text);
    }

    #[test]
    fn test_view_text() {
        let text = format_view(&view(), false, OutputFormat::Text);
        assert!(text.contains("Phase:   hint-shown"));
        assert!(text.contains("Level:   algorithm-focus"));
        assert!(text.contains("  Find indices."));
        assert!(text.contains("Use a <strong>map</strong>."));

        let plain = format_view(&view(), true, OutputFormat::Text);
        assert!(plain.contains("Use a map."));
    }

    #[test]
    fn test_view_json() {
        let json: serde_json::Value =
            serde_json::from_str(&format_view(&view(), false, OutputFormat::Json)).unwrap();
        assert_eq!(json["phase"], "hint-shown");
        assert_eq!(json["level"], "algorithm-focus");
        assert_eq!(json["hint"], "Use a **map**.");
    }

    #[test]
    fn test_levels() {
        let text = format_levels(OutputFormat::Text);
        assert_eq!(text.lines().count(), 4);
        assert!(text.starts_with("high-level"));

        let json: serde_json::Value =
            serde_json::from_str(&format_levels(OutputFormat::Json)).unwrap();
        assert_eq!(json[3]["name"], "generic");
    }

    #[test]
    fn test_format_error() {
        let err = Error::Hint(HintError::Validation);
        assert_eq!(
            format_error(&err, OutputFormat::Text),
            "Please enter a problem description to get a clue."
        );
        let json: serde_json::Value =
            serde_json::from_str(&format_error(&err, OutputFormat::Json)).unwrap();
        assert_eq!(json["detail"], "hint error: problem text is empty");
    }

    #[test]
    fn test_copy_feedback() {
        assert_eq!(format_copy(CopyFeedback::Copied, OutputFormat::Text), "Copied!\n");
        assert!(format_copy(CopyFeedback::Failed, OutputFormat::Json).contains("\"failed\""));
    }
}
