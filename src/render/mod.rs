//! Hint rendering.
//!
//! Turns the markdown-flavoured text returned by the text-generation service
//! into markup: code blocks, inline code, bold, italic, flat lists and line
//! breaks. See [`markdown`] for the pass order and known limitations.

pub mod markdown;
pub mod plain;

pub use markdown::render_markdown;
pub use plain::to_plain_text;

use serde::Serialize;
use std::fmt;

/// Markup derived from a raw hint.
///
/// Always recomputed from the raw hint, never edited in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RenderedHint {
    html: String,
}

impl RenderedHint {
    /// Wraps already-rendered markup.
    #[must_use]
    pub const fn new(html: String) -> Self {
        Self { html }
    }

    /// Returns the markup.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.html
    }

    /// Consumes the hint and returns the markup.
    #[must_use]
    pub fn into_string(self) -> String {
        self.html
    }

    /// Returns whether nothing was rendered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.html.is_empty()
    }

    /// Returns the text a copy action places on the clipboard.
    #[must_use]
    pub fn plain_text(&self) -> String {
        to_plain_text(&self.html)
    }
}

impl fmt::Display for RenderedHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendered_hint_accessors() {
        let hint = render_markdown("**Hint:** think\nrecursively");
        assert_eq!(hint.as_str(), "<strong>Hint:</strong> think<br>recursively");
        assert_eq!(hint.to_string(), hint.as_str());
        assert_eq!(hint.plain_text(), "Hint: think\nrecursively");
        assert!(!hint.is_empty());
        assert!(RenderedHint::default().is_empty());
    }

    #[test]
    fn test_rendered_hint_serializes_as_string() {
        let hint = RenderedHint::new("<em>x</em>".to_string());
        assert_eq!(serde_json::to_string(&hint).unwrap(), "\"<em>x</em>\"");
    }
}
