//! Read-only access to a rendered page.
//!
//! The extractor never touches a live document. It receives a
//! [`PageContent`] provider, which keeps adapters testable without a browser.

use crate::error::{IoError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Read-only view of a page's structural content.
pub trait PageContent {
    /// Returns the `content` attribute of `<meta name="{name}">`, if present.
    fn meta_content(&self, name: &str) -> Option<String>;

    /// Returns the visible text of the first element matching `selector`.
    fn inner_text(&self, selector: &str) -> Option<String>;
}

/// A captured page: metadata fields and the visible text of known containers.
///
/// Snapshots are produced by whatever drives the browser and handed to the
/// CLI as JSON:
///
/// ```json
/// {
///   "url": "https://leetcode.com/problems/two-sum/",
///   "meta": { "description": "Given an array..." },
///   "containers": { "div[data-track-load=\"description_content\"]": "Given..." }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSnapshot {
    /// Address of the captured page.
    #[serde(default)]
    pub url: Option<String>,

    /// `<meta name=...>` fields keyed by name.
    #[serde(default)]
    pub meta: BTreeMap<String, String>,

    /// Visible text keyed by CSS selector.
    #[serde(default)]
    pub containers: BTreeMap<String, String>,
}

impl PageSnapshot {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a metadata field.
    #[must_use]
    pub fn with_meta(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.meta.insert(name.into(), content.into());
        self
    }

    /// Adds a container's visible text.
    #[must_use]
    pub fn with_container(mut self, selector: impl Into<String>, text: impl Into<String>) -> Self {
        self.containers.insert(selector.into(), text.into());
        self
    }

    /// Parses a snapshot from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a snapshot.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| IoError::Generic(format!("invalid page snapshot: {e}")).into())
    }

    /// Loads a snapshot from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable, or not a snapshot.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let path_str = path.to_string_lossy().to_string();
        if !path.exists() {
            return Err(IoError::FileNotFound { path: path_str }.into());
        }
        let json = std::fs::read_to_string(path).map_err(|e| IoError::ReadFailed {
            path: path_str,
            reason: e.to_string(),
        })?;
        Self::from_json(&json)
    }
}

impl PageContent for PageSnapshot {
    fn meta_content(&self, name: &str) -> Option<String> {
        self.meta.get(name).cloned()
    }

    fn inner_text(&self, selector: &str) -> Option<String> {
        self.containers.get(selector).cloned()
    }
}
