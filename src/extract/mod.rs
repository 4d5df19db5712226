//! Problem-statement extraction.
//!
//! The [`Extractor`] runs a prioritized list of [`SiteAdapter`]s against an
//! injected [`PageContent`] provider. Built-in adapters, in order:
//!
//! - **meta-description**: the page's `description` metadata, accepted only
//!   when it mentions examples, input, output or constraints
//! - **leetcode**: the current LeetCode description container
//! - **leetcode-legacy**: the older LeetCode container
//! - **codechef**: the CodeChef statement container
//!
//! "Nothing found" is not an error: [`Extractor::extract`] returns an empty
//! string.

pub mod adapters;
pub mod clean;
pub mod page;

pub use adapters::{
    CODECHEF_SELECTOR, CodeChefAdapter, LEETCODE_LEGACY_SELECTOR, LEETCODE_SELECTOR,
    LeetCodeAdapter, META_DESCRIPTION, MetaDescriptionAdapter, SiteAdapter,
};
pub use clean::normalize_blank_lines;
pub use page::{PageContent, PageSnapshot};

use tracing::debug;

/// Runs site adapters in priority order.
pub struct Extractor {
    adapters: Vec<Box<dyn SiteAdapter>>,
}

impl Extractor {
    /// Creates an extractor from an explicit adapter list (highest priority first).
    #[must_use]
    pub fn new(adapters: Vec<Box<dyn SiteAdapter>>) -> Self {
        Self { adapters }
    }

    /// Creates an extractor with the built-in adapters.
    #[must_use]
    pub fn with_default_adapters() -> Self {
        Self::new(vec![
            Box::new(MetaDescriptionAdapter),
            Box::new(LeetCodeAdapter::current()),
            Box::new(LeetCodeAdapter::legacy()),
            Box::new(CodeChefAdapter),
        ])
    }

    /// Appends an adapter with the lowest priority.
    pub fn push(&mut self, adapter: Box<dyn SiteAdapter>) {
        self.adapters.push(adapter);
    }

    /// Returns the adapter names in priority order.
    #[must_use]
    pub fn adapter_names(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    /// Extracts the problem text, or an empty string when no layout matches.
    #[must_use]
    pub fn extract(&self, page: &dyn PageContent) -> String {
        for adapter in &self.adapters {
            if let Some(text) = adapter.try_extract(page) {
                debug!(adapter = adapter.name(), len = text.len(), "problem text extracted");
                return text;
            }
            debug!(adapter = adapter.name(), "adapter did not match");
        }
        String::new()
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::with_default_adapters()
    }
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractor")
            .field("adapters", &self.adapter_names())
            .finish()
    }
}
