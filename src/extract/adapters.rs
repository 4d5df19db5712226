//! Site adapters.
//!
//! Each adapter knows one page layout and turns it into plain problem text.
//! Adapters are tried in priority order by the
//! [`Extractor`](super::Extractor); the first non-empty result wins.

use super::clean::{
    has_problem_keywords, normalize_blank_lines, replace_nbsp, strip_codechef_sections,
    strip_leetcode_sections,
};
use super::page::PageContent;

/// Selector of the current LeetCode description container.
pub const LEETCODE_SELECTOR: &str = r#"div[data-track-load="description_content"]"#;

/// Selector of the legacy LeetCode description container.
pub const LEETCODE_LEGACY_SELECTOR: &str = ".xFUwe";

/// Selector of the CodeChef statement container.
pub const CODECHEF_SELECTOR: &str = ".problem-statement";

/// Name of the page-level description metadata field.
pub const META_DESCRIPTION: &str = "description";

/// Trait for page-layout adapters.
///
/// # Examples
///
/// ```
/// use cluekit::extract::{CodeChefAdapter, PageSnapshot, SiteAdapter, CODECHEF_SELECTOR};
///
/// let page = PageSnapshot::new().with_container(CODECHEF_SELECTOR, "Chef has N coins.");
/// let text = CodeChefAdapter.try_extract(&page);
/// assert_eq!(text.as_deref(), Some("Chef has N coins."));
/// ```
pub trait SiteAdapter: Send + Sync {
    /// Returns the adapter name used in logs.
    fn name(&self) -> &'static str;

    /// Attempts to extract problem text; `None` when the layout does not match
    /// or yields nothing.
    fn try_extract(&self, page: &dyn PageContent) -> Option<String>;
}

/// Uses the page's `description` metadata when it looks like a full statement.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetaDescriptionAdapter;

impl SiteAdapter for MetaDescriptionAdapter {
    fn name(&self) -> &'static str {
        "meta-description"
    }

    fn try_extract(&self, page: &dyn PageContent) -> Option<String> {
        let content = page.meta_content(META_DESCRIPTION)?;
        let text = normalize_blank_lines(&replace_nbsp(&content));
        // Short or generic metadata is not the problem body.
        (!text.is_empty() && has_problem_keywords(&text)).then_some(text)
    }
}

/// LeetCode description container, current or legacy layout.
#[derive(Debug, Clone, Copy)]
pub struct LeetCodeAdapter {
    selector: &'static str,
    name: &'static str,
}

impl LeetCodeAdapter {
    /// Adapter for the current layout.
    #[must_use]
    pub const fn current() -> Self {
        Self {
            selector: LEETCODE_SELECTOR,
            name: "leetcode",
        }
    }

    /// Adapter for the legacy layout.
    #[must_use]
    pub const fn legacy() -> Self {
        Self {
            selector: LEETCODE_LEGACY_SELECTOR,
            name: "leetcode-legacy",
        }
    }

    /// Returns the container selector this adapter reads.
    #[must_use]
    pub const fn selector(&self) -> &'static str {
        self.selector
    }
}

impl SiteAdapter for LeetCodeAdapter {
    fn name(&self) -> &'static str {
        self.name
    }

    fn try_extract(&self, page: &dyn PageContent) -> Option<String> {
        let text = strip_leetcode_sections(&page.inner_text(self.selector)?);
        (!text.is_empty()).then_some(text)
    }
}

/// CodeChef statement container.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeChefAdapter;

impl SiteAdapter for CodeChefAdapter {
    fn name(&self) -> &'static str {
        "codechef"
    }

    fn try_extract(&self, page: &dyn PageContent) -> Option<String> {
        let text = strip_codechef_sections(&page.inner_text(CODECHEF_SELECTOR)?);
        (!text.is_empty()).then_some(text)
    }
}
