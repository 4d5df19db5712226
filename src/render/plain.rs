//! Plain-text projection of rendered markup.

use regex::Regex;
use std::sync::OnceLock;

fn markup_tag() -> &'static Regex {
    static MARKUP_TAG: OnceLock<Regex> = OnceLock::new();
    MARKUP_TAG.get_or_init(|| {
        Regex::new(r#"</?(?:pre|code|strong|em|ul|ol|li)(?: class="[^"]*")?>"#)
            .expect("valid regex")
    })
}

/// Converts renderer markup into the text a copy action should produce.
///
/// `<br>` and item ends become newlines, the renderer's own tags are
/// dropped and the entities it emits are decoded.
#[must_use]
pub fn to_plain_text(markup: &str) -> String {
    let text = markup
        .replace("<br>", "\n")
        .replace("</li>\n", "\n")
        .replace("</li>", "\n");
    let text = markup_tag().replace_all(&text, "");
    let text = text
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&");
    text.trim_end().to_string()
}
