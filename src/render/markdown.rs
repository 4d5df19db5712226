//! Markdown-subset to markup conversion.
//!
//! Passes run once each, in this order:
//!
//! 1. fenced code blocks
//! 2. inline code
//! 3. bold (`**text**`)
//! 4. italic (`*text*` and `_text_`, evaluated independently)
//! 5. bulleted and numbered lists (flat model, no nesting)
//! 6. line breaks
//!
//! Code produced by passes 1 and 2 is parked in a [`Stash`] behind
//! private-use sentinel characters, so later passes cannot reach inside it.
//! The placeholders are expanded after the last pass.
//!
//! # Known limitations
//!
//! Triple (or longer) emphasis runs such as `***x***` are not specially
//! handled; the result is whatever the bold-then-italic ordering produces.
//! Lists immediately adjacent to code fences are rendered without any
//! attempt to attach the code to the list item.

use super::RenderedHint;
use regex::{Captures, Regex};
use std::sync::OnceLock;
use tracing::debug;

/// Opens a stash placeholder.
const STASH_OPEN: char = '\u{E000}';

/// Closes a stash placeholder.
const STASH_CLOSE: char = '\u{E001}';

/// Tags that delimit list structure.
const LIST_TAGS: [&str; 6] = ["<ul>", "</ul>", "<ol>", "</ol>", "<li>", "</li>"];

/// Regex patterns used by the passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pattern {
    CodeFence,
    InlineCode,
    Bold,
    ListItem,
}

impl Pattern {
    /// Returns the compiled regex for this pattern.
    fn regex(self) -> &'static Regex {
        macro_rules! static_regex {
            ($name:ident, $pattern:expr) => {{
                static $name: OnceLock<Regex> = OnceLock::new();
                $name.get_or_init(|| Regex::new($pattern).expect("valid regex"))
            }};
        }

        match self {
            Self::CodeFence => static_regex!(CODE_FENCE, r"(?s)```([\w+#.-]*)\n(.*?)\n```"),
            Self::InlineCode => static_regex!(INLINE_CODE, r"`([^`]+)`"),
            Self::Bold => static_regex!(BOLD, r"\*\*(.+?)\*\*"),
            Self::ListItem => static_regex!(LIST_ITEM, r"^( *)([*-]|\d+\.) (.+)$"),
        }
    }
}

/// Renders a markdown-flavoured hint into markup.
///
/// Rendering is deterministic: the same input always produces byte-identical
/// output. Rendering is not idempotent; markup is not valid input.
///
/// # Examples
///
/// ```
/// use cluekit::render::render_markdown;
///
/// let rendered = render_markdown("Use a **hash map** and `O(n)` time.");
/// assert_eq!(
///     rendered.as_str(),
///     "Use a <strong>hash map</strong> and <code>O(n)</code> time."
/// );
/// ```
#[must_use]
pub fn render_markdown(markdown: &str) -> RenderedHint {
    if markdown.is_empty() {
        return RenderedHint::default();
    }

    let text: String = markdown
        .replace("\r\n", "\n")
        .chars()
        .filter(|c| *c != STASH_OPEN && *c != STASH_CLOSE)
        .collect();

    let mut stash = Stash::default();
    let text = fenced_code_blocks(&text, &mut stash);
    let text = inline_code(&text, &mut stash);
    let text = bold(&text);
    let text = emphasis(&text, '*');
    let text = emphasis(&text, '_');
    let text = lists(&text);
    let text = line_breaks(&text);
    let html = stash.expand(&text);

    debug!(
        input_len = markdown.len(),
        output_len = html.len(),
        stashed = stash.len(),
        "hint rendered"
    );
    RenderedHint::new(html)
}

/// Rendered code fragments parked behind placeholders.
#[derive(Debug, Default)]
struct Stash {
    fragments: Vec<String>,
}

impl Stash {
    /// Parks `markup` and returns its placeholder.
    fn put(&mut self, markup: String) -> String {
        let index = self.fragments.len();
        self.fragments.push(markup);
        format!("{STASH_OPEN}{index}{STASH_CLOSE}")
    }

    fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Replaces every placeholder with its fragment.
    ///
    /// A fragment only ever references fragments parked before it, so the
    /// recursion terminates.
    fn expand(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(open) = rest.find(STASH_OPEN) {
            out.push_str(&rest[..open]);
            let after = &rest[open + STASH_OPEN.len_utf8()..];
            let Some(close) = after.find(STASH_CLOSE) else {
                rest = after;
                continue;
            };
            if let Some(fragment) = after[..close]
                .parse::<usize>()
                .ok()
                .and_then(|i| self.fragments.get(i))
            {
                out.push_str(&self.expand(fragment));
            }
            rest = &after[close + STASH_CLOSE.len_utf8()..];
        }
        out.push_str(rest);
        out
    }
}

/// Escapes the characters that would otherwise be read as markup.
fn escape_code(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn fenced_code_blocks(text: &str, stash: &mut Stash) -> String {
    Pattern::CodeFence
        .regex()
        .replace_all(text, |caps: &Captures<'_>| {
            let body = escape_code(&caps[2]);
            let markup = match &caps[1] {
                "" => format!("<pre><code>{body}</code></pre>"),
                lang => format!("<pre><code class=\"language-{lang}\">{body}</code></pre>"),
            };
            stash.put(markup)
        })
        .into_owned()
}

fn inline_code(text: &str, stash: &mut Stash) -> String {
    Pattern::InlineCode
        .regex()
        .replace_all(text, |caps: &Captures<'_>| {
            stash.put(format!("<code>{}</code>", escape_code(&caps[1])))
        })
        .into_owned()
}

fn bold(text: &str) -> String {
    Pattern::Bold
        .regex()
        .replace_all(text, "<strong>${1}</strong>")
        .into_owned()
}

/// Converts single-delimiter spans into `<em>` spans.
///
/// A delimiter next to a second copy of itself never opens or closes a span,
/// so leftovers of the bold pass are not re-matched. An opening delimiter
/// must be followed by non-whitespace and a closing one preceded by
/// non-whitespace, which keeps `* item` bullets intact. Underscores inside
/// words (`snake_case`) are left alone. Spans never cross a newline.
fn emphasis(text: &str, delim: char) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == delim
            && opens_at(&chars, i, delim)
            && let Some(close) = find_close(&chars, i, delim)
        {
            out.push_str("<em>");
            out.extend(&chars[i + 1..close]);
            out.push_str("</em>");
            i = close + 1;
            continue;
        }
        out.push(chars[i]);
        i += 1;
    }

    out
}

/// Returns whether the delimiter at `i` has no copy of itself on either side.
fn is_lone(chars: &[char], i: usize, delim: char) -> bool {
    let prev = i.checked_sub(1).map(|p| chars[p]);
    let next = chars.get(i + 1).copied();
    prev != Some(delim) && next != Some(delim)
}

fn opens_at(chars: &[char], i: usize, delim: char) -> bool {
    if !is_lone(chars, i, delim) {
        return false;
    }
    let Some(next) = chars.get(i + 1) else {
        return false;
    };
    if next.is_whitespace() {
        return false;
    }
    let intraword = delim == '_' && i > 0 && chars[i - 1].is_alphanumeric();
    !intraword
}

fn find_close(chars: &[char], open: usize, delim: char) -> Option<usize> {
    for j in open + 2..chars.len() {
        if chars[j] == '\n' {
            return None;
        }
        if chars[j] != delim || !is_lone(chars, j, delim) || chars[j - 1].is_whitespace() {
            continue;
        }
        let intraword = delim == '_' && chars.get(j + 1).is_some_and(|c| c.is_alphanumeric());
        if !intraword {
            return Some(j);
        }
    }
    None
}

/// List flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Unordered,
    Ordered,
}

impl ListKind {
    fn from_marker(marker: &str) -> Self {
        if marker == "*" || marker == "-" {
            Self::Unordered
        } else {
            Self::Ordered
        }
    }

    const fn open_tag(self) -> &'static str {
        match self {
            Self::Unordered => "<ul>",
            Self::Ordered => "<ol>",
        }
    }

    const fn close_tag(self) -> &'static str {
        match self {
            Self::Unordered => "</ul>",
            Self::Ordered => "</ol>",
        }
    }
}

/// The single open list.
#[derive(Debug, Clone, Copy)]
struct OpenList {
    kind: ListKind,
    indent: usize,
    /// Byte offset in the output just past the last item's `</li>`.
    last_item_end: usize,
}

/// Wraps list lines in `<ul>`/`<ol>` containers and `<li>` items.
///
/// One list is open at a time. A change of kind or of indentation closes it
/// and opens a new one; nothing nests. Other lines pass through unchanged and
/// leave the list open. Closing tags go directly after the last item.
fn lists(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 32);
    let mut open: Option<OpenList> = None;

    for line in text.split_inclusive('\n') {
        let (body, newline) = line
            .strip_suffix('\n')
            .map_or((line, ""), |body| (body, "\n"));

        if let Some(caps) = Pattern::ListItem.regex().captures(body) {
            let indent = caps[1].len();
            let kind = ListKind::from_marker(&caps[2]);

            let continues = open.is_some_and(|list| list.kind == kind && list.indent == indent);
            if !continues {
                if let Some(list) = open.take() {
                    close_list(&mut out, list);
                }
                out.push_str(kind.open_tag());
            }

            out.push_str("<li>");
            out.push_str(&caps[3]);
            out.push_str("</li>");
            open = Some(OpenList {
                kind,
                indent,
                last_item_end: out.len(),
            });
            out.push_str(newline);
        } else {
            out.push_str(line);
        }
    }

    if let Some(list) = open {
        close_list(&mut out, list);
    }

    out
}

fn close_list(out: &mut String, list: OpenList) {
    out.insert_str(list.last_item_end, list.kind.close_tag());
}

/// Turns newlines into `<br>`, except those touching code or list structure.
fn line_breaks(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    for (i, c) in text.char_indices() {
        if c != '\n' {
            out.push(c);
            continue;
        }
        let before = &text[..i];
        let after = &text[i + 1..];
        if is_structural_end(before) || is_structural_start(after) {
            out.push('\n');
        } else {
            out.push_str("<br>");
        }
    }
    out
}

fn is_structural_end(before: &str) -> bool {
    before.ends_with(STASH_CLOSE) || LIST_TAGS.iter().any(|tag| before.ends_with(tag))
}

fn is_structural_start(after: &str) -> bool {
    after.starts_with(STASH_OPEN) || LIST_TAGS.iter().any(|tag| after.starts_with(tag))
}
