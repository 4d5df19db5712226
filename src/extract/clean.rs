//! Text cleanup shared by the site adapters.

use regex::Regex;
use std::sync::OnceLock;

/// Cleanup patterns used by the adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pattern {
    BlankRun,
    ProblemKeywords,
    ExampleStart,
    ConstraintsColon,
    FollowUp,
    CodeChefIo,
    ConstraintsLine,
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
            Self::BlankRun => static_regex!(BLANK_RUN, r"\n\s*\n"),
            Self::ProblemKeywords => {
                static_regex!(PROBLEM_KEYWORDS, r"(?i)Example|Input|Output|Constraints")
            }
            Self::ExampleStart => static_regex!(EXAMPLE_START, r"Example \d+:\nInput:"),
            Self::ConstraintsColon => static_regex!(CONSTRAINTS_COLON, r"(?s)Constraints:.*\z"),
            Self::FollowUp => static_regex!(FOLLOW_UP, r"(?s)Follow up:.*\z"),
            Self::CodeChefIo => static_regex!(CODECHEF_IO, r"(?s)Input\n.*?Output\n"),
            Self::ConstraintsLine => static_regex!(CONSTRAINTS_LINE, r"(?s)Constraints\n.*\z"),
        }
    }
}

/// Collapses runs of blank lines to exactly one blank line and trims.
#[must_use]
pub fn normalize_blank_lines(text: &str) -> String {
    Pattern::BlankRun.regex().replace_all(text, "\n\n").trim().to_string()
}

/// Replaces literal `&nbsp;` entities with spaces.
#[must_use]
pub fn replace_nbsp(text: &str) -> String {
    text.replace("&nbsp;", " ")
}

/// Returns whether the text mentions any typical problem-statement section.
#[must_use]
pub fn has_problem_keywords(text: &str) -> bool {
    Pattern::ProblemKeywords.regex().is_match(text)
}

/// Strips LeetCode example blocks and the constraints and follow-up tails.
#[must_use]
pub fn strip_leetcode_sections(text: &str) -> String {
    let text = strip_examples(text);
    let text = Pattern::ConstraintsColon.regex().replace(&text, "");
    let text = Pattern::FollowUp.regex().replace(&text, "");
    normalize_blank_lines(&text)
}

/// Strips CodeChef input/output preambles and the constraints tail.
#[must_use]
pub fn strip_codechef_sections(text: &str) -> String {
    let text = Pattern::CodeChefIo.regex().replace_all(text, "");
    let text = Pattern::ConstraintsLine.regex().replace(&text, "");
    normalize_blank_lines(&text)
}

/// Removes every `Example N:` block up to the next `Example` or the end.
///
/// The `regex` crate has no lookahead, so the block end is located by
/// searching for the next `\nExample` after the block's `Output:` marker.
fn strip_examples(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(m) = Pattern::ExampleStart.regex().find(rest) {
        let after_start = &rest[m.end()..];
        let Some(output_at) = after_start.find("Output:") else {
            break;
        };
        let tail = &after_start[output_at + "Output:".len()..];
        let block_len = tail.find("\nExample").unwrap_or(tail.len());
        out.push_str(&rest[..m.start()]);
        rest = &tail[block_len..];
    }
    out.push_str(rest);
    out
}
