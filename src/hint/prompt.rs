//! Prompt construction.

use super::level::ClueLevel;

/// Builds the single instruction prompt sent for a problem.
///
/// # Examples
///
/// ```
/// use cluekit::hint::{ClueLevel, build_prompt};
///
/// let prompt = build_prompt(ClueLevel::Generic, "Reverse a linked list.");
/// assert!(prompt.starts_with("Provide a simple, optimal, and concise coding clue."));
/// assert!(prompt.ends_with("Problem:\nReverse a linked list.\n\nClue:"));
/// ```
#[must_use]
pub fn build_prompt(level: ClueLevel, problem: &str) -> String {
    format!(
        "{instruction}\n\nProblem:\n{problem}\n\nClue:",
        instruction = level.instruction()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problem_text_is_literal() {
        let problem = "Given `nums`, return **the** sum.\n\nExample 1: ...";
        let prompt = build_prompt(ClueLevel::DetailedInsight, problem);
        assert!(prompt.contains(problem));
        assert!(prompt.starts_with(ClueLevel::DetailedInsight.instruction()));
    }
}
