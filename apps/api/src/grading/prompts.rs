// Grading prompt templates.
// Rubric and essay text are embedded verbatim; nothing is escaped or truncated.

pub const GRADING_SYSTEM: &str = "You are a homework grading assistant.";

/// Builds the user prompt for a grading call.
///
/// Uses `format!` rather than placeholder replacement so that text which
/// happens to contain a placeholder token is never rewritten.
pub fn build_grading_prompt(rubric_text: &str, essay_text: &str) -> String {
    format!(
        "I am a college level student. Grade the following homework based on this rubric \
         and just output the score:\n{rubric_text}\n\nEssay:\n{essay_text}. \
         Try to avoid giving a perfect grade I am looking for feedback"
    )
}
