//! Grading — turns an (essay, rubric) pair into feedback text.
//!
//! `AppState` holds an `Arc<dyn Grader>`; the production backend is `LlmGrader`.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::grading::prompts::{build_grading_prompt, GRADING_SYSTEM};
use crate::llm_client::{LlmClient, LlmError};

pub mod prompts;

/// Prefix shown in front of a failed grading call, in the same pane as real feedback.
pub const ERROR_PREFIX: &str = "An error occurred: ";

/// Implement this to swap grading backends without touching the handlers.
#[async_trait]
pub trait Grader: Send + Sync {
    async fn grade(&self, essay_text: &str, rubric_text: &str) -> Result<String, LlmError>;
}

/// Grades with one chat-completion call. Empty inputs are sent as-is.
pub struct LlmGrader {
    llm: LlmClient,
}

impl LlmGrader {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Grader for LlmGrader {
    async fn grade(&self, essay_text: &str, rubric_text: &str) -> Result<String, LlmError> {
        let prompt = build_grading_prompt(rubric_text, essay_text);
        let started = std::time::Instant::now();

        let result = self.llm.complete(&prompt, GRADING_SYSTEM).await;

        match &result {
            Ok(feedback) => info!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                feedback_chars = feedback.chars().count(),
                "grading call succeeded"
            ),
            Err(e) => warn!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                kind = e.kind(),
                "grading call failed: {e}"
            ),
        }

        result
    }
}

/// Text shown in the results pane: the feedback itself, or the prefixed error description.
pub fn render_feedback(result: &Result<String, LlmError>) -> String {
    match result {
        Ok(feedback) => feedback.clone(),
        Err(e) => format!("{ERROR_PREFIX}{e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::tests::{completion_reply, spawn_completion_stub};

    #[tokio::test]
    async fn test_grade_sends_prompt_with_both_texts() {
        let (url, captured) = spawn_completion_stub(200, completion_reply("Score: 82/100")).await;
        let grader = LlmGrader::new(LlmClient::new("sk-test".to_string(), url));

        let feedback = grader
            .grade("My essay on photosynthesis.", "Clarity: 50 pts")
            .await
            .unwrap();
        assert_eq!(feedback, "Score: 82/100");

        let captured = captured.lock().unwrap();
        let body = captured.body.as_ref().unwrap();
        assert_eq!(body["messages"][0]["content"], GRADING_SYSTEM);
        let user = body["messages"][1]["content"].as_str().unwrap();
        assert_eq!(
            user,
            build_grading_prompt("Clarity: 50 pts", "My essay on photosynthesis.")
        );
    }

    #[tokio::test]
    async fn test_grade_with_empty_inputs_still_calls_model() {
        let (url, captured) = spawn_completion_stub(200, completion_reply("Score: 0")).await;
        let grader = LlmGrader::new(LlmClient::new("sk-test".to_string(), url));

        grader.grade("", "").await.unwrap();

        let captured = captured.lock().unwrap();
        let body = captured.body.as_ref().expect("a call was made");
        assert_eq!(body["messages"][1]["content"], build_grading_prompt("", ""));
    }

    #[tokio::test]
    async fn test_failed_call_renders_with_error_prefix() {
        let (url, _) = spawn_completion_stub(
            429,
            serde_json::json!({ "error": { "message": "quota exhausted" } }),
        )
        .await;
        let grader = LlmGrader::new(LlmClient::new("sk-test".to_string(), url));

        let result = grader.grade("essay", "rubric").await;
        let rendered = render_feedback(&result);
        assert!(rendered.starts_with(ERROR_PREFIX));
        assert!(rendered.contains("quota exhausted"));
    }

    #[test]
    fn test_render_feedback_passes_success_through() {
        let result: Result<String, LlmError> = Ok("Score: 9/10".to_string());
        assert_eq!(render_feedback(&result), "Score: 9/10");
    }

    #[test]
    fn test_render_feedback_includes_error_description() {
        let result: Result<String, LlmError> =
            Err(LlmError::MalformedResponse("no choices".to_string()));
        assert_eq!(
            render_feedback(&result),
            "An error occurred: malformed response: no choices"
        );
    }
}
