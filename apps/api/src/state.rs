use std::sync::Arc;

use crate::config::Config;
use crate::grading::Grader;

/// Shared application state injected into all route handlers via Axum extractors.
/// Immutable for the life of the process; nothing here is per-request.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable grader. Default: LlmGrader.
    pub grader: Arc<dyn Grader>,
}
