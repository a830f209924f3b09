pub mod grade;
pub mod health;
pub mod page;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // Grading page
        .route("/", get(grade::handle_upload_page))
        .route("/grade", post(grade::handle_grade_form))
        // JSON API
        .route("/api/v1/grade", post(grade::handle_grade_api))
        .layer(body_limit)
        .with_state(state)
}
