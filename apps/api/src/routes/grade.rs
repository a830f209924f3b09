//! Axum route handlers for the grading page and its JSON twin.
//!
//! Both handlers share one pipeline: read uploads → extract both texts → grade.
//! Missing or unreadable uploads stop the pipeline before the grader is called.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::{extract_text, UploadedDocument};
use crate::grading::render_feedback;
use crate::llm_client::LlmError;
use crate::routes::page::{self, ResultsView};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// A file part as received, before its format is checked.
#[derive(Debug)]
pub struct RawUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl RawUpload {
    fn into_document(self) -> Result<UploadedDocument, AppError> {
        Ok(UploadedDocument::new(
            self.file_name,
            self.content_type.as_deref(),
            self.bytes,
        )?)
    }
}

#[derive(Debug, Default)]
pub struct Submission {
    pub essay: Option<RawUpload>,
    pub rubric: Option<RawUpload>,
}

/// Outcome of a full grading run. `feedback` carries the grader's typed result.
#[derive(Debug)]
pub struct GradedSubmission {
    pub request_id: Uuid,
    pub essay_text: String,
    pub rubric_text: String,
    pub feedback: Result<String, LlmError>,
    pub graded_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FeedbackBody {
    Ok { text: String },
    Error { kind: &'static str, text: String },
}

#[derive(Debug, Serialize)]
pub struct GradeResponse {
    pub request_id: Uuid,
    pub essay_text: String,
    pub rubric_text: String,
    pub feedback: FeedbackBody,
    pub graded_at: DateTime<Utc>,
}

impl From<GradedSubmission> for GradeResponse {
    fn from(graded: GradedSubmission) -> Self {
        let feedback = match &graded.feedback {
            Ok(text) => FeedbackBody::Ok { text: text.clone() },
            Err(e) => FeedbackBody::Error {
                kind: e.kind(),
                text: render_feedback(&graded.feedback),
            },
        };

        GradeResponse {
            request_id: graded.request_id,
            essay_text: graded.essay_text,
            rubric_text: graded.rubric_text,
            feedback,
            graded_at: graded.graded_at,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /
pub async fn handle_upload_page() -> Html<String> {
    Html(page::render_upload_page())
}

/// POST /grade
///
/// Renders the results page. Problems with the uploads render as a warning
/// on the same page instead of an error document.
pub async fn handle_grade_form(State(state): State<AppState>, multipart: Multipart) -> Response {
    let outcome = match read_submission(multipart).await {
        Ok(submission) => grade_submission(&state, submission).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(graded) => {
            let feedback = render_feedback(&graded.feedback);
            Html(page::render_results_page(&ResultsView {
                essay_text: &graded.essay_text,
                rubric_text: &graded.rubric_text,
                feedback: &feedback,
                feedback_is_error: graded.feedback.is_err(),
            }))
            .into_response()
        }
        Err(AppError::MissingUploads) => {
            Html(page::render_warning_page(&AppError::MissingUploads.user_message()))
                .into_response()
        }
        Err(e) => (e.status(), Html(page::render_warning_page(&e.user_message()))).into_response(),
    }
}

/// POST /api/v1/grade
pub async fn handle_grade_api(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<GradeResponse>, AppError> {
    let submission = read_submission(multipart).await?;
    let graded = grade_submission(&state, submission).await?;
    Ok(Json(graded.into()))
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Collects the `essay` and `rubric` file parts. Other parts are ignored.
///
/// A part with no file name and no content is what a browser sends for an
/// untouched file input; it counts as absent.
pub async fn read_submission(mut multipart: Multipart) -> Result<Submission, AppError> {
    let mut submission = Submission::default();

    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        let name = field.name().unwrap_or("").to_string();
        if name != "essay" && name != "rubric" {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(upload_error)?;

        let untouched = bytes.is_empty() && file_name.as_deref().map_or(true, str::is_empty);
        if untouched {
            continue;
        }

        let upload = RawUpload {
            file_name,
            content_type,
            bytes,
        };
        if name == "essay" {
            submission.essay = Some(upload);
        } else {
            submission.rubric = Some(upload);
        }
    }

    Ok(submission)
}

/// Runs one submission end to end. Exactly one grading call is made when
/// both documents are present and readable; none otherwise.
pub async fn grade_submission(
    state: &AppState,
    submission: Submission,
) -> Result<GradedSubmission, AppError> {
    let (Some(essay), Some(rubric)) = (submission.essay, submission.rubric) else {
        info!("Submission missing essay or rubric; skipping grading");
        return Err(AppError::MissingUploads);
    };

    let request_id = Uuid::new_v4();
    let span = info_span!("grade_submission", %request_id);

    async move {
        let essay = essay.into_document()?;
        let rubric = rubric.into_document()?;
        info!(
            essay_file = %essay.file_name,
            essay_format = essay.format.label(),
            essay_bytes = essay.bytes.len(),
            rubric_file = %rubric.file_name,
            rubric_format = rubric.format.label(),
            rubric_bytes = rubric.bytes.len(),
            "Extracting uploaded documents"
        );

        let essay_text = extract_text(&essay)
            .await
            .map_err(|source| AppError::Extraction {
                document: "homework",
                source,
            })?;
        let rubric_text = extract_text(&rubric)
            .await
            .map_err(|source| AppError::Extraction {
                document: "rubric",
                source,
            })?;
        info!(
            essay_chars = essay_text.chars().count(),
            rubric_chars = rubric_text.chars().count(),
            "Extraction complete"
        );

        let feedback = state.grader.grade(&essay_text, &rubric_text).await;

        Ok::<_, AppError>(GradedSubmission {
            request_id,
            essay_text,
            rubric_text,
            feedback,
            graded_at: Utc::now(),
        })
    }
    .instrument(span)
    .await
}

fn upload_error(e: MultipartError) -> AppError {
    let status = e.status();
    AppError::Upload {
        status: if status.is_client_error() {
            status
        } else {
            StatusCode::BAD_REQUEST
        },
        message: e.body_text(),
    }
}
