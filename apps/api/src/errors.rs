use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extract::{ExtractError, UnsupportedFormat};

pub const MISSING_UPLOADS_WARNING: &str = "Please upload both the homework and the rubric.";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Grading failures are not here: they belong to a successful response and
/// are rendered in the feedback pane.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{}", MISSING_UPLOADS_WARNING)]
    MissingUploads,

    #[error("Upload rejected: {message}")]
    Upload { status: StatusCode, message: String },

    #[error(transparent)]
    UnsupportedFormat(#[from] UnsupportedFormat),

    #[error("Could not read the {document}: {source}")]
    Extraction {
        document: &'static str,
        #[source]
        source: ExtractError,
    },
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingUploads => StatusCode::BAD_REQUEST,
            AppError::Upload { status, .. } => *status,
            AppError::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::Extraction { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::MissingUploads => "MISSING_UPLOADS",
            AppError::Upload { .. } => "UPLOAD_ERROR",
            AppError::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            AppError::Extraction { .. } => "EXTRACTION_ERROR",
        }
    }

    /// Message shown to the person who uploaded the files.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Extraction { document, .. } => format!(
                "Could not read the {document}. Make sure it is a valid Word (.docx) or PDF file."
            ),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Extraction { document, source } = &self {
            tracing::warn!("Extraction failed for {document}: {source}");
        }

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": self.user_message()
            }
        }));

        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_uploads_message() {
        let err = AppError::MissingUploads;
        assert_eq!(err.user_message(), "Please upload both the homework and the rubric.");
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_upload_keeps_its_status() {
        let err = AppError::Upload {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            message: "too big".to_string(),
        };
        assert_eq!(err.into_response().status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_unsupported_format_maps_to_415() {
        let err = AppError::from(UnsupportedFormat {
            file_name: "notes.txt".to_string(),
        });
        assert!(err.user_message().contains("notes.txt"));
        assert_eq!(err.into_response().status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[test]
    fn test_extraction_names_the_document() {
        let source = crate::extract::docx::extract_text(b"garbage").unwrap_err();
        let err = AppError::Extraction {
            document: "rubric",
            source,
        };
        assert!(err.user_message().contains("rubric"));
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
