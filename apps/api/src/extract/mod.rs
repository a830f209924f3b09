//! Text extraction — turns an uploaded PDF or Word document into plain text.
//!
//! Both parsers are CPU-bound and run inside `tokio::task::spawn_blocking`.
//! A panic inside a parser surfaces as `ExtractError::Join` instead of
//! taking the request down.

use bytes::Bytes;
use thiserror::Error;

pub mod docx;
pub mod pdf;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("not a readable PDF: {0}")]
    Pdf(#[from] pdf_extract::OutputError),

    #[error("not a readable Word document: {0}")]
    Docx(#[from] docx_rs::ReaderError),

    #[error("extraction task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// The two document formats the grader accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Picks the format from the declared MIME type, falling back to the
    /// file extension when the browser sent a generic or unknown type.
    pub fn detect(content_type: Option<&str>, file_name: Option<&str>) -> Option<Self> {
        let mime = content_type
            .and_then(|ct| ct.split(';').next())
            .map(|ct| ct.trim().to_ascii_lowercase());

        match mime.as_deref() {
            Some(PDF_MIME) => return Some(DocumentFormat::Pdf),
            Some(DOCX_MIME) => return Some(DocumentFormat::Docx),
            _ => {}
        }

        let extension = file_name
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase())?;

        match extension.as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" => Some(DocumentFormat::Docx),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::Docx => "Word",
        }
    }
}

/// Raised when an upload is neither a PDF nor a .docx file.
#[derive(Debug, Error)]
#[error("'{file_name}' is not a Word (.docx) or PDF document")]
pub struct UnsupportedFormat {
    pub file_name: String,
}

/// A single uploaded file, with its format fixed at upload time.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: String,
    pub format: DocumentFormat,
    pub bytes: Bytes,
}

impl UploadedDocument {
    pub fn new(
        file_name: Option<String>,
        content_type: Option<&str>,
        bytes: Bytes,
    ) -> Result<Self, UnsupportedFormat> {
        let file_name = file_name.unwrap_or_default();
        let format = DocumentFormat::detect(content_type, Some(&file_name))
            .ok_or_else(|| UnsupportedFormat {
                file_name: file_name.clone(),
            })?;

        Ok(Self {
            file_name,
            format,
            bytes,
        })
    }
}

/// Extracts the full text of a document on the blocking pool.
pub async fn extract_text(document: &UploadedDocument) -> Result<String, ExtractError> {
    let bytes = document.bytes.clone();
    let format = document.format;

    tokio::task::spawn_blocking(move || match format {
        DocumentFormat::Pdf => pdf::extract_text(&bytes),
        DocumentFormat::Docx => docx::extract_text(&bytes),
    })
    .await?
}
