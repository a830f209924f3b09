//! PDF text layer via `pdf-extract`, page by page.

use crate::extract::ExtractError;

/// Concatenates the text of every page in page order, with no separator.
pub fn extract_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)?;
    Ok(join_pages(pages))
}

fn join_pages(pages: Vec<String>) -> String {
    pages.concat()
}
