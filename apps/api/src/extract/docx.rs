//! Word (.docx) text layer: one line per body paragraph, in document order.

use docx_rs::{DocumentChild, ParagraphChild, RunChild};

use crate::extract::ExtractError;

/// Joins the text of every body paragraph with `\n`.
/// Empty paragraphs yield empty lines rather than being skipped.
pub fn extract_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let document = docx_rs::read_docx(bytes)?;

    let paragraphs: Vec<String> = document
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(p) => Some(paragraph_text(&p.children)),
            _ => None,
        })
        .collect();

    Ok(paragraphs.join("\n"))
}

fn paragraph_text(children: &[ParagraphChild]) -> String {
    let mut text = String::new();
    for child in children {
        match child {
            ParagraphChild::Run(run) => {
                for node in &run.children {
                    match node {
                        RunChild::Text(t) => text.push_str(&t.text),
                        RunChild::Tab(_) => text.push('\t'),
                        RunChild::Break(_) => text.push('\n'),
                        _ => {}
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => text.push_str(&paragraph_text(&link.children)),
            _ => {}
        }
    }
    text
}
