//! Server-rendered HTML for the single grading page.

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};

pub const TITLE: &str = "AutoGrader";
pub const SUBHEADER: &str = "Upload your homework and your rubric and get a projected score \
    with feedback on what to improve on.";
pub const ESSAY_LABEL: &str = "Upload your homework (Word or PDF)";
pub const RUBRIC_LABEL: &str = "Upload your rubric (Word or PDF)";

const ACCEPTED_TYPES: &str = ".docx,.pdf,application/pdf,\
    application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const STYLE: &str = "\
body { font-family: system-ui, sans-serif; max-width: 52rem; margin: 2rem auto; padding: 0 1rem; color: #262730; }
h1 { margin-bottom: 0.25rem; }
label { display: block; margin: 1rem 0 0.25rem; font-weight: 600; }
button { margin-top: 1.25rem; padding: 0.5rem 1.25rem; }
pre { background: #f0f2f6; padding: 1rem; white-space: pre-wrap; word-wrap: break-word; }
.feedback { line-height: 1.5; }
.feedback.error { white-space: pre-wrap; }
.warning { background: #fffce7; border-left: 4px solid #ffbd45; padding: 0.75rem 1rem; margin-top: 1.5rem; }
.error { color: #b00020; }";

/// Rendered content of a completed grading run.
pub struct ResultsView<'a> {
    pub essay_text: &'a str,
    pub rubric_text: &'a str,
    pub feedback: &'a str,
    pub feedback_is_error: bool,
}

/// The landing page: title, subheader, both upload widgets and the initial warning.
pub fn render_upload_page() -> String {
    render_warning_page(crate::errors::MISSING_UPLOADS_WARNING)
}

pub fn render_warning_page(message: &str) -> String {
    layout(&format!(
        "<div class=\"warning\">{}</div>",
        escape_html(message)
    ))
}

pub fn render_results_page(view: &ResultsView<'_>) -> String {
    // Error text is shown as-is; model feedback is Markdown.
    let (feedback_class, feedback_html) = if view.feedback_is_error {
        ("feedback error", escape_html(view.feedback))
    } else {
        ("feedback", render_markdown(view.feedback))
    };

    layout(&format!(
        "<h3>Essay Text</h3>\n<pre>{}</pre>\n\
         <h3>Rubric Text</h3>\n<pre>{}</pre>\n\
         <h3>Grading Results</h3>\n<div class=\"{feedback_class}\">{feedback_html}</div>",
        escape_html(view.essay_text),
        escape_html(view.rubric_text),
    ))
}

fn layout(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{TITLE}</title>\n<style>\n{STYLE}\n</style>\n</head>\n<body>\n\
         <h1>{TITLE}</h1>\n<h3>{SUBHEADER}</h3>\n{form}\n{body}\n</body>\n</html>\n",
        form = upload_form(),
    )
}

fn upload_form() -> String {
    format!(
        "<form method=\"post\" action=\"/grade\" enctype=\"multipart/form-data\">\n\
         <label for=\"essay\">{ESSAY_LABEL}</label>\n\
         <input type=\"file\" id=\"essay\" name=\"essay\" accept=\"{ACCEPTED_TYPES}\">\n\
         <label for=\"rubric\">{RUBRIC_LABEL}</label>\n\
         <input type=\"file\" id=\"rubric\" name=\"rubric\" accept=\"{ACCEPTED_TYPES}\">\n\
         <button type=\"submit\">Grade</button>\n</form>"
    )
}

/// Renders Markdown to HTML. Raw HTML in the source is emitted as escaped text
/// and link targets with scripting schemes are dropped.
fn render_markdown(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let events = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        other => other,
    });

    let mut rendered = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut rendered, events);
    rendered
}

/// Keeps relative URLs and http(s)/mailto links; anything else becomes `#`.
fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    let scheme = url
        .split_once(':')
        // Browsers ignore embedded whitespace and control characters in schemes.
        .map(|(scheme, _)| {
            scheme
                .chars()
                .filter(|c| !c.is_ascii_whitespace() && !c.is_ascii_control())
                .collect::<String>()
                .to_ascii_lowercase()
        })
        .filter(|scheme| {
            !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        });

    match scheme.as_deref() {
        None | Some("http") | Some("https") | Some("mailto") => url,
        Some(_) => CowStr::Borrowed("#"),
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<b>A & B</b> \"q\" 'x'"),
            "&lt;b&gt;A &amp; B&lt;/b&gt; &quot;q&quot; &#39;x&#39;"
        );
    }

    #[test]
    fn test_upload_page_has_both_widgets() {
        let html = render_upload_page();
        assert!(html.contains("<h1>AutoGrader</h1>"));
        assert!(html.contains(SUBHEADER));
        assert!(html.contains("name=\"essay\""));
        assert!(html.contains("name=\"rubric\""));
        assert!(html.contains(ESSAY_LABEL));
        assert!(html.contains(RUBRIC_LABEL));
        assert!(html.contains("Please upload both the homework and the rubric."));
    }

    #[test]
    fn test_results_page_escapes_extracted_text() {
        let html = render_results_page(&ResultsView {
            essay_text: "x < y",
            rubric_text: "<script>alert(1)</script>",
            feedback: "Score: 8/10",
            feedback_is_error: false,
        });
        assert!(html.contains("<pre>x &lt; y</pre>"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("<div class=\"feedback\"><p>Score: 8/10</p>"));
    }

    #[test]
    fn test_feedback_markdown_is_rendered() {
        let html = render_results_page(&ResultsView {
            essay_text: "",
            rubric_text: "",
            feedback: "**Score**: 7/10\n\n- Tighten the thesis\n- Cite sources",
            feedback_is_error: false,
        });
        assert!(html.contains("<strong>Score</strong>: 7/10"));
        assert!(html.contains("<li>Tighten the thesis</li>"));
        assert!(!html.contains("**Score**"));
    }

    #[test]
    fn test_feedback_raw_html_stays_escaped() {
        let rendered = render_markdown(
            "**Score**: 5\n\n<script>alert(1)</script>\n\nInline <img src=x onerror=alert(1)> tag",
        );
        assert!(rendered.contains("<strong>Score</strong>"));
        assert!(!rendered.contains("<script>"));
        assert!(rendered.contains("&lt;script&gt;"));
        assert!(!rendered.contains("<img"));
    }

    #[test]
    fn test_feedback_script_links_are_neutralised() {
        let rendered = render_markdown("[click](javascript:alert(1)) and [docs](https://example.com)");
        assert!(!rendered.contains("javascript:"));
        assert!(rendered.contains("href=\"#\""));
        assert!(rendered.contains("href=\"https://example.com\""));
    }

    #[test]
    fn test_error_feedback_is_not_markdown() {
        let html = render_results_page(&ResultsView {
            essay_text: "",
            rubric_text: "",
            feedback: "An error occurred: **boom** <b>",
            feedback_is_error: true,
        });
        assert!(html.contains("An error occurred: **boom** &lt;b&gt;"));
    }

    #[test]
    fn test_results_page_marks_errors() {
        let html = render_results_page(&ResultsView {
            essay_text: "",
            rubric_text: "",
            feedback: "An error occurred: network error",
            feedback_is_error: true,
        });
        assert!(html.contains("class=\"feedback error\""));
    }
}
