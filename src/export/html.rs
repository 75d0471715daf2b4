//! Built-in HTML export
//!
//! Generates a complete standalone HTML document from markdown content with
//! inlined CSS, so HTML export works without pandoc installed. The same
//! fragment generation feeds the clipboard copy path.

use std::path::Path;

use crate::document::split_front_matter;
use crate::error::{Error, Result};
use crate::markdown::render;

// ─────────────────────────────────────────────────────────────────────────────
// HTML Generation
// ─────────────────────────────────────────────────────────────────────────────

/// Generate a complete HTML document from markdown content.
///
/// The front matter block is stripped; `title` lands in `<title>`.
pub fn generate_html_document(markdown: &str, title: Option<&str>) -> Result<String> {
    let body = split_front_matter(markdown).body;
    let html_body = render(body)?;
    let doc_title = title.unwrap_or("Exported Document");

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta name="generator" content="Tandem">
    <title>{title}</title>
    <style>
{css}
    </style>
</head>
<body>
    <article class="markdown-body">
{body}
    </article>
</body>
</html>"#,
        title = html_escape(doc_title),
        css = EXPORT_CSS,
        body = html_body,
    ))
}

/// Generate an HTML fragment (no doctype/head) for the clipboard.
pub fn generate_html_fragment(markdown: &str) -> Result<String> {
    render(split_front_matter(markdown).body)
}

/// Export markdown text to a standalone HTML file.
pub fn export_to_html_file(markdown: &str, output_path: &Path, title: Option<&str>) -> Result<()> {
    let html = generate_html_document(markdown, title)?;
    std::fs::write(output_path, html).map_err(|e| Error::FileWrite {
        path: output_path.to_path_buf(),
        source: e,
    })
}

/// Escape text for embedding in HTML.
fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// ─────────────────────────────────────────────────────────────────────────────
// CSS
// ─────────────────────────────────────────────────────────────────────────────

/// Inlined stylesheet for exported documents.
const EXPORT_CSS: &str = r#"
*, *::before, *::after {
    box-sizing: border-box;
}

body {
    margin: 0;
    padding: 0;
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Noto Sans', Helvetica, Arial, sans-serif;
    font-size: 16px;
    line-height: 1.6;
    color: #24292f;
    background-color: #ffffff;
}

.markdown-body {
    max-width: 900px;
    margin: 0 auto;
    padding: 32px 24px;
}

.markdown-body h1,
.markdown-body h2,
.markdown-body h3,
.markdown-body h4,
.markdown-body h5,
.markdown-body h6 {
    margin-top: 24px;
    margin-bottom: 16px;
    font-weight: 600;
    line-height: 1.25;
}

.markdown-body h1 { font-size: 2em; border-bottom: 1px solid #d8dee4; padding-bottom: 0.3em; }
.markdown-body h2 { font-size: 1.5em; border-bottom: 1px solid #d8dee4; padding-bottom: 0.3em; }
.markdown-body h3 { font-size: 1.25em; }

.markdown-body p {
    margin-top: 0;
    margin-bottom: 16px;
}

.markdown-body a {
    color: #0969da;
    text-decoration: none;
}

.markdown-body a:hover {
    text-decoration: underline;
}

.markdown-body ul,
.markdown-body ol {
    margin-top: 0;
    margin-bottom: 16px;
    padding-left: 2em;
}

.markdown-body li + li {
    margin-top: 4px;
}

.markdown-body code {
    padding: 0.2em 0.4em;
    font-size: 85%;
    background-color: rgba(175, 184, 193, 0.2);
    border-radius: 6px;
    font-family: 'SFMono-Regular', Consolas, 'Liberation Mono', Menlo, monospace;
}

.markdown-body pre {
    padding: 16px;
    overflow: auto;
    font-size: 85%;
    line-height: 1.45;
    background-color: #f6f8fa;
    border-radius: 6px;
    margin-bottom: 16px;
}

.markdown-body pre code {
    background: transparent;
    padding: 0;
}

.markdown-body blockquote {
    padding: 0 1em;
    color: #57606a;
    border-left: 0.25em solid #d0d7de;
    margin: 0 0 16px 0;
}

.markdown-body table {
    border-collapse: collapse;
    margin-bottom: 16px;
    width: 100%;
}

.markdown-body table th,
.markdown-body table td {
    padding: 6px 13px;
    border: 1px solid #d0d7de;
}

.markdown-body table th {
    background-color: #f6f8fa;
    font-weight: 600;
}

.markdown-body img {
    max-width: 100%;
}

.markdown-body hr {
    height: 0.25em;
    padding: 0;
    margin: 24px 0;
    background-color: #d0d7de;
    border: 0;
}
"#;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_generate_document_structure() {
        let html = generate_html_document("# Hello\n\n**Bold**", Some("My Doc")).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>My Doc</title>"));
        assert!(html.contains("<h1>Hello</h1>"));
        assert!(html.contains("<strong>Bold</strong>"));
        assert!(html.contains("markdown-body"));
    }

    #[test]
    fn test_title_is_escaped() {
        let html = generate_html_document("x", Some("a < b & c")).unwrap();
        assert!(html.contains("<title>a &lt; b &amp; c</title>"));
    }

    #[test]
    fn test_front_matter_stripped() {
        let html = generate_html_document("---\ntitle: Secret\n---\n\n# Public\n", None).unwrap();
        assert!(!html.contains("Secret"));
        assert!(html.contains("Public"));
    }

    #[test]
    fn test_fragment_has_no_doctype() {
        let fragment = generate_html_fragment("# H\n").unwrap();
        assert!(!fragment.contains("<!DOCTYPE"));
        assert!(fragment.contains("<h1>H</h1>"));
    }

    #[test]
    fn test_export_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.html");
        export_to_html_file("# File\n", &path, Some("T")).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("<h1>File</h1>"));
    }
}
