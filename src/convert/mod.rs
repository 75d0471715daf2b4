//! HTML → Markdown conversion
//!
//! The structural inverse of the renderer, used when content edited in the
//! rendered view must be normalized back into markdown source. A small
//! tree-building HTML parser feeds a recursive visitor that dispatches on
//! element tag; the conversion is best-effort and intentionally lossy for
//! constructs with no markdown equivalent.

mod parser;
mod writer;

pub use parser::{parse_fragment, Element, HtmlNode};
pub use writer::{inline_markdown, write_markdown};

use crate::error::{Error, Result};

/// Convert a well-formed HTML fragment to markdown text.
///
/// Output is normalized: runs of three or more newlines collapse to exactly
/// two and the ends are trimmed.
///
/// # Errors
///
/// Returns `Error::Convert` when the fragment carried visible text but the
/// conversion produced nothing — the one signal that the derivation went
/// wrong badly enough that the document must not be overwritten.
pub fn html_to_markdown(html: &str) -> Result<String> {
    let nodes = parse_fragment(html);
    let markdown = write_markdown(&nodes);

    if markdown.is_empty() && has_visible_text(&nodes) {
        return Err(Error::Convert(
            "conversion produced no output for a non-empty fragment".to_string(),
        ));
    }

    Ok(markdown)
}

/// Whether the node tree contains any non-whitespace text.
fn has_visible_text(nodes: &[HtmlNode]) -> bool {
    nodes.iter().any(|node| match node {
        HtmlNode::Text(t) => !t.trim().is_empty(),
        HtmlNode::Element(el) => has_visible_text(&el.children),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
