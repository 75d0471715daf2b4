//! Markdown writer for parsed HTML trees
//!
//! A recursive visitor that turns the parser's node tree into markdown text.
//! Dispatch is per element tag, with a block-level walk that delegates to an
//! inline walk for phrasing content. Elements with no markdown equivalent
//! are stripped down to their text content; the conversion is lossy by
//! contract, never failing on unexpected structure.

use regex::Regex;
use std::sync::OnceLock;

use super::parser::{Element, HtmlNode};

// ─────────────────────────────────────────────────────────────────────────────
// Entry Point
// ─────────────────────────────────────────────────────────────────────────────

/// Convert a parsed HTML tree to normalized markdown text.
pub fn write_markdown(nodes: &[HtmlNode]) -> String {
    let mut out = String::new();
    write_blocks(nodes, &mut out);
    normalize(&out)
}

/// Collapse runs of 3+ newlines to exactly 2 and trim the ends.
fn normalize(text: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\n{3,}").expect("valid regex"));
    re.replace_all(text, "\n\n").trim().to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// Block-Level Walk
// ─────────────────────────────────────────────────────────────────────────────

fn write_blocks(nodes: &[HtmlNode], out: &mut String) {
    for node in nodes {
        match node {
            HtmlNode::Text(text) => {
                // Inter-tag whitespace is formatting, not content
                if !text.trim().is_empty() {
                    out.push_str(text);
                }
            }
            HtmlNode::Element(el) => write_block_element(el, out),
        }
    }
}

fn write_block_element(el: &Element, out: &mut String) {
    match el.tag.as_str() {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = el.tag[1..].parse::<usize>().unwrap_or(1);
            let text = write_inline_to_string(&el.children);
            out.push_str(&"#".repeat(level));
            out.push(' ');
            out.push_str(text.trim());
            out.push_str("\n\n");
        }
        "p" => {
            let text = write_inline_to_string(&el.children);
            out.push_str(text.trim());
            out.push_str("\n\n");
        }
        "ul" => write_list(el, out, false, 0),
        "ol" => write_list(el, out, true, 0),
        "blockquote" => {
            let mut inner = String::new();
            write_blocks(&el.children, &mut inner);
            for line in normalize(&inner).lines() {
                if line.is_empty() {
                    out.push_str(">\n");
                } else {
                    out.push_str("> ");
                    out.push_str(line);
                    out.push('\n');
                }
            }
            out.push('\n');
        }
        "pre" => write_code_block(el, out),
        "hr" => out.push_str("---\n\n"),
        "br" => out.push('\n'),
        // Inline elements at block level keep their inline rendering
        "strong" | "b" | "em" | "i" | "code" | "del" | "s" | "strike" | "a" | "img"
        | "input" | "span" => write_inline_element(el, out),
        // Table rows become plain text lines; everything else is a
        // transparent container
        "tr" => {
            let mut cells = Vec::new();
            for child in &el.children {
                if let HtmlNode::Element(cell) = child {
                    if matches!(cell.tag.as_str(), "td" | "th") {
                        cells.push(write_inline_to_string(&cell.children).trim().to_string());
                    }
                }
            }
            if !cells.is_empty() {
                out.push_str(&cells.join(" "));
                out.push('\n');
            }
        }
        _ => write_blocks(&el.children, out),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Lists
// ─────────────────────────────────────────────────────────────────────────────

/// Write a list, restarting ordered numbering at 1 regardless of any
/// `start` attribute.
fn write_list(list: &Element, out: &mut String, ordered: bool, depth: usize) {
    let indent = "  ".repeat(depth);
    let mut index = 1;

    for child in &list.children {
        let item = match child {
            HtmlNode::Element(el) if el.tag == "li" => el,
            _ => continue,
        };

        let marker = if ordered {
            format!("{}. ", index)
        } else {
            "- ".to_string()
        };
        index += 1;

        // Item line: everything except nested lists
        let mut line = String::new();
        for item_child in &item.children {
            match item_child {
                HtmlNode::Element(el) if el.tag == "ul" || el.tag == "ol" => {}
                // Loose lists wrap item content in paragraphs
                HtmlNode::Element(el) if el.tag == "p" => {
                    if !line.is_empty() {
                        line.push(' ');
                    }
                    line.push_str(write_inline_to_string(&el.children).trim());
                }
                other => write_inline_node(other, &mut line),
            }
        }
        out.push_str(&indent);
        out.push_str(&marker);
        out.push_str(line.trim());
        out.push('\n');

        // Nested lists after the item line
        for item_child in &item.children {
            if let HtmlNode::Element(el) = item_child {
                match el.tag.as_str() {
                    "ul" => write_list(el, out, false, depth + 1),
                    "ol" => write_list(el, out, true, depth + 1),
                    _ => {}
                }
            }
        }
    }

    // Top-level lists end the block; nested ones flow into their parent
    if depth == 0 {
        out.push('\n');
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Code Blocks
// ─────────────────────────────────────────────────────────────────────────────

/// Write a `<pre>` element as a fenced code block.
///
/// The language comes from a `language-*` class on the inner `<code>`
/// element when present.
fn write_code_block(pre: &Element, out: &mut String) {
    let code_el = pre.children.iter().find_map(|child| match child {
        HtmlNode::Element(el) if el.tag == "code" => Some(el),
        _ => None,
    });

    let language = code_el
        .and_then(|el| el.attr("class"))
        .and_then(|class| {
            class
                .split_whitespace()
                .find_map(|c| c.strip_prefix("language-"))
        })
        .unwrap_or("");

    let literal = match code_el {
        Some(el) => el.text_content(),
        None => pre.text_content(),
    };

    out.push_str("```");
    out.push_str(language);
    out.push('\n');
    out.push_str(&literal);
    if !literal.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("```\n\n");
}

// ─────────────────────────────────────────────────────────────────────────────
// Inline Walk
// ─────────────────────────────────────────────────────────────────────────────

/// Render phrasing content to inline markdown (no block structure).
///
/// Used by the preview pane to derive the editable text form of a block.
pub fn inline_markdown(nodes: &[HtmlNode]) -> String {
    write_inline_to_string(nodes)
}

fn write_inline_to_string(nodes: &[HtmlNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_inline_node(node, &mut out);
    }
    out
}

fn write_inline_node(node: &HtmlNode, out: &mut String) {
    match node {
        HtmlNode::Text(text) => out.push_str(text),
        HtmlNode::Element(el) => write_inline_element(el, out),
    }
}

fn write_inline_element(el: &Element, out: &mut String) {
    match el.tag.as_str() {
        "strong" | "b" => wrap_inline(el, out, "**"),
        "em" | "i" => wrap_inline(el, out, "*"),
        "del" | "s" | "strike" => wrap_inline(el, out, "~~"),
        "code" => {
            out.push('`');
            out.push_str(&el.text_content());
            out.push('`');
        }
        "a" => {
            let text = write_inline_to_string(&el.children);
            // Invisible anchors (heading permalinks) carry nothing
            if text.trim().is_empty() {
                return;
            }
            out.push('[');
            out.push_str(&text);
            out.push_str("](");
            out.push_str(el.attr("href").unwrap_or(""));
            out.push(')');
        }
        "img" => {
            out.push_str("![");
            out.push_str(el.attr("alt").unwrap_or(""));
            out.push_str("](");
            out.push_str(el.attr("src").unwrap_or(""));
            out.push(')');
        }
        "br" => out.push('\n'),
        "input" => {
            if el.attr("type") == Some("checkbox") {
                if el.attr("checked").is_some() {
                    out.push_str("[x]");
                } else {
                    out.push_str("[ ]");
                }
            }
        }
        // Unknown inline markup is stripped to its content
        _ => {
            for child in &el.children {
                write_inline_node(child, out);
            }
        }
    }
}

fn wrap_inline(el: &Element, out: &mut String, delimiter: &str) {
    let text = write_inline_to_string(&el.children);
    if text.is_empty() {
        return;
    }
    out.push_str(delimiter);
    out.push_str(&text);
    out.push_str(delimiter);
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
