//! Document outline extraction
//!
//! Builds the heading tree shown in the sidebar: (level, title, source line,
//! char offset) per ATX heading. The outline is a derived, read-only view —
//! rebuilt from the document text on every content refresh, never edited in
//! place.

use regex::Regex;
use std::sync::OnceLock;

use crate::document::split_front_matter;

// ─────────────────────────────────────────────────────────────────────────────
// OutlineItem
// ─────────────────────────────────────────────────────────────────────────────

/// A single heading in the document outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineItem {
    /// Heading level (1-6 for H1-H6)
    pub level: u8,
    /// The heading text content (marker stripped, trimmed)
    pub title: String,
    /// Line number in the source document (1-indexed)
    pub line: usize,
    /// Byte offset of the heading line in the source document
    pub char_offset: usize,
}

impl OutlineItem {
    /// Get the indentation level (0 for H1, 1 for H2, etc.)
    pub fn indent_level(&self) -> usize {
        (self.level.saturating_sub(1)) as usize
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// DocumentOutline
// ─────────────────────────────────────────────────────────────────────────────

/// A complete document outline containing all headings in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentOutline {
    /// All heading items in document order
    pub items: Vec<OutlineItem>,
}

impl DocumentOutline {
    /// Check if the outline is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Find the index of the heading whose section contains the given
    /// 1-indexed line, or None if the line is before any heading.
    pub fn find_current_section(&self, line: usize) -> Option<usize> {
        let mut result = None;
        for (i, item) in self.items.iter().enumerate() {
            if item.line <= line {
                result = Some(i);
            } else {
                break;
            }
        }
        result
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Extraction
// ─────────────────────────────────────────────────────────────────────────────

fn heading_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(#{1,6})\s+(.+?)\s*#*\s*$").expect("valid regex"))
}

/// Extract the outline from markdown text.
///
/// Front matter and the contents of fenced code blocks are skipped so a
/// `# comment` inside a shell snippet never shows up as a heading.
pub fn extract_outline(text: &str) -> DocumentOutline {
    let split = split_front_matter(text);
    // Lines consumed by the front matter block, for 1-indexed numbering
    let skipped_lines = text[..text.len() - split.body.len()]
        .matches('\n')
        .count();

    let mut items = Vec::new();
    let mut in_code_fence = false;
    let mut offset = text.len() - split.body.len();

    for (i, line) in split.body.lines().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_code_fence = !in_code_fence;
        } else if !in_code_fence {
            if let Some(caps) = heading_regex().captures(line) {
                items.push(OutlineItem {
                    level: caps[1].len() as u8,
                    title: caps[2].to_string(),
                    line: skipped_lines + i + 1,
                    char_offset: offset,
                });
            }
        }
        offset += line.len() + 1;
    }

    DocumentOutline { items }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple_headings() {
        let outline = extract_outline("# One\n\ntext\n\n## Two\n\n### Three\n");
        assert_eq!(outline.items.len(), 3);
        assert_eq!(outline.items[0].level, 1);
        assert_eq!(outline.items[0].title, "One");
        assert_eq!(outline.items[0].line, 1);
        assert_eq!(outline.items[1].level, 2);
        assert_eq!(outline.items[1].line, 5);
        assert_eq!(outline.items[2].level, 3);
    }

    #[test]
    fn test_headings_in_code_fences_ignored() {
        let text = "# Real\n\n```sh\n# not a heading\n```\n\n## Also real\n";
        let outline = extract_outline(text);
        assert_eq!(outline.items.len(), 2);
        assert_eq!(outline.items[1].title, "Also real");
    }

    #[test]
    fn test_front_matter_skipped_and_lines_offset() {
        let text = "---\ntitle: X\n---\n# First\n";
        let outline = extract_outline(text);
        assert_eq!(outline.items.len(), 1);
        // The heading sits on line 4 of the full document
        assert_eq!(outline.items[0].line, 4);
    }

    #[test]
    fn test_char_offset_points_at_heading() {
        let text = "intro\n\n## Target\n";
        let outline = extract_outline(text);
        let item = &outline.items[0];
        assert_eq!(&text[item.char_offset..item.char_offset + 2], "##");
    }

    #[test]
    fn test_trailing_hashes_stripped() {
        let outline = extract_outline("## Closed ##\n");
        assert_eq!(outline.items[0].title, "Closed");
    }

    #[test]
    fn test_hash_without_space_is_not_heading() {
        let outline = extract_outline("#nospace\n");
        assert!(outline.is_empty());
    }

    #[test]
    fn test_find_current_section() {
        let outline = extract_outline("# A\n\ntext\n\n# B\n\nmore\n");
        assert_eq!(outline.find_current_section(1), Some(0));
        assert_eq!(outline.find_current_section(3), Some(0));
        assert_eq!(outline.find_current_section(5), Some(1));
        assert_eq!(outline.find_current_section(7), Some(1));

        let empty = extract_outline("no headings here\n");
        assert_eq!(empty.find_current_section(1), None);
    }
}
