//! Front matter handling
//!
//! Markdown files may begin with a YAML metadata block delimited by lines
//! consisting solely of `---`. The sync core treats that block as opaque
//! leading text; only this module looks inside it. Splitting is lossless:
//! the raw block is carried verbatim so a round trip through the editor
//! cannot corrupt user metadata it does not understand.

use log::warn;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

// ─────────────────────────────────────────────────────────────────────────────
// Metadata
// ─────────────────────────────────────────────────────────────────────────────

/// Document front matter properties.
///
/// Unknown keys are preserved in `custom` so regenerating the block keeps
/// fields the dialog does not expose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DocMetadata {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub author: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub date: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub draft: bool,
    #[serde(flatten)]
    pub custom: BTreeMap<String, serde_yaml::Value>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl DocMetadata {
    /// Whether any field carries a value worth serializing.
    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.author.is_empty()
            && self.date.is_empty()
            && self.description.is_empty()
            && self.tags.is_empty()
            && self.categories.is_empty()
            && !self.draft
            && self.custom.is_empty()
    }

    /// Validate field formats, returning human-readable issues.
    pub fn validate(&self) -> Vec<String> {
        static DATE_RE: OnceLock<Regex> = OnceLock::new();
        let date_re =
            DATE_RE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"));

        let mut issues = Vec::new();
        if !self.date.is_empty() && !date_re.is_match(&self.date) {
            issues.push("Date should be in YYYY-MM-DD format".to_string());
        }
        issues
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Splitting
// ─────────────────────────────────────────────────────────────────────────────

/// The result of splitting a document into front matter and body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontMatterSplit<'a> {
    /// The complete front matter block, delimiters included, or None
    pub raw: Option<&'a str>,
    /// The YAML between the delimiters (without them)
    pub yaml: Option<&'a str>,
    /// The document body (leading blank lines after the block stripped)
    pub body: &'a str,
}

impl<'a> FrontMatterSplit<'a> {
    /// Parse the YAML block into metadata.
    ///
    /// Returns None when there is no block or the YAML is invalid; an
    /// invalid block is logged and otherwise left untouched.
    pub fn parse_metadata(&self) -> Option<DocMetadata> {
        let yaml = self.yaml?;
        if yaml.trim().is_empty() {
            return Some(DocMetadata::default());
        }
        match serde_yaml::from_str::<DocMetadata>(yaml) {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                warn!("Front matter is not valid YAML: {}", e);
                None
            }
        }
    }
}

/// Split text into an optional front matter block and the body.
///
/// A block exists only when the very first line is exactly `---` and a later
/// line is exactly `---` (trailing whitespace tolerated). Anything else —
/// including an unterminated opening delimiter — is treated as body text.
pub fn split_front_matter(text: &str) -> FrontMatterSplit<'_> {
    let no_front_matter = FrontMatterSplit {
        raw: None,
        yaml: None,
        body: text,
    };

    let first_line_end = match text.find('\n') {
        Some(i) => i,
        None => return no_front_matter,
    };
    if text[..first_line_end].trim_end() != "---" {
        return no_front_matter;
    }

    // Scan for the closing delimiter line
    let after_open = first_line_end + 1;
    let mut offset = after_open;
    for line in text[after_open..].split_inclusive('\n') {
        let line_body = line.strip_suffix('\n').unwrap_or(line);
        if line_body.trim_end() == "---" {
            let block_end = offset + line.len();
            let body = text[block_end..].trim_start_matches('\n');
            return FrontMatterSplit {
                raw: Some(&text[..block_end]),
                yaml: Some(&text[after_open..offset]),
                body,
            };
        }
        offset += line.len();
    }

    no_front_matter
}

// ─────────────────────────────────────────────────────────────────────────────
// Generation
// ─────────────────────────────────────────────────────────────────────────────

/// Generate a front matter block (with delimiters and a trailing blank line)
/// from metadata. Returns an empty string when there is nothing to write.
pub fn generate_front_matter(metadata: &DocMetadata) -> String {
    if metadata.is_empty() {
        return String::new();
    }

    match serde_yaml::to_string(metadata) {
        Ok(yaml) => format!("---\n{}---\n\n", yaml),
        Err(e) => {
            warn!("Failed to serialize front matter: {}", e);
            String::new()
        }
    }
}

/// Replace (or insert, or remove) the front matter block of `text` according
/// to `metadata`, leaving the body untouched.
pub fn update_front_matter(text: &str, metadata: &DocMetadata) -> String {
    let split = split_front_matter(text);
    let block = generate_front_matter(metadata);
    format!("{}{}", block, split.body)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_no_front_matter() {
        let split = split_front_matter("# Hello\n\nWorld");
        assert!(split.raw.is_none());
        assert_eq!(split.body, "# Hello\n\nWorld");
    }

    #[test]
    fn test_split_with_front_matter() {
        let text = "---\ntitle: Test\ntags:\n  - a\n---\n\n# Hello\n";
        let split = split_front_matter(text);
        assert_eq!(split.raw, Some("---\ntitle: Test\ntags:\n  - a\n---\n"));
        assert_eq!(split.yaml, Some("title: Test\ntags:\n  - a\n"));
        assert_eq!(split.body, "# Hello\n");
    }

    #[test]
    fn test_split_unterminated_block_is_body() {
        let text = "---\ntitle: Broken\n\n# Hello";
        let split = split_front_matter(text);
        assert!(split.raw.is_none());
        assert_eq!(split.body, text);
    }

    #[test]
    fn test_split_dashes_mid_document_are_not_front_matter() {
        let text = "# Hello\n\n---\n\nrule above";
        let split = split_front_matter(text);
        assert!(split.raw.is_none());
    }

    #[test]
    fn test_parse_metadata_fields() {
        let text = "---\ntitle: My Doc\nauthor: Someone\ndate: 2025-01-18\ntags:\n  - md\n  - sync\ndraft: true\n---\nbody";
        let metadata = split_front_matter(text).parse_metadata().unwrap();
        assert_eq!(metadata.title, "My Doc");
        assert_eq!(metadata.author, "Someone");
        assert_eq!(metadata.tags, vec!["md", "sync"]);
        assert!(metadata.draft);
    }

    #[test]
    fn test_parse_metadata_preserves_unknown_keys() {
        let text = "---\ntitle: T\nlayout: post\n---\nbody";
        let metadata = split_front_matter(text).parse_metadata().unwrap();
        assert_eq!(
            metadata.custom.get("layout"),
            Some(&serde_yaml::Value::String("post".to_string()))
        );
    }

    #[test]
    fn test_parse_invalid_yaml_returns_none() {
        let text = "---\ntitle: [unclosed\n---\nbody";
        assert!(split_front_matter(text).parse_metadata().is_none());
    }

    #[test]
    fn test_generate_empty_metadata_is_empty() {
        assert_eq!(generate_front_matter(&DocMetadata::default()), "");
    }

    #[test]
    fn test_generate_and_reparse() {
        let metadata = DocMetadata {
            title: "Round".to_string(),
            tags: vec!["one".to_string(), "two".to_string()],
            ..DocMetadata::default()
        };
        let block = generate_front_matter(&metadata);
        assert!(block.starts_with("---\n"));
        assert!(block.ends_with("---\n\n"));

        let reparsed = split_front_matter(&block).parse_metadata().unwrap();
        assert_eq!(reparsed, metadata);
    }

    #[test]
    fn test_update_front_matter_keeps_body() {
        let text = "---\ntitle: Old\n---\n\n# Body heading\n\ntext\n";
        let metadata = DocMetadata {
            title: "New".to_string(),
            ..DocMetadata::default()
        };
        let updated = update_front_matter(text, &metadata);
        assert!(updated.contains("title: New"));
        assert!(updated.ends_with("# Body heading\n\ntext\n"));
        assert!(!updated.contains("Old"));
    }

    #[test]
    fn test_update_removes_block_for_empty_metadata() {
        let text = "---\ntitle: Old\n---\n\nbody\n";
        let updated = update_front_matter(text, &DocMetadata::default());
        assert_eq!(updated, "body\n");
    }

    #[test]
    fn test_validate_date_format() {
        let mut metadata = DocMetadata::default();
        metadata.date = "January 5".to_string();
        assert_eq!(metadata.validate().len(), 1);

        metadata.date = "2025-01-05".to_string();
        assert!(metadata.validate().is_empty());
    }
}
