//! Document model for Tandem
//!
//! The `Document` is the single persistent truth of an editing session: the
//! raw markdown text, its dirty flag, and the optional file path it came
//! from. Both views render or edit derived copies; only the sync controller
//! writes the document back.

mod front_matter;
mod stats;

pub use front_matter::{
    split_front_matter, DocMetadata, FrontMatterSplit, generate_front_matter,
    update_front_matter,
};
pub use stats::TextStats;

use crate::error::{Error, Result};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

// ─────────────────────────────────────────────────────────────────────────────
// Document
// ─────────────────────────────────────────────────────────────────────────────

/// The logical document: a single mutable sequence of characters.
///
/// Invariant: the text here is the only persistent state. The rendered view
/// is regenerated from it and discarded on every push, never merged.
#[derive(Debug, Clone, Default)]
pub struct Document {
    /// Raw markdown text, including any front matter block
    text: String,
    /// Whether the text differs from what is on disk
    dirty: bool,
    /// Backing file (None for unsaved documents)
    path: Option<PathBuf>,
}

impl Document {
    /// Create an empty, unsaved document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document from in-memory text (unsaved).
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            dirty: false,
            path: None,
        }
    }

    /// Load a document from a UTF-8 markdown file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        info!("Loaded {} ({} bytes)", path.display(), text.len());
        Ok(Self {
            text,
            dirty: false,
            path: Some(path.to_path_buf()),
        })
    }

    /// The current text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The document body with any front matter block removed.
    pub fn body(&self) -> &str {
        split_front_matter(&self.text).body
    }

    /// Replace the text, marking the document dirty if it changed.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text != self.text {
            self.text = text;
            self.dirty = true;
        }
    }

    /// Replace the body while preserving the front matter block verbatim.
    ///
    /// This is the write path for content pulled back from the rendered
    /// view: the converter only ever sees the body, so the metadata block
    /// must be spliced back on unchanged.
    pub fn set_body(&mut self, body: &str) {
        let new_text = match split_front_matter(&self.text).raw {
            Some(raw) => format!("{}\n{}", raw, body),
            None => body.to_string(),
        };
        self.set_text(new_text);
    }

    /// Whether there are unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The backing file path, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Display name for the title bar ("Untitled" when unsaved).
    pub fn title(&self) -> String {
        let name = self
            .path
            .as_ref()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or("Untitled");
        if self.dirty {
            format!("{}*", name)
        } else {
            name.to_string()
        }
    }

    /// Save to the current path.
    ///
    /// # Errors
    ///
    /// Returns `Error::Application` if the document has no path yet
    /// (callers should route through Save As), or `Error::FileWrite` on
    /// I/O failure.
    pub fn save(&mut self) -> Result<()> {
        let path = self
            .path
            .clone()
            .ok_or_else(|| Error::Application("Document has no file path".to_string()))?;
        self.save_as(&path)
    }

    /// Save to a specific path, adopting it as the document's path.
    pub fn save_as(&mut self, path: &Path) -> Result<()> {
        fs::write(path, &self.text).map_err(|e| Error::FileWrite {
            path: path.to_path_buf(),
            source: e,
        })?;
        debug!("Saved {} ({} bytes)", path.display(), self.text.len());
        self.path = Some(path.to_path_buf());
        self.dirty = false;
        Ok(())
    }

    /// Parse metadata out of the front matter block, if present.
    pub fn metadata(&self) -> DocMetadata {
        split_front_matter(&self.text)
            .parse_metadata()
            .unwrap_or_default()
    }

    /// Replace the front matter block from metadata, leaving the body as is.
    pub fn apply_metadata(&mut self, metadata: &DocMetadata) {
        let updated = update_front_matter(&self.text, metadata);
        self.set_text(updated);
    }

    /// Compute word/character/paragraph statistics over the body.
    pub fn stats(&self) -> TextStats {
        TextStats::of(self.body())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_new_document_is_clean() {
        let doc = Document::new();
        assert!(!doc.is_dirty());
        assert!(doc.path().is_none());
        assert_eq!(doc.title(), "Untitled");
    }

    #[test]
    fn test_set_text_marks_dirty() {
        let mut doc = Document::new();
        doc.set_text("# Hello");
        assert!(doc.is_dirty());
        assert_eq!(doc.text(), "# Hello");
    }

    #[test]
    fn test_set_identical_text_keeps_clean() {
        let mut doc = Document::with_text("# Hello");
        doc.set_text("# Hello");
        assert!(!doc.is_dirty());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("note.md");

        let mut doc = Document::with_text("# Title\n\nBody text.\n");
        doc.set_text("# Title\n\nEdited body.\n");
        doc.save_as(&path).unwrap();
        assert!(!doc.is_dirty());
        assert_eq!(doc.path(), Some(path.as_path()));

        let loaded = Document::load(&path).unwrap();
        assert_eq!(loaded.text(), "# Title\n\nEdited body.\n");
        assert!(!loaded.is_dirty());
    }

    #[test]
    fn test_load_missing_file_errors() {
        let dir = TempDir::new().unwrap();
        let result = Document::load(&dir.path().join("missing.md"));
        assert!(matches!(result, Err(Error::FileRead { .. })));
    }

    #[test]
    fn test_save_without_path_errors() {
        let mut doc = Document::with_text("x");
        assert!(matches!(doc.save(), Err(Error::Application(_))));
    }

    #[test]
    fn test_title_shows_dirty_marker() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("note.md");
        let mut doc = Document::with_text("x");
        doc.save_as(&path).unwrap();
        assert_eq!(doc.title(), "note.md");
        doc.set_text("y");
        assert_eq!(doc.title(), "note.md*");
    }

    #[test]
    fn test_body_strips_front_matter() {
        let doc = Document::with_text("---\ntitle: T\n---\n\n# Heading\n");
        assert_eq!(doc.body(), "# Heading\n");
        assert_eq!(doc.metadata().title, "T");
    }

    #[test]
    fn test_set_body_preserves_front_matter() {
        let mut doc = Document::with_text("---\ntitle: T\ncustom: kept\n---\n\nold body\n");
        doc.set_body("new body\n");
        assert_eq!(doc.text(), "---\ntitle: T\ncustom: kept\n---\n\nnew body\n");
        assert!(doc.is_dirty());
    }

    #[test]
    fn test_set_body_without_front_matter() {
        let mut doc = Document::with_text("old\n");
        doc.set_body("new\n");
        assert_eq!(doc.text(), "new\n");
    }
}
