//! Markdown renderer adapter
//!
//! A thin wrapper around comrak that pins down the one contract the sync
//! engine relies on: `render(markdown) -> html fragment`, pure and
//! deterministic for a fixed option set. The rest of the application never
//! touches comrak directly, so swapping renderers stays a one-file change.

use comrak::{markdown_to_html, Options};

use crate::error::Result;

// ─────────────────────────────────────────────────────────────────────────────
// Options
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for markdown rendering.
///
/// Defaults enable the GitHub-flavored extensions the preview is expected
/// to display: tables, strikethrough, autolinks, task lists, and footnotes.
/// Front matter is recognized (and excluded from output) so a metadata block
/// never renders as a garbled table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Enable GitHub Flavored Markdown tables
    pub tables: bool,
    /// Enable strikethrough syntax (~~text~~)
    pub strikethrough: bool,
    /// Enable autolink URLs and emails
    pub autolink: bool,
    /// Enable task lists (- [ ] and - [x])
    pub tasklist: bool,
    /// Enable footnotes
    pub footnotes: bool,
    /// Front matter delimiter (None disables recognition)
    pub front_matter_delimiter: Option<String>,
    /// Make URLs safe by removing potentially dangerous protocols
    pub safe_urls: bool,
    /// Generate GitHub-style heading IDs with this prefix.
    ///
    /// Off by default: the anchor elements this injects into headings are
    /// invisible noise for the HTML→Markdown conversion.
    pub header_ids: Option<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            tables: true,
            strikethrough: true,
            autolink: true,
            tasklist: true,
            footnotes: true,
            front_matter_delimiter: Some("---".to_string()),
            safe_urls: true,
            header_ids: None,
        }
    }
}

impl RenderOptions {
    /// Convert to comrak Options.
    fn to_comrak_options(&self) -> Options {
        let mut options = Options::default();

        // Extension options
        options.extension.strikethrough = self.strikethrough;
        options.extension.table = self.tables;
        options.extension.autolink = self.autolink;
        options.extension.tasklist = self.tasklist;
        options.extension.footnotes = self.footnotes;
        options.extension.front_matter_delimiter = self.front_matter_delimiter.clone();
        options.extension.header_ids = self.header_ids.clone();

        // Render options
        options.render.unsafe_ = !self.safe_urls;

        options
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rendering
// ─────────────────────────────────────────────────────────────────────────────

/// Render markdown text to an HTML fragment with default options.
///
/// The output is a fragment (no `<html>`/`<body>` wrapper) suitable for the
/// rendered view's content container and for the HTML→Markdown converter.
pub fn render(markdown: &str) -> Result<String> {
    render_with_options(markdown, &RenderOptions::default())
}

/// Render markdown text to an HTML fragment with explicit options.
pub fn render_with_options(markdown: &str, options: &RenderOptions) -> Result<String> {
    let comrak_options = options.to_comrak_options();
    Ok(markdown_to_html(markdown, &comrak_options))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
