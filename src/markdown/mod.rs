//! Markdown processing module
//!
//! This module wraps the comrak renderer behind the narrow contract the sync
//! engine depends on (`render`), and provides the derived read-only views of
//! a document: outline extraction and lint results. Syntax highlighting for
//! fenced code blocks in the preview lives here too.

mod lint;
mod outline;
mod renderer;
pub mod syntax;

pub use lint::{lint_document, LintIssue, LintOptions, LintSeverity};
pub use outline::{extract_outline, DocumentOutline, OutlineItem};
pub use renderer::{render, render_with_options, RenderOptions};
pub use syntax::SyntaxHighlighter;
