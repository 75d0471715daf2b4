//! Document Export Module for Tandem
//!
//! Exporting the current document to other formats. Two paths exist:
//!
//! - **pandoc** (`pandoc.rs`): the external document converter, driving
//!   PDF/DOCX/ODT/EPUB/LaTeX (and HTML, when installed). The document text
//!   is handed over with its front matter stripped; success/failure and the
//!   converter's diagnostic text are the only contract surfaces.
//! - **built-in HTML** (`html.rs`): a standalone HTML document produced by
//!   the crate's own renderer, available with no external tooling. The same
//!   fragment also feeds clipboard copies (`clipboard.rs`).

pub mod clipboard;
pub mod html;
pub mod pandoc;

pub use clipboard::{copy_html_to_clipboard, copy_text_to_clipboard};
pub use html::{export_to_html_file, generate_html_document};
pub use pandoc::{ExportFormat, ExportOutcome, PandocExporter};
