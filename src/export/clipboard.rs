//! Clipboard export
//!
//! Copies the rendered HTML (with a plain-text markdown fallback) to the
//! system clipboard via arboard, so formatted content can be pasted into
//! email clients and word processors.

use arboard::Clipboard;
use log::info;

use super::html::generate_html_fragment;
use crate::error::{Error, Result};

/// Copy the document's rendered HTML to the clipboard.
///
/// Platforms with an HTML clipboard format receive both the HTML and the
/// raw markdown as the plain-text alternative.
pub fn copy_html_to_clipboard(markdown: &str) -> Result<()> {
    let html = generate_html_fragment(markdown)?;

    let mut clipboard = Clipboard::new()
        .map_err(|e| Error::Application(format!("Clipboard unavailable: {}", e)))?;
    clipboard
        .set_html(html.as_str(), Some(markdown))
        .map_err(|e| Error::Application(format!("Clipboard write failed: {}", e)))?;

    info!("Copied {} bytes of HTML to clipboard", html.len());
    Ok(())
}

/// Copy plain markdown text to the clipboard.
pub fn copy_text_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = Clipboard::new()
        .map_err(|e| Error::Application(format!("Clipboard unavailable: {}", e)))?;
    clipboard
        .set_text(text)
        .map_err(|e| Error::Application(format!("Clipboard write failed: {}", e)))?;
    Ok(())
}
