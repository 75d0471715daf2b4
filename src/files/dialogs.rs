//! Native file dialog integration using the rfd crate
//!
//! Thin wrappers around the native file picker for opening and saving
//! markdown documents and choosing export targets.

use rfd::FileDialog;
use std::path::{Path, PathBuf};

/// File extension filters for markdown documents.
const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown", "mdown", "mkd"];
const TEXT_EXTENSIONS: &[&str] = &["txt", "text"];

/// Opens a native file dialog for selecting a markdown file.
///
/// Returns `Some(PathBuf)` if a file was selected, `None` if cancelled.
pub fn open_file_dialog(initial_dir: Option<&Path>) -> Option<PathBuf> {
    let mut dialog = FileDialog::new()
        .set_title("Open Markdown File")
        .add_filter("Markdown Files", MARKDOWN_EXTENSIONS)
        .add_filter("Text Files", TEXT_EXTENSIONS)
        .add_filter("All Files", &["*"]);

    if let Some(dir) = initial_dir {
        dialog = dialog.set_directory(dir);
    }

    dialog.pick_file()
}

/// Opens a native save dialog for the document itself.
///
/// Returns `Some(PathBuf)` if a location was selected, `None` if cancelled.
pub fn save_file_dialog(initial_dir: Option<&Path>, default_name: Option<&str>) -> Option<PathBuf> {
    let mut dialog = FileDialog::new()
        .set_title("Save Markdown File")
        .add_filter("Markdown Files", MARKDOWN_EXTENSIONS)
        .add_filter("All Files", &["*"]);

    if let Some(dir) = initial_dir {
        dialog = dialog.set_directory(dir);
    }
    if let Some(name) = default_name {
        dialog = dialog.set_file_name(name);
    }

    dialog.save_file()
}

/// Opens a native save dialog for an export target with a fixed extension.
pub fn save_export_dialog(
    initial_dir: Option<&Path>,
    default_name: &str,
    format_label: &str,
    extension: &str,
) -> Option<PathBuf> {
    let mut dialog = FileDialog::new()
        .set_title(format!("Export as {}", format_label))
        .add_filter(format!("{} Files", format_label), &[extension])
        .set_file_name(default_name);

    if let Some(dir) = initial_dir {
        dialog = dialog.set_directory(dir);
    }

    dialog.save_file()
}
