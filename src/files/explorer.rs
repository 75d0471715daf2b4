//! File explorer listing
//!
//! Produces the sidebar's directory view: subdirectories and markdown-ish
//! files of one directory, sorted directories-first, hidden entries
//! skipped. Listing is shallow — the tree deepens only as the user
//! navigates, so huge workspaces stay cheap.

use log::warn;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions the explorer considers openable documents.
const DOCUMENT_EXTENSIONS: &[&str] = &["md", "markdown", "mdown", "mkd", "txt"];

/// Kind of a listed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirEntryKind {
    Directory,
    File,
}

/// One row in the file explorer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplorerEntry {
    pub name: String,
    pub path: PathBuf,
    pub kind: DirEntryKind,
}

/// List a directory's subdirectories and documents.
///
/// Directories sort before files; both sort case-insensitively by name.
/// Unreadable entries are skipped with a warning rather than failing the
/// whole listing.
pub fn list_directory(dir: &Path) -> Vec<ExplorerEntry> {
    let mut entries = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                continue;
            }
        };

        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }

        if entry.file_type().is_dir() {
            entries.push(ExplorerEntry {
                name,
                path: entry.path().to_path_buf(),
                kind: DirEntryKind::Directory,
            });
        } else if is_document(entry.path()) {
            entries.push(ExplorerEntry {
                name,
                path: entry.path().to_path_buf(),
                kind: DirEntryKind::File,
            });
        }
    }

    entries.sort_by(|a, b| {
        let kind_order = |k: DirEntryKind| match k {
            DirEntryKind::Directory => 0,
            DirEntryKind::File => 1,
        };
        kind_order(a.kind)
            .cmp(&kind_order(b.kind))
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });

    entries
}

/// Whether a file looks like an openable document.
fn is_document(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| DOCUMENT_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "").unwrap();
    }

    #[test]
    fn test_lists_documents_and_directories() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "notes.md");
        touch(dir.path(), "readme.txt");
        touch(dir.path(), "binary.png");
        fs::create_dir(dir.path().join("sub")).unwrap();

        let entries = list_directory(dir.path());
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["sub", "notes.md", "readme.txt"]);
        assert_eq!(entries[0].kind, DirEntryKind::Directory);
    }

    #[test]
    fn test_hidden_entries_skipped() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), ".hidden.md");
        fs::create_dir(dir.path().join(".git")).unwrap();
        touch(dir.path(), "visible.md");

        let entries = list_directory(dir.path());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "visible.md");
    }

    #[test]
    fn test_sorted_case_insensitively() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "Beta.md");
        touch(dir.path(), "alpha.md");

        let entries = list_directory(dir.path());
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["alpha.md", "Beta.md"]);
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(list_directory(&missing).is_empty());
    }
}
