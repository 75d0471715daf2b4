//! Bidirectional synchronization engine
//!
//! The core of Tandem: a single authority that keeps the plain-text source
//! buffer and the rendered HTML preview behaving as one document. Two
//! independently-editable representations, user or programmatic edits on
//! either side, and the re-entrancy discipline that makes them converge
//! without feedback loops, data loss, or viewport jumps.
//!
//! Layout:
//! - [`view`] — the capability set both views implement
//! - [`controller`] — the state machine that owns the document and routes
//!   every change
//! - [`debounce`] — input-coalescing timers
//! - [`position`] — scroll-ratio and line-to-block mapping
//! - [`mode`] — which view is writable

mod controller;
mod debounce;
mod mode;
mod position;
mod view;

pub use controller::{SyncController, SyncEvent, SyncState};
pub use debounce::Debouncer;
pub use mode::{EditorMode, ModeManager};
pub use position::{block_index_for_line, offset_for_ratio, scroll_ratio};
pub use view::{PushId, PushOutcome, SyncableView, ViewKind};

// ─────────────────────────────────────────────────────────────────────────────
// Change-Suppression Normalization
// ─────────────────────────────────────────────────────────────────────────────

/// Normalize text for the "did anything meaningful change" comparison.
///
/// Trailing whitespace is stripped from every line and trailing newlines
/// from the end of the text. Leading whitespace and interior blank lines
/// are significant and survive untouched. Two texts equal under this
/// normalization never trigger a push — the primary anti-flicker,
/// anti-loop mechanism.
pub fn normalize_for_compare(text: &str) -> String {
    let joined = text
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n");
    joined.trim_end_matches('\n').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_texts_equal() {
        assert_eq!(normalize_for_compare("a\nb"), normalize_for_compare("a\nb"));
    }

    #[test]
    fn test_trailing_line_whitespace_ignored() {
        assert_eq!(
            normalize_for_compare("a  \nb\t"),
            normalize_for_compare("a\nb")
        );
    }

    #[test]
    fn test_trailing_newlines_ignored() {
        assert_eq!(
            normalize_for_compare("a\nb\n\n\n"),
            normalize_for_compare("a\nb")
        );
    }

    #[test]
    fn test_leading_whitespace_significant() {
        assert_ne!(
            normalize_for_compare("  indented"),
            normalize_for_compare("indented")
        );
    }

    #[test]
    fn test_interior_blank_lines_significant() {
        assert_ne!(
            normalize_for_compare("a\n\nb"),
            normalize_for_compare("a\nb")
        );
    }
}
