//! The syncable view abstraction
//!
//! The sync controller is written once against this capability set; the
//! source editor pane and the rendered preview pane both implement it. A
//! view holds only a transient copy of content for display — the document
//! owned by the controller stays authoritative.
//!
//! `set_content` may complete asynchronously: a view backed by a rendering
//! surface that lays out on a later tick returns `Deferred` with a push id,
//! and the shell reports completion back to the controller once the new
//! content is actually in place. The controller keeps its re-entrancy guard
//! up until that continuation runs.

// ─────────────────────────────────────────────────────────────────────────────
// Identifiers
// ─────────────────────────────────────────────────────────────────────────────

/// Identifier for a deferred content push, allocated by the receiving view.
pub type PushId = u64;

/// Which of the two views a value refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    /// The plain-text markdown editing surface
    Source,
    /// The HTML-based live preview
    Rendered,
}

/// Result of a content push into a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// The content is in place; the push is done
    Applied,
    /// The view will finish applying the content later; the shell reports
    /// the id back via `SyncController::complete_push`
    Deferred(PushId),
}

// ─────────────────────────────────────────────────────────────────────────────
// SyncableView
// ─────────────────────────────────────────────────────────────────────────────

/// Capability set the sync controller needs from either view.
///
/// Content is markdown text for the source view and an HTML fragment for
/// the rendered view; the controller never mixes the two up because every
/// push goes through a conversion first.
pub trait SyncableView {
    /// Which view this is.
    fn kind(&self) -> ViewKind;

    /// Current content of the view's display buffer.
    fn content(&self) -> String;

    /// Replace the view's content wholesale (never merged).
    fn set_content(&mut self, content: &str) -> PushOutcome;

    /// Current vertical scroll position as a ratio in [0, 1].
    fn scroll_ratio(&self) -> f32;

    /// Scroll to a ratio in [0, 1].
    fn set_scroll_ratio(&mut self, ratio: f32);

    /// Make the view writable or read-only.
    fn set_editable(&mut self, editable: bool);

    /// Caret byte offset into the content, where the view has one.
    fn caret(&self) -> usize {
        0
    }

    /// Move the caret to a byte offset (views without a caret ignore this).
    fn set_caret(&mut self, _offset: usize) {}

    /// Number of block-level elements, for line-to-block mapping.
    fn block_count(&self) -> usize {
        0
    }

    /// Scroll the block at `index` into view, centered.
    fn scroll_block_into_view(&mut self, _index: usize) {}
}

// ─────────────────────────────────────────────────────────────────────────────
// Mock View (test support)
// ─────────────────────────────────────────────────────────────────────────────

/// A scriptable view implementation for controller tests.
#[cfg(test)]
pub(crate) mod mock {
    use super::*;

    #[derive(Debug)]
    pub struct MockView {
        pub kind: ViewKind,
        pub content: String,
        pub scroll: f32,
        pub editable: bool,
        pub caret: usize,
        pub blocks: usize,
        /// When set, the next `set_content` defers with this id
        pub defer_next_push: Option<PushId>,
        /// Count of `set_content` calls
        pub pushes: usize,
        /// Count of `set_scroll_ratio` calls
        pub scrolls: usize,
        /// Last block index scrolled into view
        pub last_block_scrolled: Option<usize>,
    }

    impl MockView {
        pub fn new(kind: ViewKind) -> Self {
            Self {
                kind,
                content: String::new(),
                scroll: 0.0,
                editable: matches!(kind, ViewKind::Source),
                caret: 0,
                blocks: 0,
                defer_next_push: None,
                pushes: 0,
                scrolls: 0,
                last_block_scrolled: None,
            }
        }
    }

    impl SyncableView for MockView {
        fn kind(&self) -> ViewKind {
            self.kind
        }

        fn content(&self) -> String {
            self.content.clone()
        }

        fn set_content(&mut self, content: &str) -> PushOutcome {
            self.pushes += 1;
            self.content = content.to_string();
            match self.defer_next_push.take() {
                Some(id) => PushOutcome::Deferred(id),
                None => PushOutcome::Applied,
            }
        }

        fn scroll_ratio(&self) -> f32 {
            self.scroll
        }

        fn set_scroll_ratio(&mut self, ratio: f32) {
            self.scrolls += 1;
            self.scroll = ratio;
        }

        fn set_editable(&mut self, editable: bool) {
            self.editable = editable;
        }

        fn caret(&self) -> usize {
            self.caret
        }

        fn set_caret(&mut self, offset: usize) {
            self.caret = offset;
        }

        fn block_count(&self) -> usize {
            self.blocks
        }

        fn scroll_block_into_view(&mut self, index: usize) {
            self.last_block_scrolled = Some(index);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
