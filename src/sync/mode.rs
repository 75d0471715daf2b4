//! Editing mode management
//!
//! Exactly one of the two views is writable at any time; the other is
//! read-only display. The manager tracks which, and the controller performs
//! the content liturgy around a switch (refresh before entering rendered
//! editing, convert-and-pull when leaving it).

// ─────────────────────────────────────────────────────────────────────────────
// EditorMode
// ─────────────────────────────────────────────────────────────────────────────

/// Which view currently accepts user edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorMode {
    /// The markdown source view is writable; the preview is display-only
    #[default]
    SourceEditable,
    /// The rendered view is writable (WYSIWYG); the source is read-only
    RenderedEditable,
}

impl EditorMode {
    /// The other mode.
    pub fn toggle(&self) -> Self {
        match self {
            EditorMode::SourceEditable => EditorMode::RenderedEditable,
            EditorMode::RenderedEditable => EditorMode::SourceEditable,
        }
    }

    /// Display label for the mode indicator.
    pub fn label(&self) -> &'static str {
        match self {
            EditorMode::SourceEditable => "Source",
            EditorMode::RenderedEditable => "Visual",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ModeManager
// ─────────────────────────────────────────────────────────────────────────────

/// Tracks the current editing mode and gates edit notifications.
///
/// Invariant: an edit notification from the read-only side is never treated
/// as authoritative, even though the UI should prevent such input in the
/// first place.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModeManager {
    mode: EditorMode,
}

impl ModeManager {
    /// Start in `SourceEditable`.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current mode.
    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    /// Whether edits arriving from the source view are legitimate.
    pub fn accepts_source_edits(&self) -> bool {
        self.mode == EditorMode::SourceEditable
    }

    /// Whether edits arriving from the rendered view are legitimate.
    pub fn accepts_rendered_edits(&self) -> bool {
        self.mode == EditorMode::RenderedEditable
    }

    /// Switch to `target`. Returns false when already there (no transition
    /// work should run).
    pub fn begin_switch(&mut self, target: EditorMode) -> bool {
        if self.mode == target {
            return false;
        }
        self.mode = target;
        true
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
