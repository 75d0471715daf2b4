//! Source editor pane
//!
//! The plain-text markdown editing surface, backed by egui's TextEdit. The
//! pane owns a display copy of the document text and implements
//! `SyncableView`, so the sync controller can push content, move the caret,
//! and mirror scroll positions without knowing anything about egui.
//!
//! Programmatic content pushes apply synchronously (the buffer is a plain
//! String); caret and scroll requests are staged and applied on the next
//! frame, when the widget exists.

use eframe::egui::{self, FontId, ScrollArea, TextEdit, Ui};

use crate::string_utils::{byte_to_char_index, char_to_byte_index, offset_to_line_col};
use crate::sync::{scroll_ratio, offset_for_ratio, PushOutcome, SyncableView, ViewKind};

/// What happened in the pane this frame, for the shell to forward to the
/// sync controller.
#[derive(Debug, Default)]
pub struct EditorPaneOutput {
    /// The user edited the buffer (current text is `EditorPane::content`)
    pub edited: bool,
    /// The user scrolled to this ratio
    pub scrolled: Option<f32>,
    /// The user moved the caret to this 0-indexed line
    pub cursor_moved_to_line: Option<usize>,
}

/// The markdown source editing surface.
pub struct EditorPane {
    buffer: String,
    editable: bool,
    font_size: f32,

    /// Caret as a byte offset into `buffer`
    caret_bytes: usize,
    /// (line, column) of the caret, 0-indexed, for the status bar
    cursor_position: (usize, usize),

    /// Bumped on programmatic pushes so the TextEdit re-reads the buffer
    content_version: u64,
    /// Caret to apply on the next frame (byte offset)
    pending_caret: Option<usize>,
    /// Scroll ratio to apply on the next frame
    pending_scroll: Option<f32>,
    /// 1-indexed line to bring into view on the next frame
    pending_goto_line: Option<usize>,

    /// Geometry from the last frame, for ratio math
    last_scroll_offset: f32,
    content_height: f32,
    viewport_height: f32,
    current_ratio: f32,
}

impl EditorPane {
    pub fn new(font_size: f32) -> Self {
        Self {
            buffer: String::new(),
            editable: true,
            font_size,
            caret_bytes: 0,
            cursor_position: (0, 0),
            content_version: 0,
            pending_caret: None,
            pending_scroll: None,
            pending_goto_line: None,
            last_scroll_offset: 0.0,
            content_height: 0.0,
            viewport_height: 0.0,
            current_ratio: 0.0,
        }
    }

    pub fn set_font_size(&mut self, size: f32) {
        self.font_size = size;
    }

    /// Caret (line, column), 0-indexed, for the status bar.
    pub fn cursor_position(&self) -> (usize, usize) {
        self.cursor_position
    }

    /// Jump to a 1-indexed line (outline or lint navigation).
    pub fn goto_line(&mut self, line: usize) {
        self.pending_goto_line = Some(line);
        let offset = crate::string_utils::line_start_offset(&self.buffer, line.saturating_sub(1));
        self.pending_caret = Some(offset);
    }

    /// Draw the pane.
    pub fn show(&mut self, ui: &mut Ui) -> EditorPaneOutput {
        let mut output = EditorPaneOutput::default();

        let id = ui.id().with(("source-editor", self.content_version));
        let font_id = FontId::monospace(self.font_size);
        let row_height = ui.fonts(|f| f.row_height(&font_id));

        // Stage programmatic scrolling before the ScrollArea builds
        let mut scroll_area = ScrollArea::vertical()
            .id_source("source-editor-scroll")
            .auto_shrink([false, false]);
        let mut programmatic_scroll = false;

        if let Some(line) = self.pending_goto_line.take() {
            let target_y = (line.saturating_sub(1)) as f32 * row_height;
            let offset = (target_y - self.viewport_height / 3.0).max(0.0);
            scroll_area = scroll_area.vertical_scroll_offset(offset);
            programmatic_scroll = true;
        } else if let Some(ratio) = self.pending_scroll.take() {
            let offset = offset_for_ratio(ratio, self.content_height, self.viewport_height);
            scroll_area = scroll_area.vertical_scroll_offset(offset);
            programmatic_scroll = true;
        }

        let before_edit = self.buffer.clone();
        let previous_caret = self.caret_bytes;
        let mut caret_was_programmatic = false;

        let scroll_output = scroll_area.show(ui, |ui| {
            let text_edit = TextEdit::multiline(&mut self.buffer)
                .id(id)
                .font(font_id.clone())
                .frame(false)
                .desired_width(f32::INFINITY)
                .interactive(self.editable);
            let text_output = text_edit.show(ui);

            // Apply a staged caret move now that the widget exists; it must
            // not be reported back as a user cursor event
            if let Some(caret_bytes) = self.pending_caret.take() {
                let char_index = byte_to_char_index(&self.buffer, caret_bytes);
                if let Some(mut state) = egui::text_edit::TextEditState::load(ui.ctx(), id) {
                    state.cursor.set_char_range(Some(egui::text::CCursorRange::one(
                        egui::text::CCursor::new(char_index),
                    )));
                    state.store(ui.ctx(), id);
                }
                self.caret_bytes = caret_bytes;
                caret_was_programmatic = true;
            } else if let Some(cursor_range) = text_output.cursor_range {
                let char_index = cursor_range.primary.ccursor.index;
                self.caret_bytes = char_to_byte_index(&self.buffer, char_index);
            }
        });

        // Geometry for ratio math
        self.content_height = scroll_output.content_size.y;
        self.viewport_height = scroll_output.inner_rect.height();
        let offset = scroll_output.state.offset.y;
        self.current_ratio = scroll_ratio(offset, self.content_height, self.viewport_height);

        // A scroll offset change the controller did not stage is user input
        if !programmatic_scroll && (offset - self.last_scroll_offset).abs() > 0.5 {
            output.scrolled = Some(self.current_ratio);
        }
        self.last_scroll_offset = offset;

        // User edits (the TextEdit mutates the buffer in place)
        if self.editable && self.buffer != before_edit {
            output.edited = true;
        }

        // Cursor tracking
        let (line, col) = offset_to_line_col(&self.buffer, self.caret_bytes);
        self.cursor_position = (line, col);
        if self.caret_bytes != previous_caret && !output.edited && !caret_was_programmatic {
            output.cursor_moved_to_line = Some(line);
        }

        output
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SyncableView
// ─────────────────────────────────────────────────────────────────────────────

impl SyncableView for EditorPane {
    fn kind(&self) -> ViewKind {
        ViewKind::Source
    }

    fn content(&self) -> String {
        self.buffer.clone()
    }

    fn set_content(&mut self, content: &str) -> PushOutcome {
        self.buffer = content.to_string();
        self.content_version = self.content_version.wrapping_add(1);
        PushOutcome::Applied
    }

    fn scroll_ratio(&self) -> f32 {
        self.current_ratio
    }

    fn set_scroll_ratio(&mut self, ratio: f32) {
        self.pending_scroll = Some(ratio);
    }

    fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
    }

    fn caret(&self) -> usize {
        self.caret_bytes
    }

    fn set_caret(&mut self, offset: usize) {
        self.pending_caret = Some(offset.min(self.buffer.len()));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_content_bumps_version() {
        let mut pane = EditorPane::new(14.0);
        let v0 = pane.content_version;
        assert_eq!(pane.set_content("# x"), PushOutcome::Applied);
        assert_eq!(pane.content(), "# x");
        assert_ne!(pane.content_version, v0);
    }

    #[test]
    fn test_set_caret_clamps_to_buffer() {
        let mut pane = EditorPane::new(14.0);
        pane.set_content("abc");
        pane.set_caret(99);
        assert_eq!(pane.pending_caret, Some(3));
    }

    #[test]
    fn test_scroll_request_is_staged() {
        let mut pane = EditorPane::new(14.0);
        pane.set_scroll_ratio(0.5);
        assert_eq!(pane.pending_scroll, Some(0.5));
    }

    #[test]
    fn test_goto_line_stages_caret_at_line_start() {
        let mut pane = EditorPane::new(14.0);
        pane.set_content("one\ntwo\nthree");
        pane.goto_line(2);
        assert_eq!(pane.pending_caret, Some(4));
        assert_eq!(pane.pending_goto_line, Some(2));
    }
}
