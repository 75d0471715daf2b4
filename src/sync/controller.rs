//! The sync controller
//!
//! Single authority for propagating a change in one view to the other while
//! preventing cascades. The session moves through an explicit state machine:
//!
//! ```text
//! Idle ──(genuine user edit)──▶ Editing ──(derive + push)──▶ Applying ──▶ Idle
//! ```
//!
//! While `Applying`, inbound change notifications from either view are
//! discarded rather than queued — the push is authoritative, so
//! last-writer-wins bookkeeping is unnecessary. Pushes to an asynchronous
//! rendered surface complete on a later tick; the guard stays up until the
//! completion callback (or a timeout abandons the push).
//!
//! Scroll and cursor sync run under a separate, lighter-weight re-entrancy
//! class so position updates never trigger content work and vice versa.

use log::{debug, info, warn};
use std::path::Path;
use std::time::{Duration, Instant};

use crate::config::SyncTiming;
use crate::convert::html_to_markdown;
use crate::document::{DocMetadata, Document};
use crate::error::{Error, Result};
use crate::markdown::{render_with_options, RenderOptions};
use crate::string_utils::clamp_caret;
use crate::sync::debounce::Debouncer;
use crate::sync::mode::{EditorMode, ModeManager};
use crate::sync::position::block_index_for_line;
use crate::sync::view::{PushId, PushOutcome, SyncableView, ViewKind};
use crate::sync::normalize_for_compare;

/// Cross-view scroll echoes arriving within this window are suppressed.
const SCROLL_COOLDOWN: Duration = Duration::from_millis(100);

// ─────────────────────────────────────────────────────────────────────────────
// State Types
// ─────────────────────────────────────────────────────────────────────────────

/// What a deferred push must restore once the new content is laid out.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Restore {
    /// Scroll the target back to this ratio
    Scroll(f32),
    /// Put the caret back at this byte offset (clamped to the new text)
    Caret(usize),
}

/// A push whose completion is outstanding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InFlightPush {
    id: PushId,
    started: Instant,
    restore: Restore,
}

/// The session state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyncState {
    /// Nothing in progress
    Idle,
    /// A genuine user edit arrived from this view; a push is pending
    Editing(ViewKind),
    /// A programmatic push to `target` is in progress; all inbound change
    /// notifications are discarded
    Applying {
        target: ViewKind,
        pending: Option<InFlightPush>,
    },
}

/// Passive signals drained by the shell each frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// The document text changed (title bar, word count, save state)
    DocumentChanged,
    /// Outline and lint results should be rebuilt
    RefreshDerived,
    /// The editing mode switched
    ModeChanged(EditorMode),
    /// A recoverable sync error occurred; the document is unchanged
    Error(String),
}

// ─────────────────────────────────────────────────────────────────────────────
// SyncController
// ─────────────────────────────────────────────────────────────────────────────

/// Owns the document and every transition between the two views.
pub struct SyncController {
    document: Document,
    mode: ModeManager,
    state: SyncState,
    render_options: RenderOptions,

    /// Coalesces source keystrokes into one rendered push
    render_debounce: Debouncer,
    /// Coalesces outline/lint refreshes (longer than the render delay)
    refresh_debounce: Debouncer,
    /// Bound on how long a deferred push may stay unacknowledged
    push_timeout: Duration,

    /// Last HTML written into the rendered view (idempotence skip)
    last_pushed_html: String,

    /// Which view initiated the scroll being echoed right now
    scroll_origin: Option<ViewKind>,
    last_scroll_time: Option<Instant>,
    /// Re-entrancy class for position sync only
    position_guard: bool,

    events: Vec<SyncEvent>,
}

impl SyncController {
    /// Create a controller owning `document`.
    pub fn new(document: Document, timing: &SyncTiming) -> Self {
        Self {
            document,
            mode: ModeManager::new(),
            state: SyncState::Idle,
            render_options: RenderOptions::default(),
            render_debounce: Debouncer::new(Duration::from_millis(timing.render_debounce_ms)),
            refresh_debounce: Debouncer::new(Duration::from_millis(timing.refresh_debounce_ms)),
            push_timeout: Duration::from_millis(timing.push_timeout_ms),
            last_pushed_html: String::new(),
            scroll_origin: None,
            last_scroll_time: None,
            position_guard: false,
            events: Vec::new(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// The authoritative document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Current editing mode.
    pub fn mode(&self) -> EditorMode {
        self.mode.mode()
    }

    /// Current session state.
    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Whether a content push is in flight (change notifications are being
    /// discarded).
    pub fn is_applying(&self) -> bool {
        matches!(self.state, SyncState::Applying { .. })
    }

    /// Drain the events produced since the last call.
    pub fn take_events(&mut self) -> Vec<SyncEvent> {
        std::mem::take(&mut self.events)
    }

    /// Save the document to its current path.
    pub fn save(&mut self) -> Result<()> {
        self.document.save()?;
        self.events.push(SyncEvent::DocumentChanged);
        Ok(())
    }

    /// Save the document to a new path.
    pub fn save_as(&mut self, path: &Path) -> Result<()> {
        self.document.save_as(path)?;
        self.events.push(SyncEvent::DocumentChanged);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Inbound Change Notifications
    // ─────────────────────────────────────────────────────────────────────────

    /// The source view's text changed under the user's hands.
    ///
    /// Ignored while a push is in flight (the notification is an echo of our
    /// own write) and when the source view is read-only (defensive: the UI
    /// should prevent that input entirely).
    pub fn on_source_changed(&mut self, text: &str, now: Instant) {
        if self.is_applying() {
            debug!("source change discarded while applying");
            return;
        }
        if !self.mode.accepts_source_edits() {
            warn!("edit notification from read-only source view ignored");
            return;
        }
        if text == self.document.text() {
            return;
        }

        self.document.set_text(text.to_string());
        self.state = SyncState::Editing(ViewKind::Source);
        self.render_debounce.schedule(now);
        self.refresh_debounce.schedule(now);
        self.events.push(SyncEvent::DocumentChanged);
    }

    /// The rendered view's content changed under the user's hands (WYSIWYG).
    ///
    /// Only honored in rendered-edit mode. The HTML is converted back to
    /// markdown; if the result differs meaningfully from the document body,
    /// it is pushed into the document and source view under the guard.
    pub fn on_rendered_changed(
        &mut self,
        html: &str,
        source: &mut dyn SyncableView,
        now: Instant,
    ) {
        if self.is_applying() {
            debug!("rendered change discarded while applying");
            return;
        }
        if !self.mode.accepts_rendered_edits() {
            warn!("edit notification from read-only rendered view ignored");
            return;
        }

        let markdown = match html_to_markdown(html) {
            Ok(markdown) => markdown,
            Err(e) => {
                warn!("Pull from rendered view abandoned: {}", e);
                self.events.push(SyncEvent::Error(e.to_string()));
                return;
            }
        };

        if normalize_for_compare(&markdown) == normalize_for_compare(self.document.body()) {
            return;
        }

        self.state = SyncState::Editing(ViewKind::Rendered);
        self.push_to_source(&markdown, source, now);
        self.refresh_debounce.schedule(now);
        self.events.push(SyncEvent::DocumentChanged);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Timer Pump
    // ─────────────────────────────────────────────────────────────────────────

    /// Drive debounce timers and the deferred-push timeout. Call once per
    /// frame.
    pub fn tick(&mut self, now: Instant, rendered: &mut dyn SyncableView) {
        // An unacknowledged deferred push must not hold the guard forever
        if let SyncState::Applying {
            pending: Some(push),
            ..
        } = self.state
        {
            if now.duration_since(push.started) >= self.push_timeout {
                warn!("deferred push {} timed out; abandoning", push.id);
                self.events
                    .push(SyncEvent::Error(Error::PushTimeout.to_string()));
                self.state = SyncState::Idle;
            }
        }

        if self.render_debounce.fire_if_due(now) {
            if self.is_applying() {
                // A push is still in flight; retry once it clears
                self.render_debounce.schedule(now);
            } else {
                self.push_to_rendered(rendered, now);
            }
        }

        if self.refresh_debounce.fire_if_due(now) {
            self.events.push(SyncEvent::RefreshDerived);
        }
    }

    /// Earliest moment a timer becomes due, for repaint scheduling.
    pub fn next_deadline(&self, now: Instant) -> Option<Duration> {
        let timers = [
            self.render_debounce.time_remaining(now),
            self.refresh_debounce.time_remaining(now),
        ];
        timers.into_iter().flatten().min()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Outbound Pushes
    // ─────────────────────────────────────────────────────────────────────────

    /// Render the document and write the HTML into the rendered view,
    /// preserving its scroll position.
    ///
    /// Skipped when the HTML is identical to the last applied value — the
    /// primary anti-flicker mechanism. A render failure abandons the cycle;
    /// the prior preview content stays up and the guard is cleared.
    pub fn push_to_rendered(&mut self, rendered: &mut dyn SyncableView, now: Instant) {
        if let SyncState::Applying {
            pending: Some(_), ..
        } = self.state
        {
            // A deferred push is still in flight; only the most recent text
            // matters, so retry once it clears instead of stacking pushes
            self.render_debounce.schedule(now);
            return;
        }

        let html = match render_with_options(self.document.text(), &self.render_options) {
            Ok(html) => html,
            Err(e) => {
                warn!("Render failed, skipping push cycle: {}", e);
                self.events.push(SyncEvent::Error(e.to_string()));
                self.state = SyncState::Idle;
                return;
            }
        };

        if html == self.last_pushed_html {
            self.state = SyncState::Idle;
            return;
        }

        let restore = rendered.scroll_ratio();
        self.state = SyncState::Applying {
            target: ViewKind::Rendered,
            pending: None,
        };
        let outcome = rendered.set_content(&html);
        self.last_pushed_html = html;

        match outcome {
            PushOutcome::Applied => {
                rendered.set_scroll_ratio(restore);
                self.state = SyncState::Idle;
            }
            PushOutcome::Deferred(id) => {
                self.state = SyncState::Applying {
                    target: ViewKind::Rendered,
                    pending: Some(InFlightPush {
                        id,
                        started: now,
                        restore: Restore::Scroll(restore),
                    }),
                };
            }
        }
    }

    /// Replace the document body and write the full text into the source
    /// view, preserving the caret where possible.
    fn push_to_source(&mut self, body: &str, source: &mut dyn SyncableView, now: Instant) {
        self.document.set_body(body);
        self.push_text_to_source(source, now);
    }

    /// Write the document's current text into the source view under the
    /// guard, restoring the caret (clamped to the new length).
    fn push_text_to_source(&mut self, source: &mut dyn SyncableView, now: Instant) {
        self.state = SyncState::Applying {
            target: ViewKind::Source,
            pending: None,
        };

        let caret = source.caret();
        let text = self.document.text().to_string();
        match source.set_content(&text) {
            PushOutcome::Applied => {
                source.set_caret(clamp_caret(&text, caret));
                self.state = SyncState::Idle;
            }
            PushOutcome::Deferred(id) => {
                self.state = SyncState::Applying {
                    target: ViewKind::Source,
                    pending: Some(InFlightPush {
                        id,
                        started: now,
                        restore: Restore::Caret(caret),
                    }),
                };
            }
        }
    }

    /// A deferred push finished: run its restore step and clear the guard.
    ///
    /// Stale ids (from a push that was superseded or timed out) are ignored.
    pub fn complete_push(
        &mut self,
        id: PushId,
        source: &mut dyn SyncableView,
        rendered: &mut dyn SyncableView,
    ) {
        let (target, push) = match self.state {
            SyncState::Applying {
                target,
                pending: Some(push),
            } if push.id == id => (target, push),
            _ => {
                debug!("stale push completion {} ignored", id);
                return;
            }
        };

        match (target, push.restore) {
            (ViewKind::Rendered, Restore::Scroll(ratio)) => rendered.set_scroll_ratio(ratio),
            (ViewKind::Source, Restore::Caret(offset)) => {
                let text = source.content();
                source.set_caret(clamp_caret(&text, offset));
            }
            _ => {}
        }
        self.state = SyncState::Idle;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mode Switching
    // ─────────────────────────────────────────────────────────────────────────

    /// Switch which view is writable.
    ///
    /// Entering rendered editing refreshes the preview from the current
    /// document first, so the user never edits stale content. Leaving it is
    /// the single point where WYSIWYG edits become authoritative: the
    /// rendered HTML is read out, converted, and pulled into the document.
    pub fn request_mode(
        &mut self,
        target: EditorMode,
        source: &mut dyn SyncableView,
        rendered: &mut dyn SyncableView,
        now: Instant,
    ) {
        if !self.mode.begin_switch(target) {
            return;
        }

        match target {
            EditorMode::RenderedEditable => {
                self.render_debounce.cancel();
                self.push_to_rendered(rendered, now);
                rendered.set_editable(true);
                source.set_editable(false);
            }
            EditorMode::SourceEditable => {
                let html = rendered.content();
                match html_to_markdown(&html) {
                    Ok(markdown) => {
                        if normalize_for_compare(&markdown)
                            != normalize_for_compare(self.document.body())
                        {
                            self.push_to_source(&markdown, source, now);
                            self.refresh_debounce.schedule(now);
                            self.events.push(SyncEvent::DocumentChanged);
                        }
                    }
                    Err(e) => {
                        // The document keeps its prior authoritative text
                        warn!("Conversion failed on mode switch: {}", e);
                        self.events.push(SyncEvent::Error(e.to_string()));
                    }
                }
                rendered.set_editable(false);
                source.set_editable(true);
            }
        }

        info!("Editor mode changed to {}", target.label());
        self.events.push(SyncEvent::ModeChanged(target));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Position Sync (separate re-entrancy class)
    // ─────────────────────────────────────────────────────────────────────────

    /// The user scrolled the source view; mirror the ratio to the preview.
    pub fn on_source_scrolled(
        &mut self,
        ratio: f32,
        rendered: &mut dyn SyncableView,
        now: Instant,
    ) {
        self.sync_scroll(ViewKind::Source, ratio, rendered, now);
    }

    /// The user scrolled the preview; mirror the ratio to the source view.
    pub fn on_rendered_scrolled(
        &mut self,
        ratio: f32,
        source: &mut dyn SyncableView,
        now: Instant,
    ) {
        self.sync_scroll(ViewKind::Rendered, ratio, source, now);
    }

    /// The source caret moved to a 0-indexed line; bring the matching
    /// rendered block into view.
    pub fn on_source_cursor_moved(
        &mut self,
        line: usize,
        rendered: &mut dyn SyncableView,
        now: Instant,
    ) {
        if !self.should_sync_scroll(ViewKind::Source, now) {
            return;
        }
        let index = match block_index_for_line(line, rendered.block_count()) {
            Some(index) => index,
            None => return,
        };
        self.mark_scroll(ViewKind::Source, now);
        self.position_guard = true;
        rendered.scroll_block_into_view(index);
        self.position_guard = false;
    }

    fn sync_scroll(
        &mut self,
        origin: ViewKind,
        ratio: f32,
        other: &mut dyn SyncableView,
        now: Instant,
    ) {
        if !self.should_sync_scroll(origin, now) {
            return;
        }
        self.mark_scroll(origin, now);
        self.position_guard = true;
        other.set_scroll_ratio(ratio.clamp(0.0, 1.0));
        self.position_guard = false;
    }

    /// Whether a scroll from `origin` should propagate.
    ///
    /// Same-origin scrolls always may (the user is still driving); a
    /// cross-origin scroll within the cooldown window is the echo of our own
    /// mirroring and is dropped.
    fn should_sync_scroll(&self, origin: ViewKind, now: Instant) -> bool {
        if self.position_guard {
            return false;
        }
        match (self.scroll_origin, self.last_scroll_time) {
            (None, _) => true,
            (Some(current), _) if current == origin => true,
            (Some(_), Some(last)) => now.duration_since(last) >= SCROLL_COOLDOWN,
            (Some(_), None) => true,
        }
    }

    fn mark_scroll(&mut self, origin: ViewKind, now: Instant) {
        self.scroll_origin = Some(origin);
        self.last_scroll_time = Some(now);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Document Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Replace the session's document (new file, open file), pushing the
    /// fresh text into both views.
    pub fn replace_document(
        &mut self,
        document: Document,
        source: &mut dyn SyncableView,
        rendered: &mut dyn SyncableView,
        now: Instant,
    ) {
        self.render_debounce.cancel();
        self.document = document;

        self.push_text_to_source(source, now);
        source.set_caret(0);

        if self.is_applying() {
            // Source push deferred; render once it clears
            self.render_debounce.schedule(now);
        } else {
            self.push_to_rendered(rendered, now);
        }

        self.refresh_debounce.schedule(now);
        self.events.push(SyncEvent::DocumentChanged);
    }

    /// Replace the document's front matter from the metadata dialog.
    pub fn apply_metadata(
        &mut self,
        metadata: &DocMetadata,
        source: &mut dyn SyncableView,
        now: Instant,
    ) {
        self.document.apply_metadata(metadata);
        self.push_text_to_source(source, now);
        self.render_debounce.schedule(now);
        self.refresh_debounce.schedule(now);
        self.events.push(SyncEvent::DocumentChanged);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::view::mock::MockView;

    fn timing() -> SyncTiming {
        SyncTiming {
            render_debounce_ms: 100,
            refresh_debounce_ms: 300,
            convert_debounce_ms: 100,
            push_timeout_ms: 2000,
        }
    }

    fn setup(text: &str) -> (SyncController, MockView, MockView, Instant) {
        let controller = SyncController::new(Document::with_text(text), &timing());
        let source = MockView::new(ViewKind::Source);
        let mut rendered = MockView::new(ViewKind::Rendered);
        rendered.editable = false;
        (controller, source, rendered, Instant::now())
    }

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_debounce_coalesces_rapid_edits_into_one_push() {
        let (mut controller, _source, mut rendered, t0) = setup("");

        // N rapid edits inside the debounce window
        controller.on_source_changed("# a", t0);
        controller.on_source_changed("# ab", t0 + ms(10));
        controller.on_source_changed("# abc", t0 + ms(20));

        controller.tick(t0 + ms(50), &mut rendered);
        assert_eq!(rendered.pushes, 0, "must not push inside the window");

        controller.tick(t0 + ms(130), &mut rendered);
        assert_eq!(rendered.pushes, 1, "exactly one coalesced push");
        assert!(rendered.content.contains("abc"), "last edit's text wins");
        assert_eq!(controller.state(), SyncState::Idle);
    }

    #[test]
    fn test_push_preserves_rendered_scroll() {
        let (mut controller, _source, mut rendered, t0) = setup("");
        rendered.scroll = 0.42;

        controller.on_source_changed("# hi", t0);
        controller.tick(t0 + ms(150), &mut rendered);

        assert_eq!(rendered.scroll, 0.42);
        assert!(rendered.scrolls >= 1);
    }

    #[test]
    fn test_identical_render_is_skipped() {
        let (mut controller, _source, mut rendered, t0) = setup("");

        controller.on_source_changed("# same", t0);
        controller.tick(t0 + ms(150), &mut rendered);
        assert_eq!(rendered.pushes, 1);

        // Trailing-whitespace-only difference renders to identical HTML
        controller.on_source_changed("# same  ", t0 + ms(200));
        controller.tick(t0 + ms(350), &mut rendered);
        assert_eq!(rendered.pushes, 1, "no-op push must be skipped");
    }

    #[test]
    fn test_guard_discards_opposing_change_during_deferred_push() {
        let (mut controller, mut source, mut rendered, t0) = setup("");
        rendered.defer_next_push = Some(9);

        controller.on_source_changed("# original", t0);
        controller.tick(t0 + ms(150), &mut rendered);
        assert!(controller.is_applying());

        // Simulated concurrent edit from the rendered view while in flight
        controller.request_mode(EditorMode::RenderedEditable, &mut source, &mut rendered, t0);
        controller.on_rendered_changed("<p>sneaky</p>", &mut source, t0 + ms(160));

        assert_eq!(controller.document().text(), "# original");
        assert_eq!(source.pushes, 0);

        // Completion clears the guard
        controller.complete_push(9, &mut source, &mut rendered);
        assert_eq!(controller.state(), SyncState::Idle);
    }

    #[test]
    fn test_guard_discards_source_change_during_deferred_push() {
        let (mut controller, _source, mut rendered, t0) = setup("");
        rendered.defer_next_push = Some(3);

        controller.on_source_changed("# one", t0);
        controller.tick(t0 + ms(150), &mut rendered);
        assert!(controller.is_applying());

        controller.on_source_changed("# two", t0 + ms(160));
        assert_eq!(controller.document().text(), "# one");
    }

    #[test]
    fn test_deferred_completion_restores_scroll() {
        let (mut controller, mut source, mut rendered, t0) = setup("");
        rendered.scroll = 0.7;
        rendered.defer_next_push = Some(5);

        controller.on_source_changed("# x", t0);
        controller.tick(t0 + ms(150), &mut rendered);

        // The view scrolled to top while relaying out
        rendered.scroll = 0.0;
        controller.complete_push(5, &mut source, &mut rendered);
        assert_eq!(rendered.scroll, 0.7);
        assert_eq!(controller.state(), SyncState::Idle);
    }

    #[test]
    fn test_stale_completion_is_ignored() {
        let (mut controller, mut source, mut rendered, t0) = setup("");
        rendered.defer_next_push = Some(5);

        controller.on_source_changed("# x", t0);
        controller.tick(t0 + ms(150), &mut rendered);

        controller.complete_push(999, &mut source, &mut rendered);
        assert!(controller.is_applying(), "wrong id must not clear the guard");

        controller.complete_push(5, &mut source, &mut rendered);
        assert_eq!(controller.state(), SyncState::Idle);
    }

    #[test]
    fn test_deferred_push_times_out() {
        let (mut controller, _source, mut rendered, t0) = setup("");
        rendered.defer_next_push = Some(4);

        controller.on_source_changed("# x", t0);
        controller.tick(t0 + ms(150), &mut rendered);
        assert!(controller.is_applying());

        controller.tick(t0 + ms(3000), &mut rendered);
        assert_eq!(controller.state(), SyncState::Idle, "timeout clears the guard");
        assert!(controller
            .take_events()
            .iter()
            .any(|e| matches!(e, SyncEvent::Error(_))));
    }

    #[test]
    fn test_rendered_edit_rejected_in_source_mode() {
        let (mut controller, mut source, _rendered, t0) = setup("# keep");

        // Defensive invariant: the read-only side is never authoritative
        controller.on_rendered_changed("<h1>replaced</h1>", &mut source, t0);
        assert_eq!(controller.document().text(), "# keep");
        assert_eq!(source.pushes, 0);
    }

    #[test]
    fn test_source_edit_rejected_in_rendered_mode() {
        let (mut controller, mut source, mut rendered, t0) = setup("# keep");
        controller.request_mode(EditorMode::RenderedEditable, &mut source, &mut rendered, t0);

        controller.on_source_changed("# replaced", t0 + ms(10));
        assert_eq!(controller.document().text(), "# keep");
    }

    #[test]
    fn test_noop_rendered_readback_does_not_mutate_document() {
        let (mut controller, mut source, mut rendered, t0) = setup("# Title\n\nHello **world**\n");
        controller.request_mode(EditorMode::RenderedEditable, &mut source, &mut rendered, t0);
        let pushed_html = rendered.content.clone();
        let text_before = controller.document().text().to_string();

        // Reading the rendered content straight back is not an edit
        controller.on_rendered_changed(&pushed_html, &mut source, t0 + ms(10));
        assert_eq!(controller.document().text(), text_before);
        assert_eq!(source.pushes, 0);
    }

    #[test]
    fn test_rendered_edit_pulls_into_document_and_source() {
        let (mut controller, mut source, mut rendered, t0) = setup("# Title\n");
        source.content = "# Title\n".to_string();
        controller.request_mode(EditorMode::RenderedEditable, &mut source, &mut rendered, t0);

        controller.on_rendered_changed(
            "<h1>Title</h1>\n<p>Hello <strong>world</strong></p>\n",
            &mut source,
            t0 + ms(10),
        );

        assert_eq!(controller.document().text(), "# Title\n\nHello **world**");
        assert_eq!(source.content, "# Title\n\nHello **world**");
        assert_eq!(controller.state(), SyncState::Idle);
    }

    #[test]
    fn test_pull_preserves_front_matter() {
        let text = "---\ntitle: Keep me\n---\n\n# Body\n";
        let (mut controller, mut source, mut rendered, t0) = setup(text);
        controller.request_mode(EditorMode::RenderedEditable, &mut source, &mut rendered, t0);

        controller.on_rendered_changed("<h1>Edited</h1>", &mut source, t0 + ms(10));
        assert_eq!(
            controller.document().text(),
            "---\ntitle: Keep me\n---\n\n# Edited"
        );
    }

    #[test]
    fn test_pull_clamps_caret() {
        let (mut controller, mut source, mut rendered, t0) = setup("# A much longer line\n");
        source.caret = 18;
        controller.request_mode(EditorMode::RenderedEditable, &mut source, &mut rendered, t0);

        controller.on_rendered_changed("<h1>B</h1>", &mut source, t0 + ms(10));
        assert_eq!(controller.document().text(), "# B");
        assert!(source.caret <= source.content.len());
    }

    #[test]
    fn test_mode_switch_refreshes_then_enables_rendered() {
        let (mut controller, mut source, mut rendered, t0) = setup("# Fresh\n");
        assert!(!rendered.editable);

        controller.request_mode(EditorMode::RenderedEditable, &mut source, &mut rendered, t0);

        assert!(rendered.content.contains("<h1>Fresh</h1>"));
        assert!(rendered.editable);
        assert!(!source.editable);
        assert_eq!(controller.mode(), EditorMode::RenderedEditable);
    }

    #[test]
    fn test_mode_switch_back_makes_wysiwyg_edits_authoritative() {
        let (mut controller, mut source, mut rendered, t0) = setup("- one\n");
        controller.request_mode(EditorMode::RenderedEditable, &mut source, &mut rendered, t0);

        // The user inserts a list item in the rendered view
        rendered.content = "<ul>\n<li>one</li>\n<li>two</li>\n</ul>\n".to_string();
        controller.request_mode(EditorMode::SourceEditable, &mut source, &mut rendered, t0 + ms(10));

        assert_eq!(controller.document().text(), "- one\n- two");
        assert!(source.editable);
        assert!(!rendered.editable);
    }

    #[test]
    fn test_mode_switch_to_same_mode_is_noop() {
        let (mut controller, mut source, mut rendered, t0) = setup("# x\n");
        controller.request_mode(EditorMode::SourceEditable, &mut source, &mut rendered, t0);
        assert_eq!(rendered.pushes, 0);
        assert!(controller.take_events().is_empty());
    }

    #[test]
    fn test_scenario_title_world_roundtrip() {
        let (mut controller, mut source, mut rendered, t0) = setup("# Title\n\nHello **world**");
        controller.request_mode(EditorMode::RenderedEditable, &mut source, &mut rendered, t0);

        assert!(rendered.content.contains("<h1>Title</h1>"));
        assert!(rendered.content.contains("<strong>world</strong>"));

        // Switching back without edits leaves the document intact
        controller.request_mode(EditorMode::SourceEditable, &mut source, &mut rendered, t0 + ms(10));
        assert_eq!(controller.document().text(), "# Title\n\nHello **world**");
    }

    #[test]
    fn test_scroll_ratio_propagates_without_echo() {
        let (mut controller, mut source, mut rendered, t0) = setup("");

        controller.on_source_scrolled(0.5, &mut rendered, t0);
        assert_eq!(rendered.scroll, 0.5);

        // The mirrored scroll echoes back within the cooldown window
        controller.on_rendered_scrolled(0.5, &mut source, t0 + ms(20));
        assert_eq!(source.scrolls, 0, "echo must be suppressed");

        // A genuine scroll after the cooldown propagates
        controller.on_rendered_scrolled(0.8, &mut source, t0 + ms(500));
        assert_eq!(source.scroll, 0.8);
    }

    #[test]
    fn test_scroll_ratio_is_clamped() {
        let (mut controller, _source, mut rendered, t0) = setup("");
        controller.on_source_scrolled(7.0, &mut rendered, t0);
        assert_eq!(rendered.scroll, 1.0);
    }

    #[test]
    fn test_cursor_moves_scroll_rendered_block_into_view() {
        let (mut controller, _source, mut rendered, t0) = setup("");
        rendered.blocks = 4;

        controller.on_source_cursor_moved(2, &mut rendered, t0);
        assert_eq!(rendered.last_block_scrolled, Some(2));

        // Out of range clamps to the last block
        controller.on_source_cursor_moved(99, &mut rendered, t0 + ms(1));
        assert_eq!(rendered.last_block_scrolled, Some(3));
    }

    #[test]
    fn test_cursor_sync_with_empty_rendered_view_is_noop() {
        let (mut controller, _source, mut rendered, t0) = setup("");
        rendered.blocks = 0;
        controller.on_source_cursor_moved(5, &mut rendered, t0);
        assert_eq!(rendered.last_block_scrolled, None);
    }

    #[test]
    fn test_replace_document_pushes_both_views() {
        let (mut controller, mut source, mut rendered, t0) = setup("old");

        controller.replace_document(
            Document::with_text("# New doc\n"),
            &mut source,
            &mut rendered,
            t0,
        );

        assert_eq!(source.content, "# New doc\n");
        assert!(rendered.content.contains("New doc"));
        assert_eq!(source.caret, 0);
        assert_eq!(controller.state(), SyncState::Idle);
    }

    #[test]
    fn test_events_are_drained_once() {
        let (mut controller, _source, _rendered, t0) = setup("");
        controller.on_source_changed("# x", t0);

        let events = controller.take_events();
        assert!(events.contains(&SyncEvent::DocumentChanged));
        assert!(controller.take_events().is_empty());
    }

    #[test]
    fn test_refresh_fires_after_longer_delay() {
        let (mut controller, _source, mut rendered, t0) = setup("");
        controller.on_source_changed("# x", t0);

        controller.tick(t0 + ms(150), &mut rendered);
        let events = controller.take_events();
        assert!(
            !events.contains(&SyncEvent::RefreshDerived),
            "refresh must lag the render push"
        );

        controller.tick(t0 + ms(350), &mut rendered);
        let events = controller.take_events();
        assert!(events.contains(&SyncEvent::RefreshDerived));
    }

    #[test]
    fn test_apply_metadata_updates_source_view() {
        let (mut controller, mut source, _rendered, t0) = setup("# Body\n");
        let metadata = DocMetadata {
            title: "Titled".to_string(),
            ..DocMetadata::default()
        };

        controller.apply_metadata(&metadata, &mut source, t0);
        assert!(controller.document().text().starts_with("---\n"));
        assert!(source.content.contains("title: Titled"));
        assert!(source.content.ends_with("# Body\n"));
    }
}
