//! Main application module for Tandem
//!
//! Implements the eframe App trait: window chrome, menus, the two panes,
//! and the per-frame wiring between pane outputs and the sync controller.
//! The shell owns no sync logic — every content, scroll, cursor, and mode
//! event is forwarded into the controller and its event queue is drained
//! at the end of the frame.

use eframe::egui;
use log::{info, warn};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::config::{save_config_silent, Settings, Theme};
use crate::document::Document;
use crate::export::{
    copy_html_to_clipboard, copy_text_to_clipboard, export_to_html_file, ExportFormat,
    PandocExporter,
};
use crate::files::{open_file_dialog, save_export_dialog, save_file_dialog};
use crate::markdown::{extract_outline, lint_document, LintOptions, SyntaxHighlighter};
use crate::sync::{Debouncer, EditorMode, SyncableView, SyncController, SyncEvent};
use crate::ui::{
    EditorPane, FrontMatterDialog, PreviewPane, SettingsDialog, Sidebar, SidebarAction,
};

/// How long transient status messages stay in the status bar.
const STATUS_MESSAGE_DURATION: Duration = Duration::from_secs(4);

/// Keyboard shortcut actions, detected in the input closure and executed
/// afterwards to avoid borrow conflicts.
#[derive(Debug, Clone, Copy)]
enum KeyboardAction {
    /// Save current file (Ctrl+S)
    Save,
    /// Save As dialog (Ctrl+Shift+S)
    SaveAs,
    /// Open file dialog (Ctrl+O)
    Open,
    /// New file (Ctrl+N)
    New,
    /// Source editing mode (Ctrl+1)
    SourceMode,
    /// Rendered editing mode (Ctrl+2)
    RenderedMode,
    /// Toggle between the two modes (Ctrl+E)
    ToggleMode,
    /// Toggle sidebar (Ctrl+\)
    ToggleSidebar,
}

/// A file operation waiting on the unsaved-changes confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PendingAction {
    NewFile,
    OpenFile(Option<PathBuf>),
}

/// The main application struct.
pub struct TandemApp {
    settings: Settings,
    controller: SyncController,
    editor_pane: EditorPane,
    preview_pane: PreviewPane,
    sidebar: Sidebar,
    front_matter_dialog: FrontMatterDialog,
    settings_dialog: SettingsDialog,
    highlighter: SyntaxHighlighter,

    /// Debounce for pulling rendered-view edits back through the converter
    convert_debounce: Debouncer,

    /// Transient status bar message
    status_message: Option<(String, Instant)>,
    /// File operation blocked on the discard-changes confirmation
    pending_action: Option<PendingAction>,
    window_title: String,
}

impl TandemApp {
    /// Create the application, loading settings and the welcome document.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        info!("Initializing Tandem");

        let settings = crate::config::load_config();
        apply_theme(&cc.egui_ctx, settings.theme);
        let mut controller = SyncController::new(Document::new(), &settings.sync);

        let mut editor_pane = EditorPane::new(settings.font_size);
        let mut preview_pane = PreviewPane::new(settings.font_size);

        // Seed both views from the welcome document
        let now = Instant::now();
        controller.replace_document(
            Document::with_text(WELCOME_CONTENT),
            &mut editor_pane,
            &mut preview_pane,
            now,
        );

        let mut sidebar = Sidebar::new();
        if let Some(dir) = settings.last_directory.clone().or_else(dirs::home_dir) {
            sidebar.set_directory(dir);
        }

        let convert_debounce =
            Debouncer::new(Duration::from_millis(settings.sync.convert_debounce_ms));

        Self {
            settings,
            controller,
            editor_pane,
            preview_pane,
            sidebar,
            front_matter_dialog: FrontMatterDialog::default(),
            settings_dialog: SettingsDialog::default(),
            highlighter: SyntaxHighlighter::new(),
            convert_debounce,
            status_message: None,
            pending_action: None,
            window_title: String::new(),
        }
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), Instant::now()));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // File Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Run a file action, or park it behind the confirmation dialog when
    /// the document has unsaved changes.
    fn request_file_action(&mut self, action: PendingAction) {
        if self.controller.document().is_dirty() {
            self.pending_action = Some(action);
        } else {
            self.run_file_action(action);
        }
    }

    fn run_file_action(&mut self, action: PendingAction) {
        let now = Instant::now();
        match action {
            PendingAction::NewFile => {
                self.controller.replace_document(
                    Document::new(),
                    &mut self.editor_pane,
                    &mut self.preview_pane,
                    now,
                );
                self.set_status("New document");
            }
            PendingAction::OpenFile(path) => {
                let path = match path.or_else(|| {
                    open_file_dialog(self.settings.last_directory.as_deref())
                }) {
                    Some(path) => path,
                    None => return,
                };
                match Document::load(&path) {
                    Ok(document) => {
                        if let Some(parent) = path.parent() {
                            self.settings.last_directory = Some(parent.to_path_buf());
                            self.sidebar.set_directory(parent.to_path_buf());
                        }
                        self.controller.replace_document(
                            document,
                            &mut self.editor_pane,
                            &mut self.preview_pane,
                            now,
                        );
                        self.set_status(format!("Opened {}", path.display()));
                    }
                    Err(e) => {
                        warn!("{}", e);
                        self.set_status(e.to_string());
                    }
                }
            }
        }
    }

    fn save_document(&mut self) {
        if self.controller.document().path().is_some() {
            match self.controller.save() {
                Ok(()) => self.set_status("Saved"),
                Err(e) => self.set_status(e.to_string()),
            }
        } else {
            self.save_document_as();
        }
    }

    fn save_document_as(&mut self) {
        let default_name = self
            .controller
            .document()
            .path()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or("untitled.md")
            .to_string();
        let path = save_file_dialog(self.settings.last_directory.as_deref(), Some(&default_name));
        if let Some(path) = path {
            match self.controller.save_as(&path) {
                Ok(()) => {
                    if let Some(parent) = path.parent() {
                        self.settings.last_directory = Some(parent.to_path_buf());
                        self.sidebar.set_directory(parent.to_path_buf());
                    }
                    self.set_status(format!("Saved {}", path.display()));
                }
                Err(e) => self.set_status(e.to_string()),
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Export
    // ─────────────────────────────────────────────────────────────────────────

    fn export_document(&mut self, format: ExportFormat) {
        let document = self.controller.document();
        let stem = document
            .path()
            .and_then(|p| p.file_stem())
            .and_then(|s| s.to_str())
            .unwrap_or("document");
        let default_name = format!("{}.{}", stem, format.extension());

        let initial_dir = self
            .settings
            .export
            .export_dir
            .as_deref()
            .or(self.settings.last_directory.as_deref());
        let output = match save_export_dialog(
            initial_dir,
            &default_name,
            format.label(),
            format.extension(),
        ) {
            Some(output) => output,
            None => return,
        };

        let text = document.text().to_string();
        let title = document.metadata().title;
        let title = if title.is_empty() { None } else { Some(title) };

        if format == ExportFormat::Html {
            // Built-in renderer; no pandoc needed
            match export_to_html_file(&text, &output, title.as_deref()) {
                Ok(()) => self.set_status(format!("Exported to {}", output.display())),
                Err(e) => self.set_status(e.to_string()),
            }
            return;
        }

        let exporter = PandocExporter::new(self.settings.export.clone());
        let outcome = exporter.export(&text, &output, format);
        self.set_status(outcome.message);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Derived State
    // ─────────────────────────────────────────────────────────────────────────

    /// Rebuild the outline and lint results for the sidebar.
    fn refresh_derived_state(&mut self) {
        let text = self.controller.document().text();
        self.sidebar.set_outline(extract_outline(text));

        if self.settings.lint_enabled {
            let options = LintOptions {
                max_line_length: self.settings.lint_max_line_length,
                front_matter_title: self.controller.document().metadata().title,
            };
            self.sidebar.set_issues(lint_document(text, &options));
        } else {
            self.sidebar.set_issues(Vec::new());
        }
    }

    /// Jump both views to a 1-indexed source line.
    fn goto_line(&mut self, line: usize, now: Instant) {
        self.editor_pane.goto_line(line);
        self.sidebar.set_cursor_line(line);
        self.controller
            .on_source_cursor_moved(line.saturating_sub(1), &mut self.preview_pane, now);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Chrome
    // ─────────────────────────────────────────────────────────────────────────

    fn keyboard_actions(&self, ctx: &egui::Context) -> Vec<KeyboardAction> {
        let mut actions = Vec::new();
        ctx.input_mut(|input| {
            let command = egui::Modifiers::COMMAND;
            if input.consume_key(command | egui::Modifiers::SHIFT, egui::Key::S) {
                actions.push(KeyboardAction::SaveAs);
            }
            if input.consume_key(command, egui::Key::S) {
                actions.push(KeyboardAction::Save);
            }
            if input.consume_key(command, egui::Key::O) {
                actions.push(KeyboardAction::Open);
            }
            if input.consume_key(command, egui::Key::N) {
                actions.push(KeyboardAction::New);
            }
            if input.consume_key(command, egui::Key::Num1) {
                actions.push(KeyboardAction::SourceMode);
            }
            if input.consume_key(command, egui::Key::Num2) {
                actions.push(KeyboardAction::RenderedMode);
            }
            if input.consume_key(command, egui::Key::E) {
                actions.push(KeyboardAction::ToggleMode);
            }
            if input.consume_key(command, egui::Key::Backslash) {
                actions.push(KeyboardAction::ToggleSidebar);
            }
        });
        actions
    }

    fn run_keyboard_action(&mut self, action: KeyboardAction, now: Instant) {
        match action {
            KeyboardAction::Save => self.save_document(),
            KeyboardAction::SaveAs => self.save_document_as(),
            KeyboardAction::Open => self.request_file_action(PendingAction::OpenFile(None)),
            KeyboardAction::New => self.request_file_action(PendingAction::NewFile),
            KeyboardAction::SourceMode => self.controller.request_mode(
                EditorMode::SourceEditable,
                &mut self.editor_pane,
                &mut self.preview_pane,
                now,
            ),
            KeyboardAction::RenderedMode => self.controller.request_mode(
                EditorMode::RenderedEditable,
                &mut self.editor_pane,
                &mut self.preview_pane,
                now,
            ),
            KeyboardAction::ToggleMode => {
                let target = self.controller.mode().toggle();
                self.controller.request_mode(
                    target,
                    &mut self.editor_pane,
                    &mut self.preview_pane,
                    now,
                );
            }
            KeyboardAction::ToggleSidebar => {
                self.settings.show_sidebar = !self.settings.show_sidebar;
            }
        }
    }

    fn show_menu_bar(&mut self, ctx: &egui::Context, now: Instant) {
        egui::TopBottomPanel::top("menu-bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("New").clicked() {
                        self.request_file_action(PendingAction::NewFile);
                        ui.close_menu();
                    }
                    if ui.button("Open…").clicked() {
                        self.request_file_action(PendingAction::OpenFile(None));
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Save").clicked() {
                        self.save_document();
                        ui.close_menu();
                    }
                    if ui.button("Save As…").clicked() {
                        self.save_document_as();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Document Properties…").clicked() {
                        let metadata = self.controller.document().metadata();
                        self.front_matter_dialog.open_with(&metadata);
                        ui.close_menu();
                    }
                    ui.separator();
                    ui.menu_button("Export", |ui| {
                        for &format in ExportFormat::all() {
                            if ui.button(format!("Export as {}…", format.label())).clicked() {
                                self.export_document(format);
                                ui.close_menu();
                            }
                        }
                        ui.separator();
                        if ui.button("Copy as HTML").clicked() {
                            match copy_html_to_clipboard(self.controller.document().text()) {
                                Ok(()) => self.set_status("HTML copied to clipboard"),
                                Err(e) => self.set_status(e.to_string()),
                            }
                            ui.close_menu();
                        }
                        if ui.button("Copy as Markdown").clicked() {
                            match copy_text_to_clipboard(self.controller.document().text()) {
                                Ok(()) => self.set_status("Markdown copied to clipboard"),
                                Err(e) => self.set_status(e.to_string()),
                            }
                            ui.close_menu();
                        }
                    });
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("View", |ui| {
                    let mode = self.controller.mode();
                    if ui
                        .selectable_label(mode == EditorMode::SourceEditable, "Source Mode")
                        .clicked()
                    {
                        self.controller.request_mode(
                            EditorMode::SourceEditable,
                            &mut self.editor_pane,
                            &mut self.preview_pane,
                            now,
                        );
                        ui.close_menu();
                    }
                    if ui
                        .selectable_label(mode == EditorMode::RenderedEditable, "Visual Mode")
                        .clicked()
                    {
                        self.controller.request_mode(
                            EditorMode::RenderedEditable,
                            &mut self.editor_pane,
                            &mut self.preview_pane,
                            now,
                        );
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui
                        .checkbox(&mut self.settings.show_sidebar, "Sidebar")
                        .clicked()
                    {
                        ui.close_menu();
                    }
                });

                ui.menu_button("Tools", |ui| {
                    if ui.button("Settings…").clicked() {
                        self.settings_dialog.open();
                        ui.close_menu();
                    }
                    if ui.button("Check Pandoc…").clicked() {
                        let exporter = PandocExporter::new(self.settings.export.clone());
                        match exporter.check_installation() {
                            Ok(version) => self.set_status(version),
                            Err(e) => self.set_status(e.to_string()),
                        }
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Markdown Guide").clicked() {
                        if let Err(e) = open::that("https://commonmark.org/help/") {
                            warn!("Could not open browser: {}", e);
                        }
                        ui.close_menu();
                    }
                });

                // Mode indicator on the right edge
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let mode = self.controller.mode();
                    ui.label(
                        egui::RichText::new(mode.label())
                            .strong()
                            .color(match mode {
                                EditorMode::SourceEditable => {
                                    egui::Color32::from_rgb(100, 160, 230)
                                }
                                EditorMode::RenderedEditable => {
                                    egui::Color32::from_rgb(230, 150, 80)
                                }
                            }),
                    );
                    ui.label("Mode:");
                });
            });
        });
    }

    fn show_status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status-bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let stats = self.controller.document().stats();
                ui.label(format!(
                    "Words: {} | Chars: {} | ¶: {} | ~{} min",
                    stats.words,
                    stats.chars,
                    stats.paragraphs,
                    stats.read_time_minutes()
                ));
                ui.separator();
                let (line, col) = self.editor_pane.cursor_position();
                ui.label(format!("Line: {}, Col: {}", line + 1, col + 1));

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if self.controller.is_applying() || self.convert_debounce.is_pending() {
                        ui.label("⟳ syncing");
                    } else {
                        ui.label("● synced");
                    }
                    ui.separator();
                    if let Some((message, _)) = &self.status_message {
                        ui.label(message.clone());
                    }
                });
            });
        });
    }

    fn show_confirm_dialog(&mut self, ctx: &egui::Context) {
        if self.pending_action.is_none() {
            return;
        }

        let mut decision: Option<bool> = None; // Some(true) = discard
        let mut cancel = false;
        egui::Window::new("Unsaved Changes")
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label("The current document has unsaved changes.");
                ui.horizontal(|ui| {
                    if ui.button("Save").clicked() {
                        decision = Some(false);
                    }
                    if ui.button("Discard").clicked() {
                        decision = Some(true);
                    }
                    if ui.button("Cancel").clicked() {
                        cancel = true;
                    }
                });
            });

        if cancel {
            self.pending_action = None;
            return;
        }
        if let Some(discard) = decision {
            if !discard {
                self.save_document();
                if self.controller.document().is_dirty() {
                    // Save was cancelled or failed; keep the dialog up
                    return;
                }
            }
            if let Some(action) = self.pending_action.take() {
                self.run_file_action(action);
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// eframe::App
// ─────────────────────────────────────────────────────────────────────────────

impl eframe::App for TandemApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        // Keyboard shortcuts (deferred execution)
        for action in self.keyboard_actions(ctx) {
            self.run_keyboard_action(action, now);
        }

        self.show_menu_bar(ctx, now);
        self.show_status_bar(ctx);
        self.show_confirm_dialog(ctx);

        // Sidebar
        if self.settings.show_sidebar {
            let mut sidebar_action = None;
            egui::SidePanel::left("sidebar")
                .default_width(self.settings.sidebar_width)
                .show(ctx, |ui| {
                    sidebar_action = self.sidebar.show(ui);
                });
            match sidebar_action {
                Some(SidebarAction::GotoLine(line)) => self.goto_line(line, now),
                Some(SidebarAction::OpenFile(path)) => {
                    self.request_file_action(PendingAction::OpenFile(Some(path)));
                }
                None => {}
            }
        }

        // Central panes
        let mut editor_output = None;
        let mut preview_output = None;
        egui::CentralPanel::default().show(ctx, |ui| {
            match self.controller.mode() {
                EditorMode::SourceEditable => {
                    // Split view: source on the left, preview on the right
                    ui.columns(2, |columns| {
                        editor_output = Some(self.editor_pane.show(&mut columns[0]));
                        preview_output =
                            Some(self.preview_pane.show(&mut columns[1], &self.highlighter));
                    });
                }
                EditorMode::RenderedEditable => {
                    preview_output = Some(self.preview_pane.show(ui, &self.highlighter));
                }
            }
        });

        // Wire pane outputs into the controller
        if let Some(output) = editor_output {
            if output.edited {
                let text = self.editor_pane.content();
                self.controller.on_source_changed(&text, now);
            }
            if let Some(ratio) = output.scrolled {
                if self.settings.sync_scroll {
                    self.controller
                        .on_source_scrolled(ratio, &mut self.preview_pane, now);
                }
            }
            if let Some(line) = output.cursor_moved_to_line {
                self.sidebar.set_cursor_line(line + 1);
                if self.settings.sync_cursor {
                    self.controller
                        .on_source_cursor_moved(line, &mut self.preview_pane, now);
                }
            }
        }

        if let Some(output) = preview_output {
            if output.edited {
                // Coalesce WYSIWYG keystrokes before converting back
                self.convert_debounce.schedule(now);
            }
            if let Some(ratio) = output.scrolled {
                if self.settings.sync_scroll {
                    self.controller
                        .on_rendered_scrolled(ratio, &mut self.editor_pane, now);
                }
            }
            if let Some(id) = output.push_completed {
                self.controller
                    .complete_push(id, &mut self.editor_pane, &mut self.preview_pane);
            }
        }

        if self.convert_debounce.fire_if_due(now) {
            let html = self.preview_pane.content();
            self.controller
                .on_rendered_changed(&html, &mut self.editor_pane, now);
        }

        // Drive debounce timers and the push timeout
        self.controller.tick(now, &mut self.preview_pane);

        // Drain controller events
        for event in self.controller.take_events() {
            match event {
                SyncEvent::DocumentChanged => {}
                SyncEvent::RefreshDerived => self.refresh_derived_state(),
                SyncEvent::ModeChanged(mode) => {
                    // Any half-typed WYSIWYG pull is superseded by the
                    // switch itself
                    self.convert_debounce.cancel();
                    self.set_status(format!("{} mode", mode.label()));
                }
                SyncEvent::Error(message) => {
                    warn!("Sync error: {}", message);
                    self.set_status(message);
                }
            }
        }

        // Dialogs
        if let Some(metadata) = self.front_matter_dialog.show(ctx) {
            self.controller
                .apply_metadata(&metadata, &mut self.editor_pane, now);
            self.set_status("Document properties updated");
        }
        if self.settings_dialog.show(ctx, &mut self.settings) {
            self.editor_pane.set_font_size(self.settings.font_size);
            self.preview_pane.set_font_size(self.settings.font_size);
            apply_theme(ctx, self.settings.theme);
            save_config_silent(&self.settings);
        }

        // Track window geometry for session restore
        let (inner_rect, maximized) = ctx.input(|input| {
            (
                input.viewport().inner_rect,
                input.viewport().maximized.unwrap_or(false),
            )
        });
        if let Some(rect) = inner_rect {
            if !maximized {
                self.settings.window_size.width = rect.width();
                self.settings.window_size.height = rect.height();
            }
        }
        self.settings.window_size.maximized = maximized;

        // Window title follows the document
        let title = format!("{} - Tandem", self.controller.document().title());
        if title != self.window_title {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
            self.window_title = title;
        }

        // Expire transient status messages
        if let Some((_, set_at)) = self.status_message {
            if now.duration_since(set_at) > STATUS_MESSAGE_DURATION {
                self.status_message = None;
            }
        }

        // Wake up when the next timer is due instead of spinning; a deferred
        // push needs the very next frame so its completion can be reported
        if self.controller.is_applying() {
            ctx.request_repaint();
        }
        let deadlines = [
            self.controller.next_deadline(now),
            self.convert_debounce.time_remaining(now),
        ];
        if let Some(delay) = deadlines.into_iter().flatten().min() {
            ctx.request_repaint_after(delay);
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        save_config_silent(&self.settings);
        info!("Tandem shutting down");
    }
}

/// Apply the configured theme to the egui context.
fn apply_theme(ctx: &egui::Context, theme: Theme) {
    match theme {
        Theme::Dark => ctx.set_visuals(egui::Visuals::dark()),
        Theme::Light => ctx.set_visuals(egui::Visuals::light()),
        // Follow whatever egui picked up from the system
        Theme::System => {}
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Welcome Content
// ─────────────────────────────────────────────────────────────────────────────

const WELCOME_CONTENT: &str = r#"---
title: "Welcome to Tandem"
author: "Tandem"
tags: ["markdown", "editor"]
---

# Welcome to Tandem

A markdown editor where the **source** and the **preview** stay in step,
whichever one you edit.

## Getting started

1. Type in the source pane and watch the preview follow
2. Switch to *Visual Mode* (Ctrl+2) to edit the rendered view directly
3. Switch back (Ctrl+1) and your edits are markdown again

## Things to try

- Scroll either pane; the other keeps pace
- Click a heading in the outline sidebar
- Open *File → Document Properties* to edit the front matter

```rust
fn main() {
    println!("two views, one document");
}
```

> The source text is the single source of truth; the preview is always
> derived from it.
"#;
