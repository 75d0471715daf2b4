//! Sidebar: outline, issues, file explorer
//!
//! Read-only navigation chrome fed from the controller's derived-state
//! refreshes. Clicking an outline heading or a lint issue jumps the editor
//! to that line; the file explorer opens documents and walks directories.

use eframe::egui::{self, RichText, ScrollArea, Ui};
use std::path::PathBuf;

use crate::files::{list_directory, DirEntryKind, ExplorerEntry};
use crate::markdown::{DocumentOutline, LintIssue, LintSeverity};

/// Actions the sidebar asks the shell to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidebarAction {
    /// Jump the editor (and preview) to a 1-indexed line
    GotoLine(usize),
    /// Open this document
    OpenFile(PathBuf),
}

/// The collapsible navigation panel.
pub struct Sidebar {
    outline: DocumentOutline,
    issues: Vec<LintIssue>,
    directory: Option<PathBuf>,
    entries: Vec<ExplorerEntry>,
    /// Outline index of the section containing the cursor
    current_section: Option<usize>,
}

impl Default for Sidebar {
    fn default() -> Self {
        Self::new()
    }
}

impl Sidebar {
    pub fn new() -> Self {
        Self {
            outline: DocumentOutline::default(),
            issues: Vec::new(),
            directory: None,
            entries: Vec::new(),
            current_section: None,
        }
    }

    /// Replace the outline (on derived-state refresh).
    pub fn set_outline(&mut self, outline: DocumentOutline) {
        self.outline = outline;
    }

    /// Replace the lint results (on derived-state refresh).
    pub fn set_issues(&mut self, issues: Vec<LintIssue>) {
        self.issues = issues;
    }

    /// Point the file explorer at a directory.
    pub fn set_directory(&mut self, directory: PathBuf) {
        self.entries = list_directory(&directory);
        self.directory = Some(directory);
    }

    /// Track the cursor for the current-section highlight (1-indexed line).
    pub fn set_cursor_line(&mut self, line: usize) {
        self.current_section = self.outline.find_current_section(line);
    }

    /// Draw the sidebar; returns at most one action per frame.
    pub fn show(&mut self, ui: &mut Ui) -> Option<SidebarAction> {
        let mut action = None;

        ScrollArea::vertical()
            .id_source("sidebar-scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                egui::CollapsingHeader::new("Outline")
                    .default_open(true)
                    .show(ui, |ui| {
                        if let Some(a) = self.show_outline(ui) {
                            action = Some(a);
                        }
                    });

                egui::CollapsingHeader::new(format!("Issues ({})", self.issues.len()))
                    .default_open(false)
                    .show(ui, |ui| {
                        if let Some(a) = self.show_issues(ui) {
                            action = Some(a);
                        }
                    });

                egui::CollapsingHeader::new("Files")
                    .default_open(false)
                    .show(ui, |ui| {
                        if let Some(a) = self.show_files(ui) {
                            action = Some(a);
                        }
                    });
            });

        action
    }

    fn show_outline(&self, ui: &mut Ui) -> Option<SidebarAction> {
        if self.outline.is_empty() {
            ui.weak("No headings");
            return None;
        }

        let mut action = None;
        for (index, item) in self.outline.items.iter().enumerate() {
            let indent = "    ".repeat(item.indent_level());
            let selected = self.current_section == Some(index);
            let label = format!("{}{}", indent, item.title);
            if ui.selectable_label(selected, label).clicked() {
                action = Some(SidebarAction::GotoLine(item.line));
            }
        }
        action
    }

    fn show_issues(&self, ui: &mut Ui) -> Option<SidebarAction> {
        if self.issues.is_empty() {
            ui.weak("No issues found");
            return None;
        }

        let mut action = None;
        for issue in &self.issues {
            let color = match issue.severity {
                LintSeverity::Error => egui::Color32::from_rgb(220, 80, 80),
                LintSeverity::Warning => egui::Color32::from_rgb(220, 160, 60),
                LintSeverity::Info => egui::Color32::from_rgb(100, 150, 220),
            };
            let label = RichText::new(format!("L{}: {}", issue.line, issue.message)).color(color);
            let response = ui
                .selectable_label(false, label)
                .on_hover_text(format!("{} · {}", issue.severity.label(), issue.rule));
            if response.clicked() {
                action = Some(SidebarAction::GotoLine(issue.line));
            }
        }
        action
    }

    fn show_files(&mut self, ui: &mut Ui) -> Option<SidebarAction> {
        let directory = match &self.directory {
            Some(directory) => directory.clone(),
            None => {
                ui.weak("No folder");
                return None;
            }
        };

        ui.weak(
            directory
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| directory.display().to_string()),
        );

        if let Some(parent) = directory.parent() {
            if ui.selectable_label(false, "⬆ ..").clicked() {
                self.set_directory(parent.to_path_buf());
                return None;
            }
        }

        let mut action = None;
        let mut navigate_to = None;
        for entry in &self.entries {
            match entry.kind {
                DirEntryKind::Directory => {
                    if ui
                        .selectable_label(false, format!("🗀 {}", entry.name))
                        .clicked()
                    {
                        navigate_to = Some(entry.path.clone());
                    }
                }
                DirEntryKind::File => {
                    if ui
                        .selectable_label(false, format!("🗋 {}", entry.name))
                        .clicked()
                    {
                        action = Some(SidebarAction::OpenFile(entry.path.clone()));
                    }
                }
            }
        }

        if let Some(path) = navigate_to {
            self.set_directory(path);
        }
        action
    }
}
