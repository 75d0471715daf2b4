//! Modal dialogs
//!
//! The front matter properties dialog and the settings dialog. Both are
//! plain egui windows driven by the shell; neither touches the document or
//! config directly — they hand the edited values back and the shell routes
//! them through the controller / persistence.

use eframe::egui::{self, Context, Grid, Slider, Window};
use std::collections::BTreeMap;

use crate::config::{Settings, Theme};
use crate::document::DocMetadata;

// ─────────────────────────────────────────────────────────────────────────────
// Front Matter Dialog
// ─────────────────────────────────────────────────────────────────────────────

/// Edits the document's metadata block.
#[derive(Default)]
pub struct FrontMatterDialog {
    open: bool,
    title: String,
    author: String,
    date: String,
    description: String,
    /// Comma-separated in the dialog
    tags: String,
    categories: String,
    draft: bool,
    /// Unknown keys carried through untouched
    custom: BTreeMap<String, serde_yaml::Value>,
    validation: Vec<String>,
}

impl FrontMatterDialog {
    /// Open the dialog pre-filled from existing metadata.
    pub fn open_with(&mut self, metadata: &DocMetadata) {
        self.title = metadata.title.clone();
        self.author = metadata.author.clone();
        self.date = metadata.date.clone();
        self.description = metadata.description.clone();
        self.tags = metadata.tags.join(", ");
        self.categories = metadata.categories.join(", ");
        self.draft = metadata.draft;
        self.custom = metadata.custom.clone();
        self.validation.clear();
        self.open = true;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Draw the dialog. Returns the edited metadata when Apply is clicked.
    pub fn show(&mut self, ctx: &Context) -> Option<DocMetadata> {
        if !self.open {
            return None;
        }

        let mut result = None;
        let mut open = self.open;

        Window::new("Document Properties")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                Grid::new("front-matter-grid")
                    .num_columns(2)
                    .spacing([8.0, 6.0])
                    .show(ui, |ui| {
                        ui.label("Title");
                        ui.text_edit_singleline(&mut self.title);
                        ui.end_row();

                        ui.label("Author");
                        ui.text_edit_singleline(&mut self.author);
                        ui.end_row();

                        ui.label("Date");
                        ui.text_edit_singleline(&mut self.date);
                        ui.end_row();

                        ui.label("Description");
                        ui.text_edit_singleline(&mut self.description);
                        ui.end_row();

                        ui.label("Tags");
                        ui.text_edit_singleline(&mut self.tags);
                        ui.end_row();

                        ui.label("Categories");
                        ui.text_edit_singleline(&mut self.categories);
                        ui.end_row();

                        ui.label("Draft");
                        ui.checkbox(&mut self.draft, "");
                        ui.end_row();
                    });

                if !self.custom.is_empty() {
                    ui.weak(format!("{} custom field(s) preserved", self.custom.len()));
                }

                for issue in &self.validation {
                    ui.colored_label(egui::Color32::from_rgb(220, 80, 80), issue);
                }

                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Apply").clicked() {
                        let metadata = self.collect();
                        self.validation = metadata.validate();
                        if self.validation.is_empty() {
                            result = Some(metadata);
                            self.open = false;
                        }
                    }
                    if ui.button("Cancel").clicked() {
                        self.open = false;
                    }
                });
            });

        // A click on the window's close button
        if !open {
            self.open = false;
        }
        result
    }

    fn collect(&self) -> DocMetadata {
        DocMetadata {
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            date: self.date.trim().to_string(),
            description: self.description.trim().to_string(),
            tags: split_list(&self.tags),
            categories: split_list(&self.categories),
            draft: self.draft,
            custom: self.custom.clone(),
        }
    }
}

/// Split a comma-separated dialog field into trimmed, non-empty entries.
fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Settings Dialog
// ─────────────────────────────────────────────────────────────────────────────

/// Edits a subset of `Settings` in place.
#[derive(Default)]
pub struct SettingsDialog {
    open: bool,
}

impl SettingsDialog {
    pub fn open(&mut self) {
        self.open = true;
    }

    /// Draw the dialog, mutating `settings` directly.
    ///
    /// Returns true while the dialog is making changes so the shell can
    /// persist and re-apply them.
    pub fn show(&mut self, ctx: &Context, settings: &mut Settings) -> bool {
        if !self.open {
            return false;
        }

        let mut changed = false;
        let mut open = self.open;

        Window::new("Settings")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.heading("Appearance");
                ui.horizontal(|ui| {
                    ui.label("Theme");
                    changed |= ui
                        .selectable_value(&mut settings.theme, Theme::Dark, "Dark")
                        .clicked();
                    changed |= ui
                        .selectable_value(&mut settings.theme, Theme::Light, "Light")
                        .clicked();
                    changed |= ui
                        .selectable_value(&mut settings.theme, Theme::System, "System")
                        .clicked();
                });
                changed |= ui
                    .add(Slider::new(&mut settings.font_size, 8.0..=32.0).text("Font size"))
                    .changed();

                ui.separator();
                ui.heading("Sync");
                changed |= ui
                    .checkbox(&mut settings.sync_scroll, "Synchronize scrolling")
                    .changed();
                changed |= ui
                    .checkbox(&mut settings.sync_cursor, "Follow cursor in preview")
                    .changed();
                changed |= ui
                    .add(
                        Slider::new(&mut settings.sync.render_debounce_ms, 16..=1000)
                            .text("Preview delay (ms)"),
                    )
                    .changed();

                ui.separator();
                ui.heading("Linting");
                changed |= ui
                    .checkbox(&mut settings.lint_enabled, "Enable linting")
                    .changed();

                ui.separator();
                ui.heading("Export");
                ui.horizontal(|ui| {
                    ui.label("Pandoc path");
                    changed |= ui
                        .text_edit_singleline(&mut settings.export.pandoc_path)
                        .changed();
                });
                changed |= ui
                    .checkbox(&mut settings.export.standalone, "Standalone documents")
                    .changed();
                changed |= ui
                    .checkbox(&mut settings.export.table_of_contents, "Table of contents")
                    .changed();
            });

        self.open = open;
        changed
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("a, b ,c"), vec!["a", "b", "c"]);
        assert_eq!(split_list(""), Vec::<String>::new());
        assert_eq!(split_list(" , ,"), Vec::<String>::new());
    }

    #[test]
    fn test_dialog_collect_roundtrip() {
        let metadata = DocMetadata {
            title: "T".to_string(),
            tags: vec!["x".to_string(), "y".to_string()],
            draft: true,
            ..DocMetadata::default()
        };

        let mut dialog = FrontMatterDialog::default();
        dialog.open_with(&metadata);
        assert!(dialog.is_open());
        assert_eq!(dialog.collect(), metadata);
    }
}
