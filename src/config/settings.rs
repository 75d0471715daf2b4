//! User settings and preferences for Tandem
//!
//! This module defines the `Settings` struct that holds all user-configurable
//! options, with serde support for JSON persistence. Sync timing values live
//! here so the controller can be tuned without a rebuild.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Theme Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Available color themes for the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
    System,
}

// ─────────────────────────────────────────────────────────────────────────────
// Window Size Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Window dimensions and position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowSize {
    /// Window width in pixels
    pub width: f32,
    /// Window height in pixels
    pub height: f32,
    /// Window X position (optional, for restoring position)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    /// Window Y position (optional, for restoring position)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    /// Whether the window was maximized
    #[serde(default)]
    pub maximized: bool,
}

impl Default for WindowSize {
    fn default() -> Self {
        Self {
            width: 1400.0,
            height: 900.0,
            x: None,
            y: None,
            maximized: false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sync Timing Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Timing knobs for the sync controller.
///
/// All values are in milliseconds. The render debounce coalesces keystrokes
/// into a single preview push; the refresh debounce (outline + lint) is
/// intentionally longer so sidebar churn stays behind preview updates; the
/// push timeout bounds how long a deferred push may stay unacknowledged
/// before the controller abandons it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncTiming {
    /// Debounce before pushing source edits to the rendered view
    pub render_debounce_ms: u64,
    /// Debounce before refreshing the outline and lint results
    pub refresh_debounce_ms: u64,
    /// Debounce before pulling rendered-view edits back to the source
    pub convert_debounce_ms: u64,
    /// How long a deferred push may remain unacknowledged
    pub push_timeout_ms: u64,
}

impl Default for SyncTiming {
    fn default() -> Self {
        Self {
            render_debounce_ms: 150,
            refresh_debounce_ms: 400,
            convert_debounce_ms: 150,
            push_timeout_ms: 2000,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Export Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Preferences for the external document converter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Path or name of the pandoc executable
    pub pandoc_path: String,
    /// Produce standalone documents (with header/footer)
    pub standalone: bool,
    /// Include a table of contents
    pub table_of_contents: bool,
    /// Number section headings
    pub number_sections: bool,
    /// Syntax highlight style passed to pandoc (empty for default)
    pub highlight_style: String,
    /// PDF engine (empty for pandoc's default)
    pub pdf_engine: String,
    /// Default directory for exported files (None = alongside the source)
    pub export_dir: Option<PathBuf>,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            pandoc_path: "pandoc".to_string(),
            standalone: true,
            table_of_contents: false,
            number_sections: false,
            highlight_style: String::new(),
            pdf_engine: String::new(),
            export_dir: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Main Settings Struct
// ─────────────────────────────────────────────────────────────────────────────

/// User preferences and application settings.
///
/// This struct is serialized to JSON and persisted to the user's config
/// directory. All fields have sensible defaults via the `Default` trait and
/// `#[serde(default)]`, so partial or outdated config files still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // ─────────────────────────────────────────────────────────────────────────
    // Appearance
    // ─────────────────────────────────────────────────────────────────────────
    /// Color theme (light, dark, or system)
    pub theme: Theme,

    /// Font size for the source editor (in points)
    pub font_size: f32,

    /// Whether the sidebar (outline/issues/files) is visible
    pub show_sidebar: bool,

    /// Sidebar width in pixels
    pub sidebar_width: f32,

    // ─────────────────────────────────────────────────────────────────────────
    // Sync Behavior
    // ─────────────────────────────────────────────────────────────────────────
    /// Sync controller timing
    pub sync: SyncTiming,

    /// Whether scroll positions are kept aligned between the two views
    pub sync_scroll: bool,

    /// Whether moving the source caret scrolls the rendered view
    pub sync_cursor: bool,

    // ─────────────────────────────────────────────────────────────────────────
    // Linting
    // ─────────────────────────────────────────────────────────────────────────
    /// Whether lint results are computed and shown
    pub lint_enabled: bool,

    /// Maximum line length before the long-line rule fires
    pub lint_max_line_length: usize,

    // ─────────────────────────────────────────────────────────────────────────
    // Export
    // ─────────────────────────────────────────────────────────────────────────
    /// External converter preferences
    pub export: ExportSettings,

    // ─────────────────────────────────────────────────────────────────────────
    // Window State
    // ─────────────────────────────────────────────────────────────────────────
    /// Saved window geometry
    pub window_size: WindowSize,

    /// Last directory used in open/save dialogs
    pub last_directory: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            font_size: 14.0,
            show_sidebar: true,
            sidebar_width: 260.0,
            sync: SyncTiming::default(),
            sync_scroll: true,
            sync_cursor: true,
            lint_enabled: true,
            lint_max_line_length: 120,
            export: ExportSettings::default(),
            window_size: WindowSize::default(),
            last_directory: None,
        }
    }
}

impl Settings {
    /// Sanitize loaded settings, clamping out-of-range values.
    ///
    /// Config files are user-editable, so every numeric field gets bounds
    /// checked on load.
    pub fn sanitize(mut self) -> Self {
        self.font_size = self.font_size.clamp(8.0, 32.0);
        self.sidebar_width = self.sidebar_width.clamp(140.0, 600.0);
        self.window_size.width = self.window_size.width.max(400.0);
        self.window_size.height = self.window_size.height.max(300.0);
        self.sync.render_debounce_ms = self.sync.render_debounce_ms.clamp(16, 2000);
        self.sync.refresh_debounce_ms = self.sync.refresh_debounce_ms.clamp(16, 5000);
        self.sync.convert_debounce_ms = self.sync.convert_debounce_ms.clamp(16, 2000);
        self.sync.push_timeout_ms = self.sync.push_timeout_ms.clamp(250, 30_000);
        if self.lint_max_line_length == 0 {
            self.lint_max_line_length = 120;
        }
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.theme, Theme::Dark);
        assert!(settings.sync_scroll);
        assert!(settings.lint_enabled);
        assert_eq!(settings.sync.render_debounce_ms, 150);
        assert!(settings.sync.refresh_debounce_ms > settings.sync.render_debounce_ms);
    }

    #[test]
    fn test_settings_roundtrip_json() {
        let settings = Settings::default();
        let json = serde_json::to_string(&settings).unwrap();
        let loaded: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(settings, loaded);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let loaded: Settings = serde_json::from_str(r#"{"font_size": 18.0}"#).unwrap();
        assert_eq!(loaded.font_size, 18.0);
        assert_eq!(loaded.sync, SyncTiming::default());
        assert_eq!(loaded.theme, Theme::Dark);
    }

    #[test]
    fn test_sanitize_clamps_values() {
        let mut settings = Settings::default();
        settings.font_size = 500.0;
        settings.sync.render_debounce_ms = 0;
        settings.lint_max_line_length = 0;
        let settings = settings.sanitize();
        assert_eq!(settings.font_size, 32.0);
        assert_eq!(settings.sync.render_debounce_ms, 16);
        assert_eq!(settings.lint_max_line_length, 120);
    }

    #[test]
    fn test_export_settings_default_pandoc_path() {
        assert_eq!(ExportSettings::default().pandoc_path, "pandoc");
    }
}
