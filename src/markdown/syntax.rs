//! Syntax highlighting for preview code blocks
//!
//! Integrates syntect to colorize fenced code blocks in the rendered view.
//! The SyntaxSet and ThemeSet are expensive to load, so one highlighter is
//! created at startup and reused.

use eframe::egui::{Color32, FontId, RichText};
use log::debug;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Style, Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

/// Default dark theme name from syntect's built-in themes
pub const DEFAULT_DARK_THEME: &str = "base16-ocean.dark";

/// Default light theme name from syntect's built-in themes
pub const DEFAULT_LIGHT_THEME: &str = "InspiredGitHub";

// ─────────────────────────────────────────────────────────────────────────────
// Highlighted Segments
// ─────────────────────────────────────────────────────────────────────────────

/// A run of highlighted text with its style.
#[derive(Debug, Clone)]
pub struct HighlightedSegment {
    pub text: String,
    pub foreground: Color32,
    pub bold: bool,
    pub italic: bool,
}

impl HighlightedSegment {
    /// Convert this segment to egui RichText at the given font size.
    pub fn to_rich_text(&self, font_size: f32) -> RichText {
        let mut rich_text = RichText::new(&self.text)
            .color(self.foreground)
            .font(FontId::monospace(font_size));
        if self.bold {
            rich_text = rich_text.strong();
        }
        if self.italic {
            rich_text = rich_text.italics();
        }
        rich_text
    }
}

/// One source line as a list of styled segments.
#[derive(Debug, Clone)]
pub struct HighlightedLine {
    pub segments: Vec<HighlightedSegment>,
}

impl HighlightedLine {
    fn plain(text: &str, color: Color32) -> Self {
        Self {
            segments: vec![HighlightedSegment {
                text: text.trim_end_matches('\n').to_string(),
                foreground: color,
                bold: false,
                italic: false,
            }],
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Syntax Highlighter
// ─────────────────────────────────────────────────────────────────────────────

/// Cached syntect syntax and theme sets.
pub struct SyntaxHighlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl Default for SyntaxHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxHighlighter {
    /// Load the default syntaxes and themes bundled with syntect.
    pub fn new() -> Self {
        debug!("Loading syntect syntax and theme sets");
        let syntax_set = SyntaxSet::load_defaults_newlines();
        let theme_set = ThemeSet::load_defaults();
        Self {
            syntax_set,
            theme_set,
        }
    }

    fn theme_for_mode(&self, dark_mode: bool) -> &Theme {
        let name = if dark_mode {
            DEFAULT_DARK_THEME
        } else {
            DEFAULT_LIGHT_THEME
        };
        self.theme_set
            .themes
            .get(name)
            .or_else(|| self.theme_set.themes.values().next())
            .expect("syntect ships built-in themes")
    }

    /// Highlight a code block for dark or light mode.
    ///
    /// Unknown languages fall back to plain text in the theme's foreground
    /// color — never an error.
    pub fn highlight_code(&self, code: &str, language: &str, dark_mode: bool) -> Vec<HighlightedLine> {
        let theme = self.theme_for_mode(dark_mode);
        let fallback = theme
            .settings
            .foreground
            .map(syntect_to_egui_color)
            .unwrap_or(Color32::GRAY);

        let syntax = self.find_syntax_for_language(language);
        let syntax = match syntax {
            Some(s) => s,
            None => {
                debug!("No syntax found for language: {}", language);
                return code
                    .lines()
                    .map(|line| HighlightedLine::plain(line, fallback))
                    .collect();
            }
        };

        let mut highlighter = HighlightLines::new(syntax, theme);
        let mut lines = Vec::new();
        for line in LinesWithEndings::from(code) {
            match highlighter.highlight_line(line, &self.syntax_set) {
                Ok(ranges) => {
                    let segments = ranges
                        .into_iter()
                        .map(|(style, text)| style_to_segment(style, text))
                        .collect();
                    lines.push(HighlightedLine { segments });
                }
                Err(_) => lines.push(HighlightedLine::plain(line, fallback)),
            }
        }
        lines
    }

    /// Find a syntax definition for a fenced-block language identifier.
    fn find_syntax_for_language(
        &self,
        language: &str,
    ) -> Option<&syntect::parsing::SyntaxReference> {
        if language.is_empty() {
            return None;
        }

        let lang_lower = language.to_lowercase();
        let extension = match lang_lower.as_str() {
            "rust" | "rs" => "rs",
            "python" | "py" => "py",
            "javascript" | "js" => "js",
            "typescript" | "ts" => "ts",
            "c" => "c",
            "cpp" | "c++" => "cpp",
            "go" | "golang" => "go",
            "ruby" | "rb" => "rb",
            "shell" | "bash" | "sh" => "sh",
            "html" | "htm" => "html",
            "css" => "css",
            "json" => "json",
            "yaml" | "yml" => "yaml",
            "toml" => "toml",
            "markdown" | "md" => "md",
            "sql" => "sql",
            "xml" => "xml",
            other => other,
        };

        self.syntax_set
            .find_syntax_by_extension(extension)
            .or_else(|| self.syntax_set.find_syntax_by_token(&lang_lower))
    }
}

fn style_to_segment(style: Style, text: &str) -> HighlightedSegment {
    use syntect::highlighting::FontStyle;
    HighlightedSegment {
        text: text.trim_end_matches('\n').to_string(),
        foreground: syntect_to_egui_color(style.foreground),
        bold: style.font_style.contains(FontStyle::BOLD),
        italic: style.font_style.contains(FontStyle::ITALIC),
    }
}

fn syntect_to_egui_color(color: syntect::highlighting::Color) -> Color32 {
    Color32::from_rgb(color.r, color.g, color.b)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_known_language() {
        let highlighter = SyntaxHighlighter::new();
        let lines = highlighter.highlight_code("fn main() {}\n", "rust", true);
        assert_eq!(lines.len(), 1);
        assert!(!lines[0].segments.is_empty());
    }

    #[test]
    fn test_unknown_language_falls_back_to_plain() {
        let highlighter = SyntaxHighlighter::new();
        let lines = highlighter.highlight_code("one\ntwo\n", "nosuchlang-xyz", true);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].segments.len(), 1);
        assert_eq!(lines[0].segments[0].text, "one");
    }

    #[test]
    fn test_language_aliases() {
        let highlighter = SyntaxHighlighter::new();
        assert!(highlighter.find_syntax_for_language("python").is_some());
        assert!(highlighter.find_syntax_for_language("py").is_some());
        assert!(highlighter.find_syntax_for_language("").is_none());
    }
}
