//! External document converter (pandoc) integration
//!
//! Builds and runs pandoc commands for the formats the built-in renderer
//! cannot produce. The document text is written to a temporary markdown
//! file with the front matter stripped; pandoc's exit status and stderr are
//! folded into an `ExportOutcome` the UI can show verbatim. Nothing here is
//! fatal — a missing pandoc is reported, not panicked over.

use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::ExportSettings;
use crate::document::split_front_matter;
use crate::error::{Error, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Formats
// ─────────────────────────────────────────────────────────────────────────────

/// Target formats offered in the export menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Html,
    Pdf,
    Docx,
    Odt,
    Epub,
    Latex,
}

impl ExportFormat {
    /// All formats in menu order.
    pub fn all() -> &'static [ExportFormat] {
        &[
            ExportFormat::Html,
            ExportFormat::Pdf,
            ExportFormat::Docx,
            ExportFormat::Odt,
            ExportFormat::Epub,
            ExportFormat::Latex,
        ]
    }

    /// File extension for the output file.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Html => "html",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
            ExportFormat::Odt => "odt",
            ExportFormat::Epub => "epub",
            ExportFormat::Latex => "tex",
        }
    }

    /// Format name passed to pandoc's `--to`.
    pub fn pandoc_name(&self) -> &'static str {
        match self {
            ExportFormat::Html => "html",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
            ExportFormat::Odt => "odt",
            ExportFormat::Epub => "epub",
            ExportFormat::Latex => "latex",
        }
    }

    /// Display label for menus.
    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Html => "HTML",
            ExportFormat::Pdf => "PDF",
            ExportFormat::Docx => "DOCX",
            ExportFormat::Odt => "ODT",
            ExportFormat::Epub => "EPUB",
            ExportFormat::Latex => "LaTeX",
        }
    }

    /// Whether the format requires pandoc (HTML has a built-in fallback).
    pub fn requires_pandoc(&self) -> bool {
        !matches!(self, ExportFormat::Html)
    }
}

/// Result of an export attempt: the only contract surface the UI consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutcome {
    pub success: bool,
    /// Human-readable diagnostic text (pandoc stderr on failure)
    pub message: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Exporter
// ─────────────────────────────────────────────────────────────────────────────

/// Drives the pandoc executable according to the export settings.
pub struct PandocExporter {
    settings: ExportSettings,
}

impl PandocExporter {
    pub fn new(settings: ExportSettings) -> Self {
        Self { settings }
    }

    /// Check whether pandoc is installed, returning its version line.
    pub fn check_installation(&self) -> Result<String> {
        let output = Command::new(&self.settings.pandoc_path)
            .arg("--version")
            .output()
            .map_err(|e| Error::Export {
                format: "any".to_string(),
                message: format!("pandoc not found ({})", e),
            })?;

        if !output.status.success() {
            return Err(Error::Export {
                format: "any".to_string(),
                message: "pandoc not found".to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let version = stdout.lines().next().unwrap_or("pandoc").to_string();
        debug!("Found {}", version);
        Ok(version)
    }

    /// Build the pandoc command line for one conversion.
    pub fn build_command(
        &self,
        input_file: &Path,
        output_file: &Path,
        format: ExportFormat,
    ) -> Command {
        let mut cmd = Command::new(&self.settings.pandoc_path);
        cmd.arg(input_file)
            .arg("-o")
            .arg(output_file)
            .arg("--from")
            .arg("markdown");

        // PDF output format is inferred from the file extension; pandoc
        // rejects an explicit `--to pdf`
        if format != ExportFormat::Pdf {
            cmd.arg("--to").arg(format.pandoc_name());
        }

        if self.settings.standalone {
            cmd.arg("--standalone");
        }
        if self.settings.table_of_contents {
            cmd.arg("--toc");
        }
        if self.settings.number_sections {
            cmd.arg("--number-sections");
        }
        if !self.settings.highlight_style.is_empty() {
            cmd.arg("--highlight-style").arg(&self.settings.highlight_style);
        }
        if format == ExportFormat::Pdf && !self.settings.pdf_engine.is_empty() {
            cmd.arg("--pdf-engine").arg(&self.settings.pdf_engine);
        }

        cmd
    }

    /// Export document text to `output_file`.
    ///
    /// The front matter block is stripped before hand-off; pandoc's own
    /// metadata handling is not engaged. The input is staged in a temporary
    /// file which is removed afterwards, success or not.
    pub fn export(
        &self,
        document_text: &str,
        output_file: &Path,
        format: ExportFormat,
    ) -> ExportOutcome {
        let body = split_front_matter(document_text).body;

        let input_file = temp_input_path();
        if let Err(e) = std::fs::write(&input_file, body) {
            return ExportOutcome {
                success: false,
                message: format!("Could not stage export input: {}", e),
            };
        }

        let result = self.run_pandoc(&input_file, output_file, format);

        if let Err(e) = std::fs::remove_file(&input_file) {
            warn!("Could not remove temp file {}: {}", input_file.display(), e);
        }

        result
    }

    fn run_pandoc(
        &self,
        input_file: &Path,
        output_file: &Path,
        format: ExportFormat,
    ) -> ExportOutcome {
        let mut cmd = self.build_command(input_file, output_file, format);
        debug!("Running {:?}", cmd);

        match cmd.output() {
            Ok(output) if output.status.success() => {
                info!("Exported {} to {}", format.label(), output_file.display());
                ExportOutcome {
                    success: true,
                    message: format!("Exported to {}", output_file.display()),
                }
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                warn!("pandoc failed: {}", stderr.trim());
                ExportOutcome {
                    success: false,
                    message: format!("pandoc error:\n{}", stderr.trim()),
                }
            }
            Err(e) => ExportOutcome {
                success: false,
                message: format!(
                    "Could not run pandoc ({}). Install pandoc for {} export.",
                    e,
                    format.label()
                ),
            },
        }
    }
}

/// A unique-enough temp path for the staged markdown input.
fn temp_input_path() -> PathBuf {
    let stamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    std::env::temp_dir().join(format!("tandem-export-{}-{}.md", std::process::id(), stamp))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn args_of(cmd: &Command) -> Vec<String> {
        cmd.get_args()
            .map(|a| a.to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_format_extensions() {
        assert_eq!(ExportFormat::Html.extension(), "html");
        assert_eq!(ExportFormat::Latex.extension(), "tex");
        assert_eq!(ExportFormat::all().len(), 6);
    }

    #[test]
    fn test_html_does_not_require_pandoc() {
        assert!(!ExportFormat::Html.requires_pandoc());
        assert!(ExportFormat::Pdf.requires_pandoc());
    }

    #[test]
    fn test_build_command_basic() {
        let exporter = PandocExporter::new(ExportSettings::default());
        let cmd = exporter.build_command(
            Path::new("in.md"),
            Path::new("out.docx"),
            ExportFormat::Docx,
        );
        let args = args_of(&cmd);
        assert_eq!(cmd.get_program(), "pandoc");
        assert!(args.contains(&"in.md".to_string()));
        assert!(args.contains(&"out.docx".to_string()));
        assert!(args.contains(&"docx".to_string()));
        assert!(args.contains(&"--standalone".to_string()));
    }

    #[test]
    fn test_build_command_pdf_omits_to_flag() {
        let mut settings = ExportSettings::default();
        settings.pdf_engine = "tectonic".to_string();
        let exporter = PandocExporter::new(settings);
        let cmd = exporter.build_command(Path::new("in.md"), Path::new("out.pdf"), ExportFormat::Pdf);
        let args = args_of(&cmd);
        assert!(!args.contains(&"--to".to_string()));
        assert!(args.contains(&"--pdf-engine".to_string()));
        assert!(args.contains(&"tectonic".to_string()));
    }

    #[test]
    fn test_build_command_optional_flags() {
        let mut settings = ExportSettings::default();
        settings.standalone = false;
        settings.table_of_contents = true;
        settings.number_sections = true;
        settings.highlight_style = "kate".to_string();
        let exporter = PandocExporter::new(settings);
        let cmd =
            exporter.build_command(Path::new("in.md"), Path::new("out.html"), ExportFormat::Html);
        let args = args_of(&cmd);
        assert!(!args.contains(&"--standalone".to_string()));
        assert!(args.contains(&"--toc".to_string()));
        assert!(args.contains(&"--number-sections".to_string()));
        assert!(args.contains(&"kate".to_string()));
    }

    #[test]
    fn test_export_with_missing_pandoc_reports_failure() {
        let settings = ExportSettings {
            pandoc_path: "pandoc-definitely-not-installed".to_string(),
            ..ExportSettings::default()
        };
        let exporter = PandocExporter::new(settings);
        let dir = tempfile::TempDir::new().unwrap();
        let outcome = exporter.export(
            "# Doc\n",
            &dir.path().join("out.docx"),
            ExportFormat::Docx,
        );
        assert!(!outcome.success);
        assert!(outcome.message.contains("pandoc"));
    }

    #[test]
    fn test_check_installation_missing_binary() {
        let settings = ExportSettings {
            pandoc_path: "pandoc-definitely-not-installed".to_string(),
            ..ExportSettings::default()
        };
        let exporter = PandocExporter::new(settings);
        assert!(exporter.check_installation().is_err());
    }

    #[test]
    fn test_temp_input_paths_are_distinct() {
        assert_ne!(temp_input_path(), temp_input_path());
    }
}
