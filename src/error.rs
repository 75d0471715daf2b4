//! Centralized error handling for Tandem
//!
//! This module provides a unified error type that covers all error scenarios
//! in the application: file I/O, configuration, rendering, HTML conversion,
//! and document export.

// Allow dead code - the error type covers every failure domain of the sync
// pipeline; not all variants are constructed on the happy path
#![allow(dead_code)]

use log::warn;
use std::fmt;
use std::io;
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Custom Result Type Alias
// ─────────────────────────────────────────────────────────────────────────────

/// A specialized `Result` type for the application.
pub type Result<T> = std::result::Result<T, Error>;

/// The centralized error type for the application.
#[derive(Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────
    // File I/O Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Generic I/O error wrapper
    Io(io::Error),

    /// Failed to read file contents
    FileRead { path: PathBuf, source: io::Error },

    /// Failed to write file contents
    FileWrite { path: PathBuf, source: io::Error },

    // ─────────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Failed to load configuration file
    ConfigLoad {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to save configuration file
    ConfigSave {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to parse configuration (invalid JSON/format)
    ConfigParse {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration directory not found or inaccessible
    ConfigDirNotFound,

    // ─────────────────────────────────────────────────────────────────────────
    // Sync Pipeline Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// The markdown renderer could not process the input
    Render(String),

    /// HTML to markdown conversion failed
    Convert(String),

    /// A deferred push to the rendered view was never acknowledged
    PushTimeout,

    // ─────────────────────────────────────────────────────────────────────────
    // Export Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// The external document converter is missing or failed
    Export { format: String, message: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Application Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Generic application error with a message
    Application(String),
}

// Implement From traits for convenient error conversion
impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ConfigParse {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Display trait implementation for user-friendly error messages
// ─────────────────────────────────────────────────────────────────────────────
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // File I/O Errors
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::FileRead { path, source } => {
                write!(f, "Failed to read '{}': {}", path.display(), source)
            }
            Error::FileWrite { path, source } => {
                write!(f, "Failed to write '{}': {}", path.display(), source)
            }

            // Configuration Errors
            Error::ConfigLoad { path, source } => {
                write!(
                    f,
                    "Failed to load configuration from '{}': {}",
                    path.display(),
                    source
                )
            }
            Error::ConfigSave { path, source } => {
                write!(
                    f,
                    "Failed to save configuration to '{}': {}",
                    path.display(),
                    source
                )
            }
            Error::ConfigParse { message, .. } => {
                write!(f, "Invalid configuration format: {}", message)
            }
            Error::ConfigDirNotFound => {
                write!(f, "Configuration directory not found")
            }

            // Sync Pipeline Errors
            Error::Render(msg) => write!(f, "Markdown rendering failed: {}", msg),
            Error::Convert(msg) => write!(f, "HTML conversion failed: {}", msg),
            Error::PushTimeout => {
                write!(f, "Push to the rendered view timed out")
            }

            // Export Errors
            Error::Export { format, message } => {
                write!(f, "Export to {} failed: {}", format, message)
            }

            // Application Errors
            Error::Application(msg) => write!(f, "{}", msg),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// std::error::Error trait implementation for error chaining
// ─────────────────────────────────────────────────────────────────────────────
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::FileRead { source, .. } => Some(source),
            Error::FileWrite { source, .. } => Some(source),
            Error::ConfigLoad { source, .. } => Some(source.as_ref()),
            Error::ConfigSave { source, .. } => Some(source.as_ref()),
            Error::ConfigParse { source, .. } => source
                .as_ref()
                .map(|s| s.as_ref() as &(dyn std::error::Error + 'static)),
            Error::ConfigDirNotFound
            | Error::Render(_)
            | Error::Convert(_)
            | Error::PushTimeout
            | Error::Export { .. }
            | Error::Application(_) => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Graceful Degradation Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for Result to support graceful degradation.
pub trait ResultExt<T> {
    /// If the result is an error, log it at warning level and return the provided default.
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T;
}

impl<T> ResultExt<T> for Result<T> {
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                warn!("{}: {}. Using default.", context, err);
                default
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_creation() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "test error");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_file_read_error() {
        let path = PathBuf::from("/test/file.md");
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing");
        let err = Error::FileRead {
            path: path.clone(),
            source: io_err,
        };
        assert!(matches!(err, Error::FileRead { path: p, .. } if p == path));
    }

    #[test]
    fn test_render_error_display() {
        let err = Error::Render("unterminated fence".to_string());
        let msg = format!("{}", err);
        assert!(msg.contains("rendering failed"));
        assert!(msg.contains("unterminated fence"));
    }

    #[test]
    fn test_convert_error_display() {
        let err = Error::Convert("empty fragment".to_string());
        assert!(format!("{}", err).contains("HTML conversion failed"));
    }

    #[test]
    fn test_export_error_display() {
        let err = Error::Export {
            format: "pdf".to_string(),
            message: "pandoc not found".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("pdf"));
        assert!(msg.contains("pandoc not found"));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_result: std::result::Result<String, _> = serde_json::from_str("invalid json");
        let err = Error::from(json_result.unwrap_err());
        assert!(matches!(err, Error::ConfigParse { .. }));
    }

    #[test]
    fn test_error_source_none_for_simple_variants() {
        use std::error::Error as StdError;
        let err = Error::PushTimeout;
        assert!(err.source().is_none());

        let err = Error::Render("x".to_string());
        assert!(err.source().is_none());
    }

    #[test]
    fn test_error_source_io() {
        use std::error::Error as StdError;
        let io_err = io::Error::new(io::ErrorKind::NotFound, "not found");
        let err = Error::Io(io_err);
        assert!(err.source().is_some());
    }

    #[test]
    fn test_unwrap_or_warn_default_ok() {
        use super::ResultExt;
        let result: super::Result<i32> = Ok(42);
        let value = result.unwrap_or_warn_default(0, "test context");
        assert_eq!(value, 42);
    }

    #[test]
    fn test_unwrap_or_warn_default_err() {
        use super::ResultExt;
        let result: super::Result<i32> = Err(Error::Application("test".to_string()));
        let value = result.unwrap_or_warn_default(0, "test context");
        assert_eq!(value, 0);
    }
}
