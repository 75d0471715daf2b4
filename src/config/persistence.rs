//! Configuration file persistence for Tandem
//!
//! Loads and saves the settings JSON under the platform config directory.
//! A missing or corrupt file never blocks startup: loading degrades to
//! defaults with a warning, and saving goes through a backup-then-rename
//! step so a crash mid-write cannot truncate the previous config.

use crate::config::Settings;
use crate::error::{Error, Result, ResultExt};
use log::{debug, info, warn};
use std::fs;
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Application name used for the config directory
const APP_NAME: &str = "tandem";

/// Configuration file name
const CONFIG_FILE_NAME: &str = "config.json";

/// Backup configuration file name (used during atomic writes)
const CONFIG_BACKUP_NAME: &str = "config.json.bak";

// ─────────────────────────────────────────────────────────────────────────────
// Platform-Specific Directory Resolution
// ─────────────────────────────────────────────────────────────────────────────

/// The per-user configuration directory.
///
/// `~/.config/tandem/` on Linux, `~/Library/Application Support/tandem/`
/// on macOS, `%APPDATA%\tandem\` on Windows.
///
/// # Errors
///
/// Returns `Error::ConfigDirNotFound` when no base directory can be
/// resolved (typically a missing HOME environment variable).
pub fn get_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|base| base.join(APP_NAME))
        .ok_or(Error::ConfigDirNotFound)
}

/// Full path of the configuration file.
pub fn get_config_file_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(CONFIG_FILE_NAME))
}

/// Ensure the configuration directory exists, creating it if necessary.
fn ensure_config_dir() -> Result<PathBuf> {
    let config_dir = get_config_dir()?;

    if !config_dir.exists() {
        debug!("Creating config directory: {}", config_dir.display());
        fs::create_dir_all(&config_dir).map_err(|e| Error::ConfigSave {
            path: config_dir.clone(),
            source: Box::new(e),
        })?;
    }

    Ok(config_dir)
}

// ─────────────────────────────────────────────────────────────────────────────
// Load Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Load settings from disk, falling back to defaults.
///
/// A missing file is normal (first run); an unreadable or unparseable one
/// is logged and replaced by defaults. Loaded values are passed through
/// `Settings::sanitize` since the file is user-editable.
pub fn load_config() -> Settings {
    load_config_internal()
        .unwrap_or_warn_default(Settings::default(), "Failed to load configuration")
}

fn load_config_internal() -> Result<Settings> {
    let config_path = get_config_file_path()?;

    if !config_path.exists() {
        debug!(
            "Config file not found at {}, using defaults",
            config_path.display()
        );
        return Ok(Settings::default());
    }

    debug!("Loading config from: {}", config_path.display());

    let contents = fs::read_to_string(&config_path).map_err(|e| Error::ConfigLoad {
        path: config_path.clone(),
        source: Box::new(e),
    })?;

    // An empty file counts as "no config yet", not corruption
    if contents.trim().is_empty() {
        debug!("Config file is empty, using defaults");
        return Ok(Settings::default());
    }

    let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
        warn!(
            "Config file at {} contains invalid JSON: {}",
            config_path.display(),
            e
        );
        Error::ConfigParse {
            message: format!("Failed to parse config file: {}", e),
            source: Some(Box::new(e)),
        }
    })?;

    info!("Configuration loaded from {}", config_path.display());
    Ok(settings.sanitize())
}

// ─────────────────────────────────────────────────────────────────────────────
// Save Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Write settings to the config file.
///
/// The JSON is written to a sibling backup file first and then renamed
/// over the real one, so an interrupted save leaves the old file intact.
pub fn save_config(settings: &Settings) -> Result<()> {
    let config_dir = ensure_config_dir()?;
    let config_path = config_dir.join(CONFIG_FILE_NAME);
    let backup_path = config_dir.join(CONFIG_BACKUP_NAME);

    debug!("Saving config to: {}", config_path.display());

    let json = serde_json::to_string_pretty(settings).map_err(|e| Error::ConfigSave {
        path: config_path.clone(),
        source: Box::new(e),
    })?;

    fs::write(&backup_path, &json).map_err(|e| Error::ConfigSave {
        path: backup_path.clone(),
        source: Box::new(e),
    })?;

    fs::rename(&backup_path, &config_path).map_err(|e| Error::ConfigSave {
        path: config_path.clone(),
        source: Box::new(e),
    })?;

    info!("Configuration saved to {}", config_path.display());
    Ok(())
}

/// Best-effort save for paths where a failure must not interrupt the
/// application (window close, settings dialog). Returns whether it worked.
pub fn save_config_silent(settings: &Settings) -> bool {
    match save_config(settings) {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to save configuration: {}", e);
            false
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Theme;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_get_config_dir_returns_path() {
        let result = get_config_dir();
        assert!(result.is_ok());

        let path = result.unwrap();
        assert!(path.to_string_lossy().contains(APP_NAME));
    }

    #[test]
    fn test_get_config_file_path() {
        let result = get_config_file_path();
        assert!(result.is_ok());

        let path = result.unwrap();
        assert!(path.to_string_lossy().contains(CONFIG_FILE_NAME));
    }

    #[test]
    fn test_settings_file_roundtrip() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_file = temp_dir.path().join(CONFIG_FILE_NAME);

        let settings = Settings {
            theme: Theme::Light,
            font_size: 16.0,
            ..Settings::default()
        };
        let json = serde_json::to_string_pretty(&settings).unwrap();
        fs::write(&config_file, &json).unwrap();

        let contents = fs::read_to_string(&config_file).unwrap();
        let loaded: Settings = serde_json::from_str(&contents).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_corrupt_json_falls_back_to_defaults() {
        // Parsing garbage must produce a ConfigParse error, which load_config
        // turns into defaults.
        let parsed: std::result::Result<Settings, _> = serde_json::from_str("{not json");
        assert!(parsed.is_err());

        let settings = load_config();
        // Whatever the user's real config says, the call must not panic and
        // must produce sane values.
        assert!(settings.font_size >= 8.0);
    }
}
