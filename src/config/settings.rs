//! User settings for the exam tracker
//!
//! Backup cadence, retention, and where the class-defaults document lives.

use std::path::PathBuf;

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use super::paths::TrackerPaths;
use crate::error::TrackerError;

/// Largest number of snapshots the store may hold
pub const MAX_BACKUP_RETENTION: usize = 10;

/// User settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Number of snapshots kept after pruning, 1 to 10
    #[serde(default = "default_backup_retention")]
    pub backup_retention: usize,

    /// Minimum hours between automatic snapshots
    #[serde(default = "default_auto_backup_hours")]
    pub auto_backup_interval_hours: i64,

    /// Days between "export your data" reminders
    #[serde(default = "default_reminder_days")]
    pub export_reminder_days: i64,

    /// Override for the class-defaults document location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults_document: Option<PathBuf>,

    /// Format used for the "Last Updated" column of the CSV export (strftime)
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_backup_retention() -> usize {
    MAX_BACKUP_RETENTION
}

fn default_auto_backup_hours() -> i64 {
    24
}

fn default_reminder_days() -> i64 {
    7
}

fn default_date_format() -> String {
    "%Y-%m-%d %H:%M:%S".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            backup_retention: default_backup_retention(),
            auto_backup_interval_hours: default_auto_backup_hours(),
            export_reminder_days: default_reminder_days(),
            defaults_document: None,
            date_format: default_date_format(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or return defaults if the file doesn't exist
    pub fn load_or_create(paths: &TrackerPaths) -> Result<Self, TrackerError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| TrackerError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                TrackerError::Config(format!("Failed to parse settings file: {}", e))
            })?;
            settings.validate()?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &TrackerPaths) -> Result<(), TrackerError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| TrackerError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| TrackerError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Reject values the rest of the tracker cannot work with
    pub fn validate(&self) -> Result<(), TrackerError> {
        if !(1..=MAX_BACKUP_RETENTION).contains(&self.backup_retention) {
            return Err(TrackerError::Config(format!(
                "backup_retention must be between 1 and {}, got {}",
                MAX_BACKUP_RETENTION, self.backup_retention
            )));
        }
        if StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(TrackerError::Config(format!(
                "Invalid date_format '{}'",
                self.date_format
            )));
        }
        Ok(())
    }

    /// Resolved path of the class-defaults document
    pub fn defaults_document_path(&self, paths: &TrackerPaths) -> PathBuf {
        self.defaults_document
            .clone()
            .unwrap_or_else(|| paths.default_defaults_document())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.backup_retention, 10);
        assert_eq!(settings.auto_backup_interval_hours, 24);
        assert_eq!(settings.export_reminder_days, 7);
        assert!(settings.defaults_document.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = TrackerPaths::with_base_dir(temp_dir.path().to_path_buf());

        let settings = Settings {
            backup_retention: 3,
            defaults_document: Some(PathBuf::from("/srv/class-defaults.json")),
            ..Settings::default()
        };
        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.backup_retention, 3);
        assert_eq!(
            loaded.defaults_document_path(&paths),
            PathBuf::from("/srv/class-defaults.json")
        );
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"backup_retention": 5}"#).unwrap();
        assert_eq!(settings.backup_retention, 5);
        assert_eq!(settings.auto_backup_interval_hours, 24);
    }

    #[test]
    fn test_retention_out_of_range_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let paths = TrackerPaths::with_base_dir(temp_dir.path().to_path_buf());
        paths.ensure_directories().unwrap();

        for retention in [0, 11, 50] {
            std::fs::write(
                paths.settings_file(),
                format!(r#"{{"backup_retention": {}}}"#, retention),
            )
            .unwrap();
            let result = Settings::load_or_create(&paths);
            assert!(matches!(result, Err(TrackerError::Config(_))), "{}", retention);
        }

        for retention in [1, 10] {
            std::fs::write(
                paths.settings_file(),
                format!(r#"{{"backup_retention": {}}}"#, retention),
            )
            .unwrap();
            let loaded = Settings::load_or_create(&paths).unwrap();
            assert_eq!(loaded.backup_retention, retention);
        }
    }

    #[test]
    fn test_bad_date_format_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let paths = TrackerPaths::with_base_dir(temp_dir.path().to_path_buf());
        paths.ensure_directories().unwrap();
        std::fs::write(paths.settings_file(), r#"{"date_format": "%Y-%Q"}"#).unwrap();

        let result = Settings::load_or_create(&paths);
        assert!(matches!(result, Err(TrackerError::Config(_))));
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_defaults_document_falls_back_to_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = TrackerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let settings = Settings::default();
        assert_eq!(
            settings.defaults_document_path(&paths),
            temp_dir.path().join("class-defaults.json")
        );
    }
}
