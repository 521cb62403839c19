//! Path management for the exam tracker
//!
//! ## Path Resolution Order
//!
//! 1. `EXAM_TRACKER_DATA_DIR` environment variable (if set)
//! 2. The platform data directory reported by `directories::ProjectDirs`
//!    (`~/.local/share/exam-tracker` on Linux, `~/Library/Application Support/...`
//!    on macOS, `%APPDATA%\...` on Windows)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::TrackerError;

/// Environment variable overriding the base directory
pub const DATA_DIR_ENV: &str = "EXAM_TRACKER_DATA_DIR";

/// Manages all paths used by the tracker
#[derive(Debug, Clone)]
pub struct TrackerPaths {
    /// Base directory for all tracker data
    base_dir: PathBuf,
}

impl TrackerPaths {
    /// Resolve the base directory from the environment or the platform default
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, TrackerError> {
        let base_dir = if let Ok(custom) = std::env::var(DATA_DIR_ENV) {
            PathBuf::from(custom)
        } else {
            ProjectDirs::from("", "", "exam-tracker")
                .map(|dirs| dirs.data_dir().to_path_buf())
                .ok_or_else(|| {
                    TrackerError::Config("Could not determine a data directory".into())
                })?
        };

        Ok(Self { base_dir })
    }

    /// Create paths rooted at a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Live entity collections
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.base_dir.join("backups")
    }

    /// Directory where the pre-database version left its document
    pub fn legacy_dir(&self) -> PathBuf {
        self.base_dir.join("legacy")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("settings.json")
    }

    /// Markers (migrated, last auto-backup, last export reminder)
    pub fn meta_file(&self) -> PathBuf {
        self.base_dir.join("meta.json")
    }

    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    pub fn chapters_file(&self) -> PathBuf {
        self.data_dir().join("chapters.json")
    }

    pub fn student_file(&self) -> PathBuf {
        self.data_dir().join("student.json")
    }

    pub fn config_file(&self) -> PathBuf {
        self.data_dir().join("config.json")
    }

    pub fn daily_tasks_file(&self) -> PathBuf {
        self.data_dir().join("daily_tasks.json")
    }

    pub fn daily_history_file(&self) -> PathBuf {
        self.data_dir().join("daily_history.json")
    }

    pub fn class_defaults_file(&self) -> PathBuf {
        self.data_dir().join("class_defaults.json")
    }

    pub fn default_chapters_file(&self) -> PathBuf {
        self.data_dir().join("default_chapters.json")
    }

    /// The snapshot table
    pub fn backups_file(&self) -> PathBuf {
        self.backup_dir().join("backups.json")
    }

    /// The flat document written by the pre-database version
    pub fn legacy_document(&self) -> PathBuf {
        self.legacy_dir().join("examTrackingData.json")
    }

    /// Default location of the externally maintained class-defaults document
    pub fn default_defaults_document(&self) -> PathBuf {
        self.base_dir.join("class-defaults.json")
    }

    /// Ensure all required directories exist
    pub fn ensure_directories(&self) -> Result<(), TrackerError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| TrackerError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| TrackerError::Io(format!("Failed to create data directory: {}", e)))?;

        std::fs::create_dir_all(self.backup_dir())
            .map_err(|e| TrackerError::Io(format!("Failed to create backup directory: {}", e)))?;

        Ok(())
    }
}
