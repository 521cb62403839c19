//! Storage layer for the exam tracker
//!
//! Every collection lives in its own JSON file under `data/`, written
//! atomically. `Database` owns one repository per collection plus the
//! marker document and the audit log.

pub mod document;
pub mod file_io;
pub mod keyed;
pub mod table;

pub use document::Document;
pub use file_io::{read_json, write_json_atomic};
pub use keyed::{Keyed, KeyedTable};
pub use table::{BulkUpdateReport, Record, Table};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::config::TrackerPaths;
use crate::error::{TrackerError, TrackerResult};
use crate::models::{
    Backup, Chapter, ClassDefaults, Collections, ConfigEntry, DailyHistoryEntry, DailyTask,
    DefaultChapter, StudentInfo,
};

/// Bookkeeping flags kept outside the snapshotted collections
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Markers {
    /// Set once the legacy document has been imported
    #[serde(default)]
    pub migrated: bool,
    #[serde(default)]
    pub migrated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_auto_backup: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_backup_reminder: Option<DateTime<Utc>>,
}

/// Main storage coordinator that provides access to all repositories
pub struct Database {
    paths: TrackerPaths,
    audit: AuditLogger,
    pub chapters: Table<Chapter>,
    pub student: Document<StudentInfo>,
    pub config: KeyedTable<ConfigEntry>,
    pub daily_tasks: Table<DailyTask>,
    pub daily_history: KeyedTable<DailyHistoryEntry>,
    pub backups: Table<Backup>,
    pub class_defaults: KeyedTable<ClassDefaults>,
    pub default_chapters: Table<DefaultChapter>,
    pub markers: Document<Markers>,
}

impl Database {
    /// Open the store rooted at `paths` and load every collection.
    ///
    /// Any failure here is an `Initialization` error; no other operation
    /// may run against a store that did not open.
    pub fn open(paths: TrackerPaths) -> TrackerResult<Self> {
        let db = Self::new(paths)
            .and_then(|db| db.load_all().map(|_| db))
            .map_err(|e| TrackerError::Initialization(e.to_string()))?;

        tracing::debug!(base_dir = %db.paths.base_dir().display(), "database opened");
        Ok(db)
    }

    fn new(paths: TrackerPaths) -> TrackerResult<Self> {
        paths.ensure_directories()?;

        Ok(Self {
            audit: AuditLogger::new(paths.audit_log()),
            chapters: Table::new(paths.chapters_file()),
            student: Document::new(paths.student_file()),
            config: KeyedTable::new(paths.config_file()),
            daily_tasks: Table::new(paths.daily_tasks_file()),
            daily_history: KeyedTable::new(paths.daily_history_file()),
            backups: Table::new(paths.backups_file()),
            class_defaults: KeyedTable::new(paths.class_defaults_file()),
            default_chapters: Table::new(paths.default_chapters_file()),
            markers: Document::new(paths.meta_file()),
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &TrackerPaths {
        &self.paths
    }

    /// Load all data from disk
    pub fn load_all(&self) -> TrackerResult<()> {
        self.chapters.load()?;
        self.student.load()?;
        self.config.load()?;
        self.daily_tasks.load()?;
        self.daily_history.load()?;
        self.backups.load()?;
        self.class_defaults.load()?;
        self.default_chapters.load()?;
        self.markers.load()?;
        Ok(())
    }

    /// Current markers, defaulted when none were stored
    pub fn markers(&self) -> TrackerResult<Markers> {
        Ok(self.markers.get()?.unwrap_or_default())
    }

    pub fn update_markers(&self, f: impl FnOnce(&mut Markers)) -> TrackerResult<Markers> {
        self.markers.update(f)
    }

    /// Read every live collection into one payload
    pub fn snapshot(&self) -> TrackerResult<Collections> {
        Ok(Collections {
            tracking_data: self.chapters.get_all()?,
            student_info: self.student.get()?.into_iter().collect(),
            config: self.config.get_all()?,
            daily_plans: self.daily_tasks.get_all()?,
            daily_history: self.daily_history.get_all()?,
        })
    }

    /// Replace every live collection with `data`.
    ///
    /// All replacement files are written first; the live files are only
    /// swapped once every collection staged successfully. A failure between
    /// two swaps can still leave a mix of old and new collections on disk.
    pub fn replace_live(&self, data: Collections) -> TrackerResult<()> {
        let Collections {
            tracking_data,
            student_info,
            config,
            daily_plans,
            daily_history,
        } = data;

        let chapters = self.chapters.stage_replace(tracking_data)?;
        let student = self.student.stage_replace(student_info.into_iter().next())?;
        let config = self.config.stage_replace(config)?;
        let tasks = self.daily_tasks.stage_replace(daily_plans)?;
        let history = self.daily_history.stage_replace(daily_history)?;

        self.chapters.commit_replace(chapters)?;
        self.student.commit_replace(student)?;
        self.config.commit_replace(config)?;
        self.daily_tasks.commit_replace(tasks)?;
        self.daily_history.commit_replace(history)?;
        Ok(())
    }

    /// Log a create operation to the audit log
    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> TrackerResult<()> {
        let entry = AuditEntry::create(entity_type, entity_id, entity_name, entity);
        self.audit.log(&entry)
    }

    /// Log an update operation, recording the fields that changed
    pub fn log_update<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
    ) -> TrackerResult<()> {
        let diff = changed_fields(before, after);
        let entry = AuditEntry::update(entity_type, entity_id, entity_name, before, after, diff);
        self.audit.log(&entry)
    }

    /// Log a delete operation to the audit log
    pub fn log_delete<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> TrackerResult<()> {
        let entry = AuditEntry::delete(entity_type, entity_id, entity_name, entity);
        self.audit.log(&entry)
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }
}

/// Comma-separated names of top-level fields that differ
fn changed_fields<T: Serialize>(before: &T, after: &T) -> Option<String> {
    let (Ok(Value::Object(before)), Ok(Value::Object(after))) =
        (serde_json::to_value(before), serde_json::to_value(after))
    else {
        return None;
    };

    let changed: Vec<&str> = after
        .iter()
        .filter(|(key, value)| before.get(*key) != Some(*value))
        .map(|(key, _)| key.as_str())
        .collect();

    (!changed.is_empty()).then(|| changed.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConfigKey, Confidence};
    use tempfile::TempDir;

    fn open_test_db() -> (TempDir, Database) {
        let temp_dir = TempDir::new().unwrap();
        let paths = TrackerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let db = Database::open(paths).unwrap();
        (temp_dir, db)
    }

    #[test]
    fn test_open_creates_directories() {
        let (temp_dir, db) = open_test_db();
        assert!(temp_dir.path().join("data").exists());
        assert!(temp_dir.path().join("backups").exists());
        assert!(db.snapshot().unwrap().is_empty());
        assert!(!db.markers().unwrap().migrated);
    }

    #[test]
    fn test_open_corrupt_collection_is_initialization_error() {
        let temp_dir = TempDir::new().unwrap();
        let paths = TrackerPaths::with_base_dir(temp_dir.path().to_path_buf());
        paths.ensure_directories().unwrap();
        std::fs::write(paths.chapters_file(), "[[[").unwrap();

        let err = Database::open(paths).err().unwrap();
        assert!(matches!(err, TrackerError::Initialization(_)));
    }

    #[test]
    fn test_replace_live_swaps_all_collections() {
        let (_temp, db) = open_test_db();
        db.chapters.insert(Chapter::blank(&[])).unwrap();
        db.config
            .put(ConfigEntry::new(ConfigKey::Subjects, vec!["Maths".into()]))
            .unwrap();

        let mut chapter = Chapter::blank(&[]);
        chapter.subject = "History".into();
        chapter.id = crate::models::ChapterId::new(9);
        let replacement = Collections {
            tracking_data: vec![chapter],
            student_info: vec![StudentInfo {
                name: "Asha".into(),
                ..StudentInfo::default()
            }],
            ..Collections::default()
        };

        db.replace_live(replacement.clone()).unwrap();
        assert_eq!(db.snapshot().unwrap(), replacement);
    }

    #[test]
    fn test_markers_survive_replace() {
        let (_temp, db) = open_test_db();
        db.update_markers(|m| m.migrated = true).unwrap();
        db.replace_live(Collections::default()).unwrap();
        assert!(db.markers().unwrap().migrated);
    }

    #[test]
    fn test_changed_fields() {
        let mut before = Chapter::blank(&[]);
        before.subject = "Maths".into();
        let mut after = before.clone();
        after.confidence = Confidence::Good;
        after.notes = "revise".into();

        assert_eq!(
            changed_fields(&before, &after).as_deref(),
            Some("confidence, notes")
        );
        assert_eq!(changed_fields(&before, &before), None);
    }
}
