//! One-shot import of the legacy flat document
//!
//! Before the record store existed, everything was kept in one JSON
//! document. On startup that document is copied into the store once; the
//! `migrated` marker stops it from ever being applied twice. The document
//! itself is left where it is.

mod legacy;

pub use legacy::LegacyDocument;

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::backup::{BackupManager, BackupPolicy};
use crate::error::{TrackerError, TrackerResult};
use crate::models::{BackupId, CollectionCounts};
use crate::storage::Database;

/// Description of the checkpoint snapshot taken after migrating
pub const MIGRATION_BACKUP: &str = "Initial migration from localStorage";

/// What a migration run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    NoLegacyDocument,
    AlreadyMigrated,
    Migrated {
        counts: CollectionCounts,
        checkpoint: BackupId,
    },
}

impl MigrationOutcome {
    pub fn migrated(&self) -> bool {
        matches!(self, MigrationOutcome::Migrated { .. })
    }
}

/// Copies the legacy document into the record store
pub struct Migrator<'a> {
    db: &'a Database,
    policy: BackupPolicy,
}

impl<'a> Migrator<'a> {
    pub fn new(db: &'a Database, policy: BackupPolicy) -> Self {
        Self { db, policy }
    }

    pub fn run(&self) -> TrackerResult<MigrationOutcome> {
        self.run_at(Utc::now())
    }

    /// Migrate unless there is nothing to migrate or it already happened.
    ///
    /// An unreadable or malformed document is a `Migration` error and leaves
    /// the marker unset.
    pub fn run_at(&self, now: DateTime<Utc>) -> TrackerResult<MigrationOutcome> {
        let path = self.db.paths().legacy_document();
        if !path.exists() {
            return Ok(MigrationOutcome::NoLegacyDocument);
        }
        if self.db.markers()?.migrated {
            tracing::debug!("legacy document already migrated");
            return Ok(MigrationOutcome::AlreadyMigrated);
        }

        tracing::info!(path = %path.display(), "migrating legacy document");
        let document = read_legacy(&path)?;
        let data = document.into_collections();
        let counts = data.counts();

        self.db.chapters.merge_all(data.tracking_data)?;
        if let Some(info) = data.student_info.into_iter().next() {
            self.db.student.set(info)?;
        }
        self.db.config.put_all(data.config)?;
        self.db.daily_tasks.merge_all(data.daily_plans)?;
        self.db.daily_history.put_all(data.daily_history)?;

        self.db.update_markers(|m| {
            m.migrated = true;
            m.migrated_at = Some(now);
        })?;

        let checkpoint = BackupManager::new(self.db, self.policy)
            .create_backup_at(MIGRATION_BACKUP, now)?;

        tracing::info!(contents = %counts.summary(), "migration completed");
        Ok(MigrationOutcome::Migrated {
            counts,
            checkpoint: checkpoint.id,
        })
    }
}

fn read_legacy(path: &Path) -> TrackerResult<LegacyDocument> {
    let text = fs::read_to_string(path)
        .map_err(|e| TrackerError::Migration(format!("Cannot read {}: {}", path.display(), e)))?;

    serde_json::from_str(&text)
        .map_err(|e| TrackerError::Migration(format!("Malformed {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackerPaths;
    use crate::models::{ConfigKey, LearningStatus};
    use chrono::TimeZone;
    use tempfile::TempDir;

    const LEGACY: &str = r#"{
        "trackingData": [
            {"id": 1718000000000, "subject": "Maths", "chapterNo": 3, "chapterName": "Fractions",
             "examTypes": ["Annual"], "learningStatus": {"School": "Completed"},
             "writingDone": "Yes", "confidence": "Good", "lastUpdated": null, "notes": ""}
        ],
        "studentInfo": {"name": "Asha", "class": "7", "reviewDate": "2026-02-01"},
        "subjects": ["Maths", "Science"],
        "learningMethods": ["School"],
        "dailyPlans": [
            {"id": 5, "date": "2026-02-10", "subject": "Maths", "task": "Ex 3.1", "status": "done"}
        ],
        "dailyHistory": [
            {"date": "2026-02-10", "tasks": [], "score": 100}
        ]
    }"#;

    fn create_test_db() -> (TempDir, Database) {
        let temp_dir = TempDir::new().unwrap();
        let paths = TrackerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let db = Database::open(paths).unwrap();
        (temp_dir, db)
    }

    fn write_legacy(db: &Database, text: &str) {
        fs::create_dir_all(db.paths().legacy_dir()).unwrap();
        fs::write(db.paths().legacy_document(), text).unwrap();
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 11, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_no_legacy_document() {
        let (_temp, db) = create_test_db();
        let outcome = Migrator::new(&db, BackupPolicy::default()).run_at(now()).unwrap();
        assert_eq!(outcome, MigrationOutcome::NoLegacyDocument);
        assert!(!db.markers().unwrap().migrated);
        assert_eq!(db.backups.count().unwrap(), 0);
    }

    #[test]
    fn test_migrates_every_collection() {
        let (_temp, db) = create_test_db();
        write_legacy(&db, LEGACY);

        let outcome = Migrator::new(&db, BackupPolicy::default()).run_at(now()).unwrap();
        assert!(outcome.migrated());

        let chapters = db.chapters.get_all().unwrap();
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].chapter_no, "3");
        assert_eq!(chapters[0].status_for("School"), LearningStatus::Completed);

        assert_eq!(db.student.get().unwrap().unwrap().name, "Asha");
        assert_eq!(db.daily_tasks.count().unwrap(), 1);
        assert_eq!(db.daily_history.count().unwrap(), 1);

        // Lists missing from the document are stored empty
        let exams = db.config.get(&ConfigKey::ExamTypes).unwrap().unwrap();
        assert!(exams.values.is_empty());

        let markers = db.markers().unwrap();
        assert!(markers.migrated);
        assert_eq!(markers.migrated_at, Some(now()));

        let backups = db.backups.get_all().unwrap();
        assert_eq!(backups.len(), 1);
        assert_eq!(backups[0].description, MIGRATION_BACKUP);
        assert_eq!(backups[0].data.tracking_data.len(), 1);

        assert!(db.paths().legacy_document().exists());
    }

    #[test]
    fn test_second_run_is_noop() {
        let (_temp, db) = create_test_db();
        write_legacy(&db, LEGACY);
        let migrator = Migrator::new(&db, BackupPolicy::default());

        migrator.run_at(now()).unwrap();
        let outcome = migrator.run_at(now()).unwrap();

        assert_eq!(outcome, MigrationOutcome::AlreadyMigrated);
        assert_eq!(db.chapters.count().unwrap(), 1);
        assert_eq!(db.daily_tasks.count().unwrap(), 1);
        assert_eq!(db.backups.count().unwrap(), 1);
    }

    #[test]
    fn test_malformed_document_leaves_marker_unset() {
        let (_temp, db) = create_test_db();
        write_legacy(&db, "{not json");

        let err = Migrator::new(&db, BackupPolicy::default()).run_at(now()).unwrap_err();
        assert!(matches!(err, TrackerError::Migration(_)));
        assert!(!db.markers().unwrap().migrated);
    }
}
