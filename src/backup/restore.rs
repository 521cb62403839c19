//! Restoring live data from a stored snapshot

use chrono::{DateTime, Utc};

use crate::error::{TrackerError, TrackerResult};
use crate::models::{BackupId, CollectionCounts};
use crate::storage::Database;

use super::manager::{BackupManager, BackupPolicy};

/// Description of the safety snapshot taken before every restore
pub const PRE_RESTORE_BACKUP: &str = "Pre-restore backup";

/// Handles restoring from snapshots
pub struct RestoreManager<'a> {
    db: &'a Database,
    policy: BackupPolicy,
}

impl<'a> RestoreManager<'a> {
    pub fn new(db: &'a Database, policy: BackupPolicy) -> Self {
        Self { db, policy }
    }

    /// Replace every live collection with the contents of snapshot `id`.
    ///
    /// A "Pre-restore backup" is always taken first, even when `id` turns
    /// out to be unknown. If swapping the collections fails part way, that
    /// safety snapshot is the way back.
    pub fn restore_from_backup(&self, id: BackupId) -> TrackerResult<RestoreResult> {
        let manager = BackupManager::new(self.db, self.policy);
        let safety = manager.create_backup(PRE_RESTORE_BACKUP)?;

        let backup = manager
            .get_backup(id)?
            .ok_or_else(|| TrackerError::backup_not_found(id.to_string()))?;

        let counts = backup.data.counts();
        self.db.replace_live(backup.data).map_err(|e| {
            tracing::error!(backup = %id, safety = %safety.id, error = %e, "restore failed");
            TrackerError::Backup(format!(
                "Restore from {} failed ({}); the live store may be partially replaced, {} holds the previous state",
                id, e, safety.id
            ))
        })?;

        tracing::info!(backup = %id, contents = %counts.summary(), "restored from backup");
        Ok(RestoreResult {
            backup_id: id,
            backup_date: backup.timestamp,
            safety_backup: safety.id,
            counts,
        })
    }

    /// Summarize a snapshot without restoring it
    pub fn validate_backup(&self, id: BackupId) -> TrackerResult<ValidationResult> {
        let backup = self
            .db
            .backups
            .get(id)?
            .ok_or_else(|| TrackerError::backup_not_found(id.to_string()))?;

        Ok(ValidationResult {
            backup_id: id,
            backup_date: backup.timestamp,
            description: backup.description,
            counts: backup.data.counts(),
        })
    }
}

/// Result of a restore operation
#[derive(Debug, Clone, PartialEq)]
pub struct RestoreResult {
    pub backup_id: BackupId,
    /// When the restored snapshot was taken
    pub backup_date: DateTime<Utc>,
    /// The snapshot taken just before restoring
    pub safety_backup: BackupId,
    pub counts: CollectionCounts,
}

impl RestoreResult {
    pub fn summary(&self) -> String {
        format!("Restored: {}", self.counts.summary())
    }
}

/// Result of inspecting a snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    pub backup_id: BackupId,
    pub backup_date: DateTime<Utc>,
    pub description: String,
    pub counts: CollectionCounts,
}

impl ValidationResult {
    /// True when the snapshot holds no records at all
    pub fn is_empty(&self) -> bool {
        self.counts.total() == 0
    }

    pub fn summary(&self) -> String {
        if self.is_empty() {
            "Snapshot is empty".to_string()
        } else {
            format!("Contains: {}", self.counts.summary())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackerPaths;
    use crate::models::{Chapter, ConfigEntry, ConfigKey, StudentInfo};
    use tempfile::TempDir;

    fn create_test_db() -> (TempDir, Database) {
        let temp_dir = TempDir::new().unwrap();
        let paths = TrackerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let db = Database::open(paths).unwrap();
        (temp_dir, db)
    }

    fn chapter(subject: &str) -> Chapter {
        let mut c = Chapter::blank(&[]);
        c.subject = subject.into();
        c
    }

    #[test]
    fn test_restore_replaces_live_data() {
        let (_temp, db) = create_test_db();
        db.chapters.insert(chapter("Maths")).unwrap();
        db.student
            .set(StudentInfo {
                name: "Asha".into(),
                ..StudentInfo::default()
            })
            .unwrap();
        let manager = BackupManager::new(&db, BackupPolicy::default());
        let saved = manager.create_backup("checkpoint").unwrap();

        db.chapters.insert(chapter("Science")).unwrap();
        db.config
            .put(ConfigEntry::new(ConfigKey::Subjects, vec!["Art".into()]))
            .unwrap();
        db.student.clear().unwrap();

        let result = RestoreManager::new(&db, BackupPolicy::default())
            .restore_from_backup(saved.id)
            .unwrap();
        assert_eq!(result.counts.chapters, 1);

        assert_eq!(db.snapshot().unwrap(), saved.data);
        assert_eq!(db.student.get().unwrap().unwrap().name, "Asha");

        let safety = manager.get_backup(result.safety_backup).unwrap().unwrap();
        assert_eq!(safety.description, PRE_RESTORE_BACKUP);
        assert_eq!(safety.data.tracking_data.len(), 2);
    }

    #[test]
    fn test_restore_unknown_backup_leaves_live_data() {
        let (_temp, db) = create_test_db();
        db.chapters.insert(chapter("Maths")).unwrap();

        let err = RestoreManager::new(&db, BackupPolicy::default())
            .restore_from_backup(BackupId::new(99))
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(db.chapters.count().unwrap(), 1);
        assert_eq!(db.backups.count().unwrap(), 1);
    }

    #[test]
    fn test_restored_chapters_keep_ids() {
        let (_temp, db) = create_test_db();
        let kept = db.chapters.insert(chapter("Maths")).unwrap();
        let manager = BackupManager::new(&db, BackupPolicy::default());
        let saved = manager.create_backup("checkpoint").unwrap();
        db.chapters.delete(kept.id).unwrap();

        RestoreManager::new(&db, BackupPolicy::default())
            .restore_from_backup(saved.id)
            .unwrap();
        assert_eq!(db.chapters.get(kept.id).unwrap().unwrap().subject, "Maths");

        let next = db.chapters.insert(chapter("Science")).unwrap();
        assert_ne!(next.id, kept.id);
    }

    #[test]
    fn test_validate_backup() {
        let (_temp, db) = create_test_db();
        let manager = BackupManager::new(&db, BackupPolicy::default());
        let empty = manager.create_backup("empty").unwrap();

        let restore = RestoreManager::new(&db, BackupPolicy::default());
        let result = restore.validate_backup(empty.id).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.description, "empty");
        assert!(restore.validate_backup(BackupId::new(42)).is_err());
    }
}
