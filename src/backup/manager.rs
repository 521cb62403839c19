//! Snapshot creation, listing and rotation
//!
//! Snapshots live in the backup table. Each one is a full copy of the live
//! entity collections; markers and class templates are not included.

use chrono::{DateTime, Duration, Utc};

use crate::config::{Settings, MAX_BACKUP_RETENTION};
use crate::error::{TrackerError, TrackerResult};
use crate::models::{Backup, BackupId, CollectionCounts};
use crate::storage::Database;

/// Description used for snapshots taken by the elapsed-time trigger
pub const AUTO_BACKUP: &str = "Auto backup";

/// Description used for snapshots taken from the command line
pub const MANUAL_BACKUP: &str = "Manual backup by user";

/// Retention and cadence for snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackupPolicy {
    /// Snapshots kept after pruning
    pub retention: usize,
    pub auto_interval: Duration,
    pub reminder_interval: Duration,
}

impl Default for BackupPolicy {
    fn default() -> Self {
        Self {
            retention: MAX_BACKUP_RETENTION,
            auto_interval: Duration::hours(24),
            reminder_interval: Duration::days(7),
        }
    }
}

/// Retention is held to 1..=10
impl From<&Settings> for BackupPolicy {
    fn from(settings: &Settings) -> Self {
        Self {
            retention: settings.backup_retention.clamp(1, MAX_BACKUP_RETENTION),
            auto_interval: Duration::hours(settings.auto_backup_interval_hours),
            reminder_interval: Duration::days(settings.export_reminder_days),
        }
    }
}

/// Metadata about a snapshot, without its payload
#[derive(Debug, Clone, PartialEq)]
pub struct BackupInfo {
    pub id: BackupId,
    pub timestamp: DateTime<Utc>,
    pub description: String,
    pub counts: CollectionCounts,
}

impl From<&Backup> for BackupInfo {
    fn from(backup: &Backup) -> Self {
        Self {
            id: backup.id,
            timestamp: backup.timestamp,
            description: backup.description.clone(),
            counts: backup.data.counts(),
        }
    }
}

/// Manages snapshot creation and retention
pub struct BackupManager<'a> {
    db: &'a Database,
    policy: BackupPolicy,
}

impl<'a> BackupManager<'a> {
    pub fn new(db: &'a Database, policy: BackupPolicy) -> Self {
        Self { db, policy }
    }

    pub fn policy(&self) -> BackupPolicy {
        self.policy
    }

    /// Snapshot every live collection
    pub fn create_backup(&self, description: &str) -> TrackerResult<Backup> {
        self.create_backup_at(description, Utc::now())
    }

    pub fn create_backup_at(&self, description: &str, now: DateTime<Utc>) -> TrackerResult<Backup> {
        let data = self.db.snapshot()?;
        let backup = self
            .db
            .backups
            .insert(Backup::new(now, description, data))
            .map_err(|e| TrackerError::Backup(format!("Failed to store snapshot: {}", e)))?;

        tracing::info!(
            id = %backup.id,
            description,
            contents = %backup.data.counts().summary(),
            "backup created"
        );
        Ok(backup)
    }

    /// All snapshots, newest first
    pub fn list_backups(&self) -> TrackerResult<Vec<Backup>> {
        let mut backups = self.db.backups.get_all()?;
        backups.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        Ok(backups)
    }

    pub fn get_backup(&self, id: BackupId) -> TrackerResult<Option<Backup>> {
        self.db.backups.get(id)
    }

    pub fn latest_backup(&self) -> TrackerResult<Option<Backup>> {
        Ok(self.list_backups()?.into_iter().next())
    }

    /// Delete every snapshot beyond the newest `retention`; returns what was deleted
    pub fn enforce_retention(&self) -> TrackerResult<Vec<BackupInfo>> {
        let doomed: Vec<BackupId> = self
            .list_backups()?
            .iter()
            .skip(self.policy.retention)
            .map(|b| b.id)
            .collect();

        if doomed.is_empty() {
            return Ok(Vec::new());
        }

        let deleted: Vec<BackupInfo> = self
            .db
            .backups
            .delete_where(|b| doomed.contains(&b.id))?
            .iter()
            .map(BackupInfo::from)
            .collect();

        tracing::info!(deleted = deleted.len(), kept = self.policy.retention, "old backups pruned");
        Ok(deleted)
    }

    /// Create a backup and then enforce the retention policy
    pub fn create_backup_with_retention(
        &self,
        description: &str,
    ) -> TrackerResult<(Backup, Vec<BackupInfo>)> {
        let backup = self.create_backup(description)?;
        let deleted = self.enforce_retention()?;
        Ok((backup, deleted))
    }

    /// Take an automatic snapshot when the last one is older than the interval
    pub fn run_auto_backup(&self) -> TrackerResult<Option<Backup>> {
        self.run_auto_backup_at(Utc::now())
    }

    pub fn run_auto_backup_at(&self, now: DateTime<Utc>) -> TrackerResult<Option<Backup>> {
        let last = self.db.markers()?.last_auto_backup;
        if !elapsed(last, now, self.policy.auto_interval) {
            tracing::debug!(?last, "auto backup not due");
            return Ok(None);
        }

        let backup = self.create_backup_at(AUTO_BACKUP, now)?;
        self.db
            .update_markers(|m| m.last_auto_backup = Some(now))?;
        self.enforce_retention()?;
        Ok(Some(backup))
    }

    /// True when an export reminder is due; the reminder clock restarts
    pub fn check_export_reminder(&self) -> TrackerResult<bool> {
        self.check_export_reminder_at(Utc::now())
    }

    pub fn check_export_reminder_at(&self, now: DateTime<Utc>) -> TrackerResult<bool> {
        let last = self.db.markers()?.last_backup_reminder;
        if !elapsed(last, now, self.policy.reminder_interval) {
            return Ok(false);
        }

        self.db
            .update_markers(|m| m.last_backup_reminder = Some(now))?;
        Ok(true)
    }
}

/// An absent marker counts as elapsed
fn elapsed(last: Option<DateTime<Utc>>, now: DateTime<Utc>, interval: Duration) -> bool {
    last.map_or(true, |last| now - last >= interval)
}
