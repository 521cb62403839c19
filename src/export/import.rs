//! Importing a full export document
//!
//! The document is parsed and its version checked before anything is
//! written. A "Pre-import backup" is then taken, the live collections are
//! replaced, and the document's snapshots are appended to the backup table.
//! Snapshots the store already holds are skipped, so importing an export
//! back into the store it came from leaves the history as it was.

use crate::backup::{BackupManager, BackupPolicy};
use crate::error::TrackerResult;
use crate::models::{Backup, BackupId, CollectionCounts};
use crate::storage::Database;

use super::json::import_from_json;

/// Description of the safety snapshot taken before every import
pub const PRE_IMPORT_BACKUP: &str = "Pre-import backup";

/// Result of an import
#[derive(Debug, Clone, PartialEq)]
pub struct ImportResult {
    pub counts: CollectionCounts,
    /// The snapshot taken just before importing
    pub safety_backup: BackupId,
    pub backups_imported: usize,
    /// Document snapshots already present in the store
    pub backups_skipped: usize,
    /// Snapshots dropped by the retention policy afterwards
    pub backups_pruned: usize,
}

impl ImportResult {
    pub fn summary(&self) -> String {
        format!(
            "Imported: {}, {} backups",
            self.counts.summary(),
            self.backups_imported
        )
    }
}

/// Replace the store's contents with an export document
pub fn import_full_database(
    db: &Database,
    policy: BackupPolicy,
    json_str: &str,
) -> TrackerResult<ImportResult> {
    let export = import_from_json(json_str)?;
    let data = export.data;

    let manager = BackupManager::new(db, policy);
    let safety = manager.create_backup(PRE_IMPORT_BACKUP)?;

    let counts = data.collections.counts();
    db.replace_live(data.collections)?;

    let existing = db.backups.get_all()?;
    let (known, fresh): (Vec<Backup>, Vec<Backup>) = data
        .backups
        .into_iter()
        .partition(|b| existing.iter().any(|e| e.same_snapshot(b)));
    let backups_skipped = known.len();
    let backups_imported = db.backups.merge_all(fresh)?.len();
    let backups_pruned = manager.enforce_retention()?.len();

    tracing::info!(
        contents = %counts.summary(),
        backups_imported,
        backups_skipped,
        backups_pruned,
        "database imported"
    );
    Ok(ImportResult {
        counts,
        safety_backup: safety.id,
        backups_imported,
        backups_skipped,
        backups_pruned,
    })
}
