//! Backup system for the exam tracker
//!
//! Snapshots of every live collection are stored in the backup table and
//! rotated so that only the newest few survive.
//!
//! # Architecture
//!
//! - `BackupManager`: creates, lists and prunes snapshots, and runs the
//!   elapsed-time checks for automatic snapshots and export reminders
//! - `RestoreManager`: validates snapshots and restores live data from them
//!
//! # Retention Policy
//!
//! By default 10 snapshots are kept, an automatic snapshot is taken at most
//! once every 24 hours, and an export reminder comes up every 7 days.
//!
//! # Example
//!
//! ```rust,ignore
//! use exam_tracker::backup::{BackupManager, BackupPolicy, RestoreManager};
//!
//! let manager = BackupManager::new(&db, BackupPolicy::from(&settings));
//! let (backup, _pruned) = manager.create_backup_with_retention("Before exams")?;
//!
//! // Later, roll back to it
//! let result = RestoreManager::new(&db, manager.policy()).restore_from_backup(backup.id)?;
//! println!("{}", result.summary());
//! ```

mod manager;
mod restore;

pub use manager::{BackupInfo, BackupManager, BackupPolicy, AUTO_BACKUP, MANUAL_BACKUP};
pub use restore::{RestoreManager, RestoreResult, ValidationResult, PRE_RESTORE_BACKUP};
