//! Backup CLI commands
//!
//! Implements CLI commands for snapshot management.

use clap::Subcommand;

use crate::backup::{BackupManager, RestoreManager, MANUAL_BACKUP};
use crate::display::{format_backup_details, format_backup_list};
use crate::error::{TrackerError, TrackerResult};
use crate::models::BackupId;
use crate::session::Tracker;

use super::parse_arg;

/// Backup subcommands
#[derive(Subcommand)]
pub enum BackupCommands {
    /// Snapshot the current data
    Create {
        /// Description stored with the snapshot
        #[arg(short, long)]
        description: Option<String>,
    },

    /// List all snapshots, newest first
    List,

    /// Restore from a snapshot
    Restore {
        /// Backup ID (e.g. bk-7 or 7; use 'latest' for most recent)
        backup: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Show information about a specific snapshot
    Info {
        /// Backup ID or 'latest'
        backup: String,
    },

    /// Delete old snapshots according to the retention count
    Prune {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

/// Handle a backup command
pub fn handle_backup_command(tracker: &Tracker, cmd: BackupCommands) -> TrackerResult<()> {
    let manager = tracker.backups();

    match cmd {
        BackupCommands::Create { description } => {
            let description = description.unwrap_or_else(|| MANUAL_BACKUP.to_string());
            let (backup, pruned) = tracker.create_backup(&description)?;

            println!("Backup created: {}", backup.id);
            println!("  {}", backup.data.counts().summary());
            if !pruned.is_empty() {
                println!("  Pruned {} old backup(s)", pruned.len());
            }
        }

        BackupCommands::List => {
            let backups = manager.list_backups()?;

            if backups.is_empty() {
                println!("No backups found.");
                println!("Create one with: tracker backup create");
                return Ok(());
            }

            println!("Available Backups");
            println!("=================");
            println!();
            print!("{}", format_backup_list(&backups));
            println!();
            println!(
                "Total: {} backup(s), keeping the newest {}",
                backups.len(),
                manager.policy().retention
            );
        }

        BackupCommands::Restore { backup, force } => {
            let id = resolve_backup_id(&manager, &backup)?;
            let validation = RestoreManager::new(tracker.db(), tracker.policy()).validate_backup(id)?;

            println!("Restore Preview");
            println!("===============");
            print!("{}", format_backup_details(&validation));
            println!();

            if validation.is_empty() {
                println!("Warning: this backup holds no data.");
            }

            if !force {
                println!("WARNING: Restoring will replace all current data!");
                println!("A safety backup of the current data is taken first.");
                println!();
                println!("To proceed, run again with --force flag:");
                println!("  tracker backup restore {} --force", id);
                return Ok(());
            }

            let result = tracker.restore_backup(id)?;
            println!("Restore complete.");
            println!("  {}", result.summary());
            println!("  Safety backup: {}", result.safety_backup);
        }

        BackupCommands::Info { backup } => {
            let id = resolve_backup_id(&manager, &backup)?;
            let validation = RestoreManager::new(tracker.db(), tracker.policy()).validate_backup(id)?;
            print!("{}", format_backup_details(&validation));
        }

        BackupCommands::Prune { force } => {
            let backups = manager.list_backups()?;
            let retention = manager.policy().retention;
            let to_delete = backups.len().saturating_sub(retention);

            if to_delete == 0 {
                println!("No backups to prune.");
                println!(
                    "You have {} backup(s); the retention count is {}.",
                    backups.len(),
                    retention
                );
                return Ok(());
            }

            println!("Prune Summary");
            println!("=============");
            println!("Retention count: {}", retention);
            println!("Current backups: {}", backups.len());
            println!("To be deleted:   {}", to_delete);
            println!();

            if !force {
                println!("To delete old backups, run again with --force flag:");
                println!("  tracker backup prune --force");
                return Ok(());
            }

            let deleted = manager.enforce_retention()?;
            println!("Deleted {} backup(s).", deleted.len());
        }
    }

    Ok(())
}

/// Resolve 'latest' or an explicit backup ID
fn resolve_backup_id(manager: &BackupManager, backup: &str) -> TrackerResult<BackupId> {
    if backup.eq_ignore_ascii_case("latest") {
        return manager
            .latest_backup()?
            .map(|b| b.id)
            .ok_or_else(|| TrackerError::backup_not_found("latest"));
    }

    parse_arg("backup ID", backup)
}
