//! Subject, learning-method and exam-type CLI commands
//!
//! The three lists share one set of subcommands; edits go through the
//! curriculum service so that chapters follow the list.

use clap::Subcommand;

use crate::error::{TrackerError, TrackerResult};
use crate::models::ConfigKey;
use crate::services::{AddOutcome, CascadeReport};
use crate::session::Tracker;

/// Subcommands for one configuration list
#[derive(Subcommand)]
pub enum ListCommands {
    /// Show the list
    List,
    /// Append a value
    Add {
        /// Value to add
        value: String,
    },
    /// Remove a value
    Remove {
        /// Value to remove
        value: String,
        /// Remove a subject even if chapters are filed under it
        #[arg(short, long)]
        force: bool,
    },
}

/// Handle a list command for `key`
pub fn handle_list_command(
    tracker: &Tracker,
    key: ConfigKey,
    cmd: ListCommands,
) -> TrackerResult<()> {
    let noun = key.item_name();

    match cmd {
        ListCommands::List => {
            let values = tracker.config().get(key)?;
            if values.is_empty() {
                println!("No {}s configured.", noun);
                return Ok(());
            }
            for (i, value) in values.iter().enumerate() {
                println!("{:>3}. {}", i + 1, value);
            }
        }

        ListCommands::Add { value } => {
            let (outcome, report) = tracker.curriculum().add(key, &value)?;
            match outcome {
                AddOutcome::Added => {
                    println!("Added {}: {}", noun, value.trim());
                    print_cascade(&report);
                }
                AddOutcome::AlreadyExists => {
                    println!("The {} '{}' already exists.", noun, value.trim());
                }
                AddOutcome::Invalid => {
                    return Err(TrackerError::Validation(format!(
                        "The {} name cannot be empty",
                        noun
                    )));
                }
            }
        }

        ListCommands::Remove { value, force } => {
            if key == ConfigKey::Subjects && !force {
                let filed = tracker
                    .chapters()
                    .list()?
                    .iter()
                    .filter(|c| c.subject == value)
                    .count();
                if filed > 0 {
                    println!(
                        "Removing '{}' will also delete its {} chapter(s).",
                        value, filed
                    );
                    println!("To continue, run again with --force flag:");
                    println!("  tracker subject remove \"{}\" --force", value);
                    return Ok(());
                }
            }

            match tracker.curriculum().remove(key, &value)? {
                Some(report) => {
                    println!("Removed {}: {}", noun, value);
                    print_cascade(&report);
                }
                None => {
                    return Err(TrackerError::NotFound {
                        entity_type: "List item",
                        identifier: value,
                    });
                }
            }
        }
    }

    Ok(())
}

fn print_cascade(report: &CascadeReport) {
    if report.chapters_updated > 0 {
        println!("  Chapters updated: {}", report.chapters_updated);
    }
    if report.chapters_deleted > 0 {
        println!("  Chapters deleted: {}", report.chapters_deleted);
    }
}
