//! Student profile CLI commands

use chrono::NaiveDate;
use clap::Subcommand;

use crate::error::{TrackerError, TrackerResult};
use crate::services::{ClassChange, ProfileUpdate};
use crate::session::Tracker;

/// Student subcommands
#[derive(Subcommand)]
pub enum StudentCommands {
    /// Show the profile
    Show,
    /// Edit the profile
    Set {
        /// Student name
        #[arg(long)]
        name: Option<String>,
        /// Class ("6", "7", ...); seeds lists and chapters from its defaults
        #[arg(long)]
        class: Option<String>,
        /// Next review date (YYYY-MM-DD)
        #[arg(long)]
        review_date: Option<String>,
    },
    /// Lock name and class permanently
    Lock,
}

/// Handle a student command
pub fn handle_student_command(tracker: &Tracker, cmd: StudentCommands) -> TrackerResult<()> {
    let service = tracker.student();

    match cmd {
        StudentCommands::Show => {
            let profile = service.profile()?;
            let or_dash = |s: &str| if s.is_empty() { "-".to_string() } else { s.to_string() };

            println!("Student Profile");
            println!("===============");
            println!("  Name:         {}", or_dash(&profile.name));
            println!("  Class:        {}", or_dash(&profile.class_name));
            println!("  Review Date:  {}", profile.review_date);
            println!(
                "  Locked:       {}",
                if profile.locked { "Yes" } else { "No" }
            );
        }

        StudentCommands::Set {
            name,
            class,
            review_date,
        } => {
            if name.is_none() && class.is_none() && review_date.is_none() {
                println!("No changes specified. Use --name, --class or --review-date.");
                return Ok(());
            }

            // Parse before writing anything
            let review_date = review_date
                .map(|d| {
                    NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").map_err(|e| {
                        TrackerError::Validation(format!(
                            "Invalid review date '{}': {}. Use YYYY-MM-DD",
                            d, e
                        ))
                    })
                })
                .transpose()?;

            if let Some(name) = name {
                match service.update_name(&name)? {
                    ProfileUpdate::Applied => println!("Name set to: {}", name.trim()),
                    ProfileUpdate::Rejected(reason) => println!("{}", reason),
                }
            }

            if let Some(class) = class {
                match service.update_class(&class)? {
                    ClassChange::Rejected(reason) => println!("{}", reason),
                    ClassChange::Cleared => println!("Class cleared."),
                    ClassChange::Seeded { chapters_added } => {
                        println!("Class set to: {}", class.trim());
                        println!("  Lists replaced with the class defaults");
                        println!("  Chapters added: {}", chapters_added);
                    }
                    ClassChange::NoDefaults => {
                        println!("Class set to: {}", class.trim());
                        println!("  No defaults are known for this class; lists unchanged");
                    }
                }
            }

            if let Some(date) = review_date {
                service.update_review_date(date)?;
                println!("Review date set to: {}", date);
            }
        }

        StudentCommands::Lock => {
            let profile = service.lock()?;
            println!(
                "Profile locked: {} (class {})",
                profile.name, profile.class_name
            );
        }
    }

    Ok(())
}
