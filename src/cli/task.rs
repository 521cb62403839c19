//! Daily plan CLI commands

use chrono::NaiveDate;
use clap::Subcommand;

use crate::display::{format_task_list, format_week};
use crate::error::{TrackerError, TrackerResult};
use crate::models::{completion_score, ChapterId, TaskId, TaskStatus};
use crate::services::today;
use crate::session::Tracker;

use super::parse_arg;

/// Task subcommands
#[derive(Subcommand)]
pub enum TaskCommands {
    /// Plan a task
    Add {
        /// Subject the task belongs to
        subject: String,
        /// What to do
        description: String,
        /// Related chapter ID
        #[arg(short, long)]
        chapter: Option<String>,
        /// Day to plan for (YYYY-MM-DD, default today)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Show the plan for a day
    List {
        /// Day to show (YYYY-MM-DD, default today)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Record how a task went
    Update {
        /// Task ID (e.g. task-4 or 4)
        id: String,
        /// pending, done, partial or not-done
        status: String,
        /// What was actually done (defaults to the plan)
        #[arg(short, long, default_value = "")]
        work: String,
    },
    /// Remove a task
    Remove {
        /// Task ID
        id: String,
    },
    /// Show the last seven days
    Week,
}

/// Handle a task command
pub fn handle_task_command(tracker: &Tracker, cmd: TaskCommands) -> TrackerResult<()> {
    let service = tracker.daily();

    match cmd {
        TaskCommands::Add {
            subject,
            description,
            chapter,
            date,
        } => {
            if description.trim().is_empty() {
                return Err(TrackerError::Validation(
                    "Task description cannot be empty".into(),
                ));
            }

            let chapter_id = chapter
                .map(|c| parse_arg::<ChapterId>("chapter ID", &c))
                .transpose()?;
            if let Some(id) = chapter_id {
                if tracker.chapters().get(id)?.is_none() {
                    return Err(TrackerError::chapter_not_found(id.to_string()));
                }
            }

            let date = parse_date(date)?;
            let task = service.add_task(&subject, &description, chapter_id, date)?;
            println!("Planned {} for {}: {}", task.id, task.date, task.description);
        }

        TaskCommands::List { date } => {
            let date = parse_date(date)?.unwrap_or_else(today);
            let tasks = service.plan_for(date)?;

            println!("Plan for {}", date);
            println!();
            println!("{}", format_task_list(&tasks).trim_end());
        }

        TaskCommands::Update { id, status, work } => {
            let id: TaskId = parse_arg("task ID", &id)?;
            let status: TaskStatus = parse_arg("task status", &status)?;

            let task = service
                .update_task(id, status, &work)?
                .ok_or_else(|| TrackerError::task_not_found(id.to_string()))?;
            println!("{} marked {}", task.id, task.status);

            let tasks = service.plan_for(task.date)?;
            if let Some(score) = completion_score(&tasks) {
                println!("Score for {}: {}%", task.date, score);
            }
        }

        TaskCommands::Remove { id } => {
            let id: TaskId = parse_arg("task ID", &id)?;
            if !service.remove_task(id)? {
                return Err(TrackerError::task_not_found(id.to_string()));
            }
            println!("Removed task {}", id);
        }

        TaskCommands::Week => {
            let today = today();
            let days = service.week_history(today)?;
            let stats = service.weekly_stats(today)?;
            print!("{}", format_week(&days, &stats));
        }
    }

    Ok(())
}

fn parse_date(date: Option<String>) -> TrackerResult<Option<NaiveDate>> {
    date.map(|d| {
        NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").map_err(|e| {
            TrackerError::Validation(format!("Invalid date '{}': {}. Use YYYY-MM-DD", d, e))
        })
    })
    .transpose()
}
