//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the tracker session.

pub mod backup;
pub mod chapter;
pub mod defaults;
pub mod export;
pub mod lists;
pub mod student;
pub mod task;

use std::fmt::Display;
use std::str::FromStr;

use crate::error::{TrackerError, TrackerResult};

pub use backup::{handle_backup_command, BackupCommands};
pub use chapter::{handle_chapter_command, ChapterCommands};
pub use defaults::{handle_defaults_command, DefaultsCommands};
pub use export::{handle_export_command, handle_import_command, ExportCommands};
pub use lists::{handle_list_command, ListCommands};
pub use student::{handle_student_command, StudentCommands};
pub use task::{handle_task_command, TaskCommands};

/// Parse a command-line value, reporting failures as validation errors
pub(crate) fn parse_arg<T>(what: &str, value: &str) -> TrackerResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| TrackerError::Validation(format!("Invalid {} '{}': {}", what, value, e)))
}
