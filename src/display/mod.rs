//! Display formatting for terminal output
//!
//! Plain-text tables and detail views for the CLI.

pub mod backup;
pub mod chapter;
pub mod daily;

pub use backup::{format_backup_details, format_backup_list};
pub use chapter::{format_chapter_details, format_chapter_list};
pub use daily::{format_task_list, format_week};
