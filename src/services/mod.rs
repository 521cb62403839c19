//! Service layer for the exam tracker
//!
//! Services hold a reference to the `Database` and implement the operations
//! the CLI and the session call: validation, cascades across collections and
//! audit logging.

pub mod chapter;
pub mod config_store;
pub mod curriculum;
pub mod daily;
pub mod student;

pub use chapter::{ChapterFilter, ChapterService};
pub use config_store::{AddOutcome, ConfigStore};
pub use curriculum::{CascadeReport, CurriculumService};
pub use daily::{today, DailyService, DayHistory, WeeklyStats};
pub use student::{ClassChange, ProfileUpdate, StudentService};
