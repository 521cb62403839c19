//! Core data models for the exam tracker
//!
//! This module contains the data structures of the tracking domain:
//! chapters, the student profile, configuration lists, daily plans,
//! backup snapshots and class templates.

pub mod backup;
pub mod chapter;
pub mod class_defaults;
pub mod config_entry;
pub mod daily;
pub mod ids;
pub mod student;

pub use backup::{Backup, CollectionCounts, Collections};
pub use chapter::{Chapter, ChapterDraft, Confidence, LearningStatus, WritingStatus};
pub use class_defaults::{ClassDefaults, DefaultChapter};
pub use config_entry::{ConfigEntry, ConfigKey};
pub use daily::{completion_score, DailyHistoryEntry, DailyTask, TaskStatus};
pub use ids::{BackupId, ChapterId, DefaultChapterId, RecordId, TaskId};
pub use student::StudentInfo;
