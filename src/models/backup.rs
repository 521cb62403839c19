//! Backup snapshot models
//!
//! A `Backup` is an append-only, point-in-time copy of every live entity
//! collection. `Collections` is that copy; it is also the `data` payload of
//! the portable export document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::chapter::Chapter;
use super::config_entry::ConfigEntry;
use super::daily::{DailyHistoryEntry, DailyTask};
use super::ids::BackupId;
use super::student::StudentInfo;

/// Every live entity collection.
///
/// Missing collections deserialize as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collections {
    #[serde(default)]
    pub tracking_data: Vec<Chapter>,
    /// Zero or one profile
    #[serde(default)]
    pub student_info: Vec<StudentInfo>,
    /// Older documents mixed bookkeeping rows into this list; only the
    /// three named lists are kept
    #[serde(default, deserialize_with = "named_lists_only")]
    pub config: Vec<ConfigEntry>,
    #[serde(default)]
    pub daily_plans: Vec<DailyTask>,
    #[serde(default)]
    pub daily_history: Vec<DailyHistoryEntry>,
}

impl Collections {
    /// Per-collection record counts
    pub fn counts(&self) -> CollectionCounts {
        CollectionCounts {
            chapters: self.tracking_data.len(),
            student_info: self.student_info.len(),
            config_lists: self.config.len(),
            daily_tasks: self.daily_plans.len(),
            history_days: self.daily_history.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.counts().total() == 0
    }
}

fn named_lists_only<'de, D>(deserializer: D) -> Result<Vec<ConfigEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let rows = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(rows
        .into_iter()
        .filter_map(|row| serde_json::from_value(row).ok())
        .collect())
}

/// Record counts per collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionCounts {
    pub chapters: usize,
    pub student_info: usize,
    pub config_lists: usize,
    pub daily_tasks: usize,
    pub history_days: usize,
}

impl CollectionCounts {
    pub fn total(&self) -> usize {
        self.chapters + self.student_info + self.config_lists + self.daily_tasks + self.history_days
    }

    pub fn summary(&self) -> String {
        format!(
            "{} chapters, {} profile, {} lists, {} tasks, {} history days",
            self.chapters, self.student_info, self.config_lists, self.daily_tasks, self.history_days
        )
    }
}

/// One stored snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Backup {
    #[serde(default)]
    pub id: BackupId,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub data: Collections,
}

impl Backup {
    pub fn new(timestamp: DateTime<Utc>, description: impl Into<String>, data: Collections) -> Self {
        Self {
            id: BackupId::UNASSIGNED,
            timestamp,
            description: description.into(),
            data,
        }
    }

    /// Same snapshot regardless of the id it is stored under
    pub fn same_snapshot(&self, other: &Backup) -> bool {
        self.timestamp == other.timestamp
            && self.description == other.description
            && self.data == other.data
    }
}
