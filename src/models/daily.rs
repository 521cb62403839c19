//! Daily plan models
//!
//! A `DailyTask` is one planned piece of work for a date. A
//! `DailyHistoryEntry` aggregates a day's tasks with a completion score and
//! is unique per date.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ids::{ChapterId, TaskId};

/// Outcome of a planned task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Done,
    Partial,
    NotDone,
}

impl TaskStatus {
    /// Weight towards the day's completion score
    pub fn credit(self) -> f64 {
        match self {
            TaskStatus::Done => 1.0,
            TaskStatus::Partial => 0.5,
            TaskStatus::Pending | TaskStatus::NotDone => 0.0,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::Done => write!(f, "done"),
            TaskStatus::Partial => write!(f, "partial"),
            TaskStatus::NotDone => write!(f, "not done"),
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "done" => Ok(TaskStatus::Done),
            "partial" => Ok(TaskStatus::Partial),
            "notdone" => Ok(TaskStatus::NotDone),
            _ => Err(format!("Unknown task status: {}", s)),
        }
    }
}

/// A planned task for one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTask {
    #[serde(default)]
    pub id: TaskId,

    pub date: NaiveDate,

    #[serde(default)]
    pub subject: String,

    /// What was planned
    #[serde(default, rename = "task")]
    pub description: String,

    #[serde(default)]
    pub chapter_id: Option<ChapterId>,

    #[serde(default)]
    pub status: TaskStatus,

    /// What was actually done
    #[serde(default)]
    pub actual_work: String,
}

impl DailyTask {
    pub fn new(
        date: NaiveDate,
        subject: impl Into<String>,
        description: impl Into<String>,
        chapter_id: Option<ChapterId>,
    ) -> Self {
        Self {
            id: TaskId::UNASSIGNED,
            date,
            subject: subject.into(),
            description: description.into(),
            chapter_id,
            status: TaskStatus::Pending,
            actual_work: String::new(),
        }
    }
}

/// Completion record for one calendar date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyHistoryEntry {
    pub date: NaiveDate,
    #[serde(default)]
    pub tasks: Vec<DailyTask>,
    /// Completion percentage, 0-100
    #[serde(default)]
    pub score: u32,
}

/// Completion percentage for a set of tasks; `None` for an empty day
pub fn completion_score(tasks: &[DailyTask]) -> Option<u32> {
    if tasks.is_empty() {
        return None;
    }
    let credit: f64 = tasks.iter().map(|t| t.status.credit()).sum();
    Some((credit / tasks.len() as f64 * 100.0).round() as u32)
}
