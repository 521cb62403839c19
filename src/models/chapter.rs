//! Chapter model
//!
//! A chapter is the unit of study content being tracked. Each chapter carries
//! a learning status per configured learning method, a writing status, a
//! confidence rating and a `last_updated` timestamp that only moves forward
//! when a rating is upgraded.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::class_defaults::DefaultChapter;
use super::ids::ChapterId;

/// Self-assessed confidence, ordered from lowest to highest
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Confidence {
    #[default]
    None,
    Low,
    Medium,
    Good,
    Excellent,
}

impl Confidence {
    pub const ALL: [Confidence; 5] = [
        Confidence::None,
        Confidence::Low,
        Confidence::Medium,
        Confidence::Good,
        Confidence::Excellent,
    ];

    /// Position on the upgrade ladder
    pub fn rank(self) -> i8 {
        match self {
            Confidence::None => 0,
            Confidence::Low => 1,
            Confidence::Medium => 2,
            Confidence::Good => 3,
            Confidence::Excellent => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Confidence::None => "None",
            Confidence::Low => "Low",
            Confidence::Medium => "Medium",
            Confidence::Good => "Good",
            Confidence::Excellent => "Excellent",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Confidence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Confidence::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown confidence level: {}", s))
    }
}

/// Progress of a chapter under one learning method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LearningStatus {
    #[default]
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    /// Sentinel: the method does not apply to this chapter
    #[serde(rename = "Not Required")]
    NotRequired,
}

impl LearningStatus {
    pub const ALL: [LearningStatus; 4] = [
        LearningStatus::NotStarted,
        LearningStatus::InProgress,
        LearningStatus::Completed,
        LearningStatus::NotRequired,
    ];

    /// Position on the upgrade ladder; `NotRequired` sits off the ladder at -1
    pub fn rank(self) -> i8 {
        match self {
            LearningStatus::NotStarted => 0,
            LearningStatus::InProgress => 1,
            LearningStatus::Completed => 2,
            LearningStatus::NotRequired => -1,
        }
    }

    pub fn is_sentinel(self) -> bool {
        self == LearningStatus::NotRequired
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LearningStatus::NotStarted => "Not Started",
            LearningStatus::InProgress => "In Progress",
            LearningStatus::Completed => "Completed",
            LearningStatus::NotRequired => "Not Required",
        }
    }
}

impl fmt::Display for LearningStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LearningStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace(['-', '_'], " ");
        LearningStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| format!("Unknown learning status: {}", s))
    }
}

/// Whether the written practice for a chapter is done
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WritingStatus {
    #[default]
    No,
    Partial,
    Yes,
}

impl WritingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            WritingStatus::No => "No",
            WritingStatus::Partial => "Partial",
            WritingStatus::Yes => "Yes",
        }
    }
}

impl fmt::Display for WritingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WritingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "no" => Ok(WritingStatus::No),
            "partial" => Ok(WritingStatus::Partial),
            "yes" => Ok(WritingStatus::Yes),
            _ => Err(format!("Unknown writing status: {}", s)),
        }
    }
}

/// Returns true when moving from `old` to `new` counts as an upgrade.
///
/// Negative ranks are sentinels and never take part in an upgrade.
pub fn is_upgrade(old: i8, new: i8) -> bool {
    old >= 0 && new >= 0 && new > old
}

/// A tracked chapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    /// Store-assigned identifier
    #[serde(default)]
    pub id: ChapterId,

    #[serde(default)]
    pub subject: String,

    /// Free-form chapter number ("1", "2a", ...)
    #[serde(default, deserialize_with = "string_or_number")]
    pub chapter_no: String,

    #[serde(default)]
    pub chapter_name: String,

    /// Exams this chapter is part of
    #[serde(default)]
    pub exam_types: BTreeSet<String>,

    /// Status per learning method; keys mirror the configured methods
    #[serde(default)]
    pub learning_status: BTreeMap<String, LearningStatus>,

    #[serde(default)]
    pub writing_done: WritingStatus,

    #[serde(default)]
    pub confidence: Confidence,

    /// Last time a rating was upgraded; never set at creation
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,

    #[serde(default)]
    pub notes: String,
}

impl Chapter {
    /// Create an empty chapter with every method marked "Not Started"
    pub fn blank(methods: &[String]) -> Self {
        Self {
            id: ChapterId::UNASSIGNED,
            subject: String::new(),
            chapter_no: String::new(),
            chapter_name: String::new(),
            exam_types: BTreeSet::new(),
            learning_status: methods
                .iter()
                .map(|m| (m.clone(), LearningStatus::NotStarted))
                .collect(),
            writing_done: WritingStatus::No,
            confidence: Confidence::None,
            last_updated: None,
            notes: String::new(),
        }
    }

    /// Create a chapter from a draft
    pub fn from_draft(draft: ChapterDraft, methods: &[String]) -> Self {
        let mut chapter = Self::blank(methods);
        chapter.subject = draft.subject.trim().to_string();
        chapter.chapter_no = draft.chapter_no.trim().to_string();
        chapter.chapter_name = draft.chapter_name.trim().to_string();
        chapter.exam_types = draft.exam_types;
        chapter.notes = draft.notes;
        chapter
    }

    /// Seed a chapter from a class template; tags and ratings start fresh
    pub fn from_template(template: &DefaultChapter, methods: &[String]) -> Self {
        let mut chapter = Self::blank(methods);
        chapter.subject = template.subject.clone();
        chapter.chapter_no = template.chapter_no.clone();
        chapter.chapter_name = template.chapter_name.clone();
        chapter.notes = template.description.clone();
        chapter
    }

    /// Make the status keys match `methods` exactly. Kept methods keep their
    /// status; new ones start as "Not Started". Returns true if anything changed.
    pub fn sync_methods(&mut self, methods: &[String]) -> bool {
        let before = self.learning_status.len();
        self.learning_status.retain(|method, _| methods.contains(method));
        let mut changed = self.learning_status.len() != before;
        for method in methods {
            if !self.learning_status.contains_key(method) {
                self.learning_status
                    .insert(method.clone(), LearningStatus::NotStarted);
                changed = true;
            }
        }
        changed
    }

    /// Status under a method; a missing key reads as "Not Started"
    pub fn status_for(&self, method: &str) -> LearningStatus {
        self.learning_status
            .get(method)
            .copied()
            .unwrap_or_default()
    }

    /// Set the confidence rating, advancing `last_updated` on an upgrade.
    ///
    /// Returns whether the timestamp moved.
    pub fn set_confidence(&mut self, confidence: Confidence, now: DateTime<Utc>) -> bool {
        let advanced = is_upgrade(self.confidence.rank(), confidence.rank());
        self.confidence = confidence;
        if advanced {
            self.last_updated = Some(now);
        }
        advanced
    }

    /// Set the status for one method, advancing `last_updated` on an upgrade.
    ///
    /// Returns whether the timestamp moved.
    pub fn set_learning_status(
        &mut self,
        method: &str,
        status: LearningStatus,
        now: DateTime<Utc>,
    ) -> bool {
        let old = self.status_for(method);
        let advanced = is_upgrade(old.rank(), status.rank());
        self.learning_status.insert(method.to_string(), status);
        if advanced {
            self.last_updated = Some(now);
        }
        advanced
    }

    /// Display label used in listings and the audit log
    pub fn label(&self) -> String {
        match (self.subject.is_empty(), self.chapter_name.is_empty()) {
            (true, true) => format!("Chapter {}", self.id),
            (false, true) => format!("{} - Ch {}", self.subject, self.chapter_no),
            _ => format!("{} - Ch {}: {}", self.subject, self.chapter_no, self.chapter_name),
        }
    }
}

/// Fields supplied when creating a populated chapter
#[derive(Debug, Clone, Default)]
pub struct ChapterDraft {
    pub subject: String,
    pub chapter_no: String,
    pub chapter_name: String,
    pub exam_types: BTreeSet<String>,
    pub notes: String,
}

/// Accept both `"3"` and `3` for chapter numbers
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}
