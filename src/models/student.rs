//! Student profile
//!
//! A single profile per data directory. Once locked, name and class are
//! fixed for good.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Review date shown before the student picks one
pub fn default_review_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 14).unwrap_or_default()
}

/// The student's profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentInfo {
    #[serde(default)]
    pub name: String,

    /// School class identifier ("6", "7", ...)
    #[serde(default, rename = "class")]
    pub class_name: String,

    #[serde(default = "default_review_date")]
    pub review_date: NaiveDate,

    /// Terminal: once true, name and class cannot change
    #[serde(default)]
    pub locked: bool,
}

impl Default for StudentInfo {
    fn default() -> Self {
        Self {
            name: String::new(),
            class_name: String::new(),
            review_date: default_review_date(),
            locked: false,
        }
    }
}

impl StudentInfo {
    /// Locking requires both identifying fields
    pub fn can_lock(&self) -> bool {
        !self.name.trim().is_empty() && !self.class_name.trim().is_empty()
    }
}
