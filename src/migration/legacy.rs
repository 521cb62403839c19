//! Shape of the legacy flat document
//!
//! ```json
//! {
//!   "trackingData": [...],
//!   "studentInfo": {"name": "...", "class": "7", "reviewDate": "2026-01-14"},
//!   "subjects": [...], "learningMethods": [...], "examTypes": [...],
//!   "dailyPlans": [...],
//!   "dailyHistory": [...]
//! }
//! ```

use serde::Deserialize;

use crate::models::{
    Chapter, Collections, ConfigEntry, ConfigKey, DailyHistoryEntry, DailyTask, StudentInfo,
};

/// The legacy document. Every part is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyDocument {
    #[serde(default)]
    pub tracking_data: Vec<Chapter>,
    #[serde(default)]
    pub student_info: Option<StudentInfo>,
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default)]
    pub learning_methods: Vec<String>,
    #[serde(default)]
    pub exam_types: Vec<String>,
    #[serde(default)]
    pub daily_plans: Vec<DailyTask>,
    #[serde(default)]
    pub daily_history: Vec<DailyHistoryEntry>,
}

impl LegacyDocument {
    /// The document as store collections. All three lists are always
    /// present; a list missing from the document becomes empty.
    pub fn into_collections(self) -> Collections {
        Collections {
            tracking_data: self.tracking_data,
            student_info: self.student_info.into_iter().collect(),
            config: vec![
                ConfigEntry::new(ConfigKey::Subjects, self.subjects),
                ConfigEntry::new(ConfigKey::LearningMethods, self.learning_methods),
                ConfigEntry::new(ConfigKey::ExamTypes, self.exam_types),
            ],
            daily_plans: self.daily_plans,
            daily_history: self.daily_history,
        }
    }
}
