//! Named configuration lists
//!
//! Subjects, learning methods and exam types are three independent ordered
//! lists of unique values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which configuration list
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConfigKey {
    Subjects,
    LearningMethods,
    ExamTypes,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 3] = [
        ConfigKey::Subjects,
        ConfigKey::LearningMethods,
        ConfigKey::ExamTypes,
    ];

    /// Built-in list used until the key has been stored
    pub fn default_values(self) -> Vec<String> {
        let values: &[&str] = match self {
            ConfigKey::Subjects => &["Maths", "Science", "English", "Social Studies"],
            ConfigKey::LearningMethods => &["School", "Tuition", "Online App", "Self Study"],
            ConfigKey::ExamTypes => &[
                "Half Yearly",
                "Annual",
                "Unit Test 1",
                "Unit Test 2",
                "Weekly Test",
            ],
        };
        values.iter().map(|s| s.to_string()).collect()
    }

    /// Singular noun for messages
    pub fn item_name(self) -> &'static str {
        match self {
            ConfigKey::Subjects => "subject",
            ConfigKey::LearningMethods => "learning method",
            ConfigKey::ExamTypes => "exam type",
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigKey::Subjects => write!(f, "subjects"),
            ConfigKey::LearningMethods => write!(f, "learningMethods"),
            ConfigKey::ExamTypes => write!(f, "examTypes"),
        }
    }
}

/// One stored list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub key: ConfigKey,
    #[serde(default)]
    pub values: Vec<String>,
}

impl ConfigEntry {
    pub fn new(key: ConfigKey, values: Vec<String>) -> Self {
        Self { key, values }
    }
}
