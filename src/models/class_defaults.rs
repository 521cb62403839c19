//! Class templates
//!
//! `ClassDefaults` holds the lists a new profile starts with for a class;
//! `DefaultChapter` is a template chapter used to seed that profile.

use serde::{Deserialize, Serialize};

use super::chapter::string_or_number;
use super::ids::DefaultChapterId;

/// Template lists for one class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDefaults {
    pub class_name: String,
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default)]
    pub learning_methods: Vec<String>,
    #[serde(default)]
    pub exam_types: Vec<String>,
}

/// Template chapter scoped to a class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultChapter {
    #[serde(default)]
    pub id: DefaultChapterId,
    pub class_name: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub chapter_no: String,
    #[serde(default)]
    pub chapter_name: String,
    #[serde(default)]
    pub description: String,
}

impl DefaultChapter {
    pub fn new(
        class_name: impl Into<String>,
        subject: impl Into<String>,
        chapter_no: impl Into<String>,
        chapter_name: impl Into<String>,
    ) -> Self {
        Self {
            id: DefaultChapterId::UNASSIGNED,
            class_name: class_name.into(),
            subject: subject.into(),
            chapter_no: chapter_no.into(),
            chapter_name: chapter_name.into(),
            description: String::new(),
        }
    }
}
