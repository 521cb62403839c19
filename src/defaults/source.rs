//! Where class defaults come from
//!
//! The defaults document is maintained outside the tracker:
//!
//! ```json
//! {
//!   "classes": {
//!     "7": {"subjects": [...], "learningMethods": [...], "examTypes": [...]}
//!   },
//!   "defaultChapters": [
//!     {"className": "7", "subject": "Science", "chapterNo": "4",
//!      "chapterName": "Heat", "description": ""}
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{TrackerError, TrackerResult};
use crate::models::{ClassDefaults, DefaultChapter};

/// Lists for one class inside the document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassLists {
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default)]
    pub learning_methods: Vec<String>,
    #[serde(default)]
    pub exam_types: Vec<String>,
}

/// The parsed defaults document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultsDocument {
    pub classes: BTreeMap<String, ClassLists>,
    #[serde(default)]
    pub default_chapters: Vec<DefaultChapter>,
}

impl DefaultsDocument {
    /// One `ClassDefaults` record per class entry
    pub fn class_defaults(&self) -> Vec<ClassDefaults> {
        self.classes
            .iter()
            .map(|(class_name, lists)| ClassDefaults {
                class_name: class_name.clone(),
                subjects: lists.subjects.clone(),
                learning_methods: lists.learning_methods.clone(),
                exam_types: lists.exam_types.clone(),
            })
            .collect()
    }
}

/// Something that can produce the defaults document
pub trait DefaultsSource {
    /// Where the document comes from, for messages
    fn describe(&self) -> String;

    /// Read and parse the document. Every call reads afresh.
    fn fetch(&self) -> TrackerResult<DefaultsDocument>;
}

/// A defaults document on the local filesystem
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl DefaultsSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self) -> TrackerResult<DefaultsDocument> {
        let text = fs::read_to_string(&self.path).map_err(|e| {
            TrackerError::Fetch(format!("Cannot read {}: {}", self.path.display(), e))
        })?;

        serde_json::from_str(&text).map_err(|e| {
            TrackerError::Fetch(format!("Malformed {}: {}", self.path.display(), e))
        })
    }
}

/// A document held in memory
#[derive(Debug, Clone, Default)]
pub struct InlineSource {
    document: Option<DefaultsDocument>,
}

impl InlineSource {
    pub fn new(document: DefaultsDocument) -> Self {
        Self {
            document: Some(document),
        }
    }

    /// A source whose fetch always fails
    pub fn unavailable() -> Self {
        Self { document: None }
    }
}

impl DefaultsSource for InlineSource {
    fn describe(&self) -> String {
        "inline defaults".into()
    }

    fn fetch(&self) -> TrackerResult<DefaultsDocument> {
        self.document
            .clone()
            .ok_or_else(|| TrackerError::Fetch("No defaults document available".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DOCUMENT: &str = r#"{
        "classes": {
            "7": {"subjects": ["Mathematics"], "learningMethods": ["School"], "examTypes": ["Annual"]},
            "8": {"subjects": ["Science"]}
        },
        "defaultChapters": [
            {"className": "7", "subject": "Mathematics", "chapterNo": "1", "chapterName": "Integers", "description": ""}
        ]
    }"#;

    #[test]
    fn test_file_source_parses_document() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("class-defaults.json");
        fs::write(&path, DOCUMENT).unwrap();

        let document = FileSource::new(path).fetch().unwrap();
        let classes = document.class_defaults();
        assert_eq!(classes.len(), 2);
        assert!(classes[1].learning_methods.is_empty());
        assert_eq!(document.default_chapters[0].chapter_name, "Integers");
    }

    #[test]
    fn test_numeric_chapter_numbers_parse() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("class-defaults.json");
        fs::write(
            &path,
            r#"{
                "classes": {"6": {"subjects": ["Science"]}},
                "defaultChapters": [
                    {"className": "6", "subject": "Science", "chapterNo": 2, "chapterName": "Components of Food"}
                ]
            }"#,
        )
        .unwrap();

        let document = FileSource::new(path).fetch().unwrap();
        assert_eq!(document.default_chapters[0].chapter_no, "2");
    }

    #[test]
    fn test_missing_file_is_fetch_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = FileSource::new(temp_dir.path().join("nope.json"))
            .fetch()
            .unwrap_err();
        assert!(matches!(err, TrackerError::Fetch(_)));
    }

    #[test]
    fn test_malformed_file_is_fetch_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("class-defaults.json");
        fs::write(&path, r#"{"defaultChapters": []}"#).unwrap();

        assert!(matches!(
            FileSource::new(path).fetch(),
            Err(TrackerError::Fetch(_))
        ));
    }

    #[test]
    fn test_unavailable_inline_source() {
        assert!(InlineSource::unavailable().fetch().is_err());
    }
}
