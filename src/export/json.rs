//! JSON Export functionality
//!
//! Exports the complete store, backup history included, as one portable
//! document with a format version.

use std::io::Write;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{TrackerError, TrackerResult};
use crate::models::{Backup, Collections};
use crate::storage::Database;

/// Format version written to, and required of, export documents
pub const EXPORT_FORMAT_VERSION: u32 = 1;

/// Full database export structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullExport {
    pub export_date: DateTime<Utc>,
    pub version: u32,
    pub data: ExportData,
}

/// The `data` section: every live collection plus the snapshots
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportData {
    #[serde(flatten)]
    pub collections: Collections,
    #[serde(default)]
    pub backups: Vec<Backup>,
}

impl FullExport {
    /// Build an export from the store
    pub fn from_database(db: &Database) -> TrackerResult<Self> {
        Self::from_database_at(db, Utc::now())
    }

    pub fn from_database_at(db: &Database, now: DateTime<Utc>) -> TrackerResult<Self> {
        Ok(Self {
            export_date: now,
            version: EXPORT_FORMAT_VERSION,
            data: ExportData {
                collections: db.snapshot()?,
                backups: db.backups.get_all()?,
            },
        })
    }

    /// Reject documents written in a format this version cannot read
    pub fn validate(&self) -> Result<(), String> {
        if self.version != EXPORT_FORMAT_VERSION {
            return Err(format!(
                "Unsupported export version {}: expected {}",
                self.version, EXPORT_FORMAT_VERSION
            ));
        }
        Ok(())
    }
}

/// Export the full database to JSON
pub fn export_full_json<W: Write>(db: &Database, writer: &mut W, pretty: bool) -> TrackerResult<()> {
    let export = FullExport::from_database(db)?;

    if pretty {
        serde_json::to_writer_pretty(writer, &export)
    } else {
        serde_json::to_writer(writer, &export)
    }
    .map_err(|e| TrackerError::Export(e.to_string()))?;

    Ok(())
}

/// Parse and validate an export document
pub fn import_from_json(json_str: &str) -> TrackerResult<FullExport> {
    let export: FullExport =
        serde_json::from_str(json_str).map_err(|e| TrackerError::Import(e.to_string()))?;

    export.validate().map_err(TrackerError::Import)?;

    Ok(export)
}

/// `exam-tracker-FULL-<Name-With-Dashes>-<date>.json`
pub fn full_export_file_name(student_name: &str, date: NaiveDate) -> String {
    format!("exam-tracker-FULL-{}-{}.json", file_name_part(student_name), date)
}

/// `exam-tracker-<Name-With-Dashes>-<date>.csv`
pub fn csv_file_name(student_name: &str, date: NaiveDate) -> String {
    format!("exam-tracker-{}-{}.csv", file_name_part(student_name), date)
}

fn file_name_part(student_name: &str) -> String {
    let parts: Vec<&str> = student_name.split_whitespace().collect();
    if parts.is_empty() {
        "Student".to_string()
    } else {
        parts.join("-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackerPaths;
    use crate::models::{Chapter, StudentInfo};
    use tempfile::TempDir;

    fn create_test_db() -> (TempDir, Database) {
        let temp_dir = TempDir::new().unwrap();
        let paths = TrackerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let db = Database::open(paths).unwrap();
        (temp_dir, db)
    }

    #[test]
    fn test_document_shape() {
        let (_temp, db) = create_test_db();
        db.chapters.insert(Chapter::blank(&[])).unwrap();
        db.student.set(StudentInfo::default()).unwrap();

        let mut output = Vec::new();
        export_full_json(&db, &mut output, false).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&output).unwrap();

        assert_eq!(value["version"], 1);
        assert!(value["exportDate"].is_string());
        let data = &value["data"];
        assert_eq!(data["trackingData"].as_array().unwrap().len(), 1);
        assert_eq!(data["studentInfo"].as_array().unwrap().len(), 1);
        for key in ["config", "dailyPlans", "dailyHistory", "backups"] {
            assert!(data[key].is_array(), "{} missing", key);
        }
    }

    #[test]
    fn test_json_roundtrip() {
        let (_temp, db) = create_test_db();
        let mut chapter = Chapter::blank(&["School".to_string()]);
        chapter.chapter_name = "Light \"and\" Shadows".into();
        db.chapters.insert(chapter).unwrap();

        let mut output = Vec::new();
        export_full_json(&db, &mut output, true).unwrap();
        let imported = import_from_json(&String::from_utf8(output).unwrap()).unwrap();

        assert_eq!(imported.data.collections, db.snapshot().unwrap());
    }

    #[test]
    fn test_unknown_version_rejected() {
        let err = import_from_json(r#"{"exportDate": "2026-02-01T00:00:00Z", "version": 2, "data": {}}"#)
            .unwrap_err();
        assert!(matches!(err, TrackerError::Import(_)));
    }

    #[test]
    fn test_missing_collections_import_as_empty() {
        let export =
            import_from_json(r#"{"exportDate": "2026-02-01T00:00:00Z", "version": 1, "data": {}}"#)
                .unwrap();
        assert!(export.data.collections.is_empty());
        assert!(export.data.backups.is_empty());
    }

    #[test]
    fn test_file_names() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 3).unwrap();
        assert_eq!(
            full_export_file_name("Asha  Rao", date),
            "exam-tracker-FULL-Asha-Rao-2026-02-03.json"
        );
        assert_eq!(csv_file_name("", date), "exam-tracker-Student-2026-02-03.csv");
    }
}
