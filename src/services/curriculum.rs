//! Configuration edits that cascade into chapters
//!
//! Each list change is written first, then the matching chapter change is
//! applied to the whole chapter table in one bulk write.

use crate::audit::EntityType;
use crate::error::TrackerResult;
use crate::models::{ConfigKey, LearningStatus};
use crate::storage::{BulkUpdateReport, Database};

use super::config_store::{AddOutcome, ConfigStore};

/// What a cascading list edit did to the chapter table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeReport {
    pub chapters_updated: usize,
    pub chapters_unchanged: usize,
    pub chapters_deleted: usize,
}

impl From<BulkUpdateReport> for CascadeReport {
    fn from(report: BulkUpdateReport) -> Self {
        Self {
            chapters_updated: report.updated,
            chapters_unchanged: report.unchanged,
            chapters_deleted: 0,
        }
    }
}

/// Service for list edits that touch every chapter
pub struct CurriculumService<'a> {
    db: &'a Database,
}

impl<'a> CurriculumService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn lists(&self) -> ConfigStore<'a> {
        ConfigStore::new(self.db)
    }

    /// Add a subject. No chapter changes.
    pub fn add_subject(&self, name: &str) -> TrackerResult<AddOutcome> {
        self.lists().add_item(ConfigKey::Subjects, name)
    }

    /// Add an exam type. No chapter changes.
    pub fn add_exam_type(&self, name: &str) -> TrackerResult<AddOutcome> {
        self.lists().add_item(ConfigKey::ExamTypes, name)
    }

    /// Add a learning method and mark it "Not Started" on every chapter
    pub fn add_learning_method(&self, name: &str) -> TrackerResult<(AddOutcome, CascadeReport)> {
        let outcome = self.lists().add_item(ConfigKey::LearningMethods, name)?;
        if !outcome.is_added() {
            return Ok((outcome, CascadeReport::default()));
        }

        let method = name.trim();
        let report = self.db.chapters.update_all(|chapter| {
            chapter
                .learning_status
                .insert(method.to_string(), LearningStatus::NotStarted)
                != Some(LearningStatus::NotStarted)
        })?;

        tracing::info!(method, updated = report.updated, "learning method added to chapters");
        Ok((outcome, report.into()))
    }

    /// Remove a learning method and drop its key from every chapter.
    ///
    /// Returns `None` when the method is not in the list.
    pub fn remove_learning_method(&self, name: &str) -> TrackerResult<Option<CascadeReport>> {
        if !self.lists().remove_item(ConfigKey::LearningMethods, name)? {
            return Ok(None);
        }

        let report = self
            .db
            .chapters
            .update_all(|chapter| chapter.learning_status.remove(name).is_some())?;

        tracing::info!(method = name, updated = report.updated, "learning method removed from chapters");
        Ok(Some(report.into()))
    }

    /// Remove a subject and delete every chapter filed under it
    pub fn remove_subject(&self, name: &str) -> TrackerResult<Option<CascadeReport>> {
        if !self.lists().remove_item(ConfigKey::Subjects, name)? {
            return Ok(None);
        }

        let deleted = self.db.chapters.delete_where(|c| c.subject == name)?;
        for chapter in &deleted {
            self.db.log_delete(
                EntityType::Chapter,
                chapter.id.to_string(),
                Some(chapter.label()),
                chapter,
            )?;
        }

        tracing::info!(subject = name, deleted = deleted.len(), "subject removed with its chapters");
        Ok(Some(CascadeReport {
            chapters_deleted: deleted.len(),
            chapters_unchanged: self.db.chapters.count()?,
            ..CascadeReport::default()
        }))
    }

    /// Remove an exam type and strip the tag from every chapter
    pub fn remove_exam_type(&self, name: &str) -> TrackerResult<Option<CascadeReport>> {
        if !self.lists().remove_item(ConfigKey::ExamTypes, name)? {
            return Ok(None);
        }

        let report = self
            .db
            .chapters
            .update_all(|chapter| chapter.exam_types.remove(name))?;

        Ok(Some(report.into()))
    }

    /// Dispatch an add by list
    pub fn add(&self, key: ConfigKey, name: &str) -> TrackerResult<(AddOutcome, CascadeReport)> {
        match key {
            ConfigKey::Subjects => Ok((self.add_subject(name)?, CascadeReport::default())),
            ConfigKey::LearningMethods => self.add_learning_method(name),
            ConfigKey::ExamTypes => Ok((self.add_exam_type(name)?, CascadeReport::default())),
        }
    }

    /// Dispatch a removal by list
    pub fn remove(&self, key: ConfigKey, name: &str) -> TrackerResult<Option<CascadeReport>> {
        match key {
            ConfigKey::Subjects => self.remove_subject(name),
            ConfigKey::LearningMethods => self.remove_learning_method(name),
            ConfigKey::ExamTypes => self.remove_exam_type(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackerPaths;
    use crate::models::ChapterDraft;
    use crate::services::ChapterService;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn create_test_db() -> (TempDir, Database) {
        let temp_dir = TempDir::new().unwrap();
        let paths = TrackerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let db = Database::open(paths).unwrap();
        (temp_dir, db)
    }

    fn seed(db: &Database, subject: &str, exams: &[&str]) {
        ChapterService::new(db)
            .add_chapter_with(ChapterDraft {
                subject: subject.into(),
                exam_types: exams.iter().map(|e| e.to_string()).collect(),
                ..ChapterDraft::default()
            })
            .unwrap();
    }

    fn method_keys(db: &Database) -> Vec<BTreeSet<String>> {
        db.chapters
            .get_all()
            .unwrap()
            .into_iter()
            .map(|c| c.learning_status.into_keys().collect())
            .collect()
    }

    #[test]
    fn test_add_method_marks_every_chapter_not_started() {
        let (_temp, db) = create_test_db();
        seed(&db, "Maths", &[]);
        seed(&db, "Science", &[]);
        let service = CurriculumService::new(&db);

        let (outcome, report) = service.add_learning_method(" Coaching ").unwrap();
        assert_eq!(outcome, AddOutcome::Added);
        assert_eq!(report.chapters_updated, 2);

        for chapter in db.chapters.get_all().unwrap() {
            assert_eq!(chapter.status_for("Coaching"), LearningStatus::NotStarted);
            assert!(chapter.learning_status.contains_key("Coaching"));
        }
    }

    #[test]
    fn test_add_then_remove_method_restores_keys() {
        let (_temp, db) = create_test_db();
        seed(&db, "Maths", &[]);
        let before = method_keys(&db);
        let service = CurriculumService::new(&db);

        service.add_learning_method("Coaching").unwrap();
        let report = service.remove_learning_method("Coaching").unwrap().unwrap();

        assert_eq!(report.chapters_updated, 1);
        assert_eq!(method_keys(&db), before);
    }

    #[test]
    fn test_duplicate_method_does_not_cascade() {
        let (_temp, db) = create_test_db();
        seed(&db, "Maths", &[]);
        let service = CurriculumService::new(&db);

        let (outcome, report) = service.add_learning_method("School").unwrap();
        assert_eq!(outcome, AddOutcome::AlreadyExists);
        assert_eq!(report, CascadeReport::default());
    }

    #[test]
    fn test_remove_subject_deletes_only_its_chapters() {
        let (_temp, db) = create_test_db();
        seed(&db, "Maths", &[]);
        seed(&db, "Science", &[]);
        seed(&db, "Maths", &[]);
        let service = CurriculumService::new(&db);

        let report = service.remove_subject("Maths").unwrap().unwrap();
        assert_eq!(report.chapters_deleted, 2);

        let remaining = db.chapters.get_all().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].subject, "Science");
        assert!(!ConfigStore::new(&db)
            .get(ConfigKey::Subjects)
            .unwrap()
            .contains(&"Maths".to_string()));
    }

    #[test]
    fn test_remove_exam_type_strips_tag() {
        let (_temp, db) = create_test_db();
        seed(&db, "Maths", &["Annual", "Half Yearly"]);
        seed(&db, "Science", &["Half Yearly"]);
        let service = CurriculumService::new(&db);

        let report = service.remove_exam_type("Annual").unwrap().unwrap();
        assert_eq!(report.chapters_updated, 1);
        assert_eq!(report.chapters_unchanged, 1);
        assert!(db
            .chapters
            .get_all()
            .unwrap()
            .iter()
            .all(|c| !c.exam_types.contains("Annual")));
    }

    #[test]
    fn test_remove_missing_item_is_none() {
        let (_temp, db) = create_test_db();
        let service = CurriculumService::new(&db);
        assert!(service.remove(ConfigKey::ExamTypes, "Olympiad").unwrap().is_none());
    }
}
