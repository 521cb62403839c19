//! Chapter service
//!
//! Creation, field edits and deletion of tracked chapters. Confidence and
//! learning-status writes go through the models' upgrade rule so that
//! `last_updated` only moves forward on an upgrade; every other field edit
//! leaves it alone.
//!
//! Edits aimed at an unknown id are silent no-ops and return `Ok(None)`.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};

use crate::audit::EntityType;
use crate::error::{TrackerError, TrackerResult};
use crate::models::{Chapter, ChapterDraft, ChapterId, Confidence, LearningStatus, WritingStatus};
use crate::storage::Database;

use super::config_store::ConfigStore;

/// Options for filtering chapter listings
#[derive(Debug, Clone, Default)]
pub struct ChapterFilter {
    pub subject: Option<String>,
    pub exam_type: Option<String>,
}

impl ChapterFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn exam_type(mut self, exam_type: impl Into<String>) -> Self {
        self.exam_type = Some(exam_type.into());
        self
    }

    fn matches(&self, chapter: &Chapter) -> bool {
        self.subject.as_ref().map_or(true, |s| &chapter.subject == s)
            && self
                .exam_type
                .as_ref()
                .map_or(true, |e| chapter.exam_types.contains(e))
    }
}

/// Service for chapter management
pub struct ChapterService<'a> {
    db: &'a Database,
}

impl<'a> ChapterService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Add a blank chapter with every current learning method "Not Started"
    pub fn add_chapter(&self) -> TrackerResult<Chapter> {
        let methods = ConfigStore::new(self.db).learning_methods()?;
        self.store_new(Chapter::blank(&methods))
    }

    /// Add a chapter with its identifying fields filled in
    pub fn add_chapter_with(&self, draft: ChapterDraft) -> TrackerResult<Chapter> {
        let methods = ConfigStore::new(self.db).learning_methods()?;
        self.store_new(Chapter::from_draft(draft, &methods))
    }

    fn store_new(&self, chapter: Chapter) -> TrackerResult<Chapter> {
        let chapter = self.db.chapters.insert(chapter)?;

        self.db.log_create(
            EntityType::Chapter,
            chapter.id.to_string(),
            Some(chapter.label()),
            &chapter,
        )?;

        Ok(chapter)
    }

    pub fn get(&self, id: ChapterId) -> TrackerResult<Option<Chapter>> {
        self.db.chapters.get(id)
    }

    /// All chapters in creation order
    pub fn list(&self) -> TrackerResult<Vec<Chapter>> {
        self.db.chapters.get_all()
    }

    pub fn list_filtered(&self, filter: &ChapterFilter) -> TrackerResult<Vec<Chapter>> {
        self.db.chapters.find(|c| filter.matches(c))
    }

    /// Apply an edit, persist it and record it in the audit log
    fn modify(&self, id: ChapterId, f: impl FnOnce(&mut Chapter)) -> TrackerResult<Option<Chapter>> {
        let Some(before) = self.db.chapters.get(id)? else {
            return Ok(None);
        };

        let Some(after) = self.db.chapters.update(id, f)? else {
            return Ok(None);
        };

        if before != after {
            self.db.log_update(
                EntityType::Chapter,
                id.to_string(),
                Some(after.label()),
                &before,
                &after,
            )?;
        }

        Ok(Some(after))
    }

    pub fn set_subject(&self, id: ChapterId, subject: &str) -> TrackerResult<Option<Chapter>> {
        let subject = subject.trim().to_string();
        self.modify(id, |c| c.subject = subject)
    }

    pub fn set_chapter_no(&self, id: ChapterId, chapter_no: &str) -> TrackerResult<Option<Chapter>> {
        let chapter_no = chapter_no.trim().to_string();
        self.modify(id, |c| c.chapter_no = chapter_no)
    }

    pub fn set_chapter_name(&self, id: ChapterId, name: &str) -> TrackerResult<Option<Chapter>> {
        let name = name.trim().to_string();
        self.modify(id, |c| c.chapter_name = name)
    }

    pub fn set_exam_types(
        &self,
        id: ChapterId,
        exam_types: BTreeSet<String>,
    ) -> TrackerResult<Option<Chapter>> {
        self.modify(id, |c| c.exam_types = exam_types)
    }

    pub fn set_writing_done(
        &self,
        id: ChapterId,
        writing: WritingStatus,
    ) -> TrackerResult<Option<Chapter>> {
        self.modify(id, |c| c.writing_done = writing)
    }

    pub fn set_notes(&self, id: ChapterId, notes: &str) -> TrackerResult<Option<Chapter>> {
        let notes = notes.to_string();
        self.modify(id, |c| c.notes = notes)
    }

    pub fn set_confidence(
        &self,
        id: ChapterId,
        confidence: Confidence,
    ) -> TrackerResult<Option<Chapter>> {
        self.set_confidence_at(id, confidence, Utc::now())
    }

    pub fn set_confidence_at(
        &self,
        id: ChapterId,
        confidence: Confidence,
        now: DateTime<Utc>,
    ) -> TrackerResult<Option<Chapter>> {
        self.modify(id, |c| {
            c.set_confidence(confidence, now);
        })
    }

    pub fn set_learning_status(
        &self,
        id: ChapterId,
        method: &str,
        status: LearningStatus,
    ) -> TrackerResult<Option<Chapter>> {
        self.set_learning_status_at(id, method, status, Utc::now())
    }

    pub fn set_learning_status_at(
        &self,
        id: ChapterId,
        method: &str,
        status: LearningStatus,
        now: DateTime<Utc>,
    ) -> TrackerResult<Option<Chapter>> {
        let methods = ConfigStore::new(self.db).learning_methods()?;
        if !methods.iter().any(|m| m == method) {
            return Err(TrackerError::Validation(format!(
                "Unknown learning method: '{}'. Configured: {}",
                method,
                methods.join(", ")
            )));
        }

        self.modify(id, |c| {
            c.set_learning_status(method, status, now);
        })
    }

    /// Delete a chapter; false when the id is unknown
    pub fn delete(&self, id: ChapterId) -> TrackerResult<bool> {
        let Some(chapter) = self.db.chapters.get(id)? else {
            return Ok(false);
        };

        let deleted = self.db.chapters.delete(id)?;
        if deleted {
            self.db.log_delete(
                EntityType::Chapter,
                id.to_string(),
                Some(chapter.label()),
                &chapter,
            )?;
        }
        Ok(deleted)
    }

    /// Rewrite the subject of every chapter filed under `old`; returns how many changed
    pub fn rename_subject(&self, old: &str, new: &str) -> TrackerResult<usize> {
        let new = new.trim();
        let report = self.db.chapters.update_all(|c| {
            if c.subject == old && c.subject != new {
                c.subject = new.to_string();
                true
            } else {
                false
            }
        })?;

        tracing::info!(old, new, updated = report.updated, "subject renamed in chapters");
        Ok(report.updated)
    }

    /// Chapters whose subject is not one of `subjects`, grouped by subject.
    ///
    /// Chapters with an empty subject are not reported.
    pub fn orphaned_chapters(
        &self,
        subjects: &[String],
    ) -> TrackerResult<BTreeMap<String, Vec<Chapter>>> {
        let mut grouped: BTreeMap<String, Vec<Chapter>> = BTreeMap::new();
        for chapter in self.db.chapters.get_all()? {
            if !chapter.subject.is_empty() && !subjects.contains(&chapter.subject) {
                grouped.entry(chapter.subject.clone()).or_default().push(chapter);
            }
        }
        Ok(grouped)
    }

    /// Distinct non-empty subjects in first-seen order
    pub fn active_subjects(&self) -> TrackerResult<Vec<String>> {
        let mut seen = Vec::new();
        for chapter in self.db.chapters.get_all()? {
            let subject = chapter.subject.trim();
            if !subject.is_empty() && !seen.iter().any(|s| s == subject) {
                seen.push(subject.to_string());
            }
        }
        Ok(seen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackerPaths;
    use crate::models::ConfigKey;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn create_test_db() -> (TempDir, Database) {
        let temp_dir = TempDir::new().unwrap();
        let paths = TrackerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let db = Database::open(paths).unwrap();
        (temp_dir, db)
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, hour, 0, 0).unwrap()
    }

    fn draft(subject: &str, no: &str, name: &str) -> ChapterDraft {
        ChapterDraft {
            subject: subject.into(),
            chapter_no: no.into(),
            chapter_name: name.into(),
            ..ChapterDraft::default()
        }
    }

    #[test]
    fn test_add_blank_chapter_uses_current_methods() {
        let (_temp, db) = create_test_db();
        ConfigStore::new(&db)
            .update(ConfigKey::LearningMethods, vec!["School".into(), "Coaching".into()])
            .unwrap();
        let service = ChapterService::new(&db);

        let chapter = service.add_chapter().unwrap();
        assert!(chapter.id.is_assigned());
        assert_eq!(
            chapter.learning_status.keys().collect::<Vec<_>>(),
            vec!["Coaching", "School"]
        );
        assert!(chapter.last_updated.is_none());
        assert!(chapter.subject.is_empty());
    }

    #[test]
    fn test_confidence_upgrade_and_downgrade() {
        let (_temp, db) = create_test_db();
        let service = ChapterService::new(&db);
        let chapter = service.add_chapter_with(draft("Maths", "1", "Integers")).unwrap();

        let up = service
            .set_confidence_at(chapter.id, Confidence::Good, at(9))
            .unwrap()
            .unwrap();
        assert_eq!(up.last_updated, Some(at(9)));

        let down = service
            .set_confidence_at(chapter.id, Confidence::Low, at(10))
            .unwrap()
            .unwrap();
        assert_eq!(down.confidence, Confidence::Low);
        assert_eq!(down.last_updated, Some(at(9)));
    }

    #[test]
    fn test_unconfigured_method_is_rejected() {
        let (_temp, db) = create_test_db();
        let service = ChapterService::new(&db);
        let chapter = service.add_chapter().unwrap();

        let err = service
            .set_learning_status(chapter.id, "Homework", LearningStatus::Completed)
            .unwrap_err();
        assert!(err.is_validation());

        let stored = service.get(chapter.id).unwrap().unwrap();
        assert!(!stored.learning_status.contains_key("Homework"));
        assert!(stored.last_updated.is_none());
    }

    #[test]
    fn test_learning_status_sentinel_keeps_timestamp() {
        let (_temp, db) = create_test_db();
        let service = ChapterService::new(&db);
        let chapter = service.add_chapter().unwrap();

        service
            .set_learning_status_at(chapter.id, "School", LearningStatus::NotRequired, at(9))
            .unwrap();
        let after = service
            .set_learning_status_at(chapter.id, "School", LearningStatus::Completed, at(10))
            .unwrap()
            .unwrap();

        assert_eq!(after.status_for("School"), LearningStatus::Completed);
        assert!(after.last_updated.is_none());
    }

    #[test]
    fn test_plain_field_edits_do_not_touch_timestamp() {
        let (_temp, db) = create_test_db();
        let service = ChapterService::new(&db);
        let chapter = service.add_chapter().unwrap();

        service.set_notes(chapter.id, "Diagrams need practice").unwrap();
        service.set_writing_done(chapter.id, WritingStatus::Yes).unwrap();
        let after = service.set_subject(chapter.id, " Science ").unwrap().unwrap();

        assert_eq!(after.subject, "Science");
        assert!(after.last_updated.is_none());
    }

    #[test]
    fn test_unknown_id_is_noop() {
        let (_temp, db) = create_test_db();
        let service = ChapterService::new(&db);

        assert!(service
            .set_confidence(ChapterId::new(42), Confidence::Excellent)
            .unwrap()
            .is_none());
        assert!(!service.delete(ChapterId::new(42)).unwrap());
        assert!(db.audit().read_all().unwrap().is_empty());
    }

    #[test]
    fn test_edits_are_audited() {
        let (_temp, db) = create_test_db();
        let service = ChapterService::new(&db);
        let chapter = service.add_chapter_with(draft("Maths", "2", "Fractions")).unwrap();
        service.set_notes(chapter.id, "revise").unwrap();
        service.delete(chapter.id).unwrap();

        let ops: Vec<String> = db
            .audit()
            .read_all()
            .unwrap()
            .iter()
            .map(|e| e.operation.to_string())
            .collect();
        assert_eq!(ops, vec!["CREATE", "UPDATE", "DELETE"]);
    }

    #[test]
    fn test_rename_subject() {
        let (_temp, db) = create_test_db();
        let service = ChapterService::new(&db);
        service.add_chapter_with(draft("Maths", "1", "A")).unwrap();
        service.add_chapter_with(draft("Maths", "2", "B")).unwrap();
        service.add_chapter_with(draft("Science", "1", "C")).unwrap();

        assert_eq!(service.rename_subject("Maths", "Mathematics").unwrap(), 2);
        assert_eq!(
            service.active_subjects().unwrap(),
            vec!["Mathematics", "Science"]
        );
    }

    #[test]
    fn test_orphaned_chapters_grouped_by_subject() {
        let (_temp, db) = create_test_db();
        let service = ChapterService::new(&db);
        service.add_chapter_with(draft("Maths", "1", "A")).unwrap();
        service.add_chapter_with(draft("Maths", "2", "B")).unwrap();
        service.add_chapter_with(draft("Mathematics", "3", "C")).unwrap();
        service.add_chapter().unwrap();

        let orphans = service
            .orphaned_chapters(&["Mathematics".to_string()])
            .unwrap();
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans["Maths"].len(), 2);
    }

    #[test]
    fn test_list_filtered() {
        let (_temp, db) = create_test_db();
        let service = ChapterService::new(&db);
        let mut tagged = draft("Maths", "1", "A");
        tagged.exam_types.insert("Annual".into());
        service.add_chapter_with(tagged).unwrap();
        service.add_chapter_with(draft("Maths", "2", "B")).unwrap();

        let annual = service
            .list_filtered(&ChapterFilter::new().subject("Maths").exam_type("Annual"))
            .unwrap();
        assert_eq!(annual.len(), 1);
        assert_eq!(annual[0].chapter_no, "1");
    }
}
