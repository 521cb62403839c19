//! Student profile service
//!
//! Handles the profile lock and class-change seeding: choosing a class on an
//! unlocked profile replaces the configuration lists with that class's
//! defaults and adds one chapter per template chapter.

use chrono::NaiveDate;

use crate::error::{TrackerError, TrackerResult};
use crate::models::{Chapter, ConfigEntry, ConfigKey, StudentInfo};
use crate::storage::Database;

/// Outcome of a name edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileUpdate {
    Applied,
    /// Nothing was changed or written
    Rejected(String),
}

/// Outcome of a class edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassChange {
    /// Profile locked; nothing was changed or written
    Rejected(String),
    /// Class saved as empty; nothing seeded
    Cleared,
    /// Class saved, lists replaced and template chapters added
    Seeded { chapters_added: usize },
    /// Class saved, but no defaults are known for it
    NoDefaults,
}

const LOCKED: &str = "Student info is locked - cannot change name or class";

/// Service for the single student profile
pub struct StudentService<'a> {
    db: &'a Database,
}

impl<'a> StudentService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// The stored profile, or the default one if none was saved
    pub fn profile(&self) -> TrackerResult<StudentInfo> {
        Ok(self.db.student.get()?.unwrap_or_default())
    }

    pub fn update_name(&self, name: &str) -> TrackerResult<ProfileUpdate> {
        if self.profile()?.locked {
            tracing::warn!("{}", LOCKED);
            return Ok(ProfileUpdate::Rejected(LOCKED.into()));
        }

        let name = name.trim().to_string();
        self.db.student.update(|info| info.name = name)?;
        Ok(ProfileUpdate::Applied)
    }

    /// Change the class and, on an unlocked profile, seed from its defaults
    pub fn update_class(&self, class_name: &str) -> TrackerResult<ClassChange> {
        if self.profile()?.locked {
            tracing::warn!("{}", LOCKED);
            return Ok(ClassChange::Rejected(LOCKED.into()));
        }

        let class_name = class_name.trim().to_string();
        self.db
            .student
            .update(|info| info.class_name = class_name.clone())?;

        if class_name.is_empty() {
            return Ok(ClassChange::Cleared);
        }

        self.seed_from_defaults(&class_name)
    }

    fn seed_from_defaults(&self, class_name: &str) -> TrackerResult<ClassChange> {
        let Some(defaults) = self.db.class_defaults.get(&class_name.to_string())? else {
            tracing::warn!(class = class_name, "no defaults found for class");
            return Ok(ClassChange::NoDefaults);
        };

        self.db.config.put_all(vec![
            ConfigEntry::new(ConfigKey::Subjects, defaults.subjects.clone()),
            ConfigEntry::new(ConfigKey::LearningMethods, defaults.learning_methods.clone()),
            ConfigEntry::new(ConfigKey::ExamTypes, defaults.exam_types.clone()),
        ])?;

        let synced = self
            .db
            .chapters
            .update_all(|chapter| chapter.sync_methods(&defaults.learning_methods))?;
        tracing::debug!(updated = synced.updated, "chapter method keys synced");

        let chapters: Vec<Chapter> = self
            .db
            .default_chapters
            .find(|t| t.class_name == class_name)?
            .iter()
            .map(|template| Chapter::from_template(template, &defaults.learning_methods))
            .collect();

        let added = self.db.chapters.insert_all(chapters)?;
        tracing::info!(class = class_name, chapters = added.len(), "class defaults applied");

        Ok(ClassChange::Seeded {
            chapters_added: added.len(),
        })
    }

    /// Review date stays editable after locking
    pub fn update_review_date(&self, date: NaiveDate) -> TrackerResult<StudentInfo> {
        self.db.student.update(|info| info.review_date = date)
    }

    /// Lock name and class for good; both must be filled in
    pub fn lock(&self) -> TrackerResult<StudentInfo> {
        let profile = self.profile()?;
        if profile.locked {
            return Ok(profile);
        }
        if !profile.can_lock() {
            return Err(TrackerError::Validation(
                "Enter both name and class before locking".into(),
            ));
        }

        let locked = self.db.student.update(|info| info.locked = true)?;
        tracing::info!(name = %locked.name, class = %locked.class_name, "student info locked");
        Ok(locked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackerPaths;
    use crate::models::{ClassDefaults, DefaultChapter, LearningStatus};
    use crate::services::ConfigStore;
    use tempfile::TempDir;

    fn create_test_db() -> (TempDir, Database) {
        let temp_dir = TempDir::new().unwrap();
        let paths = TrackerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let db = Database::open(paths).unwrap();
        (temp_dir, db)
    }

    fn install_class_seven(db: &Database) {
        db.class_defaults
            .put(ClassDefaults {
                class_name: "7".into(),
                subjects: vec!["Mathematics".into(), "Science".into()],
                learning_methods: vec!["School".into(), "Tuition".into()],
                exam_types: vec!["Annual".into()],
            })
            .unwrap();
        let mut heat = DefaultChapter::new("7", "Science", "4", "Heat");
        heat.description = "Read NCERT first".into();
        db.default_chapters
            .insert_all(vec![
                DefaultChapter::new("7", "Mathematics", "1", "Integers"),
                heat,
                DefaultChapter::new("8", "Science", "1", "Crop Production"),
            ])
            .unwrap();
    }

    #[test]
    fn test_default_profile() {
        let (_temp, db) = create_test_db();
        let profile = StudentService::new(&db).profile().unwrap();
        assert_eq!(profile, StudentInfo::default());
    }

    #[test]
    fn test_class_change_seeds_lists_and_chapters() {
        let (_temp, db) = create_test_db();
        install_class_seven(&db);
        let service = StudentService::new(&db);

        let change = service.update_class("7").unwrap();
        assert_eq!(change, ClassChange::Seeded { chapters_added: 2 });

        let lists = ConfigStore::new(&db);
        assert_eq!(lists.get(ConfigKey::Subjects).unwrap(), vec!["Mathematics", "Science"]);
        assert_eq!(lists.get(ConfigKey::ExamTypes).unwrap(), vec!["Annual"]);

        let chapters = db.chapters.get_all().unwrap();
        assert_eq!(chapters.len(), 2);
        let heat = chapters.iter().find(|c| c.chapter_name == "Heat").unwrap();
        assert_eq!(heat.notes, "Read NCERT first");
        assert!(heat.exam_types.is_empty());
        assert_eq!(heat.status_for("Tuition"), LearningStatus::NotStarted);
        assert!(heat.last_updated.is_none());
    }

    #[test]
    fn test_class_change_syncs_existing_chapter_methods() {
        let (_temp, db) = create_test_db();
        install_class_seven(&db);
        let mut existing = Chapter::blank(&["Self Study".to_string(), "School".to_string()]);
        existing.learning_status.insert("School".into(), LearningStatus::Completed);
        let existing = db.chapters.insert(existing).unwrap();

        StudentService::new(&db).update_class("7").unwrap();

        let chapter = db.chapters.get(existing.id).unwrap().unwrap();
        let keys: Vec<&String> = chapter.learning_status.keys().collect();
        assert_eq!(keys, vec!["School", "Tuition"]);
        assert_eq!(chapter.status_for("School"), LearningStatus::Completed);
        assert_eq!(chapter.status_for("Tuition"), LearningStatus::NotStarted);
    }

    #[test]
    fn test_class_without_defaults() {
        let (_temp, db) = create_test_db();
        let service = StudentService::new(&db);

        assert_eq!(service.update_class("12").unwrap(), ClassChange::NoDefaults);
        assert_eq!(service.profile().unwrap().class_name, "12");
        assert_eq!(service.update_class("  ").unwrap(), ClassChange::Cleared);
    }

    #[test]
    fn test_locked_profile_rejects_name_and_class() {
        let (_temp, db) = create_test_db();
        install_class_seven(&db);
        let service = StudentService::new(&db);
        service.update_name("Asha").unwrap();
        service.update_class("8").unwrap();
        service.lock().unwrap();

        assert!(matches!(
            service.update_name("Someone Else").unwrap(),
            ProfileUpdate::Rejected(_)
        ));
        assert!(matches!(
            service.update_class("7").unwrap(),
            ClassChange::Rejected(_)
        ));

        let profile = service.profile().unwrap();
        assert_eq!(profile.name, "Asha");
        assert_eq!(profile.class_name, "8");
        assert!(db.chapters.get_all().unwrap().is_empty());

        let date = NaiveDate::from_ymd_opt(2026, 3, 20).unwrap();
        assert_eq!(service.update_review_date(date).unwrap().review_date, date);
    }

    #[test]
    fn test_lock_requires_name_and_class() {
        let (_temp, db) = create_test_db();
        let service = StudentService::new(&db);
        service.update_name("Asha").unwrap();

        let err = service.lock().unwrap_err();
        assert!(err.is_validation());
        assert!(!service.profile().unwrap().locked);
    }
}
