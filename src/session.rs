//! The tracker session
//!
//! `Tracker` owns the open database and the settings. Opening it runs the
//! startup sequence in a fixed order: open the store, migrate the legacy
//! document, load class defaults, take the automatic snapshot if one is due,
//! then check the export reminder.

use std::io::Write;

use chrono::{DateTime, Utc};

use crate::backup::{BackupInfo, BackupManager, BackupPolicy, RestoreManager, RestoreResult};
use crate::config::{Settings, TrackerPaths};
use crate::defaults::{ClassDefaultsLoader, DefaultsCatalog, DefaultsOrigin, DefaultsSource, FileSource};
use crate::error::{TrackerError, TrackerResult};
use crate::export::{self, ImportResult};
use crate::migration::{MigrationOutcome, Migrator};
use crate::models::{Backup, BackupId, ConfigEntry, ConfigKey};
use crate::services::{ChapterService, ConfigStore, CurriculumService, DailyService, StudentService};
use crate::storage::Database;

pub const PRE_RESET_BACKUP: &str = "Pre-reset backup";
pub const PRE_CLEAR_BACKUP: &str = "Pre-clear backup";

/// What happened while opening the tracker
#[derive(Debug, Clone, PartialEq)]
pub struct StartupReport {
    pub migration: MigrationOutcome,
    /// Set when the legacy document could not be migrated; startup continued
    pub migration_error: Option<String>,
    pub defaults_origin: DefaultsOrigin,
    pub auto_backup: Option<Backup>,
    pub export_reminder_due: bool,
}

/// An open tracker: the store plus the settings it runs with
pub struct Tracker {
    db: Database,
    settings: Settings,
}

impl Tracker {
    /// Open the tracker reading class defaults from the configured document
    pub fn open(paths: TrackerPaths) -> TrackerResult<(Self, StartupReport)> {
        let settings = Settings::load_or_create(&paths)?;
        let source = FileSource::new(settings.defaults_document_path(&paths));
        Self::open_with(paths, settings, &source, Utc::now())
    }

    pub fn open_with_source(
        paths: TrackerPaths,
        source: &dyn DefaultsSource,
    ) -> TrackerResult<(Self, StartupReport)> {
        let settings = Settings::load_or_create(&paths)?;
        Self::open_with(paths, settings, source, Utc::now())
    }

    /// Run the startup sequence. Only a failure to open the store, or a
    /// storage failure later on, is fatal; a legacy document that cannot be
    /// migrated is reported and skipped.
    pub fn open_with(
        paths: TrackerPaths,
        settings: Settings,
        source: &dyn DefaultsSource,
        now: DateTime<Utc>,
    ) -> TrackerResult<(Self, StartupReport)> {
        let db = Database::open(paths)?;
        let tracker = Self { db, settings };
        let policy = tracker.policy();

        let (migration, migration_error) = match Migrator::new(&tracker.db, policy).run_at(now) {
            Ok(outcome) => (outcome, None),
            Err(TrackerError::Migration(reason)) => {
                tracing::warn!(%reason, "legacy migration skipped");
                (MigrationOutcome::NoLegacyDocument, Some(reason))
            }
            Err(e) => return Err(e),
        };

        let defaults_origin = ClassDefaultsLoader::new(&tracker.db, source).initialize()?;

        let backups = tracker.backups();
        let auto_backup = backups.run_auto_backup_at(now)?;
        let export_reminder_due = backups.check_export_reminder_at(now)?;

        tracing::info!(
            base_dir = %tracker.db.paths().base_dir().display(),
            defaults = %defaults_origin,
            "tracker initialized"
        );

        let report = StartupReport {
            migration,
            migration_error,
            defaults_origin,
            auto_backup,
            export_reminder_due,
        };
        Ok((tracker, report))
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn paths(&self) -> &TrackerPaths {
        self.db.paths()
    }

    pub fn policy(&self) -> BackupPolicy {
        BackupPolicy::from(&self.settings)
    }

    pub fn chapters(&self) -> ChapterService<'_> {
        ChapterService::new(&self.db)
    }

    pub fn config(&self) -> ConfigStore<'_> {
        ConfigStore::new(&self.db)
    }

    pub fn curriculum(&self) -> CurriculumService<'_> {
        CurriculumService::new(&self.db)
    }

    pub fn student(&self) -> StudentService<'_> {
        StudentService::new(&self.db)
    }

    pub fn daily(&self) -> DailyService<'_> {
        DailyService::new(&self.db)
    }

    pub fn backups(&self) -> BackupManager<'_> {
        BackupManager::new(&self.db, self.policy())
    }

    pub fn catalog(&self) -> DefaultsCatalog<'_> {
        DefaultsCatalog::new(&self.db)
    }

    /// Snapshot the store and prune to the retention count
    pub fn create_backup(&self, description: &str) -> TrackerResult<(Backup, Vec<BackupInfo>)> {
        self.backups().create_backup_with_retention(description)
    }

    /// Restore snapshot `id` after taking a safety snapshot
    pub fn restore_backup(&self, id: BackupId) -> TrackerResult<RestoreResult> {
        let result = RestoreManager::new(&self.db, self.policy()).restore_from_backup(id);
        // The safety snapshot is stored even when the restore itself fails
        self.backups().enforce_retention()?;
        result
    }

    pub fn export_json<W: Write>(&self, writer: &mut W) -> TrackerResult<()> {
        export::export_full_json(&self.db, writer, true)
    }

    pub fn export_yaml<W: Write>(&self, writer: &mut W) -> TrackerResult<()> {
        export::export_full_yaml(&self.db, writer)
    }

    /// Export chapters as CSV; returns the row count
    pub fn export_csv<W: Write>(&self, writer: W) -> TrackerResult<usize> {
        export::export_chapters_csv(&self.db, writer, &self.settings.date_format)
    }

    pub fn import_json(&self, json_str: &str) -> TrackerResult<ImportResult> {
        export::import_full_database(&self.db, self.policy(), json_str)
    }

    /// Empty and reload the class templates from the configured document
    pub fn reload_defaults(&self) -> TrackerResult<DefaultsOrigin> {
        let source = FileSource::new(self.settings.defaults_document_path(self.paths()));
        self.reload_defaults_from(&source)
    }

    pub fn reload_defaults_from(&self, source: &dyn DefaultsSource) -> TrackerResult<DefaultsOrigin> {
        ClassDefaultsLoader::new(&self.db, source).reload()
    }

    /// Delete chapters, daily plans and history; profile and lists stay
    pub fn reset_progress(&self) -> TrackerResult<Backup> {
        let (backup, _) = self.create_backup(PRE_RESET_BACKUP)?;

        self.db.chapters.clear()?;
        self.db.daily_tasks.clear()?;
        self.db.daily_history.clear()?;

        tracing::info!(backup = %backup.id, "progress reset");
        Ok(backup)
    }

    /// Delete every chapter and put the lists back to a short starter set
    pub fn clear_all(&self) -> TrackerResult<Backup> {
        let (backup, _) = self.create_backup(PRE_CLEAR_BACKUP)?;

        self.db.chapters.clear()?;
        self.db.config.put_all(starter_lists())?;

        tracing::info!(backup = %backup.id, "all chapters cleared");
        Ok(backup)
    }
}

fn starter_lists() -> Vec<ConfigEntry> {
    let strings = |values: &[&str]| -> Vec<String> { values.iter().map(|s| s.to_string()).collect() };
    vec![
        ConfigEntry::new(ConfigKey::Subjects, strings(&["Maths", "Science"])),
        ConfigEntry::new(
            ConfigKey::LearningMethods,
            ConfigKey::LearningMethods.default_values(),
        ),
        ConfigEntry::new(
            ConfigKey::ExamTypes,
            strings(&["Half Yearly", "Annual", "Unit Test 1"]),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::{ClassLists, DefaultsDocument, InlineSource};
    use crate::models::{Chapter, DefaultChapter, StudentInfo};
    use chrono::{Duration, NaiveDate, TimeZone};
    use std::fs;
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap()
    }

    fn paths(temp_dir: &TempDir) -> TrackerPaths {
        TrackerPaths::with_base_dir(temp_dir.path().to_path_buf())
    }

    fn open_at(temp_dir: &TempDir, at: DateTime<Utc>) -> (Tracker, StartupReport) {
        Tracker::open_with(
            paths(temp_dir),
            Settings::default(),
            &InlineSource::unavailable(),
            at,
        )
        .unwrap()
    }

    #[test]
    fn test_first_start() {
        let temp_dir = TempDir::new().unwrap();
        let (tracker, report) = open_at(&temp_dir, now());

        assert_eq!(report.migration, MigrationOutcome::NoLegacyDocument);
        assert_eq!(report.defaults_origin, DefaultsOrigin::BuiltIn { classes: 4 });
        assert_eq!(report.auto_backup.unwrap().description, "Auto backup");
        assert!(report.export_reminder_due);
        assert_eq!(tracker.db().backups.count().unwrap(), 1);
    }

    #[test]
    fn test_second_start_within_a_day() {
        let temp_dir = TempDir::new().unwrap();
        open_at(&temp_dir, now());
        let (tracker, report) = open_at(&temp_dir, now() + Duration::hours(3));

        assert_eq!(report.defaults_origin, DefaultsOrigin::AlreadyLoaded);
        assert!(report.auto_backup.is_none());
        assert!(!report.export_reminder_due);
        assert_eq!(tracker.db().backups.count().unwrap(), 1);
    }

    #[test]
    fn test_startup_migrates_then_backs_up() {
        let temp_dir = TempDir::new().unwrap();
        let paths = paths(&temp_dir);
        fs::create_dir_all(paths.legacy_dir()).unwrap();
        fs::write(
            paths.legacy_document(),
            r#"{"trackingData": [{"id": 1, "subject": "Maths"}], "subjects": ["Maths"]}"#,
        )
        .unwrap();

        let (tracker, report) = open_at(&temp_dir, now());
        assert!(report.migration.migrated());
        let descriptions: Vec<String> = tracker
            .db()
            .backups
            .get_all()
            .unwrap()
            .into_iter()
            .map(|b| b.description)
            .collect();
        assert_eq!(
            descriptions,
            vec!["Initial migration from localStorage", "Auto backup"]
        );
    }

    #[test]
    fn test_broken_legacy_document_does_not_stop_startup() {
        let temp_dir = TempDir::new().unwrap();
        let paths = paths(&temp_dir);
        fs::create_dir_all(paths.legacy_dir()).unwrap();
        fs::write(paths.legacy_document(), "{{").unwrap();

        let (tracker, report) = open_at(&temp_dir, now());
        assert!(report.migration_error.is_some());
        assert!(!tracker.db().markers().unwrap().migrated);
    }

    #[test]
    fn test_open_fails_on_corrupt_store() {
        let temp_dir = TempDir::new().unwrap();
        let paths = paths(&temp_dir);
        paths.ensure_directories().unwrap();
        fs::write(paths.backups_file(), "not json").unwrap();

        let result = Tracker::open_with(paths, Settings::default(), &InlineSource::unavailable(), now());
        assert!(matches!(result, Err(TrackerError::Initialization(_))));
    }

    #[test]
    fn test_defaults_from_source_seed_class() {
        let temp_dir = TempDir::new().unwrap();
        let mut document = DefaultsDocument::default();
        document.classes.insert(
            "7".into(),
            ClassLists {
                subjects: vec!["Science".into()],
                learning_methods: vec!["School".into()],
                exam_types: vec!["Annual".into()],
            },
        );
        document
            .default_chapters
            .push(DefaultChapter::new("7", "Science", "1", "Nutrition in Plants"));

        let (tracker, report) = Tracker::open_with(
            paths(&temp_dir),
            Settings::default(),
            &InlineSource::new(document),
            now(),
        )
        .unwrap();
        assert_eq!(report.defaults_origin, DefaultsOrigin::Fetched { classes: 1, chapters: 1 });

        tracker.student().update_class("7").unwrap();
        let chapters = tracker.chapters().list().unwrap();
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].chapter_name, "Nutrition in Plants");
    }

    #[test]
    fn test_restore_then_export_matches_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let (tracker, _) = open_at(&temp_dir, now());
        let mut chapter = Chapter::blank(&[]);
        chapter.subject = "Maths".into();
        tracker.db().chapters.insert(chapter).unwrap();
        let (saved, _) = tracker.create_backup("checkpoint").unwrap();

        tracker.chapters().add_chapter().unwrap();
        tracker
            .db()
            .student
            .set(StudentInfo {
                name: "Changed".into(),
                ..StudentInfo::default()
            })
            .unwrap();

        tracker.restore_backup(saved.id).unwrap();

        let mut output = Vec::new();
        tracker.export_json(&mut output).unwrap();
        let exported = export::import_from_json(&String::from_utf8(output).unwrap()).unwrap();
        assert_eq!(exported.data.collections, saved.data);
        assert!(exported
            .data
            .backups
            .iter()
            .any(|b| b.description == "Pre-restore backup"));
    }

    #[test]
    fn test_restore_keeps_safety_backup_with_zero_retention() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings {
            backup_retention: 0,
            ..Settings::default()
        };
        let (tracker, _) = Tracker::open_with(
            paths(&temp_dir),
            settings,
            &InlineSource::unavailable(),
            now(),
        )
        .unwrap();
        let (saved, _) = tracker.create_backup("checkpoint").unwrap();

        let result = tracker.restore_backup(saved.id).unwrap();
        assert!(tracker.backups().get_backup(result.safety_backup).unwrap().is_some());
        assert_eq!(tracker.db().backups.count().unwrap(), 1);
    }

    #[test]
    fn test_restore_unknown_id_still_prunes() {
        let temp_dir = TempDir::new().unwrap();
        let (tracker, _) = open_at(&temp_dir, now());
        for i in 0..9 {
            tracker.create_backup(&format!("b{}", i)).unwrap();
        }
        assert_eq!(tracker.db().backups.count().unwrap(), 10);

        let result = tracker.restore_backup(BackupId::new(999));
        assert!(matches!(result, Err(TrackerError::NotFound { .. })));
        assert_eq!(tracker.db().backups.count().unwrap(), 10);
        assert_eq!(
            tracker.backups().latest_backup().unwrap().unwrap().description,
            "Pre-restore backup"
        );
    }

    #[test]
    fn test_reset_progress_keeps_profile_and_lists() {
        let temp_dir = TempDir::new().unwrap();
        let (tracker, _) = open_at(&temp_dir, now());
        tracker.student().update_name("Asha").unwrap();
        tracker.config().add_item(ConfigKey::Subjects, "Art").unwrap();
        tracker.chapters().add_chapter().unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let task = tracker.daily().add_task("Art", "Sketch", None, Some(date)).unwrap();
        tracker
            .daily()
            .update_task(task.id, crate::models::TaskStatus::Done, "")
            .unwrap();

        let backup = tracker.reset_progress().unwrap();
        assert_eq!(backup.description, PRE_RESET_BACKUP);
        assert_eq!(backup.data.tracking_data.len(), 1);

        let db = tracker.db();
        assert_eq!(db.chapters.count().unwrap(), 0);
        assert_eq!(db.daily_tasks.count().unwrap(), 0);
        assert_eq!(db.daily_history.count().unwrap(), 0);
        assert_eq!(tracker.student().profile().unwrap().name, "Asha");
        assert!(tracker.config().get(ConfigKey::Subjects).unwrap().contains(&"Art".to_string()));
    }

    #[test]
    fn test_clear_all_resets_lists() {
        let temp_dir = TempDir::new().unwrap();
        let (tracker, _) = open_at(&temp_dir, now());
        tracker.chapters().add_chapter().unwrap();

        let backup = tracker.clear_all().unwrap();
        assert_eq!(backup.description, PRE_CLEAR_BACKUP);
        assert_eq!(tracker.db().chapters.count().unwrap(), 0);

        let config = tracker.config();
        assert_eq!(config.get(ConfigKey::Subjects).unwrap(), vec!["Maths", "Science"]);
        assert_eq!(config.get(ConfigKey::LearningMethods).unwrap().len(), 4);
        assert_eq!(
            config.get(ConfigKey::ExamTypes).unwrap(),
            vec!["Half Yearly", "Annual", "Unit Test 1"]
        );
    }
}
