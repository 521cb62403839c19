//! Class-Defaults Loader
//!
//! Class defaults are loaded once, on the first start with an empty
//! class-defaults table: from the defaults document when it can be read,
//! otherwise from the built-in table. A forced reload empties both template
//! collections and reads the document again with no fallback.

mod builtin;
mod source;

pub use builtin::builtin_class_defaults;
pub use source::{ClassLists, DefaultsDocument, DefaultsSource, FileSource, InlineSource};

use std::fmt;

use crate::audit::EntityType;
use crate::error::{TrackerError, TrackerResult};
use crate::models::{ClassDefaults, DefaultChapter, DefaultChapterId};
use crate::storage::Database;

/// Where the class defaults in the store came from on this call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultsOrigin {
    /// The table already had entries; nothing was loaded
    AlreadyLoaded,
    /// Loaded from the defaults document
    Fetched { classes: usize, chapters: usize },
    /// The document could not be read; the built-in table was used
    BuiltIn { classes: usize },
}

impl fmt::Display for DefaultsOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultsOrigin::AlreadyLoaded => write!(f, "already loaded"),
            DefaultsOrigin::Fetched { classes, chapters } => write!(
                f,
                "loaded {} classes and {} template chapters from the defaults document",
                classes, chapters
            ),
            DefaultsOrigin::BuiltIn { classes } => {
                write!(f, "loaded {} classes from built-in defaults", classes)
            }
        }
    }
}

/// Loads class templates into the store
pub struct ClassDefaultsLoader<'a> {
    db: &'a Database,
    source: &'a dyn DefaultsSource,
}

impl<'a> ClassDefaultsLoader<'a> {
    pub fn new(db: &'a Database, source: &'a dyn DefaultsSource) -> Self {
        Self { db, source }
    }

    /// Populate the templates if the class-defaults table is empty.
    ///
    /// A fetch failure is not an error here: the built-in table is used.
    pub fn initialize(&self) -> TrackerResult<DefaultsOrigin> {
        if !self.db.class_defaults.is_empty()? {
            tracing::debug!("class defaults already loaded");
            return Ok(DefaultsOrigin::AlreadyLoaded);
        }

        match self.source.fetch() {
            Ok(document) => self.store(document),
            Err(e) => {
                tracing::warn!(source = %self.source.describe(), error = %e, "using built-in class defaults");
                let defaults = builtin_class_defaults();
                let classes = defaults.len();
                self.db.class_defaults.put_all(defaults)?;
                Ok(DefaultsOrigin::BuiltIn { classes })
            }
        }
    }

    /// Empty both template collections and load the document again.
    ///
    /// On a fetch failure the collections stay empty and the error is returned.
    pub fn reload(&self) -> TrackerResult<DefaultsOrigin> {
        self.db.class_defaults.clear()?;
        self.db.default_chapters.clear()?;

        let document = self.source.fetch().map_err(|e| {
            tracing::error!(source = %self.source.describe(), error = %e, "failed to reload defaults");
            e
        })?;
        self.store(document)
    }

    fn store(&self, document: DefaultsDocument) -> TrackerResult<DefaultsOrigin> {
        let defaults = document.class_defaults();
        let classes = defaults.len();
        self.db.class_defaults.put_all(defaults)?;

        let templates: Vec<DefaultChapter> = document
            .default_chapters
            .into_iter()
            .map(|mut template| {
                template.id = DefaultChapterId::UNASSIGNED;
                template
            })
            .collect();
        let chapters = self.db.default_chapters.insert_all(templates)?.len();

        tracing::info!(source = %self.source.describe(), classes, chapters, "class defaults loaded");
        Ok(DefaultsOrigin::Fetched { classes, chapters })
    }
}

/// Read and admin access to the stored templates
pub struct DefaultsCatalog<'a> {
    db: &'a Database,
}

impl<'a> DefaultsCatalog<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn class_defaults(&self, class_name: &str) -> TrackerResult<Option<ClassDefaults>> {
        self.db.class_defaults.get(&class_name.to_string())
    }

    pub fn all_classes(&self) -> TrackerResult<Vec<ClassDefaults>> {
        self.db.class_defaults.get_all()
    }

    pub fn default_chapters_for(&self, class_name: &str) -> TrackerResult<Vec<DefaultChapter>> {
        self.db
            .default_chapters
            .find(|t| t.class_name == class_name)
    }

    pub fn add_default_chapter(&self, template: DefaultChapter) -> TrackerResult<DefaultChapter> {
        if template.class_name.trim().is_empty() {
            return Err(TrackerError::Validation(
                "Template chapter needs a class".into(),
            ));
        }

        let stored = self.db.default_chapters.insert(template)?;
        self.db.log_create(
            EntityType::DefaultChapter,
            stored.id.to_string(),
            Some(format!("Class {} {} - Ch {}", stored.class_name, stored.subject, stored.chapter_no)),
            &stored,
        )?;
        Ok(stored)
    }

    /// Delete a template; false when the id is unknown
    pub fn delete_default_chapter(&self, id: DefaultChapterId) -> TrackerResult<bool> {
        let Some(template) = self.db.default_chapters.get(id)? else {
            return Ok(false);
        };

        self.db.default_chapters.delete(id)?;
        self.db.log_delete(EntityType::DefaultChapter, id.to_string(), None, &template)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackerPaths;
    use tempfile::TempDir;

    fn create_test_db() -> (TempDir, Database) {
        let temp_dir = TempDir::new().unwrap();
        let paths = TrackerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let db = Database::open(paths).unwrap();
        (temp_dir, db)
    }

    fn document() -> DefaultsDocument {
        let mut document = DefaultsDocument::default();
        document.classes.insert(
            "10".into(),
            ClassLists {
                subjects: vec!["Physics".into(), "Chemistry".into()],
                learning_methods: vec!["School".into()],
                exam_types: vec!["Board Exam".into()],
            },
        );
        document
            .default_chapters
            .push(DefaultChapter::new("10", "Physics", "1", "Light"));
        document
    }

    #[test]
    fn test_initialize_from_document() {
        let (_temp, db) = create_test_db();
        let source = InlineSource::new(document());

        let origin = ClassDefaultsLoader::new(&db, &source).initialize().unwrap();
        assert_eq!(origin, DefaultsOrigin::Fetched { classes: 1, chapters: 1 });
        assert_eq!(
            DefaultsCatalog::new(&db).default_chapters_for("10").unwrap()[0].chapter_name,
            "Light"
        );
    }

    #[test]
    fn test_initialize_falls_back_without_chapters() {
        let (_temp, db) = create_test_db();
        let source = InlineSource::unavailable();

        let origin = ClassDefaultsLoader::new(&db, &source).initialize().unwrap();
        assert_eq!(origin, DefaultsOrigin::BuiltIn { classes: 4 });
        assert_eq!(db.default_chapters.count().unwrap(), 0);
        assert!(DefaultsCatalog::new(&db).class_defaults("9").unwrap().is_some());
    }

    #[test]
    fn test_initialize_runs_once() {
        let (_temp, db) = create_test_db();
        let unavailable = InlineSource::unavailable();
        ClassDefaultsLoader::new(&db, &unavailable).initialize().unwrap();

        let available = InlineSource::new(document());
        let origin = ClassDefaultsLoader::new(&db, &available).initialize().unwrap();
        assert_eq!(origin, DefaultsOrigin::AlreadyLoaded);
        assert!(DefaultsCatalog::new(&db).class_defaults("10").unwrap().is_none());
    }

    #[test]
    fn test_reload_replaces_templates() {
        let (_temp, db) = create_test_db();
        let unavailable = InlineSource::unavailable();
        ClassDefaultsLoader::new(&db, &unavailable).initialize().unwrap();

        let available = InlineSource::new(document());
        ClassDefaultsLoader::new(&db, &available).reload().unwrap();
        assert_eq!(db.class_defaults.count().unwrap(), 1);
    }

    #[test]
    fn test_failed_reload_leaves_collections_empty() {
        let (_temp, db) = create_test_db();
        let available = InlineSource::new(document());
        ClassDefaultsLoader::new(&db, &available).initialize().unwrap();

        let unavailable = InlineSource::unavailable();
        let err = ClassDefaultsLoader::new(&db, &unavailable).reload().unwrap_err();
        assert!(matches!(err, TrackerError::Fetch(_)));
        assert!(db.class_defaults.is_empty().unwrap());
        assert_eq!(db.default_chapters.count().unwrap(), 0);
    }

    #[test]
    fn test_catalog_add_and_delete() {
        let (_temp, db) = create_test_db();
        let catalog = DefaultsCatalog::new(&db);

        let stored = catalog
            .add_default_chapter(DefaultChapter::new("7", "Science", "2", "Nutrition in Animals"))
            .unwrap();
        assert_eq!(catalog.default_chapters_for("7").unwrap().len(), 1);
        assert!(catalog.delete_default_chapter(stored.id).unwrap());
        assert!(!catalog.delete_default_chapter(stored.id).unwrap());

        let err = catalog
            .add_default_chapter(DefaultChapter::new(" ", "Science", "2", "x"))
            .unwrap_err();
        assert!(err.is_validation());
    }
}
