//! Configuration Store
//!
//! Subjects, learning methods and exam types. A list that was never stored
//! reads as its built-in default; updates replace the whole list at once.

use crate::error::TrackerResult;
use crate::models::{ConfigEntry, ConfigKey};
use crate::storage::Database;

/// Result of adding an item to a list.
///
/// Rejections are ordinary outcomes rather than errors; callers check the
/// variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    /// The trimmed value is already in the list (case-sensitive)
    AlreadyExists,
    /// The value is empty after trimming
    Invalid,
}

impl AddOutcome {
    pub fn is_added(self) -> bool {
        self == AddOutcome::Added
    }
}

/// Service for the three named lists
pub struct ConfigStore<'a> {
    db: &'a Database,
}

impl<'a> ConfigStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// The stored list, or the built-in default if the key was never stored
    pub fn get(&self, key: ConfigKey) -> TrackerResult<Vec<String>> {
        Ok(self
            .db
            .config
            .get(&key)?
            .map(|entry| entry.values)
            .unwrap_or_else(|| key.default_values()))
    }

    /// Whether the list has been stored at least once
    pub fn is_initialized(&self, key: ConfigKey) -> TrackerResult<bool> {
        Ok(self.db.config.get(&key)?.is_some())
    }

    /// Replace the whole list
    pub fn update(&self, key: ConfigKey, values: Vec<String>) -> TrackerResult<()> {
        self.db.config.put(ConfigEntry::new(key, values))
    }

    /// Append a trimmed value unless it is empty or already present
    pub fn add_item(&self, key: ConfigKey, value: &str) -> TrackerResult<AddOutcome> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(AddOutcome::Invalid);
        }

        let mut values = self.get(key)?;
        if values.iter().any(|v| v == value) {
            return Ok(AddOutcome::AlreadyExists);
        }

        values.push(value.to_string());
        self.update(key, values)?;
        tracing::debug!(list = %key, value, "list item added");
        Ok(AddOutcome::Added)
    }

    /// Remove an exact value; returns false when it is not in the list
    pub fn remove_item(&self, key: ConfigKey, value: &str) -> TrackerResult<bool> {
        let mut values = self.get(key)?;
        let Some(index) = values.iter().position(|v| v == value) else {
            return Ok(false);
        };

        values.remove(index);
        self.update(key, values)?;
        Ok(true)
    }

    /// Learning methods, the keys every chapter's status map mirrors
    pub fn learning_methods(&self) -> TrackerResult<Vec<String>> {
        self.get(ConfigKey::LearningMethods)
    }
}
