//! Tables keyed by a natural key
//!
//! Configuration lists are keyed by list name, class templates by class and
//! history entries by date. Writing a record whose key already exists
//! replaces it.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{TrackerError, TrackerResult};
use crate::models::{ClassDefaults, ConfigEntry, ConfigKey, DailyHistoryEntry};

use super::file_io::{read_json, stage_json, write_json_atomic, StagedFile};

/// A record identified by one of its own fields
pub trait Keyed: Clone + Serialize + DeserializeOwned {
    type Key: Ord + Clone + fmt::Display;

    fn key(&self) -> Self::Key;
}

impl Keyed for ConfigEntry {
    type Key = ConfigKey;

    fn key(&self) -> ConfigKey {
        self.key
    }
}

impl Keyed for ClassDefaults {
    type Key = String;

    fn key(&self) -> String {
        self.class_name.clone()
    }
}

impl Keyed for DailyHistoryEntry {
    type Key = NaiveDate;

    fn key(&self) -> NaiveDate {
        self.date
    }
}

/// A replacement for a keyed table, written to disk but not yet live
pub struct StagedKeyed<T: Keyed> {
    records: BTreeMap<T::Key, T>,
    file: StagedFile,
}

/// Repository for one naturally keyed collection
pub struct KeyedTable<T: Keyed> {
    path: PathBuf,
    records: RwLock<BTreeMap<T::Key, T>>,
}

impl<T: Keyed> KeyedTable<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            records: RwLock::new(BTreeMap::new()),
        }
    }

    fn read(&self) -> TrackerResult<RwLockReadGuard<'_, BTreeMap<T::Key, T>>> {
        self.records
            .read()
            .map_err(|e| TrackerError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> TrackerResult<RwLockWriteGuard<'_, BTreeMap<T::Key, T>>> {
        self.records
            .write()
            .map_err(|e| TrackerError::Storage(format!("Failed to acquire write lock: {}", e)))
    }

    fn persist(&self, records: &BTreeMap<T::Key, T>) -> TrackerResult<()> {
        let list: Vec<&T> = records.values().collect();
        write_json_atomic(&self.path, &list)
    }

    pub fn load(&self) -> TrackerResult<()> {
        let list: Vec<T> = read_json(&self.path)?;
        *self.write()? = list.into_iter().map(|r| (r.key(), r)).collect();
        Ok(())
    }

    pub fn save(&self) -> TrackerResult<()> {
        let records = self.read()?;
        self.persist(&records)
    }

    pub fn get(&self, key: &T::Key) -> TrackerResult<Option<T>> {
        Ok(self.read()?.get(key).cloned())
    }

    /// All records in key order
    pub fn get_all(&self) -> TrackerResult<Vec<T>> {
        Ok(self.read()?.values().cloned().collect())
    }

    /// Insert or replace by key
    pub fn put(&self, record: T) -> TrackerResult<()> {
        self.put_all(vec![record])
    }

    /// Insert or replace several records with a single write
    pub fn put_all(&self, batch: Vec<T>) -> TrackerResult<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let mut records = self.write()?;
        let mut next = records.clone();
        for record in batch {
            next.insert(record.key(), record);
        }
        self.persist(&next)?;
        *records = next;
        Ok(())
    }

    /// Delete by key; returns false when the key is unknown
    pub fn delete(&self, key: &T::Key) -> TrackerResult<bool> {
        let mut records = self.write()?;
        if !records.contains_key(key) {
            return Ok(false);
        }
        let mut next = records.clone();
        next.remove(key);
        self.persist(&next)?;
        *records = next;
        Ok(true)
    }

    pub fn clear(&self) -> TrackerResult<()> {
        let mut records = self.write()?;
        let next = BTreeMap::new();
        self.persist(&next)?;
        *records = next;
        Ok(())
    }

    pub fn count(&self) -> TrackerResult<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> TrackerResult<bool> {
        Ok(self.read()?.is_empty())
    }

    /// Build and write a full replacement without touching the live table
    pub fn stage_replace(&self, list: Vec<T>) -> TrackerResult<StagedKeyed<T>> {
        let records: BTreeMap<T::Key, T> = list.into_iter().map(|r| (r.key(), r)).collect();
        let flat: Vec<&T> = records.values().collect();
        let file = stage_json(&self.path, &flat)?;
        Ok(StagedKeyed { records, file })
    }

    pub fn commit_replace(&self, staged: StagedKeyed<T>) -> TrackerResult<()> {
        let mut records = self.write()?;
        staged.file.commit()?;
        *records = staged.records;
        Ok(())
    }
}
