//! Generic record table with store-assigned integer ids
//!
//! Each table lives in one JSON file holding its records and the next id to
//! hand out. Every mutating call persists before it returns; the in-memory
//! copy only changes once the write has succeeded.

use std::collections::BTreeMap;
use std::ops::RangeBounds;
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::{TrackerError, TrackerResult};
use crate::models::{
    Backup, BackupId, Chapter, ChapterId, DailyTask, DefaultChapter, DefaultChapterId, RecordId,
    TaskId,
};

use super::file_io::{read_json, stage_json, write_json_atomic, StagedFile};

/// A record stored in a [`Table`]
pub trait Record: Clone + Serialize + DeserializeOwned {
    type Id: RecordId;

    /// Entity name used in messages
    const ENTITY: &'static str;

    fn id(&self) -> Self::Id;
    fn set_id(&mut self, id: Self::Id);
}

macro_rules! impl_record {
    ($record:ty, $id:ty, $entity:literal) => {
        impl Record for $record {
            type Id = $id;
            const ENTITY: &'static str = $entity;

            fn id(&self) -> $id {
                self.id
            }

            fn set_id(&mut self, id: $id) {
                self.id = id;
            }
        }
    };
}

impl_record!(Chapter, ChapterId, "Chapter");
impl_record!(DailyTask, TaskId, "Task");
impl_record!(Backup, BackupId, "Backup");
impl_record!(DefaultChapter, DefaultChapterId, "Default chapter");

/// On-disk layout of a table
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: DeserializeOwned"))]
struct TableFile<T> {
    #[serde(default)]
    next_id: u64,
    #[serde(default)]
    records: Vec<T>,
}

impl<T> Default for TableFile<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            records: Vec::new(),
        }
    }
}

/// In-memory contents of a table
#[derive(Debug, Clone)]
pub struct TableState<T> {
    next_id: u64,
    records: BTreeMap<u64, T>,
}

impl<T> Default for TableState<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            records: BTreeMap::new(),
        }
    }
}

impl<T: Record> TableState<T> {
    fn from_records(records: Vec<T>, next_id: u64) -> TrackerResult<Self> {
        let mut state = Self {
            next_id: next_id.max(1),
            records: BTreeMap::new(),
        };
        for record in records {
            state.put(record)?;
        }
        Ok(state)
    }

    fn assign(&mut self, mut record: T) -> T {
        let id = self.next_id;
        self.next_id += 1;
        record.set_id(T::Id::from_raw(id));
        self.records.insert(id, record.clone());
        record
    }

    /// Insert keeping an already assigned id; unassigned records get a fresh one
    fn put(&mut self, record: T) -> TrackerResult<T> {
        let raw = record.id().raw();
        if raw == 0 {
            return Ok(self.assign(record));
        }
        if self.records.contains_key(&raw) {
            return Err(TrackerError::Validation(format!(
                "Duplicate {} id {}",
                T::ENTITY,
                record.id()
            )));
        }
        self.next_id = self.next_id.max(raw + 1);
        self.records.insert(raw, record.clone());
        Ok(record)
    }

    fn to_file(&self) -> TableFile<&T> {
        TableFile {
            next_id: self.next_id,
            records: self.records.values().collect(),
        }
    }
}

/// Outcome of a bulk update across a table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkUpdateReport {
    /// Records the mutation changed (and that were persisted)
    pub updated: usize,
    /// Records left as they were
    pub unchanged: usize,
}

/// A replacement for a table's contents, written to disk but not yet live
pub struct StagedTable<T> {
    state: TableState<T>,
    file: StagedFile,
}

/// Repository for one auto-id collection
pub struct Table<T> {
    path: PathBuf,
    state: RwLock<TableState<T>>,
}

impl<T: Record> Table<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            state: RwLock::new(TableState::default()),
        }
    }

    fn read(&self) -> TrackerResult<RwLockReadGuard<'_, TableState<T>>> {
        self.state
            .read()
            .map_err(|e| TrackerError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> TrackerResult<RwLockWriteGuard<'_, TableState<T>>> {
        self.state
            .write()
            .map_err(|e| TrackerError::Storage(format!("Failed to acquire write lock: {}", e)))
    }

    /// Apply `f` to a copy of the state; persist and swap it in if `f` reports a change
    fn mutate<R>(&self, f: impl FnOnce(&mut TableState<T>) -> TrackerResult<(R, bool)>) -> TrackerResult<R> {
        let mut state = self.write()?;
        let mut next = state.clone();
        let (out, changed) = f(&mut next)?;
        if changed {
            write_json_atomic(&self.path, &next.to_file())?;
            *state = next;
        }
        Ok(out)
    }

    /// Load records from disk
    pub fn load(&self) -> TrackerResult<()> {
        let file: TableFile<T> = read_json(&self.path)?;
        let loaded = TableState::from_records(file.records, file.next_id)?;
        *self.write()? = loaded;
        Ok(())
    }

    /// Write the current contents to disk
    pub fn save(&self) -> TrackerResult<()> {
        let state = self.read()?;
        write_json_atomic(&self.path, &state.to_file())
    }

    /// Insert a record under a fresh id and return the stored copy
    pub fn insert(&self, record: T) -> TrackerResult<T> {
        self.mutate(|state| Ok((state.assign(record), true)))
    }

    /// Insert many records under fresh ids with a single write
    pub fn insert_all(&self, records: Vec<T>) -> TrackerResult<Vec<T>> {
        self.mutate(|state| {
            let changed = !records.is_empty();
            let stored = records.into_iter().map(|r| state.assign(r)).collect();
            Ok((stored, changed))
        })
    }

    /// Store records keeping their ids (fresh ids for unassigned ones)
    pub fn put_all(&self, records: Vec<T>) -> TrackerResult<usize> {
        self.mutate(|state| {
            let count = records.len();
            for record in records {
                state.put(record)?;
            }
            Ok((count, count > 0))
        })
    }

    /// Store records keeping each id that is still free; records whose id is
    /// taken (or unassigned) get a fresh one
    pub fn merge_all(&self, records: Vec<T>) -> TrackerResult<Vec<T>> {
        self.mutate(|state| {
            let changed = !records.is_empty();
            let mut stored = Vec::with_capacity(records.len());
            for record in records {
                let raw = record.id().raw();
                if raw == 0 || state.records.contains_key(&raw) {
                    stored.push(state.assign(record));
                } else {
                    stored.push(state.put(record)?);
                }
            }
            Ok((stored, changed))
        })
    }

    pub fn get(&self, id: T::Id) -> TrackerResult<Option<T>> {
        Ok(self.read()?.records.get(&id.raw()).cloned())
    }

    /// All records in id order
    pub fn get_all(&self) -> TrackerResult<Vec<T>> {
        Ok(self.read()?.records.values().cloned().collect())
    }

    /// Records matching a predicate, in id order
    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> TrackerResult<Vec<T>> {
        Ok(self
            .read()?
            .records
            .values()
            .filter(|r| predicate(r))
            .cloned()
            .collect())
    }

    /// Records whose key falls in `range`, sorted by key then id.
    ///
    /// Equality is the range `k..=k`.
    pub fn range_by<K, F, B>(&self, key: F, range: B) -> TrackerResult<Vec<T>>
    where
        K: Ord,
        F: Fn(&T) -> K,
        B: RangeBounds<K>,
    {
        let mut hits: Vec<(K, T)> = self
            .read()?
            .records
            .values()
            .filter_map(|r| {
                let k = key(r);
                range.contains(&k).then(|| (k, r.clone()))
            })
            .collect();
        hits.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(hits.into_iter().map(|(_, r)| r).collect())
    }

    /// Merge changes into one record. Unknown ids are a silent no-op (`None`).
    pub fn update(&self, id: T::Id, f: impl FnOnce(&mut T)) -> TrackerResult<Option<T>> {
        self.mutate(|state| match state.records.get_mut(&id.raw()) {
            Some(record) => {
                f(record);
                record.set_id(id);
                Ok((Some(record.clone()), true))
            }
            None => Ok((None, false)),
        })
    }

    /// Apply `f` to every record in one persisted write.
    ///
    /// `f` returns whether it changed the record.
    pub fn update_all(&self, mut f: impl FnMut(&mut T) -> bool) -> TrackerResult<BulkUpdateReport> {
        self.mutate(|state| {
            let mut report = BulkUpdateReport::default();
            for record in state.records.values_mut() {
                if f(record) {
                    report.updated += 1;
                } else {
                    report.unchanged += 1;
                }
            }
            let changed = report.updated > 0;
            Ok((report, changed))
        })
    }

    /// Delete by id; returns false for unknown ids
    pub fn delete(&self, id: T::Id) -> TrackerResult<bool> {
        self.mutate(|state| {
            let removed = state.records.remove(&id.raw()).is_some();
            Ok((removed, removed))
        })
    }

    /// Delete every record matching `predicate` and return them
    pub fn delete_where(&self, predicate: impl Fn(&T) -> bool) -> TrackerResult<Vec<T>> {
        self.mutate(|state| {
            let doomed: Vec<u64> = state
                .records
                .iter()
                .filter(|(_, r)| predicate(r))
                .map(|(id, _)| *id)
                .collect();
            let removed: Vec<T> = doomed
                .iter()
                .filter_map(|id| state.records.remove(id))
                .collect();
            let changed = !removed.is_empty();
            Ok((removed, changed))
        })
    }

    /// Remove every record. Ids already handed out are not reused.
    pub fn clear(&self) -> TrackerResult<()> {
        self.mutate(|state| {
            state.records.clear();
            Ok(((), true))
        })
    }

    pub fn count(&self) -> TrackerResult<usize> {
        Ok(self.read()?.records.len())
    }

    pub fn exists(&self, id: T::Id) -> TrackerResult<bool> {
        Ok(self.read()?.records.contains_key(&id.raw()))
    }

    /// Build and write a full replacement without touching the live table
    pub fn stage_replace(&self, records: Vec<T>) -> TrackerResult<StagedTable<T>> {
        let next_id = self.read()?.next_id;
        let state = TableState::from_records(records, next_id)?;
        let file = stage_json(&self.path, &state.to_file())?;
        Ok(StagedTable { state, file })
    }

    /// Swap a staged replacement in
    pub fn commit_replace(&self, staged: StagedTable<T>) -> TrackerResult<()> {
        let mut state = self.write()?;
        staged.file.commit()?;
        *state = staged.state;
        Ok(())
    }
}
