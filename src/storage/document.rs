//! Single-record documents (the student profile, store markers)

use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{TrackerError, TrackerResult};

use super::file_io::{read_json, stage_json, write_json_atomic, StagedFile};

/// A document written to disk but not yet live
pub struct StagedDocument<T> {
    value: Option<T>,
    file: StagedFile,
}

/// A file holding zero or one record
pub struct Document<T> {
    path: PathBuf,
    value: RwLock<Option<T>>,
}

impl<T: Clone + Serialize + DeserializeOwned> Document<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            value: RwLock::new(None),
        }
    }

    fn read(&self) -> TrackerResult<RwLockReadGuard<'_, Option<T>>> {
        self.value
            .read()
            .map_err(|e| TrackerError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> TrackerResult<RwLockWriteGuard<'_, Option<T>>> {
        self.value
            .write()
            .map_err(|e| TrackerError::Storage(format!("Failed to acquire write lock: {}", e)))
    }

    pub fn load(&self) -> TrackerResult<()> {
        let loaded: Option<T> = read_json(&self.path)?;
        *self.write()? = loaded;
        Ok(())
    }

    pub fn get(&self) -> TrackerResult<Option<T>> {
        Ok(self.read()?.clone())
    }

    pub fn set(&self, value: T) -> TrackerResult<()> {
        let mut current = self.write()?;
        let next = Some(value);
        write_json_atomic(&self.path, &next)?;
        *current = next;
        Ok(())
    }

    /// Modify the stored value, starting from `T::default()` when absent
    pub fn update(&self, f: impl FnOnce(&mut T)) -> TrackerResult<T>
    where
        T: Default,
    {
        let mut current = self.write()?;
        let mut next = current.clone().unwrap_or_default();
        f(&mut next);
        write_json_atomic(&self.path, &Some(&next))?;
        *current = Some(next.clone());
        Ok(next)
    }

    pub fn clear(&self) -> TrackerResult<()> {
        let mut current = self.write()?;
        write_json_atomic(&self.path, &Option::<T>::None)?;
        *current = None;
        Ok(())
    }

    pub fn stage_replace(&self, value: Option<T>) -> TrackerResult<StagedDocument<T>> {
        let file = stage_json(&self.path, &value)?;
        Ok(StagedDocument { value, file })
    }

    pub fn commit_replace(&self, staged: StagedDocument<T>) -> TrackerResult<()> {
        let mut current = self.write()?;
        staged.file.commit()?;
        *current = staged.value;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StudentInfo;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let doc: Document<StudentInfo> = Document::new(temp_dir.path().join("student.json"));
        doc.load().unwrap();
        assert!(doc.get().unwrap().is_none());
    }

    #[test]
    fn test_update_starts_from_default_and_persists() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("student.json");
        let doc: Document<StudentInfo> = Document::new(path.clone());

        let info = doc.update(|i| i.name = "Asha".into()).unwrap();
        assert_eq!(info.review_date.to_string(), "2026-01-14");

        let reloaded: Document<StudentInfo> = Document::new(path);
        reloaded.load().unwrap();
        assert_eq!(reloaded.get().unwrap().unwrap().name, "Asha");
    }

    #[test]
    fn test_clear() {
        let temp_dir = TempDir::new().unwrap();
        let doc: Document<StudentInfo> = Document::new(temp_dir.path().join("student.json"));
        doc.set(StudentInfo::default()).unwrap();
        doc.clear().unwrap();
        assert!(doc.get().unwrap().is_none());
    }
}
