use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{remove_from, update_in, upsert, Record, Repository};
use crate::util::write_atomic;
use crate::{aflog_debug, Result};

/// Repository persisted as a pretty-printed JSON array.
///
/// The file is read once on open. A mutation is applied to a copy of the
/// records, written through `write_atomic` while the lock is held, and only
/// then swapped in, so a failed write leaves both file and memory as they were.
pub struct JsonFileRepository<T> {
    path: PathBuf,
    records: Mutex<Vec<T>>,
}

impl<T> JsonFileRepository<T>
where
    T: Record + Serialize + DeserializeOwned,
{
    /// Open an existing collection. A missing file is an empty collection.
    pub fn open(path: &Path) -> Result<Self> {
        let records = if path.exists() {
            let contents = fs::read_to_string(path)?;
            let records: Vec<T> = serde_json::from_str(&contents)?;
            aflog_debug!(
                "JsonFileRepository::open path={} records={}",
                path.display(),
                records.len()
            );
            records
        } else {
            aflog_debug!(
                "JsonFileRepository::open path={} (new collection)",
                path.display()
            );
            Vec::new()
        };
        Ok(Self {
            path: path.to_path_buf(),
            records: Mutex::new(records),
        })
    }

    /// Create (or overwrite) a collection with the given records.
    pub fn create(path: &Path, records: Vec<T>) -> Result<Self> {
        write_atomic(path, &serde_json::to_string_pretty(&records)?)?;
        Ok(Self {
            path: path.to_path_buf(),
            records: Mutex::new(records),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Vec<T>> {
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn persist(&self, records: &[T]) -> Result<()> {
        write_atomic(&self.path, &serde_json::to_string_pretty(records)?)?;
        aflog_debug!(
            "Saved {} {} records to {}",
            records.len(),
            T::KIND,
            self.path.display()
        );
        Ok(())
    }
}

impl<T> Repository<T> for JsonFileRepository<T>
where
    T: Record + Serialize + DeserializeOwned,
{
    fn get(&self, id: &T::Id) -> Result<Option<T>> {
        Ok(self.lock().iter().find(|r| r.id() == id).cloned())
    }

    fn list(&self) -> Result<Vec<T>> {
        Ok(self.lock().clone())
    }

    fn save(&self, record: T) -> Result<()> {
        let mut records = self.lock();
        let mut next = records.clone();
        upsert(&mut next, record);
        self.persist(&next)?;
        *records = next;
        Ok(())
    }

    fn save_all(&self, batch: Vec<T>) -> Result<()> {
        let mut records = self.lock();
        let mut next = records.clone();
        for record in batch {
            upsert(&mut next, record);
        }
        self.persist(&next)?;
        *records = next;
        Ok(())
    }

    fn update(&self, id: &T::Id, f: &mut dyn FnMut(&mut T)) -> Result<T> {
        let mut records = self.lock();
        let mut next = records.clone();
        let updated = update_in(&mut next, id, f)?;
        self.persist(&next)?;
        *records = next;
        Ok(updated)
    }

    fn delete(&self, id: &T::Id) -> Result<bool> {
        let mut records = self.lock();
        let mut next = records.clone();
        if !remove_from(&mut next, id) {
            return Ok(false);
        }
        self.persist(&next)?;
        *records = next;
        Ok(true)
    }
}
