use std::sync::{Mutex, MutexGuard};

use super::{remove_from, update_in, upsert, Record, Repository};
use crate::Result;

/// In-memory repository. Not durable, but good for tests and `--memory` runs.
pub struct MemoryRepository<T> {
    records: Mutex<Vec<T>>,
}

impl<T: Record> MemoryRepository<T> {
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    pub fn with_records(records: Vec<T>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<T>> {
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<T: Record> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> Repository<T> for MemoryRepository<T> {
    fn get(&self, id: &T::Id) -> Result<Option<T>> {
        Ok(self.lock().iter().find(|r| r.id() == id).cloned())
    }

    fn list(&self) -> Result<Vec<T>> {
        Ok(self.lock().clone())
    }

    fn save(&self, record: T) -> Result<()> {
        upsert(&mut self.lock(), record);
        Ok(())
    }

    fn save_all(&self, records: Vec<T>) -> Result<()> {
        let mut stored = self.lock();
        for record in records {
            upsert(&mut stored, record);
        }
        Ok(())
    }

    fn update(&self, id: &T::Id, f: &mut dyn FnMut(&mut T)) -> Result<T> {
        update_in(&mut self.lock(), id, f)
    }

    fn delete(&self, id: &T::Id) -> Result<bool> {
        Ok(remove_from(&mut self.lock(), id))
    }
}
