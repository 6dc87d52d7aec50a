//! Record storage.
//!
//! Every collection (tasks, notes, projects, users) sits behind the same
//! `Repository` trait. `MemoryRepository` backs tests and throwaway sessions;
//! `JsonFileRepository` writes each collection to its own JSON file.
//! `Workspace` bundles one repository per collection.

mod json;
mod memory;
pub mod seed;

pub use json::JsonFileRepository;
pub use memory::MemoryRepository;

use std::fmt::Display;
use std::hash::Hash;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::core::{Note, Project, Task, User};
use crate::{aflog, aflog_debug, Result};

/// Anything a repository can hold.
pub trait Record: Clone + Send + Sync + 'static {
    type Id: Clone + Eq + Hash + Display + Send + Sync;

    /// Name used in `NotFound` errors.
    const KIND: &'static str;

    fn id(&self) -> &Self::Id;
}

/// Keyed storage for one kind of record.
///
/// `list` preserves insertion order. `save` is an upsert: an existing record
/// with the same id is replaced in place, otherwise the record is appended.
pub trait Repository<T: Record>: Send + Sync {
    fn get(&self, id: &T::Id) -> Result<Option<T>>;

    fn list(&self) -> Result<Vec<T>>;

    fn save(&self, record: T) -> Result<()>;

    /// Upsert every record as one change. Either all of them are stored or,
    /// on error, none are.
    fn save_all(&self, records: Vec<T>) -> Result<()>;

    /// Apply `f` to the stored record and return the updated copy.
    ///
    /// # Errors
    /// `Error::NotFound` if no record has this id.
    fn update(&self, id: &T::Id, f: &mut dyn FnMut(&mut T)) -> Result<T>;

    /// Remove a record. Returns whether anything was removed.
    fn delete(&self, id: &T::Id) -> Result<bool>;
}

pub(crate) fn upsert<T: Record>(records: &mut Vec<T>, record: T) {
    match records.iter_mut().find(|r| r.id() == record.id()) {
        Some(slot) => *slot = record,
        None => records.push(record),
    }
}

pub(crate) fn update_in<T: Record>(
    records: &mut [T],
    id: &T::Id,
    f: &mut dyn FnMut(&mut T),
) -> Result<T> {
    let record = records
        .iter_mut()
        .find(|r| r.id() == id)
        .ok_or_else(|| crate::Error::not_found(T::KIND, id))?;
    f(record);
    Ok(record.clone())
}

pub(crate) fn remove_from<T: Record>(records: &mut Vec<T>, id: &T::Id) -> bool {
    let before = records.len();
    records.retain(|r| r.id() != id);
    records.len() != before
}

/// One repository per collection.
#[derive(Clone)]
pub struct Workspace {
    pub tasks: Arc<dyn Repository<Task>>,
    pub notes: Arc<dyn Repository<Note>>,
    pub projects: Arc<dyn Repository<Project>>,
    pub users: Arc<dyn Repository<User>>,
}

impl Workspace {
    /// Empty, non-persistent workspace.
    pub fn in_memory() -> Self {
        Self {
            tasks: Arc::new(MemoryRepository::<Task>::new()),
            notes: Arc::new(MemoryRepository::<Note>::new()),
            projects: Arc::new(MemoryRepository::<Project>::new()),
            users: Arc::new(MemoryRepository::<User>::new()),
        }
    }

    /// Non-persistent workspace preloaded with the demo data.
    pub fn seeded() -> Self {
        Self {
            tasks: Arc::new(MemoryRepository::with_records(seed::tasks())),
            notes: Arc::new(MemoryRepository::with_records(seed::notes())),
            projects: Arc::new(MemoryRepository::with_records(seed::projects())),
            users: Arc::new(MemoryRepository::with_records(seed::users())),
        }
    }

    /// File-backed workspace under `dir`.
    ///
    /// When `seed_demo_data` is set, collections whose file does not exist
    /// yet are initialized with the demo data.
    pub fn open(dir: &Path, seed_demo_data: bool) -> Result<Self> {
        aflog_debug!(
            "Workspace::open dir={} seed={}",
            dir.display(),
            seed_demo_data
        );
        Ok(Self {
            tasks: Arc::new(open_collection(dir, "tasks", seed_demo_data, seed::tasks)?),
            notes: Arc::new(open_collection(dir, "notes", seed_demo_data, seed::notes)?),
            projects: Arc::new(open_collection(
                dir,
                "projects",
                seed_demo_data,
                seed::projects,
            )?),
            users: Arc::new(open_collection(dir, "users", seed_demo_data, seed::users)?),
        })
    }
}

fn collection_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.json", name))
}

fn open_collection<T, F>(
    dir: &Path,
    name: &str,
    seed_demo_data: bool,
    seed_fn: F,
) -> Result<JsonFileRepository<T>>
where
    T: Record + Serialize + DeserializeOwned,
    F: FnOnce() -> Vec<T>,
{
    let path = collection_path(dir, name);
    if seed_demo_data && !path.exists() {
        aflog!("Seeding {} with demo data", path.display());
        return JsonFileRepository::create(&path, seed_fn());
    }
    JsonFileRepository::open(&path)
}
