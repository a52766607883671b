//! Key-value persistence for the task collection.
//!
//! The collection is always read and written as one blob under
//! [`TASKS_KEY`]; there is no incremental update and no merge.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Result, TaskError};
use crate::task::{assign_missing_ids, now_ms, Task};

/// Storage key holding the serialized task collection.
pub const TASKS_KEY: &str = "tasks";

/// A synchronous string key-value store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    /// Overwrites any prior value.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    /// Removing an absent key succeeds.
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Stores each key as `<root>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        let target = self.path_for(key);
        let tmp = self.root.join(format!(".{key}.json.tmp"));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &target)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// In-process store; contents vanish with the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Reads and writes the full task collection through a [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct TaskStore<S> {
    backend: S,
}

impl<S: KeyValueStore> TaskStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }

    pub fn save(&mut self, tasks: &[Task]) -> Result<()> {
        let data = serde_json::to_string_pretty(tasks)?;
        self.backend.set(TASKS_KEY, &data)?;
        debug!(count = tasks.len(), "saved tasks");
        Ok(())
    }

    /// Absent key yields an empty collection; unparsable content is
    /// [`TaskError::Corrupt`]. Records without ids are given one and
    /// written back so ids stay stable across loads.
    pub fn load(&mut self) -> Result<Vec<Task>> {
        let Some(data) = self.backend.get(TASKS_KEY)? else {
            return Ok(Vec::new());
        };
        let mut tasks: Vec<Task> =
            serde_json::from_str(&data).map_err(|source| TaskError::Corrupt {
                key: TASKS_KEY.to_string(),
                source,
            })?;
        let assigned = assign_missing_ids(&mut tasks, now_ms());
        if assigned > 0 {
            info!(assigned, "assigned ids to legacy task records");
            self.save(&tasks)?;
        }
        Ok(tasks)
    }

    /// Like [`TaskStore::load`], but any failure degrades to no tasks.
    pub fn load_or_empty(&mut self) -> Vec<Task> {
        self.load().unwrap_or_else(|err| {
            warn!(%err, "failed to load tasks, treating as empty");
            Vec::new()
        })
    }

    pub fn clear(&mut self) -> Result<()> {
        self.backend.remove(TASKS_KEY)?;
        info!("cleared all tasks");
        Ok(())
    }
}
