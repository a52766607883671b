use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, TaskError};

/// A single to-do item.
///
/// Field names on disk stay camelCase so blobs written by the browser
/// version of the list load unchanged.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Zero means the record predates ids; see [`assign_missing_ids`].
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: u64,
    pub day: String,
    pub task_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_important: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub done: bool,
}

/// Treats an explicit `null` like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// User-supplied fields for a task that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewTask {
    pub day: String,
    pub task_name: String,
    pub description: String,
    pub is_important: bool,
}

impl Task {
    /// Builds an open (not done) task. Day and name must be non-blank.
    pub fn new(id: u64, fields: NewTask) -> Result<Self> {
        let day = fields.day.trim();
        let task_name = fields.task_name.trim();
        if day.is_empty() {
            return Err(TaskError::MissingField("day"));
        }
        if task_name.is_empty() {
            return Err(TaskError::MissingField("taskName"));
        }
        Ok(Self {
            id,
            day: day.to_string(),
            task_name: task_name.to_string(),
            description: fields.description.trim().to_string(),
            is_important: fields.is_important,
            done: false,
        })
    }
}

/// Current wall-clock time in epoch milliseconds, the seed for new ids.
pub fn now_ms() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
}

/// Picks an id derived from `now_ms` that no task in `tasks` uses.
///
/// Ids normally climb past the highest stored one; once that reaches
/// `u64::MAX` the lowest free non-zero id is used instead.
pub fn next_id(tasks: &[Task], now_ms: u64) -> u64 {
    let highest = tasks.iter().map(|t| t.id).max().unwrap_or(0);
    match highest.checked_add(1) {
        Some(next) => now_ms.max(next),
        None => (1..=u64::MAX)
            .find(|id| tasks.iter().all(|t| t.id != *id))
            .unwrap_or(1),
    }
}

/// Gives every id-less record a fresh id. Returns how many were assigned.
pub fn assign_missing_ids(tasks: &mut [Task], now_ms: u64) -> usize {
    let mut assigned = 0;
    for i in 0..tasks.len() {
        if tasks[i].id == 0 {
            let id = next_id(tasks, now_ms);
            tasks[i].id = id;
            assigned += 1;
        }
    }
    assigned
}
