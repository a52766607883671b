use chrono::NaiveDate;
use tracing::info;

use crate::error::{Result, TaskError};
use crate::grouping::{group_by_day, DayGroup};
use crate::ordering::sort_tasks;
use crate::storage::{KeyValueStore, TaskStore};
use crate::task::{next_id, now_ms, NewTask, Task};

/// Holds the last rendered snapshot of the task list.
///
/// Storage stays authoritative: every mutation reloads the collection,
/// applies the change, writes it back and then replaces the snapshot. A
/// failed reload aborts the mutation so nothing stored is overwritten.
#[derive(Debug)]
pub struct TaskBoard<S> {
    store: TaskStore<S>,
    tasks: Vec<Task>,
    pub selected_task: usize,
}

impl<S: KeyValueStore> TaskBoard<S> {
    pub fn new(store: TaskStore<S>) -> Self {
        Self {
            store,
            tasks: Vec::new(),
            selected_task: 0,
        }
    }

    pub fn store(&self) -> &TaskStore<S> {
        &self.store
    }

    /// Sorted snapshot from the most recent load or mutation.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Replaces the snapshot from storage. On a read failure the snapshot
    /// becomes empty and the error is handed back for display.
    pub fn reload(&mut self) -> Result<()> {
        match self.store.load() {
            Ok(tasks) => {
                self.set_snapshot(tasks);
                Ok(())
            }
            Err(err) => {
                self.set_snapshot(Vec::new());
                Err(err)
            }
        }
    }

    pub fn add_task(&mut self, fields: NewTask) -> Result<&Task> {
        let id = self.mutate(|tasks| {
            let task = Task::new(next_id(tasks, now_ms()), fields)?;
            let id = task.id;
            tasks.push(task);
            Ok(id)
        })?;
        info!(id, "added task");
        self.tasks
            .iter()
            .find(|t| t.id == id)
            .ok_or(TaskError::NotFound(id))
    }

    /// Returns `false` when no task has `id`.
    pub fn set_done(&mut self, id: u64, done: bool) -> Result<bool> {
        let found = self.mutate(|tasks| {
            Ok(match tasks.iter_mut().find(|t| t.id == id) {
                Some(task) => {
                    task.done = done;
                    true
                }
                None => false,
            })
        })?;
        if found {
            info!(id, done, "updated completion");
        }
        Ok(found)
    }

    /// Flips completion; returns the new state, or `None` when `id` is gone.
    pub fn toggle_done(&mut self, id: u64) -> Result<Option<bool>> {
        let state = self.mutate(|tasks| {
            Ok(tasks.iter_mut().find(|t| t.id == id).map(|task| {
                task.done = !task.done;
                task.done
            }))
        })?;
        if let Some(done) = state {
            info!(id, done, "toggled completion");
        }
        Ok(state)
    }

    /// Deletes one task by id; returns `false` when it was already gone.
    pub fn remove(&mut self, id: u64) -> Result<bool> {
        let removed = self.mutate(|tasks| {
            let before = tasks.len();
            tasks.retain(|t| t.id != id);
            Ok(tasks.len() != before)
        })?;
        if removed {
            info!(id, "removed task");
        }
        Ok(removed)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.store.clear()?;
        self.set_snapshot(Vec::new());
        Ok(())
    }

    pub fn groups(&self, today: NaiveDate) -> Vec<DayGroup> {
        group_by_day(&self.tasks, today)
    }

    pub fn selected(&self) -> Option<&Task> {
        self.tasks.get(self.selected_task)
    }

    pub fn move_selection(&mut self, delta: isize) {
        if self.tasks.is_empty() {
            self.selected_task = 0;
            return;
        }
        let last = self.tasks.len() as isize - 1;
        self.selected_task = (self.selected_task as isize + delta).clamp(0, last) as usize;
    }

    fn mutate<R>(&mut self, apply: impl FnOnce(&mut Vec<Task>) -> Result<R>) -> Result<R> {
        let mut tasks = self.store.load()?;
        let outcome = apply(&mut tasks)?;
        self.store.save(&tasks)?;
        self.set_snapshot(tasks);
        Ok(outcome)
    }

    /// The cursor follows the selected task's id across re-sorts; if that
    /// task is gone it stays at the same index, clamped.
    fn set_snapshot(&mut self, mut tasks: Vec<Task>) {
        let selected_id = self.selected().map(|t| t.id);
        sort_tasks(&mut tasks);
        self.tasks = tasks;
        match selected_id.and_then(|id| self.tasks.iter().position(|t| t.id == id)) {
            Some(pos) => self.selected_task = pos,
            None => self.move_selection(0),
        }
    }
}
