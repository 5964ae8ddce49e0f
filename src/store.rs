// Persistent task store backed by a single CSV file

use crate::csvfile::{self, ExportPayload};
use crate::error::TaskError;
use crate::models::{Priority, Task};
use crate::tasklist::TaskList;
use eyre::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default task file, relative to the working directory
pub const DEFAULT_FILE_NAME: &str = "tasks.csv";

/// Session handle over the task file
///
/// Every mutation computes the next `TaskList`, writes it to disk, and only
/// then adopts it, so a failed write leaves the session's list unchanged.
/// Validation and not-found failures never touch the file.
pub struct Store {
    path: PathBuf,
    tasks: TaskList,
}

impl Store {
    /// Open the task file at `path`, starting empty if it does not exist
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let tasks = csvfile::read_tasks(&path)?;

        Ok(Self { path, tasks })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current task list
    pub fn tasks(&self) -> &TaskList {
        &self.tasks
    }

    /// Re-read the backing file, discarding the in-memory list
    pub fn reload(&mut self) -> Result<()> {
        self.tasks = csvfile::read_tasks(&self.path)?;
        debug!(path = ?self.path, count = self.tasks.len(), "Reloaded tasks");
        Ok(())
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Add a task and return it
    pub fn add(&mut self, title: &str, priority: Priority) -> Result<Task> {
        let id = self.tasks.next_id();
        let next = self.tasks.add(title, priority)?;
        self.commit(next)?;

        info!(id, "Added task");
        let task = self.tasks.get(id).cloned().ok_or(TaskError::NotFound(id))?;
        Ok(task)
    }

    /// Change the title and priority of one task
    pub fn update(&mut self, id: u64, title: &str, priority: Priority) -> Result<()> {
        let next = self.tasks.update(id, title, priority)?;
        self.commit(next)?;

        info!(id, "Updated task");
        Ok(())
    }

    /// Change title and priority on every task titled `selector`
    ///
    /// Returns how many tasks changed.
    pub fn update_matching(&mut self, selector: &str, title: &str, priority: Priority) -> Result<usize> {
        let (next, count) = self.tasks.update_matching(selector, title, priority)?;
        self.commit(next)?;

        info!(selector, count, "Updated tasks by title");
        Ok(count)
    }

    /// Mark a task as done
    pub fn complete(&mut self, id: u64) -> Result<()> {
        let next = self.tasks.complete(id)?;
        self.commit(next)?;

        info!(id, "Completed task");
        Ok(())
    }

    /// Delete a task
    pub fn delete(&mut self, id: u64) -> Result<()> {
        let next = self.tasks.delete(id)?;
        self.commit(next)?;

        info!(id, "Deleted task");
        Ok(())
    }

    /// Serialize the current list for download without writing the task file
    pub fn export(&self) -> Result<ExportPayload> {
        ExportPayload::new(&self.tasks)
    }

    fn commit(&mut self, next: TaskList) -> Result<()> {
        csvfile::write_tasks(&self.path, &next)?;
        self.tasks = next;
        Ok(())
    }
}
