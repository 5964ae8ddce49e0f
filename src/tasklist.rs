// In-memory task list with value-in, value-out mutations

use crate::error::TaskError;
use crate::filter::Filter;
use crate::models::{MAX_TASK_ID, Priority, Task};
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Ordered collection of tasks plus the id counter for new ones
///
/// Mutations never change `self`; they return the next list so the caller
/// decides when (and whether) to persist and adopt it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskList {
    tasks: Vec<Task>,
    next_id: u64,
}

impl Default for TaskList {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 1,
        }
    }
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from already-identified tasks
    ///
    /// The id counter resumes after the largest id present, so ids of deleted
    /// tasks at the tail may be handed out again in a later session. Ids above
    /// `MAX_TASK_ID` are rejected.
    pub fn from_tasks(tasks: Vec<Task>) -> Result<Self, TaskError> {
        if let Some(task) = tasks.iter().find(|t| t.id > MAX_TASK_ID) {
            return Err(TaskError::IdOutOfRange(task.id));
        }
        // max <= MAX_TASK_ID, so the increment cannot overflow
        let next_id = tasks.iter().map(|t| t.id).max().map_or(1, |max| max + 1);
        Ok(Self { tasks, next_id })
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Id the next added task will receive
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Current zero-based position of a task
    pub fn position(&self, id: u64) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    pub fn pending(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| !t.completed)
    }

    pub fn completed(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| t.completed)
    }

    /// Tasks matching every filter, in list order
    pub fn filter(&self, filters: &[Filter]) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| filters.iter().all(|f| f.matches(*t)))
            .collect()
    }

    pub fn progress(&self) -> Progress {
        Progress {
            completed: self.completed().count(),
            total: self.tasks.len(),
        }
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Append a new pending task
    pub fn add(&self, title: &str, priority: Priority) -> Result<TaskList, TaskError> {
        validate_title(title)?;

        if self.next_id > MAX_TASK_ID {
            return Err(TaskError::IdsExhausted);
        }

        let mut next = self.clone();
        let id = next.next_id;
        next.tasks.push(Task::new(id, title, priority));
        next.next_id += 1;

        debug!(id, %priority, "add: appended task");
        Ok(next)
    }

    /// Overwrite title and priority of the task with the given id
    pub fn update(&self, id: u64, title: &str, priority: Priority) -> Result<TaskList, TaskError> {
        validate_title(title)?;

        let mut next = self.clone();
        let task = next.tasks.iter_mut().find(|t| t.id == id).ok_or(TaskError::NotFound(id))?;
        task.title = title.to_string();
        task.priority = priority;

        debug!(id, %priority, "update: rewrote task");
        Ok(next)
    }

    /// Overwrite title and priority on every task titled `selector`
    ///
    /// Returns the new list and how many tasks were rewritten.
    pub fn update_matching(
        &self,
        selector: &str,
        title: &str,
        priority: Priority,
    ) -> Result<(TaskList, usize), TaskError> {
        validate_title(title)?;

        let mut next = self.clone();
        let mut count = 0;
        for task in next.tasks.iter_mut().filter(|t| t.title == selector) {
            task.title = title.to_string();
            task.priority = priority;
            count += 1;
        }

        if count == 0 {
            return Err(TaskError::NoTitleMatch(selector.to_string()));
        }

        debug!(selector, count, "update_matching: rewrote tasks");
        Ok((next, count))
    }

    /// Mark a task as done
    ///
    /// Completion is one-way; completing a finished task changes nothing.
    pub fn complete(&self, id: u64) -> Result<TaskList, TaskError> {
        let mut next = self.clone();
        let task = next.tasks.iter_mut().find(|t| t.id == id).ok_or(TaskError::NotFound(id))?;
        task.completed = true;

        debug!(id, "complete: marked task done");
        Ok(next)
    }

    /// Remove a task; later tasks shift down one position
    pub fn delete(&self, id: u64) -> Result<TaskList, TaskError> {
        let pos = self.position(id).ok_or(TaskError::NotFound(id))?;

        let mut next = self.clone();
        next.tasks.remove(pos);

        debug!(id, pos, "delete: removed task");
        Ok(next)
    }
}

fn validate_title(title: &str) -> Result<(), TaskError> {
    if title.trim().is_empty() {
        return Err(TaskError::EmptyTitle);
    }
    Ok(())
}

/// Completed versus total task counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    /// Completed share in `0.0..=1.0`; an empty list counts as no progress
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Completed: {} / {}", self.completed, self.total)
    }
}
