// Domain errors for task mutations

use thiserror::Error;

/// Recoverable failures of a task list operation
///
/// These travel inside `eyre::Report` once they leave the pure task list
/// operations, so callers that care use `report.downcast_ref::<TaskError>()`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("task title cannot be empty")]
    EmptyTitle,

    #[error("no task with id {0}")]
    NotFound(u64),

    #[error("no task titled {0:?}")]
    NoTitleMatch(String),

    #[error("task id {0} is out of range (max {max})", max = crate::models::MAX_TASK_ID)]
    IdOutOfRange(u64),

    #[error("no task ids left to assign")]
    IdsExhausted,
}
