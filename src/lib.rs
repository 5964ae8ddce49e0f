// Tasklist - single-user task tracking persisted to a flat CSV file

pub mod config;
pub mod csvfile;
pub mod error;
pub mod filter;
pub mod models;
pub mod record;
pub mod store;
pub mod tasklist;

// Re-export main types for convenience
pub use config::Config;
pub use csvfile::{ExportPayload, export_csv, read_tasks, write_tasks};
pub use error::TaskError;
pub use filter::{Filter, FilterOp};
pub use models::{Priority, Task};
pub use record::{IndexValue, Record};
pub use store::Store;
pub use tasklist::{Progress, TaskList};
