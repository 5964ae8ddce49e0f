// CSV file operations for the persisted task file and exports

use crate::models::{MAX_TASK_ID, Priority, Task};
use crate::tasklist::TaskList;
use eyre::{Context, Result, eyre};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Column order for every file this crate writes
pub const HEADER: [&str; 4] = ["id", "title", "completed", "priority"];

/// File name offered with an export
pub const EXPORT_FILE_NAME: &str = "tasks.csv";

/// MIME type offered with an export
pub const EXPORT_MIME_TYPE: &str = "text/csv";

/// Read the task file at `path`
///
/// A missing file is an empty list. Older files without `id` or `priority`
/// columns are accepted and default-filled; anything else that fails to
/// open or parse is returned as an error.
pub fn read_tasks(path: &Path) -> Result<TaskList> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = ?path, "Task file not found, starting empty");
            return Ok(TaskList::new());
        }
        Err(e) => {
            return Err(e).wrap_err_with(|| format!("Failed to open task file {}", path.display()));
        }
    };

    let list = parse_tasks(file).wrap_err_with(|| format!("Failed to read task file {}", path.display()))?;

    info!(path = ?path, count = list.len(), "Loaded tasks");
    Ok(list)
}

/// Replace the task file at `path` with `list`
///
/// The data goes to a temporary file beside the target which is synced and
/// then renamed over it, so an interrupted save leaves the previous file.
pub fn write_tasks(path: &Path, list: &TaskList) -> Result<()> {
    let data = to_csv_bytes(list)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).wrap_err_with(|| format!("Failed to create directory {}", dir.display()))?;

    let mut tmp = NamedTempFile::new_in(&dir).context("Failed to create temporary task file")?;
    tmp.write_all(&data).context("Failed to write temporary task file")?;
    tmp.as_file().sync_all().context("Failed to sync temporary task file")?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .wrap_err_with(|| format!("Failed to replace task file {}", path.display()))?;

    info!(path = ?path, count = list.len(), "Saved tasks");
    Ok(())
}

/// Serialize `list` in the persisted file format without touching disk
pub fn export_csv(list: &TaskList) -> Result<String> {
    let bytes = to_csv_bytes(list)?;
    String::from_utf8(bytes).context("Exported CSV is not valid UTF-8")
}

/// An on-demand copy of the task list, ready to hand to a download or a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPayload {
    pub file_name: &'static str,
    pub mime_type: &'static str,
    pub data: String,
}

impl ExportPayload {
    pub fn new(list: &TaskList) -> Result<Self> {
        Ok(Self {
            file_name: EXPORT_FILE_NAME,
            mime_type: EXPORT_MIME_TYPE,
            data: export_csv(list)?,
        })
    }
}

fn to_csv_bytes(list: &TaskList) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;

    for task in list.tasks() {
        let id = task.id.to_string();
        let completed = if task.completed { "true" } else { "false" };
        writer
            .write_record([id.as_str(), task.title.as_str(), completed, task.priority.as_str()])
            .wrap_err_with(|| format!("Failed to serialize task {}", task.id))?;
    }

    writer
        .into_inner()
        .map_err(|e| eyre!("Failed to flush CSV writer: {}", e.error()))
}

// Column positions resolved from a header row
struct Columns {
    id: Option<usize>,
    title: usize,
    completed: Option<usize>,
    priority: Option<usize>,
}

impl Columns {
    fn from_header(header: &csv::StringRecord) -> Result<Self> {
        let find = |names: &[&str]| {
            header
                .iter()
                .position(|h| names.iter().any(|name| h.trim().eq_ignore_ascii_case(name)))
        };

        let title = find(&["title", "task"]).ok_or_else(|| eyre!("Task file has no title column"))?;

        Ok(Self {
            id: find(&["id"]),
            title,
            completed: find(&["completed"]),
            priority: find(&["priority"]),
        })
    }
}

fn parse_tasks<R: Read>(reader: R) -> Result<TaskList> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);

    let columns = Columns::from_header(reader.headers().context("Failed to read header row")?)?;
    if columns.priority.is_none() {
        warn!("Task file has no priority column, defaulting every task to Medium");
    }
    if columns.id.is_none() {
        debug!("Task file has no id column, numbering tasks in file order");
    }

    let mut rows: Vec<(Option<u64>, Task)> = Vec::new();
    for result in reader.records() {
        let record = result.context("Malformed CSV row")?;
        let line = record.position().map_or(0, |p| p.line());
        let row = parse_row(&record, &columns).wrap_err_with(|| format!("Invalid task on line {}", line))?;
        rows.push(row);
    }

    assign_ids(rows)
}

fn parse_row(record: &csv::StringRecord, columns: &Columns) -> Result<(Option<u64>, Task)> {
    let id = match cell(record, columns.id) {
        "" => None,
        raw => Some(raw.parse::<u64>().wrap_err_with(|| format!("Invalid id {:?}", raw))?),
    };

    let completed = match cell(record, columns.completed) {
        "" => false,
        raw if raw.eq_ignore_ascii_case("true") => true,
        raw if raw.eq_ignore_ascii_case("false") => false,
        raw => return Err(eyre!("Invalid completed flag {:?} (expected true or false)", raw)),
    };

    let priority = match cell(record, columns.priority) {
        "" => Priority::default(),
        raw => raw.parse::<Priority>()?,
    };

    let title = record.get(columns.title).unwrap_or_default().to_string();

    Ok((
        id,
        Task {
            id: 0,
            title,
            completed,
            priority,
        },
    ))
}

fn cell(record: &csv::StringRecord, index: Option<usize>) -> &str {
    index.and_then(|i| record.get(i)).map(str::trim).unwrap_or_default()
}

// Tasks without an id get fresh ones after the largest id in the file
fn assign_ids(rows: Vec<(Option<u64>, Task)>) -> Result<TaskList> {
    let mut seen = HashSet::new();
    for id in rows.iter().filter_map(|(id, _)| *id) {
        if id > MAX_TASK_ID {
            return Err(eyre!("Task id {} is out of range (max {})", id, MAX_TASK_ID));
        }
        if !seen.insert(id) {
            return Err(eyre!("Duplicate task id {}", id));
        }
    }

    let max = seen.iter().copied().max();
    let mut next_id = max.map_or(1, |max| max + 1);
    let mut tasks = Vec::with_capacity(rows.len());
    for (id, mut task) in rows {
        task.id = match id {
            Some(id) => id,
            None => {
                if next_id > MAX_TASK_ID {
                    return Err(eyre!("Task id {} leaves no room for new ids", max.unwrap_or_default()));
                }
                next_id += 1;
                next_id - 1
            }
        };
        tasks.push(task);
    }

    Ok(TaskList::from_tasks(tasks)?)
}
