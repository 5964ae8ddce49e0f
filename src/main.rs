use clap::{ArgAction, Parser, Subcommand};
use colored::{ColoredString, Colorize};
use eyre::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tasklist::{Config, Filter, FilterOp, IndexValue, Priority, Store, Task, TaskError, TaskList};
use tracing::Level;

#[derive(Parser)]
#[command(name = "tasklist")]
#[command(about = "Tasklist - manage your to-do list in a CSV file")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Task file (default: $TASKLIST_FILE, the config's `file`, or ./tasks.csv)
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        title: String,

        /// high, medium or low (default from config, else medium)
        #[arg(short, long)]
        priority: Option<Priority>,
    },

    /// Show tasks, grouped into pending and completed
    List {
        /// Only pending tasks
        #[arg(long, conflicts_with = "completed")]
        pending: bool,

        /// Only completed tasks
        #[arg(long)]
        completed: bool,

        /// Only tasks with this priority
        #[arg(short, long)]
        priority: Option<Priority>,

        /// Extra filter such as `title~milk` or `id>=3` (repeatable)
        #[arg(short = 'w', long = "where", value_name = "EXPR")]
        filters: Vec<String>,

        /// Print JSON instead of a listing
        #[arg(long)]
        json: bool,
    },

    /// Change a task's title and/or priority
    Update {
        id: u64,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        priority: Option<Priority>,
    },

    /// Retitle every task whose title matches exactly
    Rename {
        selector: String,

        title: String,

        #[arg(short, long)]
        priority: Priority,
    },

    /// Mark a task as done
    Done { id: u64 },

    /// Delete a task
    Delete { id: u64 },

    /// Write all tasks as CSV to stdout or a file
    Export {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show completion progress
    Stats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    // Setup tracing
    let level = match cli.verbose {
        0 => config.log_level()?.unwrap_or(Level::WARN),
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let mut store = Store::open(config.task_file(cli.file.as_deref()))?;

    match cli.command {
        Commands::Add { title, priority } => {
            let priority = priority.unwrap_or(config.default_priority);
            let Some(task) = add_task(&mut store, &title, priority)? else {
                eprintln!("{}", "Please enter a task before adding.".yellow());
                return Ok(());
            };
            println!("{} {}", "Added".green().bold(), describe(&task));
            render(store.tasks());
        }
        Commands::List {
            pending,
            completed,
            priority,
            filters,
            json,
        } => {
            let mut query = Vec::new();
            if pending {
                query.push(Filter::new("completed", FilterOp::Eq, IndexValue::Bool(false)));
            }
            if completed {
                query.push(Filter::new("completed", FilterOp::Eq, IndexValue::Bool(true)));
            }
            if let Some(priority) = priority {
                query.push(Filter::new("priority", FilterOp::Eq, IndexValue::String(priority.to_string())));
            }
            for expr in &filters {
                query.push(Filter::parse(expr)?);
            }

            let tasks = store.tasks().filter(&query);
            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else if query.is_empty() {
                render(store.tasks());
            } else if tasks.is_empty() {
                println!("{}", "No matching tasks.".dimmed());
            } else {
                for task in tasks {
                    println!("{}", line(task));
                }
            }
        }
        Commands::Update { id, title, priority } => {
            let current = store.tasks().get(id).cloned().ok_or(TaskError::NotFound(id))?;
            let title = title.unwrap_or(current.title);
            let priority = priority.unwrap_or(current.priority);
            store.update(id, &title, priority)?;
            println!("{} task {}", "Updated".green().bold(), id);
            render(store.tasks());
        }
        Commands::Rename {
            selector,
            title,
            priority,
        } => {
            let count = store.update_matching(&selector, &title, priority)?;
            println!("{} {} task(s)", "Updated".green().bold(), count);
            render(store.tasks());
        }
        Commands::Done { id } => {
            store.complete(id)?;
            println!("{} task {}", "Completed".green().bold(), id);
            render(store.tasks());
        }
        Commands::Delete { id } => {
            store.delete(id)?;
            println!("{} task {}", "Deleted".red().bold(), id);
            render(store.tasks());
        }
        Commands::Export { output } => {
            let payload = store.export()?;
            match output {
                Some(path) => {
                    fs::write(&path, &payload.data)
                        .wrap_err_with(|| format!("Failed to write export to {}", path.display()))?;
                    println!(
                        "Exported {} task(s) to {} ({})",
                        store.tasks().len(),
                        path.display(),
                        payload.mime_type
                    );
                }
                None => print!("{}", payload.data),
            }
        }
        Commands::Stats => {
            let list = store.tasks();
            println!("{} {}", progress_bar(list), list.progress().to_string().bold());
            for priority in Priority::ALL {
                let open = list.pending().filter(|t| t.priority == priority).count();
                println!("  {} {} pending", paint(priority, &format!("{:<8}", priority.as_str())), open);
            }
        }
    }

    Ok(())
}

/// Add a task; a blank title is a warning rather than a failure, so it
/// yields `None` and leaves the task file untouched
fn add_task(store: &mut Store, title: &str, priority: Priority) -> Result<Option<Task>> {
    match store.add(title, priority) {
        Ok(task) => Ok(Some(task)),
        Err(e) if e.downcast_ref::<TaskError>() == Some(&TaskError::EmptyTitle) => Ok(None),
        Err(e) => Err(e),
    }
}

fn render(list: &TaskList) {
    println!();
    if !list.is_empty() {
        println!("{} {}", progress_bar(list), list.progress().to_string().bold());
        println!();
    }

    println!("{}", "Pending Tasks".bold().underline());
    let mut any = false;
    for task in list.pending() {
        println!("{}", line(task));
        any = true;
    }
    if !any {
        println!("{}", "No pending tasks! You're all caught up.".dimmed());
    }

    println!();
    println!("{}", "Completed Tasks".bold().underline());
    let mut any = false;
    for task in list.completed() {
        println!("{}", line(task));
        any = true;
    }
    if !any {
        println!("{}", "No completed tasks yet! Keep going!".dimmed());
    }
}

fn line(task: &Task) -> String {
    let title = if task.completed {
        task.title.strikethrough()
    } else {
        task.title.normal()
    };
    format!("{:>4}  {}  ({})", task.id.to_string().dimmed(), title, priority_label(task.priority))
}

fn describe(task: &Task) -> String {
    format!("#{} {} ({})", task.id, task.title, priority_label(task.priority))
}

fn priority_label(priority: Priority) -> ColoredString {
    paint(priority, priority.as_str())
}

fn paint(priority: Priority, text: &str) -> ColoredString {
    match priority {
        Priority::High => text.red(),
        Priority::Medium => text.yellow(),
        Priority::Low => text.green(),
    }
}

fn progress_bar(list: &TaskList) -> String {
    const WIDTH: usize = 20;
    let filled = (list.progress().fraction() * WIDTH as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled).green(), "-".repeat(WIDTH - filled).dimmed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_add_task_blank_title_is_not_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tasks.csv");
        let mut store = Store::open(&path).unwrap();

        let added = add_task(&mut store, "   ", Priority::High).unwrap();

        assert!(added.is_none());
        assert!(store.tasks().is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn test_add_task_writes_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tasks.csv");
        let mut store = Store::open(&path).unwrap();

        let task = add_task(&mut store, "Buy milk", Priority::Low).unwrap().unwrap();

        assert_eq!(task.id, 1);
        assert_eq!(Store::open(&path).unwrap().tasks().len(), 1);
    }

    #[test]
    fn test_cli_parses_add_with_priority() {
        let cli = Cli::try_parse_from(["tasklist", "--file", "x.csv", "add", "Call mom", "-p", "high"]).unwrap();

        assert_eq!(cli.file, Some(PathBuf::from("x.csv")));
        match cli.command {
            Commands::Add { title, priority } => {
                assert_eq!(title, "Call mom");
                assert_eq!(priority, Some(Priority::High));
            }
            _ => panic!("expected add command"),
        }
    }
}
