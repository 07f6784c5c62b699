use clap::{ArgAction, Parser, Subcommand};
use eyre::Result;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tasktrack::kv::KeyValueStore;
use tasktrack::render;
use tasktrack::shell::Session;
use tasktrack::{Backend, ListQuery, StatusFilter, TaskDraft, TaskStatus, TaskStore};

#[derive(Parser)]
#[command(name = "tasktrack")]
#[command(about = "tasktrack - create, edit, list, filter and sort your tasks")]
#[command(version = env!("GIT_DESCRIBE"))]
pub struct Cli {
    /// Path to a YAML config file (default: <config dir>/tasktrack/tasktrack.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the task data
    #[arg(short, long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Storage backend
    #[arg(short, long, value_enum, global = true)]
    pub backend: Option<Backend>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Add a new task
    Add {
        title: String,
        description: String,
        /// Due date as YYYY-MM-DD
        due: String,
        #[arg(short, long, default_value = "pending")]
        status: TaskStatus,
    },

    /// Edit a task; fields not given keep their current value
    Edit {
        /// Task id or unique id prefix
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        status: Option<TaskStatus>,
    },

    /// Delete a task
    Delete {
        /// Task id or unique id prefix
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// List tasks
    List {
        /// all, pending, in-progress or completed
        #[arg(short, long, default_value = "all")]
        status: StatusFilter,
        /// Sort by due date, earliest first
        #[arg(long)]
        sort_by_due: bool,
    },

    /// Show one task in full
    Show {
        /// Task id or unique id prefix
        id: String,
    },

    /// Interactive session
    Shell,
}

/// Run one subcommand against the store
pub fn execute<S, R, W>(store: &mut TaskStore<S>, command: Commands, mut input: R, mut output: W) -> Result<()>
where
    S: KeyValueStore,
    R: BufRead,
    W: Write,
{
    match command {
        Commands::Add {
            title,
            description,
            due,
            status,
        } => {
            let task = store.create(&TaskDraft::new(title, description, due, status))?;
            writeln!(output, "Added task {}", task.id)?;
        }
        Commands::Edit {
            id,
            title,
            description,
            due,
            status,
        } => {
            let task = store.find_by_prefix(&id)?.clone();
            let mut draft = task.to_draft();
            if let Some(title) = title {
                draft.title = title;
            }
            if let Some(description) = description {
                draft.description = description;
            }
            if let Some(due) = due {
                draft.due_date = due;
            }
            if let Some(status) = status {
                draft.status = status;
            }
            let task = store.update(&task.id, &draft)?;
            writeln!(output, "Updated task {}", task.id)?;
        }
        Commands::Delete { id, yes } => {
            let id = store.find_by_prefix(&id)?.id.clone();
            if !yes && !confirm(&mut input, &mut output)? {
                writeln!(output, "Cancelled")?;
                return Ok(());
            }
            let task = store.delete(&id)?;
            writeln!(output, "Deleted task {}", task.id)?;
        }
        Commands::List { status, sort_by_due } => {
            let tasks = store.list(&ListQuery::new(status, sort_by_due));
            write!(output, "{}", render::task_table(&tasks, store.short_id_len()))?;
        }
        Commands::Show { id } => {
            let task = store.find_by_prefix(&id)?;
            write!(output, "{}", render::task_detail(task))?;
        }
        Commands::Shell => {
            Session::new(store, input, output).run()?;
        }
    }
    Ok(())
}

fn confirm<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<bool> {
    write!(output, "Are you sure you want to delete this task? [y/N] ")?;
    output.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
