//! Command-line interface for inspecting a task board snapshot.
//!
//! The CLI reads a JSON snapshot of a project's tasks (as the task service
//! serves them, wrapped as `{ "tasks": [...] }`) and renders the same views
//! the client shows: the filtered list, related tasks and subtasks.

mod run;


pub use run::{run, CliOutput, Snapshot};

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Inspect task board snapshots.
///
/// Snapshots are read from `--snapshot` or, when omitted, from stdin.
#[derive(Parser, Debug)]
#[command(name = "taskdeck")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Snapshot file to read instead of stdin.
    #[arg(long, global = true)]
    pub snapshot: Option<PathBuf>,

    /// Print JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Sort direction as typed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Direction {
    /// Smallest first.
    Asc,
    /// Largest first.
    Desc,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List tasks with search, filters, sorting and pagination.
    List {
        /// Case-insensitive search over title and description.
        #[arg(long, short)]
        query: Option<String>,

        /// Only tasks with this status (todo, in_progress, done).
        #[arg(long)]
        status: Option<String>,

        /// Only tasks with this priority (low, medium, high).
        #[arg(long)]
        priority: Option<String>,

        /// Sort field (title, status, priority, due_date, created_at).
        #[arg(long, default_value = "created_at")]
        sort: String,

        /// Sort direction.
        #[arg(long, value_enum, default_value_t = Direction::Desc)]
        direction: Direction,

        /// Page to show, starting at 1.
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Tasks per page.
        #[arg(long, default_value_t = 20)]
        page_size: usize,
    },

    /// Show the tasks related to a task, one row per related task.
    Related {
        /// The task to inspect.
        task_id: String,
    },

    /// Show a task's parents and subtasks.
    Subtasks {
        /// The task to inspect.
        task_id: String,
    },

    /// Print the effective client configuration as YAML.
    Config {
        /// Directory to look for `.taskdeck/config.yaml` in.
        #[arg(long, default_value = ".")]
        base_dir: PathBuf,
    },
}

impl Command {
    /// Returns true if this command reads a snapshot.
    #[must_use]
    pub const fn needs_snapshot(&self) -> bool {
        !matches!(self, Self::Config { .. })
    }
}

impl Cli {
    /// Returns true if the snapshot has to come from stdin.
    #[must_use]
    pub const fn needs_stdin(&self) -> bool {
        self.snapshot.is_none() && self.command.needs_snapshot()
    }
}
