//! Command execution for the CLI.
//!
//! This module handles running CLI commands and producing output.

use std::path::Path;
use std::process::ExitCode;

use serde::{Deserialize, Serialize};

use crate::cli::{Cli, Command, Direction};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::tasks::{resolve_related_tasks, HierarchyView, Priority, Status, Task};
use crate::view::{paginate, Filter, ListOutcome, SortDirection, SortField, SortSpec, TaskListState};

/// Output from running the CLI, with separate stdout and stderr messages.
#[derive(Debug)]
pub struct CliOutput {
    /// Exit code for the process.
    pub exit_code: ExitCode,
    /// Messages to print to stdout.
    pub stdout: Vec<String>,
    /// Messages to print to stderr.
    pub stderr: Vec<String>,
}

impl CliOutput {
    fn ok(stdout: Vec<String>) -> Self {
        Self { exit_code: ExitCode::SUCCESS, stdout, stderr: vec![] }
    }

    fn error(err: &Error) -> Self {
        Self { exit_code: ExitCode::from(1), stdout: vec![], stderr: vec![format!("Error: {err}")] }
    }
}

/// Tasks of one project as served by the task service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Every task, with links and hierarchy when the service included them.
    pub tasks: Vec<Task>,
}

impl Snapshot {
    /// Parse a snapshot from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn parse(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    fn task(&self, task_id: &str) -> Result<&Task> {
        self.tasks
            .iter()
            .find(|t| t.id == task_id)
            .ok_or_else(|| Error::NotFound { kind: "task", id: task_id.to_string() })
    }
}

/// Run a CLI command. `stdin` is only read when no snapshot file is given.
pub fn run(cli: Cli, stdin: &str) -> CliOutput {
    let result = match cli.command {
        Command::Config { base_dir } => run_config(&base_dir),
        command => load_snapshot(cli.snapshot.as_deref(), stdin)
            .and_then(|snapshot| run_with_snapshot(command, &snapshot, cli.json)),
    };

    match result {
        Ok(lines) => CliOutput::ok(lines),
        Err(err) => CliOutput::error(&err),
    }
}

fn load_snapshot(path: Option<&Path>, stdin: &str) -> Result<Snapshot> {
    match path {
        Some(path) => Snapshot::parse(&std::fs::read_to_string(path)?),
        None => Snapshot::parse(stdin),
    }
}

fn run_with_snapshot(command: Command, snapshot: &Snapshot, json: bool) -> Result<Vec<String>> {
    match command {
        Command::List { query, status, priority, sort, direction, page, page_size } => {
            let mut state = TaskListState::new(0);
            if let Some(query) = query {
                state.set_query(&query, chrono::Utc::now());
                state.flush_query();
            }
            if let Some(status) = status {
                let status =
                    Status::from_str(&status).map_err(|e| Error::InvalidArgument(e.to_string()))?;
                state.status = Filter::Only(status);
            }
            if let Some(priority) = priority {
                let priority = Priority::from_str(&priority)
                    .map_err(|e| Error::InvalidArgument(e.to_string()))?;
                state.priority = Filter::Only(priority);
            }
            let field = SortField::parse(&sort)
                .ok_or_else(|| Error::InvalidArgument(format!("unknown sort field: '{sort}'")))?;
            let direction = match direction {
                Direction::Asc => SortDirection::Asc,
                Direction::Desc => SortDirection::Desc,
            };
            state.sort = SortSpec { field, direction };
            run_list(&state, snapshot, page, page_size, json)
        }
        Command::Related { task_id } => run_related(&task_id, snapshot, json),
        Command::Subtasks { task_id } => run_subtasks(&task_id, snapshot, json),
        Command::Config { base_dir } => run_config(&base_dir),
    }
}

fn run_list(
    state: &TaskListState,
    snapshot: &Snapshot,
    page: usize,
    page_size: usize,
    json: bool,
) -> Result<Vec<String>> {
    let tasks = match state.apply(&snapshot.tasks) {
        ListOutcome::NoTasks => return Ok(vec!["No tasks yet.".to_string()]),
        ListOutcome::NoMatches { can_clear_filters } => {
            let mut lines = vec!["No tasks match the current filters.".to_string()];
            if can_clear_filters {
                lines.push("Clear the search and filters to see every task.".to_string());
            }
            return Ok(lines);
        }
        ListOutcome::Tasks(tasks) => tasks,
    };

    let page = paginate(tasks, page, page_size);
    if json {
        return Ok(vec![serde_json::to_string_pretty(&page)?]);
    }

    let mut lines: Vec<String> = page
        .items
        .iter()
        .map(|t| format!("{:<12} {:<11} {:<6} {}", t.id, t.status.as_str(), t.priority.as_str(), t.title))
        .collect();
    lines.push(format!(
        "Page {} of {} ({} tasks)",
        page.page, page.total_pages, page.total_items
    ));
    Ok(lines)
}

fn run_related(task_id: &str, snapshot: &Snapshot, json: bool) -> Result<Vec<String>> {
    let task = snapshot.task(task_id)?;
    let links = task.links.clone().unwrap_or_default();
    let rows = resolve_related_tasks(task_id, &links, snapshot.tasks.as_slice());

    if json {
        return Ok(vec![serde_json::to_string_pretty(&rows)?]);
    }
    if rows.is_empty() {
        return Ok(vec![format!("{task_id} has no related tasks.")]);
    }
    Ok(rows
        .iter()
        .map(|row| {
            let both = if row.is_bidirectional { " (linked both ways)" } else { "" };
            format!(
                "{:<16} {:<12} {}{both}",
                row.relationship_type.label(),
                row.task.id,
                row.task.title
            )
        })
        .collect())
}

fn run_subtasks(task_id: &str, snapshot: &Snapshot, json: bool) -> Result<Vec<String>> {
    let task = snapshot.task(task_id)?;
    let view = task.hierarchy.as_ref().map(HierarchyView::from_hierarchy).unwrap_or_default();

    if json {
        return Ok(vec![serde_json::to_string_pretty(&view)?]);
    }

    let mut lines = vec![format!("Parents ({}):", view.parent_count)];
    lines.extend(view.parents.iter().map(|r| format!("  {:<12} {}", r.task.id, r.task.title)));
    lines.push(format!("Subtasks ({}):", view.child_count));
    lines.extend(
        view.children
            .iter()
            .map(|r| format!("  {:<12} {:<11} {}", r.task.id, r.task.status.as_str(), r.task.title)),
    );
    Ok(lines)
}

fn run_config(base_dir: &Path) -> Result<Vec<String>> {
    let config = ClientConfig::load_or_default(base_dir)?;
    Ok(vec![serde_yaml::to_string(&config)?])
}
