//! Client-side search, filter and sort over an in-memory task list.

use std::cmp::Ordering;

use chrono::{DateTime, Duration, Utc};

use crate::config::ClientConfig;
use crate::tasks::{Priority, Status, Task};

/// Default delay between the last keystroke and applying the search query.
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;

/// A filter that either lets everything through or requires an exact value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter<T> {
    /// No filtering.
    #[default]
    All,
    /// Keep only items with this value.
    Only(T),
}

impl<T: PartialEq> Filter<T> {
    /// Whether `value` passes the filter.
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == value,
        }
    }

    /// Whether the filter restricts anything.
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Only(_))
    }
}

/// Field a task list can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    /// Title, lexicographic.
    Title,
    /// Status, lexicographic on its wire name.
    Status,
    /// Priority, by rank (LOW < MEDIUM < HIGH).
    Priority,
    /// Due date; tasks without one sort as the Unix epoch.
    DueDate,
    /// Creation time.
    CreatedAt,
}

impl SortField {
    /// Parse a field name as typed on the command line or stored in a URL.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "title" => Some(Self::Title),
            "status" => Some(Self::Status),
            "priority" => Some(Self::Priority),
            "duedate" | "due" => Some(Self::DueDate),
            "createdat" | "created" => Some(Self::CreatedAt),
            _ => None,
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Smallest first.
    Asc,
    /// Largest first.
    Desc,
}

/// A sort field crossed with a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    /// Field to compare.
    pub field: SortField,
    /// Direction.
    pub direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self { field: SortField::CreatedAt, direction: SortDirection::Desc }
    }
}

impl SortSpec {
    /// Compare two tasks by this sort field and direction.
    #[must_use]
    pub fn compare(&self, a: &Task, b: &Task) -> Ordering {
        let ordering = match self.field {
            SortField::Title => a.title.cmp(&b.title),
            SortField::Status => a.status.as_str().cmp(b.status.as_str()),
            SortField::Priority => a.priority.rank().cmp(&b.priority.rank()),
            SortField::DueDate => due_or_epoch(a).cmp(&due_or_epoch(b)),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        };
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

// A missing due date sorts as the epoch, i.e. first when ascending.
fn due_or_epoch(task: &Task) -> DateTime<Utc> {
    task.due_date.unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// What a list view should render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListOutcome<'a> {
    /// The project has no tasks at all.
    NoTasks,
    /// Tasks exist but none pass the filters.
    NoMatches {
        /// Whether a clear-filters action should be offered.
        can_clear_filters: bool,
    },
    /// Filtered and sorted tasks.
    Tasks(Vec<&'a Task>),
}

impl ListOutcome<'_> {
    /// Number of tasks to render.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Tasks(tasks) => tasks.len(),
            _ => 0,
        }
    }

    /// Whether nothing will be rendered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// User-adjustable controls of a task list.
#[derive(Debug, Clone)]
pub struct TaskListState {
    query_input: String,
    applied_query: String,
    pending_since: Option<DateTime<Utc>>,
    debounce: Duration,
    /// Status filter.
    pub status: Filter<Status>,
    /// Priority filter.
    pub priority: Filter<Priority>,
    /// Sort order.
    pub sort: SortSpec,
}

impl Default for TaskListState {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_DEBOUNCE_MS)
    }
}

impl TaskListState {
    /// Create an unfiltered state with the given search debounce.
    #[must_use]
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            query_input: String::new(),
            applied_query: String::new(),
            pending_since: None,
            debounce: Duration::milliseconds(i64::try_from(debounce_ms).unwrap_or(i64::MAX)),
            status: Filter::All,
            priority: Filter::All,
            sort: SortSpec::default(),
        }
    }

    /// Create an unfiltered state using the configured search debounce.
    #[must_use]
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.search_debounce_ms)
    }

    /// Record a keystroke in the search box. The query is not applied until
    /// the debounce window passes without further input.
    pub fn set_query(&mut self, text: &str, now: DateTime<Utc>) {
        self.query_input = text.to_string();
        self.pending_since = Some(now);
    }

    /// Apply the pending query if the debounce window has elapsed.
    ///
    /// Returns `true` when the applied query changed.
    pub fn poll(&mut self, now: DateTime<Utc>) -> bool {
        match self.pending_since {
            Some(since) if now - since >= self.debounce => self.flush_query(),
            _ => false,
        }
    }

    /// Apply the pending query immediately. Returns `true` when it changed.
    pub fn flush_query(&mut self) -> bool {
        self.pending_since = None;
        if self.applied_query == self.query_input {
            return false;
        }
        self.applied_query.clone_from(&self.query_input);
        true
    }

    /// Whether a typed query is still waiting for the debounce window.
    #[must_use]
    pub const fn has_pending_query(&self) -> bool {
        self.pending_since.is_some()
    }

    /// The text currently in the search box.
    #[must_use]
    pub fn query_input(&self) -> &str {
        &self.query_input
    }

    /// The query used for filtering.
    #[must_use]
    pub fn applied_query(&self) -> &str {
        &self.applied_query
    }

    /// Whether any query or filter restricts the list. Sort order does not
    /// count.
    #[must_use]
    pub fn has_active_filters(&self) -> bool {
        !self.applied_query.trim().is_empty() || self.status.is_active() || self.priority.is_active()
    }

    /// Reset query, status and priority to unfiltered and the sort to
    /// newest first.
    pub fn clear_filters(&mut self) {
        self.query_input.clear();
        self.applied_query.clear();
        self.pending_since = None;
        self.status = Filter::All;
        self.priority = Filter::All;
        self.sort = SortSpec::default();
    }

    /// Whether a task passes the applied query and filters.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.status.matches(&task.status)
            && self.priority.matches(&task.priority)
            && matches_query(task, &self.applied_query)
    }

    /// Filter and sort `tasks` for rendering.
    #[must_use]
    pub fn apply<'a>(&self, tasks: &'a [Task]) -> ListOutcome<'a> {
        if tasks.is_empty() {
            return ListOutcome::NoTasks;
        }

        let mut visible: Vec<&Task> = tasks.iter().filter(|t| self.matches(t)).collect();
        if visible.is_empty() {
            return ListOutcome::NoMatches { can_clear_filters: self.has_active_filters() };
        }

        visible.sort_by(|a, b| self.sort.compare(a, b));
        ListOutcome::Tasks(visible)
    }
}

fn matches_query(task: &Task, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    task.title.to_lowercase().contains(&needle) || task.description.to_lowercase().contains(&needle)
}
