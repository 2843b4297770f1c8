//! Core traits for testability and abstraction.
//!
//! The task service, the notification surface, the clock and task lookup
//! are all collaborators owned by the embedding application. They are
//! modelled as traits so the query layer can run against mocks.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::tasks::{
    Comment, Contributor, DashboardSummary, HierarchyEdge, Link, ListParams, NewLink, NewTask,
    Project, ProjectInput, ProjectReport, Role, Status, Task, TaskHierarchy, TaskLinks,
    TaskSummary, TaskUpdate,
};

/// The REST task service.
///
/// Each method maps to one resource-oriented request. Implementations
/// return [`crate::Error::Api`] for transport and server failures.
#[allow(clippy::missing_errors_doc)]
pub trait TaskApi {
    // Projects
    /// List projects matching the given filters.
    fn list_projects(&self, params: &ListParams) -> Result<Vec<Project>>;

    /// Get a project by ID.
    fn get_project(&self, project_id: &str) -> Result<Project>;

    /// Search projects by name.
    fn search_projects(&self, query: &str) -> Result<Vec<Project>>;

    /// Create a project.
    fn create_project(&self, input: &ProjectInput) -> Result<Project>;

    /// Update a project.
    fn update_project(&self, project_id: &str, input: &ProjectInput) -> Result<Project>;

    /// Delete a project.
    fn delete_project(&self, project_id: &str) -> Result<()>;

    // Contributors
    /// List a project's contributors.
    fn list_contributors(&self, project_id: &str) -> Result<Vec<Contributor>>;

    /// Change a contributor's role.
    fn update_contributor_role(
        &self,
        project_id: &str,
        user_id: &str,
        role: Role,
    ) -> Result<Contributor>;

    /// Remove a contributor from a project.
    fn remove_contributor(&self, project_id: &str, user_id: &str) -> Result<()>;

    // Tasks
    /// List a project's tasks.
    fn list_tasks(&self, project_id: &str, params: &ListParams) -> Result<Vec<Task>>;

    /// Get a task by ID.
    fn get_task(&self, project_id: &str, task_id: &str) -> Result<Task>;

    /// Search a project's tasks.
    fn search_tasks(&self, project_id: &str, query: &str) -> Result<Vec<Task>>;

    /// Create a task.
    fn create_task(&self, project_id: &str, task: &NewTask) -> Result<Task>;

    /// Update a task's fields.
    fn update_task(&self, project_id: &str, task_id: &str, update: &TaskUpdate) -> Result<Task>;

    /// Change a task's status.
    fn update_task_status(&self, project_id: &str, task_id: &str, status: Status)
        -> Result<Task>;

    /// Assign a task to a user, or unassign it with `None`.
    fn assign_task(&self, project_id: &str, task_id: &str, user_id: Option<&str>)
        -> Result<Task>;

    /// Delete a task.
    fn delete_task(&self, project_id: &str, task_id: &str) -> Result<()>;

    // Links and hierarchy
    /// Get the links touching a task.
    fn get_task_links(&self, task_id: &str) -> Result<TaskLinks>;

    /// Create a link.
    fn create_link(&self, link: &NewLink) -> Result<Link>;

    /// Delete a link.
    fn delete_link(&self, link_id: &str) -> Result<()>;

    /// Get a task's hierarchy edges.
    fn get_task_hierarchy(&self, task_id: &str) -> Result<TaskHierarchy>;

    /// Make `child_task_id` a subtask of `parent_task_id`.
    fn create_hierarchy_edge(&self, parent_task_id: &str, child_task_id: &str)
        -> Result<HierarchyEdge>;

    /// Delete a hierarchy edge.
    fn delete_hierarchy_edge(&self, edge_id: &str) -> Result<()>;

    // Comments
    /// List a task's comments.
    fn list_comments(&self, project_id: &str, task_id: &str) -> Result<Vec<Comment>>;

    /// Add a comment to a task.
    fn create_comment(&self, project_id: &str, task_id: &str, content: &str) -> Result<Comment>;

    /// Edit a comment.
    fn update_comment(
        &self,
        project_id: &str,
        task_id: &str,
        comment_id: &str,
        content: &str,
    ) -> Result<Comment>;

    /// Delete a comment.
    fn delete_comment(&self, project_id: &str, task_id: &str, comment_id: &str) -> Result<()>;

    // Aggregates
    /// Dashboard summary for the viewer.
    fn dashboard_summary(&self) -> Result<DashboardSummary>;

    /// Reporting aggregates for a project.
    fn project_report(&self, project_id: &str) -> Result<ProjectReport>;
}

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// The action succeeded.
    Success,
    /// The action failed.
    Error,
}

/// A transient message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity.
    pub level: NotificationLevel,
    /// Message text.
    pub message: String,
}

/// The toast/notification surface. Fire-and-forget.
pub trait Notifier {
    /// Show a notification.
    fn notify(&self, notification: Notification);
}

/// A notifier that drops every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _notification: Notification) {}
}

/// Source of the current time.
pub trait Clock {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Finds a task snapshot by ID among already-fetched data.
pub trait TaskLookup {
    /// Look up a task, returning `None` if it is not known.
    fn find_task(&self, task_id: &str) -> Option<TaskSummary>;
}

impl TaskLookup for [Task] {
    fn find_task(&self, task_id: &str) -> Option<TaskSummary> {
        self.iter().find(|t| t.id == task_id).map(Task::summary)
    }
}

impl TaskLookup for Vec<Task> {
    fn find_task(&self, task_id: &str) -> Option<TaskSummary> {
        self.as_slice().find_task(task_id)
    }
}

impl TaskLookup for HashMap<String, Task> {
    fn find_task(&self, task_id: &str) -> Option<TaskSummary> {
        self.get(task_id).map(Task::summary)
    }
}

/// A lookup that knows no tasks.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLookup;

impl TaskLookup for NoLookup {
    fn find_task(&self, _task_id: &str) -> Option<TaskSummary> {
        None
    }
}
