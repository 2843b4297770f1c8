//! Entity types shared by the task board: tasks, links, hierarchy edges,
//! projects, comments and people.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tasks::relations::RelationshipType;

/// Task status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// Not started.
    #[default]
    Todo,
    /// Being worked on.
    InProgress,
    /// Finished.
    Done,
}

impl Status {
    /// All statuses in board order.
    pub const ALL: [Self; 3] = [Self::Todo, Self::InProgress, Self::Done];

    /// Parse a status from a string (case-insensitive, `-` or `_` separated).
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid status.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, InvalidStatus> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "TODO" => Ok(Self::Todo),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "DONE" => Ok(Self::Done),
            _ => Err(InvalidStatus(s.to_string())),
        }
    }

    /// Wire representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "TODO",
            Self::InProgress => "IN_PROGRESS",
            Self::Done => "DONE",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid status string is provided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidStatus(pub String);

impl std::fmt::Display for InvalidStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid status: '{}' (must be one of: todo, in_progress, done)", self.0)
    }
}

impl std::error::Error for InvalidStatus {}

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    /// Low priority.
    Low,
    /// Medium priority (default).
    #[default]
    Medium,
    /// High priority.
    High,
}

impl Priority {
    /// All priorities from lowest to highest.
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    /// Sort rank: LOW=1, MEDIUM=2, HIGH=3.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
        }
    }

    /// Parse a priority from a string (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid priority.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, InvalidPriority> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(Self::Low),
            "MEDIUM" => Ok(Self::Medium),
            "HIGH" => Ok(Self::High),
            _ => Err(InvalidPriority(s.to_string())),
        }
    }

    /// Wire representation of the priority.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid priority string is provided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidPriority(pub String);

impl std::fmt::Display for InvalidPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid priority: '{}' (must be one of: low, medium, high)", self.0)
    }
}

impl std::error::Error for InvalidPriority {}

/// A person known to the task service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Avatar image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Project-scoped role of a contributor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Created the project.
    Owner,
    /// Manages contributors and tasks.
    Admin,
    /// Edits and assigns tasks.
    Write,
    /// Read-only access.
    Read,
}

impl Role {
    /// Whether this role may add, remove or re-role contributors.
    #[must_use]
    pub const fn can_manage_contributors(self) -> bool {
        matches!(self, Self::Owner | Self::Admin)
    }

    /// Whether this role may assign or unassign tasks.
    #[must_use]
    pub const fn can_assign_tasks(self) -> bool {
        matches!(self, Self::Owner | Self::Admin | Self::Write)
    }
}

/// A user together with their role on a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contributor {
    /// The contributing user.
    pub user: User,
    /// Role on the project.
    pub role: Role,
}

/// Denormalized snapshot of a task carried on links and hierarchy edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSummary {
    /// Task identifier.
    pub id: String,
    /// Task title.
    pub title: String,
    /// Task status.
    pub status: Status,
    /// Task priority.
    pub priority: Priority,
}

/// A directed, typed link between two tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    /// Unique identifier.
    pub id: String,
    /// Task the link was recorded from.
    pub source_task_id: String,
    /// Task the link points at.
    pub target_task_id: String,
    /// Relationship as read from the source task.
    #[serde(rename = "type")]
    pub link_type: RelationshipType,
    /// When the link was created.
    pub created_at: DateTime<Utc>,
    /// Snapshot of the source task, if the service embedded it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_task: Option<TaskSummary>,
    /// Snapshot of the target task, if the service embedded it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_task: Option<TaskSummary>,
}

/// Links touching a task, split by direction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskLinks {
    /// Links where the task is the source.
    #[serde(default)]
    pub outgoing: Vec<Link>,
    /// Links where the task is the target.
    #[serde(default)]
    pub incoming: Vec<Link>,
}

impl TaskLinks {
    /// Total number of links.
    #[must_use]
    pub fn len(&self) -> usize {
        self.outgoing.len() + self.incoming.len()
    }

    /// Whether there are no links at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outgoing.is_empty() && self.incoming.is_empty()
    }
}

/// A parent/child subtask edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyEdge {
    /// Unique identifier.
    pub id: String,
    /// Parent task.
    pub parent_task_id: String,
    /// Child task.
    pub child_task_id: String,
    /// When the edge was created.
    pub created_at: DateTime<Utc>,
    /// Snapshot of the parent task, if embedded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_task: Option<TaskSummary>,
    /// Snapshot of the child task, if embedded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_task: Option<TaskSummary>,
}

/// Hierarchy edges of a task as served by the task service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskHierarchy {
    /// Edges where the task is the parent.
    #[serde(default)]
    pub children: Vec<HierarchyEdge>,
    /// Edges where the task is the child.
    #[serde(default)]
    pub parents: Vec<HierarchyEdge>,
    /// Number of children reported by the service.
    #[serde(default)]
    pub child_count: usize,
    /// Number of parents reported by the service.
    #[serde(default)]
    pub parent_count: usize,
}

/// A task on a project board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier.
    pub id: String,
    /// Short title.
    pub title: String,
    /// Longer description.
    #[serde(default)]
    pub description: String,
    /// Current status.
    pub status: Status,
    /// Priority.
    pub priority: Priority,
    /// Optional due date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    /// Owning project.
    pub project_id: String,
    /// Assigned user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<User>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
    /// Links touching the task, when the service includes them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<TaskLinks>,
    /// Hierarchy edges, when the service includes them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hierarchy: Option<TaskHierarchy>,
}

impl Task {
    /// Snapshot of this task for embedding in links and edges.
    #[must_use]
    pub fn summary(&self) -> TaskSummary {
        TaskSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            status: self.status,
            priority: self.priority,
        }
    }

    /// Whether the task is past its due date and not done.
    #[must_use]
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status != Status::Done && self.due_date.is_some_and(|due| due < now)
    }
}

/// Fields for creating a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    /// Title (required).
    pub title: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Initial status.
    #[serde(default)]
    pub status: Status,
    /// Priority.
    #[serde(default)]
    pub priority: Priority,
    /// Due date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    /// Assignee user ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
}

/// Fields that can be updated on a task.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    /// New title (if Some).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description (if Some).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New priority (if Some).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// New status (if Some).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    /// New due date (if Some).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

impl TaskUpdate {
    /// Check if any fields are set for update.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.status.is_none()
            && self.due_date.is_none()
    }
}

/// Fields for creating a link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLink {
    /// Task the link is recorded from.
    pub source_task_id: String,
    /// Task the link points at.
    pub target_task_id: String,
    /// Relationship as read from the source.
    #[serde(rename = "type")]
    pub link_type: RelationshipType,
}

/// A project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique identifier.
    pub id: String,
    /// Project name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Owning user.
    pub owner: User,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating or updating a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInput {
    /// Project name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
}

/// A comment on a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Unique identifier.
    pub id: String,
    /// Task the comment belongs to.
    pub task_id: String,
    /// Author.
    pub author: User,
    /// Markdown content.
    pub content: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last edit time.
    pub updated_at: DateTime<Utc>,
}

/// Task counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    /// Tasks in TODO.
    pub todo: usize,
    /// Tasks in progress.
    pub in_progress: usize,
    /// Tasks done.
    pub done: usize,
}

impl StatusCounts {
    /// Count the statuses of the given tasks.
    #[must_use]
    pub fn from_tasks(tasks: &[Task]) -> Self {
        tasks.iter().fold(Self::default(), |mut counts, task| {
            match task.status {
                Status::Todo => counts.todo += 1,
                Status::InProgress => counts.in_progress += 1,
                Status::Done => counts.done += 1,
            }
            counts
        })
    }

    /// Total number of tasks counted.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.todo + self.in_progress + self.done
    }
}

/// Task counts per priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityCounts {
    /// Low-priority tasks.
    pub low: usize,
    /// Medium-priority tasks.
    pub medium: usize,
    /// High-priority tasks.
    pub high: usize,
}

impl PriorityCounts {
    /// Count the priorities of the given tasks.
    #[must_use]
    pub fn from_tasks(tasks: &[Task]) -> Self {
        tasks.iter().fold(Self::default(), |mut counts, task| {
            match task.priority {
                Priority::Low => counts.low += 1,
                Priority::Medium => counts.medium += 1,
                Priority::High => counts.high += 1,
            }
            counts
        })
    }
}

/// Summary shown on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// Projects visible to the viewer.
    pub total_projects: usize,
    /// Tasks across those projects.
    pub total_tasks: usize,
    /// Task counts per status.
    pub tasks_by_status: StatusCounts,
    /// Overdue tasks.
    pub overdue_tasks: usize,
    /// Tasks assigned to the viewer.
    pub assigned_to_me: usize,
}

/// Aggregates for one project's reporting page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectReport {
    /// Reported project.
    pub project_id: String,
    /// Task counts per status.
    pub tasks_by_status: StatusCounts,
    /// Task counts per priority.
    pub tasks_by_priority: PriorityCounts,
    /// Fraction of tasks done, between 0 and 1.
    pub completion_rate: f64,
    /// Overdue tasks.
    pub overdue_tasks: usize,
}

impl ProjectReport {
    /// Compute a report locally from a project's tasks.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_tasks(project_id: &str, tasks: &[Task], now: DateTime<Utc>) -> Self {
        let tasks_by_status = StatusCounts::from_tasks(tasks);
        let completion_rate = if tasks.is_empty() {
            0.0
        } else {
            tasks_by_status.done as f64 / tasks.len() as f64
        };
        Self {
            project_id: project_id.to_string(),
            tasks_by_status,
            tasks_by_priority: PriorityCounts::from_tasks(tasks),
            completion_rate,
            overdue_tasks: tasks.iter().filter(|t| t.is_overdue(now)).count(),
        }
    }
}

/// Filter parameters sent with list requests and folded into cache keys.
pub type ListParams = BTreeMap<String, String>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn task(id: &str, status: Status, priority: Priority) -> Task {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Task {
            id: id.to_string(),
            title: format!("Task {id}"),
            description: String::new(),
            status,
            priority,
            due_date: None,
            project_id: "p-1".to_string(),
            assignee: None,
            created_at: ts,
            updated_at: ts,
            links: None,
            hierarchy: None,
        }
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!(Status::from_str("todo").unwrap(), Status::Todo);
        assert_eq!(Status::from_str("IN_PROGRESS").unwrap(), Status::InProgress);
        assert_eq!(Status::from_str("in-progress").unwrap(), Status::InProgress);
        assert_eq!(Status::from_str("Done").unwrap(), Status::Done);
        assert!(Status::from_str("blocked").is_err());
    }

    #[test]
    fn test_invalid_status_display() {
        let err = InvalidStatus("foo".to_string());
        assert!(err.to_string().contains("foo"));
        assert!(err.to_string().contains("in_progress"));
    }

    #[test]
    fn test_priority_rank() {
        assert_eq!(Priority::Low.rank(), 1);
        assert_eq!(Priority::Medium.rank(), 2);
        assert_eq!(Priority::High.rank(), 3);
    }

    #[test]
    fn test_priority_from_str() {
        assert_eq!(Priority::from_str("high").unwrap(), Priority::High);
        assert_eq!(Priority::from_str(" LOW ").unwrap(), Priority::Low);
        assert!(Priority::from_str("urgent").is_err());
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(serde_json::to_string(&Status::InProgress).unwrap(), "\"IN_PROGRESS\"");
        let parsed: Priority = serde_json::from_str("\"HIGH\"").unwrap();
        assert_eq!(parsed, Priority::High);
    }

    #[test]
    fn test_role_permissions() {
        assert!(Role::Owner.can_manage_contributors());
        assert!(Role::Admin.can_manage_contributors());
        assert!(!Role::Write.can_manage_contributors());
        assert!(!Role::Read.can_manage_contributors());

        assert!(Role::Write.can_assign_tasks());
        assert!(!Role::Read.can_assign_tasks());
    }

    #[test]
    fn test_task_deserializes_camel_case() {
        let json = r#"{
            "id": "t-1",
            "title": "Fix bug",
            "status": "TODO",
            "priority": "LOW",
            "projectId": "p-1",
            "dueDate": "2024-02-01T00:00:00Z",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z",
            "links": {
                "outgoing": [{
                    "id": "l-1",
                    "sourceTaskId": "t-1",
                    "targetTaskId": "t-2",
                    "type": "BLOCKS",
                    "createdAt": "2024-01-01T00:00:00Z"
                }]
            }
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.description, "");
        assert!(task.due_date.is_some());
        let links = task.links.unwrap();
        assert_eq!(links.len(), 1);
        assert!(links.incoming.is_empty());
        assert_eq!(links.outgoing[0].link_type, RelationshipType::Blocks);
    }

    #[test]
    fn test_task_update_is_empty() {
        assert!(TaskUpdate::default().is_empty());
        let update = TaskUpdate { status: Some(Status::Done), ..Default::default() };
        assert!(!update.is_empty());
    }

    #[test]
    fn test_is_overdue() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let mut t = task("1", Status::Todo, Priority::Low);
        assert!(!t.is_overdue(now));

        t.due_date = Some(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
        assert!(t.is_overdue(now));

        t.status = Status::Done;
        assert!(!t.is_overdue(now));
    }

    #[test]
    fn test_project_report_from_tasks() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let tasks = vec![
            task("1", Status::Done, Priority::High),
            task("2", Status::Todo, Priority::Low),
            task("3", Status::InProgress, Priority::High),
            task("4", Status::Done, Priority::Medium),
        ];
        let report = ProjectReport::from_tasks("p-1", &tasks, now);
        assert_eq!(report.tasks_by_status.total(), 4);
        assert_eq!(report.tasks_by_status.done, 2);
        assert_eq!(report.tasks_by_priority.high, 2);
        assert!((report.completion_rate - 0.5).abs() < f64::EPSILON);
        assert_eq!(report.overdue_tasks, 0);

        let empty = ProjectReport::from_tasks("p-2", &[], now);
        assert!(empty.completion_rate.abs() < f64::EPSILON);
    }
}
