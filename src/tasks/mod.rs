//! Task board domain model.
//!
//! This module provides:
//! - Tasks, projects, comments and contributors as served by the task service
//! - Typed links between tasks, with a perspective flip for the target side
//! - Resolution of a task's links into one row per related task
//! - Parent/child subtask rows
//!
//! # Example
//!
//! ```
//! use taskdeck::tasks::{resolve_related_tasks, RelationshipType, TaskLinks};
//! use taskdeck::traits::NoLookup;
//!
//! assert_eq!(RelationshipType::Blocks.flip(), RelationshipType::IsBlockedBy);
//! assert!(resolve_related_tasks("t-1", &TaskLinks::default(), &NoLookup).is_empty());
//! ```

pub mod hierarchy;
pub mod models;
pub mod relations;
pub mod resolve;

pub use hierarchy::{HierarchyRow, HierarchyView};
pub use models::{
    Comment, Contributor, DashboardSummary, HierarchyEdge, InvalidPriority, InvalidStatus, Link,
    ListParams, NewLink, NewTask, Priority, PriorityCounts, Project, ProjectInput, ProjectReport,
    Role, Status, StatusCounts, Task, TaskHierarchy, TaskLinks, TaskSummary, TaskUpdate, User,
};
pub use relations::RelationshipType;
pub use resolve::{resolve_related_tasks, RelatedTask};
