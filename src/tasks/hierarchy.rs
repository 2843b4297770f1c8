//! Subtask hierarchy rows for a task's detail view.

use serde::Serialize;

use crate::tasks::models::{HierarchyEdge, TaskHierarchy, TaskSummary};

/// One parent or child row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyRow {
    /// Edge to delete when the row is removed.
    pub edge_id: String,
    /// The task on the other end of the edge.
    pub task: TaskSummary,
}

/// Parents and children of a task, ready to render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyView {
    /// Subtasks.
    pub children: Vec<HierarchyRow>,
    /// Parent tasks.
    pub parents: Vec<HierarchyRow>,
    /// Child count as reported by the service.
    pub child_count: usize,
    /// Parent count as reported by the service.
    pub parent_count: usize,
}

impl HierarchyView {
    /// Build the view from the service's hierarchy payload.
    ///
    /// Edges keep their order. An edge missing the snapshot of the task it
    /// points at is skipped with a warning. Counts are passed through
    /// untouched, so they may exceed the number of rows.
    #[must_use]
    pub fn from_hierarchy(hierarchy: &TaskHierarchy) -> Self {
        let children = hierarchy
            .children
            .iter()
            .filter_map(|edge| row(edge, edge.child_task.as_ref(), &edge.child_task_id, "child"))
            .collect();
        let parents = hierarchy
            .parents
            .iter()
            .filter_map(|edge| row(edge, edge.parent_task.as_ref(), &edge.parent_task_id, "parent"))
            .collect();

        Self {
            children,
            parents,
            child_count: hierarchy.child_count,
            parent_count: hierarchy.parent_count,
        }
    }

    /// Whether there is nothing to show.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty() && self.parents.is_empty()
    }
}

fn row(
    edge: &HierarchyEdge,
    snapshot: Option<&TaskSummary>,
    task_id: &str,
    side: &str,
) -> Option<HierarchyRow> {
    let Some(task) = snapshot else {
        tracing::warn!(edge_id = %edge.id, task_id, side, "hierarchy edge has no task snapshot, skipping");
        return None;
    };
    Some(HierarchyRow { edge_id: edge.id.clone(), task: task.clone() })
}
