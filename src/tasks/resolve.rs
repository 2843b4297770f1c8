//! Resolution of a task's links into display rows.
//!
//! Every link touching a task is read from that task's side, then links are
//! grouped by the task at the other end so each peer appears once.

use std::collections::HashMap;

use serde::Serialize;

use crate::tasks::models::{Link, TaskLinks, TaskSummary};
use crate::tasks::relations::RelationshipType;
use crate::traits::TaskLookup;

/// One related task as shown on a task's detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedTask {
    /// The task at the other end.
    pub task: TaskSummary,
    /// Relationship as read from the viewed task.
    pub relationship_type: RelationshipType,
    /// More than one link connects the two tasks.
    pub is_bidirectional: bool,
    /// First link encountered for this peer; the one unlink acts on.
    pub link_id: String,
    /// Every link connecting the two tasks, in encounter order.
    pub link_ids: Vec<String>,
}

/// Where the viewed task sits on a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Source,
    Target,
}

/// Resolve the links of `task_id` into one row per related task.
///
/// Outgoing links are visited before incoming ones. A kind recorded from the
/// peer's side is flipped. When several links reach the same peer the row
/// is marked bidirectional and keeps its first link as representative; a
/// blocking kind replaces a generic `RelatesTo`, any other combination keeps
/// the first kind seen.
///
/// Peers without an embedded snapshot are looked up with `lookup`. Peers that
/// cannot be found, and links that do not touch `task_id` at all, are
/// skipped with a warning.
#[must_use]
pub fn resolve_related_tasks<L: TaskLookup + ?Sized>(
    task_id: &str,
    links: &TaskLinks,
    lookup: &L,
) -> Vec<RelatedTask> {
    let mut rows: Vec<RelatedTask> = Vec::new();
    let mut index_by_peer: HashMap<String, usize> = HashMap::new();

    for link in links.outgoing.iter().chain(&links.incoming) {
        let Some(side) = side_of(task_id, link) else {
            tracing::warn!(
                task_id,
                link_id = %link.id,
                source = %link.source_task_id,
                target = %link.target_task_id,
                "link does not touch task, skipping"
            );
            continue;
        };

        let (peer_id, snapshot, kind) = match side {
            Side::Source => (&link.target_task_id, &link.target_task, link.link_type.clone()),
            Side::Target => (&link.source_task_id, &link.source_task, link.link_type.flip()),
        };

        if let Some(&idx) = index_by_peer.get(peer_id) {
            let row = &mut rows[idx];
            row.is_bidirectional = true;
            row.link_ids.push(link.id.clone());
            if row.relationship_type.is_generic() && kind.is_specific() {
                row.relationship_type = kind;
            }
            continue;
        }

        let Some(peer) = snapshot.clone().or_else(|| lookup.find_task(peer_id)) else {
            tracing::warn!(task_id, link_id = %link.id, peer_id = %peer_id, "related task not found, skipping");
            continue;
        };

        index_by_peer.insert(peer_id.clone(), rows.len());
        rows.push(RelatedTask {
            task: peer,
            relationship_type: kind,
            is_bidirectional: false,
            link_id: link.id.clone(),
            link_ids: vec![link.id.clone()],
        });
    }

    rows
}

fn side_of(task_id: &str, link: &Link) -> Option<Side> {
    if link.source_task_id == task_id {
        Some(Side::Source)
    } else if link.target_task_id == task_id {
        Some(Side::Target)
    } else {
        None
    }
}
