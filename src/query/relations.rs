//! Link and subtask queries and mutations.

use crate::error::{Error, Result};
use crate::query::client::QueryClient;
use crate::query::keys;
use crate::tasks::{
    resolve_related_tasks, HierarchyEdge, HierarchyView, Link, NewLink, RelatedTask,
    TaskHierarchy, TaskLinks,
};
use crate::traits::NotificationLevel;

impl QueryClient {
    /// Links touching a task.
    ///
    /// # Errors
    ///
    /// Returns the fetch error once retries are exhausted.
    pub fn task_links(&mut self, task_id: &str) -> Result<TaskLinks> {
        let stale = self.config.stale_times.tasks();
        self.fetch(keys::tasks::links(task_id), stale, |api| api.get_task_links(task_id))
    }

    /// A task's links resolved into one row per related task. Peers without
    /// an embedded snapshot are looked up among cached tasks.
    ///
    /// # Errors
    ///
    /// Returns the fetch error once retries are exhausted.
    pub fn related_tasks(&mut self, task_id: &str) -> Result<Vec<RelatedTask>> {
        let links = self.task_links(task_id)?;
        Ok(resolve_related_tasks(task_id, &links, &self.cache))
    }

    /// Link two tasks.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for a self-link, otherwise the
    /// service error. Either is notified.
    pub fn create_link(&mut self, link: &NewLink) -> Result<Link> {
        if link.source_task_id == link.target_task_id {
            return Err(self.fail(Error::InvalidArgument(
                "A task cannot be linked to itself".to_string(),
            )));
        }
        let created = self.mutate("Tasks linked", |api| api.create_link(link))?;
        self.invalidate_links(&link.source_task_id, &link.target_task_id);
        Ok(created)
    }

    /// Delete one link between `task_id` and `peer_id`.
    ///
    /// # Errors
    ///
    /// Returns the service error after notifying it.
    pub fn delete_link(&mut self, link_id: &str, task_id: &str, peer_id: &str) -> Result<()> {
        self.mutate("Link removed", |api| api.delete_link(link_id))?;
        self.invalidate_links(task_id, peer_id);
        Ok(())
    }

    /// Delete every link behind a resolved row, in order. Stops at the
    /// first failure; links already deleted stay deleted.
    ///
    /// # Errors
    ///
    /// Returns the first service error after notifying it.
    pub fn unlink(&mut self, task_id: &str, related: &RelatedTask) -> Result<()> {
        let outcome = related.link_ids.iter().try_for_each(|id| self.api.delete_link(id));
        self.invalidate_links(task_id, &related.task.id);
        match outcome {
            Ok(()) => {
                self.notify(NotificationLevel::Success, "Link removed");
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// A task's hierarchy edges.
    ///
    /// # Errors
    ///
    /// Returns the fetch error once retries are exhausted.
    pub fn task_hierarchy(&mut self, task_id: &str) -> Result<TaskHierarchy> {
        let stale = self.config.stale_times.tasks();
        self.fetch(keys::tasks::hierarchy(task_id), stale, |api| api.get_task_hierarchy(task_id))
    }

    /// A task's parents and children as display rows.
    ///
    /// # Errors
    ///
    /// Returns the fetch error once retries are exhausted.
    pub fn subtasks(&mut self, task_id: &str) -> Result<HierarchyView> {
        Ok(HierarchyView::from_hierarchy(&self.task_hierarchy(task_id)?))
    }

    /// Make `child_task_id` a subtask of `parent_task_id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when both IDs are the same,
    /// otherwise the service error. Either is notified.
    pub fn add_subtask(&mut self, parent_task_id: &str, child_task_id: &str) -> Result<HierarchyEdge> {
        if parent_task_id == child_task_id {
            return Err(self.fail(Error::InvalidArgument(
                "A task cannot be its own subtask".to_string(),
            )));
        }
        let edge = self.mutate("Subtask added", |api| {
            api.create_hierarchy_edge(parent_task_id, child_task_id)
        })?;
        self.invalidate_hierarchy(parent_task_id, child_task_id);
        Ok(edge)
    }

    /// Remove a parent/child edge.
    ///
    /// # Errors
    ///
    /// Returns the service error after notifying it.
    pub fn remove_subtask(
        &mut self,
        edge_id: &str,
        parent_task_id: &str,
        child_task_id: &str,
    ) -> Result<()> {
        self.mutate("Subtask removed", |api| api.delete_hierarchy_edge(edge_id))?;
        self.invalidate_hierarchy(parent_task_id, child_task_id);
        Ok(())
    }

    fn invalidate_links(&mut self, a: &str, b: &str) {
        self.cache.invalidate(&keys::tasks::links(a));
        self.cache.invalidate(&keys::tasks::links(b));
    }

    fn invalidate_hierarchy(&mut self, parent: &str, child: &str) {
        self.cache.invalidate(&keys::tasks::hierarchy(parent));
        self.cache.invalidate(&keys::tasks::hierarchy(child));
    }
}
