//! Hierarchical cache keys.
//!
//! Keys are ordered segment lists such as `["tasks", "detail", "p-1", "t-9"]`.
//! Invalidation works on prefixes, so `["tasks", "list", "p-1"]` covers
//! every filtered list of project `p-1`.

use crate::tasks::ListParams;

/// A cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    /// Build a key from segments.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Append a segment, returning the extended key.
    #[must_use]
    pub fn with(mut self, segment: impl Into<String>) -> Self {
        self.0.push(segment.into());
        self
    }

    /// Whether this key lies under (or equals) `prefix`.
    #[must_use]
    pub fn starts_with(&self, prefix: &Self) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// The key's segments.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

/// Render filter parameters as one canonical segment (`a=1&b=2`).
/// Parameters are already sorted by key; empty values are dropped.
#[must_use]
pub fn params_segment(params: &ListParams) -> String {
    params
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Keys for projects.
pub mod projects {
    use super::{params_segment, QueryKey};
    use crate::tasks::ListParams;

    /// Everything about projects.
    #[must_use]
    pub fn all() -> QueryKey {
        QueryKey::new(["projects"])
    }

    /// All project lists.
    #[must_use]
    pub fn lists() -> QueryKey {
        all().with("list")
    }

    /// One filtered project list.
    #[must_use]
    pub fn list(params: &ListParams) -> QueryKey {
        lists().with(params_segment(params))
    }

    /// All project details.
    #[must_use]
    pub fn details() -> QueryKey {
        all().with("detail")
    }

    /// One project.
    #[must_use]
    pub fn detail(project_id: &str) -> QueryKey {
        details().with(project_id)
    }

    /// A project search.
    #[must_use]
    pub fn search(query: &str) -> QueryKey {
        all().with("search").with(query)
    }

    /// A project's contributors.
    #[must_use]
    pub fn contributors(project_id: &str) -> QueryKey {
        all().with("contributors").with(project_id)
    }
}

/// Keys for tasks, their links and their hierarchy.
pub mod tasks {
    use super::{params_segment, QueryKey};
    use crate::tasks::ListParams;

    /// Everything about tasks.
    #[must_use]
    pub fn all() -> QueryKey {
        QueryKey::new(["tasks"])
    }

    /// All task lists of a project.
    #[must_use]
    pub fn lists(project_id: &str) -> QueryKey {
        all().with("list").with(project_id)
    }

    /// One filtered task list.
    #[must_use]
    pub fn list(project_id: &str, params: &ListParams) -> QueryKey {
        lists(project_id).with(params_segment(params))
    }

    /// All task details.
    #[must_use]
    pub fn details() -> QueryKey {
        all().with("detail")
    }

    /// One task.
    #[must_use]
    pub fn detail(project_id: &str, task_id: &str) -> QueryKey {
        details().with(project_id).with(task_id)
    }

    /// A task search within a project.
    #[must_use]
    pub fn search(project_id: &str, query: &str) -> QueryKey {
        all().with("search").with(project_id).with(query)
    }

    /// Links touching a task.
    #[must_use]
    pub fn links(task_id: &str) -> QueryKey {
        all().with("links").with(task_id)
    }

    /// A task's hierarchy edges.
    #[must_use]
    pub fn hierarchy(task_id: &str) -> QueryKey {
        all().with("hierarchy").with(task_id)
    }
}

/// Keys for comments.
pub mod comments {
    use super::QueryKey;

    /// Everything about comments.
    #[must_use]
    pub fn all() -> QueryKey {
        QueryKey::new(["comments"])
    }

    /// Comments of one task.
    #[must_use]
    pub fn list(project_id: &str, task_id: &str) -> QueryKey {
        all().with("list").with(project_id).with(task_id)
    }
}

/// Keys for the dashboard.
pub mod dashboard {
    use super::QueryKey;

    /// Everything on the dashboard.
    #[must_use]
    pub fn all() -> QueryKey {
        QueryKey::new(["dashboard"])
    }

    /// The summary cards.
    #[must_use]
    pub fn summary() -> QueryKey {
        all().with("summary")
    }
}

/// Keys for reporting aggregates.
pub mod reporting {
    use super::QueryKey;

    /// Every report.
    #[must_use]
    pub fn all() -> QueryKey {
        QueryKey::new(["reporting"])
    }

    /// One project's report.
    #[must_use]
    pub fn project(project_id: &str) -> QueryKey {
        all().with("project").with(project_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_is_under_all() {
        let key = tasks::detail("p-1", "t-1");
        assert!(key.starts_with(&tasks::all()));
        assert!(key.starts_with(&tasks::details()));
        assert!(!key.starts_with(&tasks::lists("p-1")));
    }

    #[test]
    fn test_list_is_under_project_lists() {
        let mut params = ListParams::new();
        params.insert("status".to_string(), "DONE".to_string());
        let key = tasks::list("p-1", &params);
        assert!(key.starts_with(&tasks::lists("p-1")));
        assert!(!key.starts_with(&tasks::lists("p-2")));
    }

    #[test]
    fn test_params_segment_is_canonical() {
        let mut a = ListParams::new();
        a.insert("status".to_string(), "TODO".to_string());
        a.insert("assignee".to_string(), "u-1".to_string());
        a.insert("empty".to_string(), String::new());

        let mut b = ListParams::new();
        b.insert("assignee".to_string(), "u-1".to_string());
        b.insert("status".to_string(), "TODO".to_string());

        assert_eq!(params_segment(&a), "assignee=u-1&status=TODO");
        assert_eq!(projects::list(&a), projects::list(&b));
    }

    #[test]
    fn test_namespaces_do_not_overlap() {
        assert!(!comments::list("p", "t").starts_with(&tasks::all()));
        assert!(!reporting::project("p").starts_with(&dashboard::all()));
        assert!(!projects::contributors("p").starts_with(&projects::details()));
    }

    #[test]
    fn test_display() {
        assert_eq!(tasks::links("t-1").to_string(), "[tasks, links, t-1]");
    }
}
