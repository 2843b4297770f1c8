//! Testing utilities and mock implementations.
//!
//! These types are provided for use in tests. They may appear unused in
//! the library itself but are consumed by unit and integration tests.
//!
//! Every mock is a cheap handle over shared state, so a test can box one
//! clone into a [`crate::query::QueryClient`] and inspect another.

#![allow(dead_code)]
#![allow(clippy::missing_panics_doc)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::error::{Error, Result};
use crate::tasks::{
    Comment, Contributor, DashboardSummary, HierarchyEdge, Link, ListParams, NewLink, NewTask,
    Priority, Project, ProjectInput, ProjectReport, RelationshipType, Role, Status, StatusCounts,
    Task, TaskHierarchy, TaskLinks, TaskUpdate, User,
};
use crate::traits::{Clock, Notification, NotificationLevel, Notifier, TaskApi};

/// The instant every fixture is stamped with.
#[must_use]
pub fn fixture_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).single().unwrap_or_default()
}

/// A user fixture.
#[must_use]
pub fn sample_user(id: &str) -> User {
    User {
        id: id.to_string(),
        name: format!("User {id}"),
        email: format!("{id}@example.com"),
        avatar_url: None,
    }
}

/// A TODO/MEDIUM task in project `p-1`.
#[must_use]
pub fn sample_task(id: &str, title: &str) -> Task {
    Task {
        id: id.to_string(),
        title: title.to_string(),
        description: String::new(),
        status: Status::Todo,
        priority: Priority::Medium,
        due_date: None,
        project_id: "p-1".to_string(),
        assignee: None,
        created_at: fixture_time(),
        updated_at: fixture_time(),
        links: None,
        hierarchy: None,
    }
}

/// A project fixture owned by `u-1`.
#[must_use]
pub fn sample_project(id: &str, name: &str) -> Project {
    Project {
        id: id.to_string(),
        name: name.to_string(),
        description: String::new(),
        owner: sample_user("u-1"),
        created_at: fixture_time(),
        updated_at: fixture_time(),
    }
}

/// A link without embedded snapshots.
#[must_use]
pub fn sample_link(id: &str, source: &str, target: &str, kind: RelationshipType) -> Link {
    Link {
        id: id.to_string(),
        source_task_id: source.to_string(),
        target_task_id: target.to_string(),
        link_type: kind,
        created_at: fixture_time(),
        source_task: None,
        target_task: None,
    }
}

/// A hierarchy edge without embedded snapshots.
#[must_use]
pub fn sample_edge(id: &str, parent: &str, child: &str) -> HierarchyEdge {
    HierarchyEdge {
        id: id.to_string(),
        parent_task_id: parent.to_string(),
        child_task_id: child.to_string(),
        created_at: fixture_time(),
        parent_task: None,
        child_task: None,
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<DateTime<Utc>>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::at(fixture_time())
    }
}

impl ManualClock {
    /// A clock stopped at `now`.
    #[must_use]
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now: Rc::new(Cell::new(now)) }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    /// Set the clock.
    pub fn set(&self, now: DateTime<Utc>) {
        self.now.set(now);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

/// A notifier that records everything it is shown.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    seen: Rc<RefCell<Vec<Notification>>>,
}

impl RecordingNotifier {
    /// Every notification so far, oldest first.
    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.seen.borrow().clone()
    }

    /// The most recent notification.
    #[must_use]
    pub fn last(&self) -> Option<Notification> {
        self.seen.borrow().last().cloned()
    }

    /// Messages of the given level, oldest first.
    #[must_use]
    pub fn messages(&self, level: NotificationLevel) -> Vec<String> {
        self.seen
            .borrow()
            .iter()
            .filter(|n| n.level == level)
            .map(|n| n.message.clone())
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.borrow_mut().push(notification);
    }
}

#[derive(Debug, Default)]
struct MockState {
    projects: Vec<Project>,
    contributors: HashMap<String, Vec<Contributor>>,
    tasks: Vec<Task>,
    links: Vec<Link>,
    edges: Vec<HierarchyEdge>,
    comments: Vec<Comment>,
    calls: HashMap<&'static str, usize>,
    failures: HashMap<&'static str, VecDeque<Error>>,
    next_id: usize,
}

impl MockState {
    fn id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", 100 + self.next_id)
    }

    fn task_mut(&mut self, task_id: &str) -> Result<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == task_id).ok_or_else(|| not_found("Task"))
    }

    fn task(&self, task_id: &str) -> Result<&Task> {
        self.tasks.iter().find(|t| t.id == task_id).ok_or_else(|| not_found("Task"))
    }

    fn with_snapshots(&self, link: &Link) -> Link {
        let mut link = link.clone();
        link.source_task = self.task(&link.source_task_id).ok().map(Task::summary);
        link.target_task = self.task(&link.target_task_id).ok().map(Task::summary);
        link
    }

    fn edge_with_snapshots(&self, edge: &HierarchyEdge) -> HierarchyEdge {
        let mut edge = edge.clone();
        edge.parent_task = self.task(&edge.parent_task_id).ok().map(Task::summary);
        edge.child_task = self.task(&edge.child_task_id).ok().map(Task::summary);
        edge
    }
}

fn not_found(kind: &str) -> Error {
    Error::api(404, format!("{kind} not found"))
}

/// An in-memory task service.
///
/// Records how often each method is called and can be told to fail the
/// next call(s) of a method with a given error.
#[derive(Debug, Clone, Default)]
pub struct MockTaskApi {
    state: Rc<RefCell<MockState>>,
}

impl MockTaskApi {
    /// Create an empty service.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a project.
    #[must_use]
    pub fn with_project(self, project: Project) -> Self {
        self.state.borrow_mut().projects.push(project);
        self
    }

    /// Seed a task.
    #[must_use]
    pub fn with_task(self, task: Task) -> Self {
        self.state.borrow_mut().tasks.push(task);
        self
    }

    /// Seed a link.
    #[must_use]
    pub fn with_link(self, link: Link) -> Self {
        self.state.borrow_mut().links.push(link);
        self
    }

    /// Seed a hierarchy edge.
    #[must_use]
    pub fn with_edge(self, edge: HierarchyEdge) -> Self {
        self.state.borrow_mut().edges.push(edge);
        self
    }

    /// Seed a contributor.
    #[must_use]
    pub fn with_contributor(self, project_id: &str, contributor: Contributor) -> Self {
        self.state
            .borrow_mut()
            .contributors
            .entry(project_id.to_string())
            .or_default()
            .push(contributor);
        self
    }

    /// Make the next call of `method` fail with `err`. Queued failures are
    /// consumed in order.
    pub fn fail_next(&self, method: &'static str, err: Error) {
        self.state.borrow_mut().failures.entry(method).or_default().push_back(err);
    }

    /// How many times `method` has been called, failures included.
    #[must_use]
    pub fn calls(&self, method: &str) -> usize {
        self.state.borrow().calls.get(method).copied().unwrap_or(0)
    }

    /// Current server-side copy of a task.
    #[must_use]
    pub fn stored_task(&self, task_id: &str) -> Option<Task> {
        self.state.borrow().task(task_id).ok().cloned()
    }

    /// Number of stored links.
    #[must_use]
    pub fn link_count(&self) -> usize {
        self.state.borrow().links.len()
    }

    fn record(&self, method: &'static str) -> Result<()> {
        let mut state = self.state.borrow_mut();
        *state.calls.entry(method).or_insert(0) += 1;
        match state.failures.get_mut(method).and_then(VecDeque::pop_front) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl TaskApi for MockTaskApi {
    fn list_projects(&self, params: &ListParams) -> Result<Vec<Project>> {
        self.record("list_projects")?;
        let search = params.get("search").map(|s| s.to_lowercase());
        Ok(self
            .state
            .borrow()
            .projects
            .iter()
            .filter(|p| search.as_ref().map_or(true, |s| p.name.to_lowercase().contains(s)))
            .cloned()
            .collect())
    }

    fn get_project(&self, project_id: &str) -> Result<Project> {
        self.record("get_project")?;
        self.state
            .borrow()
            .projects
            .iter()
            .find(|p| p.id == project_id)
            .cloned()
            .ok_or_else(|| not_found("Project"))
    }

    fn search_projects(&self, query: &str) -> Result<Vec<Project>> {
        self.record("search_projects")?;
        let query = query.to_lowercase();
        Ok(self
            .state
            .borrow()
            .projects
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&query))
            .cloned()
            .collect())
    }

    fn create_project(&self, input: &ProjectInput) -> Result<Project> {
        self.record("create_project")?;
        let mut state = self.state.borrow_mut();
        let id = state.id("p");
        let mut project = sample_project(&id, &input.name);
        project.description.clone_from(&input.description);
        state.projects.push(project.clone());
        Ok(project)
    }

    fn update_project(&self, project_id: &str, input: &ProjectInput) -> Result<Project> {
        self.record("update_project")?;
        let mut state = self.state.borrow_mut();
        let project = state
            .projects
            .iter_mut()
            .find(|p| p.id == project_id)
            .ok_or_else(|| not_found("Project"))?;
        project.name.clone_from(&input.name);
        project.description.clone_from(&input.description);
        Ok(project.clone())
    }

    fn delete_project(&self, project_id: &str) -> Result<()> {
        self.record("delete_project")?;
        let mut state = self.state.borrow_mut();
        let before = state.projects.len();
        state.projects.retain(|p| p.id != project_id);
        if state.projects.len() == before {
            return Err(not_found("Project"));
        }
        state.tasks.retain(|t| t.project_id != project_id);
        Ok(())
    }

    fn list_contributors(&self, project_id: &str) -> Result<Vec<Contributor>> {
        self.record("list_contributors")?;
        Ok(self.state.borrow().contributors.get(project_id).cloned().unwrap_or_default())
    }

    fn update_contributor_role(
        &self,
        project_id: &str,
        user_id: &str,
        role: Role,
    ) -> Result<Contributor> {
        self.record("update_contributor_role")?;
        let mut state = self.state.borrow_mut();
        let contributor = state
            .contributors
            .get_mut(project_id)
            .and_then(|list| list.iter_mut().find(|c| c.user.id == user_id))
            .ok_or_else(|| not_found("Contributor"))?;
        contributor.role = role;
        Ok(contributor.clone())
    }

    fn remove_contributor(&self, project_id: &str, user_id: &str) -> Result<()> {
        self.record("remove_contributor")?;
        let mut state = self.state.borrow_mut();
        let list = state.contributors.get_mut(project_id).ok_or_else(|| not_found("Contributor"))?;
        let before = list.len();
        list.retain(|c| c.user.id != user_id);
        if list.len() == before {
            return Err(not_found("Contributor"));
        }
        Ok(())
    }

    fn list_tasks(&self, project_id: &str, params: &ListParams) -> Result<Vec<Task>> {
        self.record("list_tasks")?;
        let status = params.get("status").and_then(|s| Status::from_str(s).ok());
        Ok(self
            .state
            .borrow()
            .tasks
            .iter()
            .filter(|t| t.project_id == project_id)
            .filter(|t| status.map_or(true, |s| t.status == s))
            .cloned()
            .collect())
    }

    fn get_task(&self, project_id: &str, task_id: &str) -> Result<Task> {
        self.record("get_task")?;
        let state = self.state.borrow();
        let task = state.task(task_id)?;
        if task.project_id != project_id {
            return Err(not_found("Task"));
        }
        Ok(task.clone())
    }

    fn search_tasks(&self, project_id: &str, query: &str) -> Result<Vec<Task>> {
        self.record("search_tasks")?;
        let query = query.to_lowercase();
        Ok(self
            .state
            .borrow()
            .tasks
            .iter()
            .filter(|t| t.project_id == project_id && t.title.to_lowercase().contains(&query))
            .cloned()
            .collect())
    }

    fn create_task(&self, project_id: &str, task: &NewTask) -> Result<Task> {
        self.record("create_task")?;
        let mut state = self.state.borrow_mut();
        let id = state.id("t");
        let mut created = sample_task(&id, &task.title);
        created.project_id = project_id.to_string();
        created.description.clone_from(&task.description);
        created.status = task.status;
        created.priority = task.priority;
        created.due_date = task.due_date;
        created.assignee = task.assignee_id.as_deref().map(sample_user);
        state.tasks.push(created.clone());
        Ok(created)
    }

    fn update_task(&self, _project_id: &str, task_id: &str, update: &TaskUpdate) -> Result<Task> {
        self.record("update_task")?;
        let mut state = self.state.borrow_mut();
        let task = state.task_mut(task_id)?;
        if let Some(title) = &update.title {
            task.title.clone_from(title);
        }
        if let Some(description) = &update.description {
            task.description.clone_from(description);
        }
        if let Some(priority) = update.priority {
            task.priority = priority;
        }
        if let Some(status) = update.status {
            task.status = status;
        }
        if update.due_date.is_some() {
            task.due_date = update.due_date;
        }
        Ok(task.clone())
    }

    fn update_task_status(&self, _project_id: &str, task_id: &str, status: Status) -> Result<Task> {
        self.record("update_task_status")?;
        let mut state = self.state.borrow_mut();
        let task = state.task_mut(task_id)?;
        task.status = status;
        Ok(task.clone())
    }

    fn assign_task(&self, _project_id: &str, task_id: &str, user_id: Option<&str>) -> Result<Task> {
        self.record("assign_task")?;
        let mut state = self.state.borrow_mut();
        let task = state.task_mut(task_id)?;
        task.assignee = user_id.map(sample_user);
        Ok(task.clone())
    }

    fn delete_task(&self, _project_id: &str, task_id: &str) -> Result<()> {
        self.record("delete_task")?;
        let mut state = self.state.borrow_mut();
        state.task(task_id)?;
        state.tasks.retain(|t| t.id != task_id);
        state.links.retain(|l| l.source_task_id != task_id && l.target_task_id != task_id);
        state.edges.retain(|e| e.parent_task_id != task_id && e.child_task_id != task_id);
        Ok(())
    }

    fn get_task_links(&self, task_id: &str) -> Result<TaskLinks> {
        self.record("get_task_links")?;
        let state = self.state.borrow();
        Ok(TaskLinks {
            outgoing: state
                .links
                .iter()
                .filter(|l| l.source_task_id == task_id)
                .map(|l| state.with_snapshots(l))
                .collect(),
            incoming: state
                .links
                .iter()
                .filter(|l| l.target_task_id == task_id)
                .map(|l| state.with_snapshots(l))
                .collect(),
        })
    }

    fn create_link(&self, link: &NewLink) -> Result<Link> {
        self.record("create_link")?;
        let mut state = self.state.borrow_mut();
        state.task(&link.source_task_id)?;
        state.task(&link.target_task_id)?;
        let id = state.id("l");
        let created =
            sample_link(&id, &link.source_task_id, &link.target_task_id, link.link_type.clone());
        state.links.push(created.clone());
        Ok(state.with_snapshots(&created))
    }

    fn delete_link(&self, link_id: &str) -> Result<()> {
        self.record("delete_link")?;
        let mut state = self.state.borrow_mut();
        let before = state.links.len();
        state.links.retain(|l| l.id != link_id);
        if state.links.len() == before {
            return Err(not_found("Link"));
        }
        Ok(())
    }

    fn get_task_hierarchy(&self, task_id: &str) -> Result<TaskHierarchy> {
        self.record("get_task_hierarchy")?;
        let state = self.state.borrow();
        let children: Vec<HierarchyEdge> = state
            .edges
            .iter()
            .filter(|e| e.parent_task_id == task_id)
            .map(|e| state.edge_with_snapshots(e))
            .collect();
        let parents: Vec<HierarchyEdge> = state
            .edges
            .iter()
            .filter(|e| e.child_task_id == task_id)
            .map(|e| state.edge_with_snapshots(e))
            .collect();
        Ok(TaskHierarchy {
            child_count: children.len(),
            parent_count: parents.len(),
            children,
            parents,
        })
    }

    fn create_hierarchy_edge(&self, parent_task_id: &str, child_task_id: &str) -> Result<HierarchyEdge> {
        self.record("create_hierarchy_edge")?;
        let mut state = self.state.borrow_mut();
        state.task(parent_task_id)?;
        state.task(child_task_id)?;
        let id = state.id("h");
        let edge = sample_edge(&id, parent_task_id, child_task_id);
        state.edges.push(edge.clone());
        Ok(state.edge_with_snapshots(&edge))
    }

    fn delete_hierarchy_edge(&self, edge_id: &str) -> Result<()> {
        self.record("delete_hierarchy_edge")?;
        let mut state = self.state.borrow_mut();
        let before = state.edges.len();
        state.edges.retain(|e| e.id != edge_id);
        if state.edges.len() == before {
            return Err(not_found("Subtask link"));
        }
        Ok(())
    }

    fn list_comments(&self, _project_id: &str, task_id: &str) -> Result<Vec<Comment>> {
        self.record("list_comments")?;
        Ok(self.state.borrow().comments.iter().filter(|c| c.task_id == task_id).cloned().collect())
    }

    fn create_comment(&self, _project_id: &str, task_id: &str, content: &str) -> Result<Comment> {
        self.record("create_comment")?;
        let mut state = self.state.borrow_mut();
        state.task(task_id)?;
        let id = state.id("c");
        let comment = Comment {
            id,
            task_id: task_id.to_string(),
            author: sample_user("u-1"),
            content: content.to_string(),
            created_at: fixture_time(),
            updated_at: fixture_time(),
        };
        state.comments.push(comment.clone());
        Ok(comment)
    }

    fn update_comment(
        &self,
        _project_id: &str,
        _task_id: &str,
        comment_id: &str,
        content: &str,
    ) -> Result<Comment> {
        self.record("update_comment")?;
        let mut state = self.state.borrow_mut();
        let comment = state
            .comments
            .iter_mut()
            .find(|c| c.id == comment_id)
            .ok_or_else(|| not_found("Comment"))?;
        comment.content = content.to_string();
        Ok(comment.clone())
    }

    fn delete_comment(&self, _project_id: &str, _task_id: &str, comment_id: &str) -> Result<()> {
        self.record("delete_comment")?;
        let mut state = self.state.borrow_mut();
        let before = state.comments.len();
        state.comments.retain(|c| c.id != comment_id);
        if state.comments.len() == before {
            return Err(not_found("Comment"));
        }
        Ok(())
    }

    fn dashboard_summary(&self) -> Result<DashboardSummary> {
        self.record("dashboard_summary")?;
        let state = self.state.borrow();
        Ok(DashboardSummary {
            total_projects: state.projects.len(),
            total_tasks: state.tasks.len(),
            tasks_by_status: StatusCounts::from_tasks(&state.tasks),
            overdue_tasks: state.tasks.iter().filter(|t| t.is_overdue(fixture_time())).count(),
            assigned_to_me: state
                .tasks
                .iter()
                .filter(|t| t.assignee.as_ref().is_some_and(|u| u.id == "u-1"))
                .count(),
        })
    }

    fn project_report(&self, project_id: &str) -> Result<ProjectReport> {
        self.record("project_report")?;
        let state = self.state.borrow();
        let tasks: Vec<Task> =
            state.tasks.iter().filter(|t| t.project_id == project_id).cloned().collect();
        Ok(ProjectReport::from_tasks(project_id, &tasks, fixture_time()))
    }
}
