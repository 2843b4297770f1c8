//! Task queries and mutations, including the optimistic status change.

use crate::error::{Error, Result};
use crate::query::client::QueryClient;
use crate::query::keys;
use crate::tasks::{ListParams, NewTask, Role, Status, Task, TaskUpdate};
use crate::traits::NotificationLevel;

impl QueryClient {
    /// A project's tasks matching `params`.
    ///
    /// # Errors
    ///
    /// Returns the fetch error once retries are exhausted.
    pub fn tasks(&mut self, project_id: &str, params: &ListParams) -> Result<Vec<Task>> {
        let stale = self.config.stale_times.tasks();
        self.fetch(keys::tasks::list(project_id, params), stale, |api| {
            api.list_tasks(project_id, params)
        })
    }

    /// One task.
    ///
    /// # Errors
    ///
    /// Returns the fetch error once retries are exhausted.
    pub fn task(&mut self, project_id: &str, task_id: &str) -> Result<Task> {
        let stale = self.config.stale_times.tasks();
        self.fetch(keys::tasks::detail(project_id, task_id), stale, |api| {
            api.get_task(project_id, task_id)
        })
    }

    /// Tasks of a project matching `query`. A blank query matches nothing
    /// and makes no request.
    ///
    /// # Errors
    ///
    /// Returns the fetch error once retries are exhausted.
    pub fn search_tasks(&mut self, project_id: &str, query: &str) -> Result<Vec<Task>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let stale = self.config.stale_times.tasks();
        self.fetch(keys::tasks::search(project_id, query), stale, |api| {
            api.search_tasks(project_id, query)
        })
    }

    /// Create a task.
    ///
    /// # Errors
    ///
    /// Returns the service error after notifying it.
    pub fn create_task(&mut self, project_id: &str, task: &NewTask) -> Result<Task> {
        let created = self.mutate("Task created", |api| api.create_task(project_id, task))?;
        self.invalidate_task_aggregates(project_id);
        Ok(created)
    }

    /// Update a task's fields.
    ///
    /// # Errors
    ///
    /// Returns the service error after notifying it.
    pub fn update_task(
        &mut self,
        project_id: &str,
        task_id: &str,
        update: &TaskUpdate,
    ) -> Result<Task> {
        let task = self.mutate("Task updated", |api| api.update_task(project_id, task_id, update))?;
        self.cache.set(keys::tasks::detail(project_id, task_id), &task)?;
        self.cache.invalidate(&keys::tasks::lists(project_id));
        Ok(task)
    }

    /// Delete a task.
    ///
    /// # Errors
    ///
    /// Returns the service error after notifying it.
    pub fn delete_task(&mut self, project_id: &str, task_id: &str) -> Result<()> {
        self.mutate("Task deleted", |api| api.delete_task(project_id, task_id))?;
        self.cache.remove(&keys::tasks::detail(project_id, task_id));
        self.cache.remove(&keys::tasks::links(task_id));
        self.cache.remove(&keys::tasks::hierarchy(task_id));
        self.invalidate_task_aggregates(project_id);
        Ok(())
    }

    /// Assign a task, or unassign it with `None`, on behalf of a viewer
    /// holding `viewer_role`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Forbidden`] without calling the service when the
    /// viewer cannot assign tasks, otherwise the service error. Either is
    /// notified.
    pub fn assign_task(
        &mut self,
        viewer_role: Role,
        project_id: &str,
        task_id: &str,
        user_id: Option<&str>,
    ) -> Result<Task> {
        if !viewer_role.can_assign_tasks() {
            return Err(self.fail(Error::Forbidden(
                "You do not have permission to assign tasks".to_string(),
            )));
        }
        let message = if user_id.is_some() { "Task assigned" } else { "Task unassigned" };
        let task = self.mutate(message, |api| api.assign_task(project_id, task_id, user_id))?;
        self.cache.set(keys::tasks::detail(project_id, task_id), &task)?;
        self.cache.invalidate(&keys::tasks::lists(project_id));
        Ok(task)
    }

    /// Change a task's status optimistically.
    ///
    /// The cached detail and every cached list of the project show the new
    /// status before the request is sent. If the request fails, those
    /// entries are put back exactly as they were.
    ///
    /// # Errors
    ///
    /// Returns the service error after rolling back and notifying it.
    pub fn update_status(&mut self, project_id: &str, task_id: &str, status: Status) -> Result<Task> {
        let detail = keys::tasks::detail(project_id, task_id);
        let lists = keys::tasks::lists(project_id);
        let snapshot = self.cache.snapshot(std::slice::from_ref(&detail), std::slice::from_ref(&lists));

        if let Err(err) = self.patch_status(&detail, &lists, task_id, status) {
            self.cache.restore(snapshot);
            return Err(err);
        }

        match self.api.update_task_status(project_id, task_id, status) {
            Ok(task) => {
                self.cache.set(detail, &task)?;
                self.invalidate_task_aggregates(project_id);
                self.notify(NotificationLevel::Success, "Task status updated");
                Ok(task)
            }
            Err(err) => {
                self.cache.restore(snapshot);
                tracing::debug!(task_id, "status change rolled back");
                Err(self.fail(err))
            }
        }
    }

    fn patch_status(
        &mut self,
        detail: &keys::QueryKey,
        lists: &keys::QueryKey,
        task_id: &str,
        status: Status,
    ) -> Result<()> {
        self.cache.update::<Task, _>(detail, |task| task.status = status)?;
        self.cache.update_all::<Vec<Task>, _>(lists, |tasks| {
            for task in tasks.iter_mut().filter(|t| t.id == task_id) {
                task.status = status;
            }
        })?;
        Ok(())
    }

    fn invalidate_task_aggregates(&mut self, project_id: &str) {
        self.cache.invalidate(&keys::tasks::lists(project_id));
        self.cache.invalidate(&keys::dashboard::all());
        self.cache.invalidate(&keys::reporting::project(project_id));
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use crate::config::ClientConfig;
    use crate::error::Error;
    use crate::query::{keys, QueryCache, QueryClient, GENERIC_ERROR_MESSAGE};
    use crate::tasks::{ListParams, NewTask, Role, Status, Task, TaskUpdate};
    use crate::testing::{sample_task, ManualClock, MockTaskApi, RecordingNotifier};
    use crate::traits::NotificationLevel;

    fn setup() -> (MockTaskApi, RecordingNotifier, QueryClient) {
        let api = MockTaskApi::new()
            .with_task(sample_task("t-1", "Write docs"))
            .with_task(sample_task("t-2", "Ship release"));
        let notifier = RecordingNotifier::default();
        let client = QueryClient::new(
            Box::new(api.clone()),
            Box::new(notifier.clone()),
            QueryCache::new(Box::new(ManualClock::default())),
            ClientConfig::default(),
        );
        (api, notifier, client)
    }

    fn done_only() -> ListParams {
        let mut params = ListParams::new();
        params.insert("status".to_string(), "DONE".to_string());
        params
    }

    #[test]
    fn test_tasks_and_detail_are_cached() {
        let (api, _notifier, mut client) = setup();
        assert_eq!(client.tasks("p-1", &ListParams::new()).unwrap().len(), 2);
        assert_eq!(client.tasks("p-1", &ListParams::new()).unwrap().len(), 2);
        assert_eq!(api.calls("list_tasks"), 1);

        client.task("p-1", "t-1").unwrap();
        client.task("p-1", "t-1").unwrap();
        assert_eq!(api.calls("get_task"), 1);
    }

    #[test]
    fn test_search_tasks() {
        let (api, _notifier, mut client) = setup();
        assert!(client.search_tasks("p-1", "").unwrap().is_empty());
        assert_eq!(api.calls("search_tasks"), 0);
        assert_eq!(client.search_tasks("p-1", "ship").unwrap()[0].id, "t-2");
    }

    #[test]
    fn test_create_invalidates_lists_dashboard_and_reporting() {
        let (_api, _notifier, mut client) = setup();
        client.tasks("p-1", &ListParams::new()).unwrap();
        client.dashboard_summary().unwrap();
        client.project_report("p-1").unwrap();

        let new = NewTask { title: "Triage".to_string(), ..Default::default() };
        client.create_task("p-1", &new).unwrap();

        let hour = Duration::hours(1);
        assert!(client.cache().is_stale(&keys::tasks::list("p-1", &ListParams::new()), hour));
        assert!(client.cache().is_stale(&keys::dashboard::summary(), hour));
        assert!(client.cache().is_stale(&keys::reporting::project("p-1"), hour));
        assert_eq!(client.tasks("p-1", &ListParams::new()).unwrap().len(), 3);
    }

    #[test]
    fn test_update_sets_detail() {
        let (api, _notifier, mut client) = setup();
        let update = TaskUpdate { title: Some("Write better docs".to_string()), ..Default::default() };
        client.update_task("p-1", "t-1", &update).unwrap();

        assert_eq!(client.task("p-1", "t-1").unwrap().title, "Write better docs");
        assert_eq!(api.calls("get_task"), 0);
    }

    #[test]
    fn test_delete_removes_detail_links_and_hierarchy() {
        let (_api, _notifier, mut client) = setup();
        client.task("p-1", "t-1").unwrap();
        client.task_links("t-1").unwrap();
        client.task_hierarchy("t-1").unwrap();

        client.delete_task("p-1", "t-1").unwrap();
        assert!(client.cache().get_raw(&keys::tasks::detail("p-1", "t-1")).is_none());
        assert!(client.cache().get_raw(&keys::tasks::links("t-1")).is_none());
        assert!(client.cache().get_raw(&keys::tasks::hierarchy("t-1")).is_none());
    }

    #[test]
    fn test_assign_and_unassign() {
        let (_api, notifier, mut client) = setup();
        let task = client.assign_task(Role::Write, "p-1", "t-1", Some("u-2")).unwrap();
        assert_eq!(task.assignee.unwrap().id, "u-2");

        let task = client.assign_task(Role::Write, "p-1", "t-1", None).unwrap();
        assert!(task.assignee.is_none());
        assert_eq!(
            notifier.messages(NotificationLevel::Success),
            vec!["Task assigned".to_string(), "Task unassigned".to_string()]
        );
    }

    #[test]
    fn test_read_viewer_cannot_assign() {
        let (api, notifier, mut client) = setup();
        let err = client.assign_task(Role::Read, "p-1", "t-1", Some("u-2")).unwrap_err();

        assert!(matches!(err, Error::Forbidden(_)));
        assert_eq!(api.calls("assign_task"), 0);
        assert!(api.stored_task("t-1").unwrap().assignee.is_none());
        assert_eq!(
            notifier.messages(NotificationLevel::Error),
            vec!["You do not have permission to assign tasks".to_string()]
        );
    }

    #[test]
    fn test_update_status_success() {
        let (api, notifier, mut client) = setup();
        client.task("p-1", "t-1").unwrap();
        client.tasks("p-1", &ListParams::new()).unwrap();

        let task = client.update_status("p-1", "t-1", Status::Done).unwrap();
        assert_eq!(task.status, Status::Done);
        assert_eq!(api.stored_task("t-1").unwrap().status, Status::Done);

        let cached: Task = client.cache().get(&keys::tasks::detail("p-1", "t-1")).unwrap().unwrap();
        assert_eq!(cached.status, Status::Done);
        assert!(client.cache().is_stale(&keys::tasks::list("p-1", &ListParams::new()), Duration::hours(1)));
        assert_eq!(notifier.last().unwrap().level, NotificationLevel::Success);
    }

    #[test]
    fn test_update_status_failure_restores_cache_exactly() {
        let (api, notifier, mut client) = setup();
        client.task("p-1", "t-1").unwrap();
        client.tasks("p-1", &ListParams::new()).unwrap();
        client.tasks("p-1", &done_only()).unwrap();

        let detail = keys::tasks::detail("p-1", "t-1");
        let all = keys::tasks::list("p-1", &ListParams::new());
        let done = keys::tasks::list("p-1", &done_only());
        let before = [detail.clone(), all.clone(), done.clone()]
            .map(|key| client.cache().get_raw(&key).cloned());

        api.fail_next("update_task_status", Error::Api { status: Some(500), message: None });
        assert!(client.update_status("p-1", "t-1", Status::InProgress).is_err());

        let after = [detail, all, done].map(|key| client.cache().get_raw(&key).cloned());
        assert_eq!(before, after);
        assert_eq!(client.cache().len(), 3);
        assert_eq!(api.stored_task("t-1").unwrap().status, Status::Todo);
        assert_eq!(notifier.messages(NotificationLevel::Error), vec![GENERIC_ERROR_MESSAGE.to_string()]);
    }

    #[test]
    fn test_update_status_failure_without_cached_data() {
        let (api, _notifier, mut client) = setup();
        api.fail_next("update_task_status", Error::api(403, "Read-only project"));

        let err = client.update_status("p-1", "t-1", Status::Done).unwrap_err();
        assert_eq!(err.server_message(), Some("Read-only project"));
        assert!(client.cache().is_empty());
    }

    #[test]
    fn test_mutations_are_not_retried() {
        let (api, _notifier, mut client) = setup();
        api.fail_next("update_task", Error::api(500, "boom"));
        let update = TaskUpdate { title: Some("x".to_string()), ..Default::default() };
        assert!(client.update_task("p-1", "t-1", &update).is_err());
        assert_eq!(api.calls("update_task"), 1);
    }
}
