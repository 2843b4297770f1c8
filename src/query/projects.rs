//! Project queries and mutations.

use crate::error::Result;
use crate::query::client::QueryClient;
use crate::query::keys;
use crate::tasks::{ListParams, Project, ProjectInput};

impl QueryClient {
    /// Projects matching `params`.
    ///
    /// # Errors
    ///
    /// Returns the fetch error once retries are exhausted.
    pub fn projects(&mut self, params: &ListParams) -> Result<Vec<Project>> {
        let stale = self.config.stale_times.projects();
        self.fetch(keys::projects::list(params), stale, |api| api.list_projects(params))
    }

    /// One project.
    ///
    /// # Errors
    ///
    /// Returns the fetch error once retries are exhausted.
    pub fn project(&mut self, project_id: &str) -> Result<Project> {
        let stale = self.config.stale_times.projects();
        self.fetch(keys::projects::detail(project_id), stale, |api| api.get_project(project_id))
    }

    /// Projects whose name matches `query`. A blank query matches nothing
    /// and makes no request.
    ///
    /// # Errors
    ///
    /// Returns the fetch error once retries are exhausted.
    pub fn search_projects(&mut self, query: &str) -> Result<Vec<Project>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let stale = self.config.stale_times.projects();
        self.fetch(keys::projects::search(query), stale, |api| api.search_projects(query))
    }

    /// Create a project.
    ///
    /// # Errors
    ///
    /// Returns the service error after notifying it.
    pub fn create_project(&mut self, input: &ProjectInput) -> Result<Project> {
        let project = self.mutate("Project created", |api| api.create_project(input))?;
        self.cache.invalidate(&keys::projects::lists());
        self.cache.invalidate(&keys::dashboard::all());
        Ok(project)
    }

    /// Update a project's name and description.
    ///
    /// # Errors
    ///
    /// Returns the service error after notifying it.
    pub fn update_project(&mut self, project_id: &str, input: &ProjectInput) -> Result<Project> {
        let project = self.mutate("Project updated", |api| api.update_project(project_id, input))?;
        self.cache.set(keys::projects::detail(project_id), &project)?;
        self.cache.invalidate(&keys::projects::lists());
        Ok(project)
    }

    /// Delete a project.
    ///
    /// # Errors
    ///
    /// Returns the service error after notifying it.
    pub fn delete_project(&mut self, project_id: &str) -> Result<()> {
        self.mutate("Project deleted", |api| api.delete_project(project_id))?;
        self.cache.remove(&keys::projects::detail(project_id));
        self.cache.remove(&keys::projects::contributors(project_id));
        self.cache.remove(&keys::tasks::lists(project_id));
        self.cache.remove(&keys::reporting::project(project_id));
        self.cache.invalidate(&keys::projects::lists());
        self.cache.invalidate(&keys::dashboard::all());
        Ok(())
    }
}
