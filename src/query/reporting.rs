//! Dashboard and reporting reads.

use crate::error::Result;
use crate::query::client::QueryClient;
use crate::query::keys;
use crate::tasks::{DashboardSummary, ProjectReport};

impl QueryClient {
    /// The viewer's dashboard summary.
    ///
    /// # Errors
    ///
    /// Returns the fetch error once retries are exhausted.
    pub fn dashboard_summary(&mut self) -> Result<DashboardSummary> {
        let stale = self.config.stale_times.dashboard();
        self.fetch(keys::dashboard::summary(), stale, |api| api.dashboard_summary())
    }

    /// A project's reporting aggregates.
    ///
    /// # Errors
    ///
    /// Returns the fetch error once retries are exhausted.
    pub fn project_report(&mut self, project_id: &str) -> Result<ProjectReport> {
        let stale = self.config.stale_times.reporting();
        self.fetch(keys::reporting::project(project_id), stale, |api| {
            api.project_report(project_id)
        })
    }
}
