//! Contributor queries and role-gated mutations.

use crate::error::{Error, Result};
use crate::query::client::QueryClient;
use crate::query::keys;
use crate::tasks::{Contributor, Role};

impl QueryClient {
    /// A project's contributors.
    ///
    /// # Errors
    ///
    /// Returns the fetch error once retries are exhausted.
    pub fn contributors(&mut self, project_id: &str) -> Result<Vec<Contributor>> {
        let stale = self.config.stale_times.projects();
        self.fetch(keys::projects::contributors(project_id), stale, |api| {
            api.list_contributors(project_id)
        })
    }

    /// Change a contributor's role on behalf of a viewer holding
    /// `viewer_role`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Forbidden`] without calling the service when the
    /// viewer cannot manage contributors, otherwise the service error.
    /// Either is notified.
    pub fn update_contributor_role(
        &mut self,
        viewer_role: Role,
        project_id: &str,
        user_id: &str,
        role: Role,
    ) -> Result<Contributor> {
        self.require_manager(viewer_role)?;
        let contributor = self.mutate("Role updated", |api| {
            api.update_contributor_role(project_id, user_id, role)
        })?;
        self.cache.invalidate(&keys::projects::contributors(project_id));
        Ok(contributor)
    }

    /// Remove a contributor on behalf of a viewer holding `viewer_role`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Forbidden`] without calling the service when the
    /// viewer cannot manage contributors, otherwise the service error.
    /// Either is notified.
    pub fn remove_contributor(&mut self, viewer_role: Role, project_id: &str, user_id: &str) -> Result<()> {
        self.require_manager(viewer_role)?;
        self.mutate("Contributor removed", |api| api.remove_contributor(project_id, user_id))?;
        self.cache.invalidate(&keys::projects::contributors(project_id));
        Ok(())
    }

    fn require_manager(&self, viewer_role: Role) -> Result<()> {
        if viewer_role.can_manage_contributors() {
            return Ok(());
        }
        Err(self.fail(Error::Forbidden(
            "You do not have permission to manage contributors".to_string(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ClientConfig;
    use crate::error::Error;
    use crate::query::{QueryCache, QueryClient};
    use crate::tasks::{Contributor, Role};
    use crate::testing::{sample_user, ManualClock, MockTaskApi, RecordingNotifier};
    use crate::traits::NotificationLevel;

    fn setup() -> (MockTaskApi, RecordingNotifier, QueryClient) {
        let api = MockTaskApi::new()
            .with_contributor("p-1", Contributor { user: sample_user("u-1"), role: Role::Owner })
            .with_contributor("p-1", Contributor { user: sample_user("u-2"), role: Role::Write });
        let notifier = RecordingNotifier::default();
        let client = QueryClient::new(
            Box::new(api.clone()),
            Box::new(notifier.clone()),
            QueryCache::new(Box::new(ManualClock::default())),
            ClientConfig::default(),
        );
        (api, notifier, client)
    }

    #[test]
    fn test_admin_updates_role() {
        let (_api, _notifier, mut client) = setup();
        assert_eq!(client.contributors("p-1").unwrap().len(), 2);

        client.update_contributor_role(Role::Admin, "p-1", "u-2", Role::Read).unwrap();
        let contributors = client.contributors("p-1").unwrap();
        assert_eq!(contributors[1].role, Role::Read);
    }

    #[test]
    fn test_writer_cannot_manage_contributors() {
        let (api, notifier, mut client) = setup();
        let err = client.update_contributor_role(Role::Write, "p-1", "u-2", Role::Admin).unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
        assert!(client.remove_contributor(Role::Read, "p-1", "u-2").is_err());

        assert_eq!(api.calls("update_contributor_role"), 0);
        assert_eq!(api.calls("remove_contributor"), 0);
        assert_eq!(notifier.messages(NotificationLevel::Error).len(), 2);
    }

    #[test]
    fn test_owner_removes_contributor() {
        let (_api, notifier, mut client) = setup();
        client.contributors("p-1").unwrap();
        client.remove_contributor(Role::Owner, "p-1", "u-2").unwrap();

        assert_eq!(client.contributors("p-1").unwrap().len(), 1);
        assert_eq!(notifier.last().unwrap().message, "Contributor removed");
    }
}
