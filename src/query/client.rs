//! The query client: cached reads and notifying mutations over a
//! [`TaskApi`].
//!
//! Entity-specific operations live in sibling modules as further `impl`
//! blocks on [`QueryClient`].

use chrono::Duration;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::query::cache::QueryCache;
use crate::query::keys::QueryKey;
use crate::traits::{Notification, NotificationLevel, Notifier, TaskApi};

/// Shown when a failed mutation carries no server message.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// Owns the cache and the collaborators every query needs.
pub struct QueryClient {
    pub(crate) cache: QueryCache,
    pub(crate) api: Box<dyn TaskApi>,
    notifier: Box<dyn Notifier>,
    pub(crate) config: ClientConfig,
}

impl std::fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryClient")
            .field("cache", &self.cache)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl QueryClient {
    /// Create a client.
    #[must_use]
    pub fn new(
        api: Box<dyn TaskApi>,
        notifier: Box<dyn Notifier>,
        cache: QueryCache,
        config: ClientConfig,
    ) -> Self {
        Self { cache, api, notifier, config }
    }

    /// The cache.
    #[must_use]
    pub const fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// The cache, mutably. Callers use this to reset state on sign-out.
    pub fn cache_mut(&mut self) -> &mut QueryCache {
        &mut self.cache
    }

    /// The configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Serve `key` from cache while fresh, otherwise fetch and store it.
    ///
    /// Failed fetches are retried `read_retries` times.
    pub(crate) fn fetch<T, F>(&mut self, key: QueryKey, stale_time: Duration, fetch: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: Fn(&dyn TaskApi) -> Result<T>,
    {
        if !self.cache.is_stale(&key, stale_time) {
            match self.cache.get::<T>(&key) {
                Ok(Some(value)) => {
                    tracing::debug!(%key, "cache hit");
                    return Ok(value);
                }
                Ok(None) => {}
                Err(err) => tracing::debug!(%key, error = %err, "cached value has the wrong shape"),
            }
        }
        tracing::debug!(%key, "cache miss");

        let mut attempt = 0;
        let value = loop {
            match fetch(self.api.as_ref()) {
                Ok(value) => break value,
                Err(err) if attempt < self.config.read_retries => {
                    attempt += 1;
                    tracing::debug!(%key, attempt, error = %err, "retrying fetch");
                }
                Err(err) => return Err(err),
            }
        };

        self.cache.set(key, &value)?;
        Ok(value)
    }

    /// Run a mutation once, notifying `success` or the failure.
    pub(crate) fn mutate<T, F>(&self, success: &str, call: F) -> Result<T>
    where
        F: FnOnce(&dyn TaskApi) -> Result<T>,
    {
        match call(self.api.as_ref()) {
            Ok(value) => {
                self.notify(NotificationLevel::Success, success);
                Ok(value)
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Notify a failure and hand the error back.
    pub(crate) fn fail(&self, err: Error) -> Error {
        tracing::warn!(error = %err, "mutation failed");
        self.notify(NotificationLevel::Error, user_message(&err));
        err
    }

    pub(crate) fn notify(&self, level: NotificationLevel, message: &str) {
        self.notifier.notify(Notification { level, message: message.to_string() });
    }
}

/// Text shown to the user for a failed mutation.
#[must_use]
pub fn user_message(err: &Error) -> &str {
    match err {
        Error::Forbidden(message) | Error::InvalidArgument(message) => message,
        _ => err.server_message().unwrap_or(GENERIC_ERROR_MESSAGE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::keys;
    use crate::testing::{ManualClock, MockTaskApi, RecordingNotifier};

    fn client(api: &MockTaskApi, clock: &ManualClock) -> QueryClient {
        QueryClient::new(
            Box::new(api.clone()),
            Box::new(RecordingNotifier::default()),
            QueryCache::new(Box::new(clock.clone())),
            ClientConfig::default(),
        )
    }

    #[test]
    fn test_user_message() {
        assert_eq!(user_message(&Error::api(409, "Title taken")), "Title taken");
        assert_eq!(user_message(&Error::Api { status: Some(500), message: None }), GENERIC_ERROR_MESSAGE);
        assert_eq!(user_message(&Error::Forbidden("Not allowed".to_string())), "Not allowed");
        assert_eq!(
            user_message(&Error::NotFound { kind: "task", id: "t-1".to_string() }),
            GENERIC_ERROR_MESSAGE
        );
    }

    #[test]
    fn test_fetch_serves_fresh_cache() {
        let api = MockTaskApi::new();
        let clock = ManualClock::default();
        let mut client = client(&api, &clock);
        let key = keys::dashboard::summary();

        let first = client.fetch(key.clone(), Duration::minutes(2), |api| api.dashboard_summary()).unwrap();
        let second = client.fetch(key.clone(), Duration::minutes(2), |api| api.dashboard_summary()).unwrap();
        assert_eq!(first, second);
        assert_eq!(api.calls("dashboard_summary"), 1);

        clock.advance(Duration::minutes(2));
        client.fetch(key, Duration::minutes(2), |api| api.dashboard_summary()).unwrap();
        assert_eq!(api.calls("dashboard_summary"), 2);
    }

    #[test]
    fn test_fetch_refetches_when_cached_value_has_wrong_shape() {
        let api = MockTaskApi::new();
        let clock = ManualClock::default();
        let mut client = client(&api, &clock);
        let key = keys::dashboard::summary();

        client.cache_mut().set(key.clone(), &"not a summary").unwrap();
        let summary = client.fetch(key.clone(), Duration::minutes(2), |api| api.dashboard_summary());
        assert!(summary.is_ok());
        assert_eq!(api.calls("dashboard_summary"), 1);
        assert!(client.cache().get::<crate::tasks::DashboardSummary>(&key).unwrap().is_some());
    }

    #[test]
    fn test_fetch_refetches_invalidated() {
        let api = MockTaskApi::new();
        let clock = ManualClock::default();
        let mut client = client(&api, &clock);
        let key = keys::dashboard::summary();

        client.fetch(key.clone(), Duration::hours(1), |api| api.dashboard_summary()).unwrap();
        client.cache_mut().invalidate(&keys::dashboard::all());
        client.fetch(key, Duration::hours(1), |api| api.dashboard_summary()).unwrap();
        assert_eq!(api.calls("dashboard_summary"), 2);
    }

    #[test]
    fn test_fetch_retries_once_by_default() {
        let api = MockTaskApi::new();
        api.fail_next("dashboard_summary", Error::Api { status: Some(503), message: None });
        let clock = ManualClock::default();
        let mut client = client(&api, &clock);

        assert!(client
            .fetch(keys::dashboard::summary(), Duration::hours(1), |api| api.dashboard_summary())
            .is_ok());
        assert_eq!(api.calls("dashboard_summary"), 2);
    }

    #[test]
    fn test_fetch_gives_up_after_retries() {
        let api = MockTaskApi::new();
        api.fail_next("dashboard_summary", Error::api(503, "down"));
        api.fail_next("dashboard_summary", Error::api(503, "still down"));
        let clock = ManualClock::default();
        let mut client = client(&api, &clock);

        let err = client
            .fetch(keys::dashboard::summary(), Duration::hours(1), |api| api.dashboard_summary())
            .unwrap_err();
        assert_eq!(err.server_message(), Some("still down"));
        assert!(client.cache().is_empty());
    }

    #[test]
    fn test_fetch_without_retries() {
        let api = MockTaskApi::new();
        api.fail_next("dashboard_summary", Error::api(503, "down"));
        let clock = ManualClock::default();
        let mut client = QueryClient::new(
            Box::new(api.clone()),
            Box::new(RecordingNotifier::default()),
            QueryCache::new(Box::new(clock)),
            ClientConfig { read_retries: 0, ..Default::default() },
        );

        assert!(client
            .fetch(keys::dashboard::summary(), Duration::hours(1), |api| api.dashboard_summary())
            .is_err());
        assert_eq!(api.calls("dashboard_summary"), 1);
    }

    #[test]
    fn test_mutate_notifies() {
        let api = MockTaskApi::new();
        let notifier = RecordingNotifier::default();
        let client = QueryClient::new(
            Box::new(api.clone()),
            Box::new(notifier.clone()),
            QueryCache::new(Box::new(ManualClock::default())),
            ClientConfig::default(),
        );

        client.mutate("Done", |_| Ok(())).unwrap();
        let _ = client.mutate::<(), _>("Done", |_| Err(Error::Api { status: None, message: None }));

        let seen = notifier.notifications();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].level, NotificationLevel::Success);
        assert_eq!(seen[0].message, "Done");
        assert_eq!(seen[1].level, NotificationLevel::Error);
        assert_eq!(seen[1].message, GENERIC_ERROR_MESSAGE);
    }
}
