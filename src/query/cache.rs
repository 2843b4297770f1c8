//! Client-side query cache.
//!
//! The cache is an explicit value owned by whoever drives the UI. It stores
//! fetched payloads as JSON values under hierarchical [`QueryKey`]s, tracks
//! when each entry was written, and supports prefix invalidation and exact
//! snapshot/restore for optimistic updates.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::query::keys::{self, QueryKey};
use crate::tasks::{Task, TaskSummary};
use crate::traits::{Clock, SystemClock, TaskLookup};

/// One cached payload.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// The payload.
    pub data: Value,
    /// When the payload was written.
    pub updated_at: DateTime<Utc>,
    /// Marked stale by an invalidation; the next read refetches.
    pub invalidated: bool,
}

/// Captured entries for rolling back an optimistic update. `None` records
/// that the key was absent.
pub type Snapshot = Vec<(QueryKey, Option<CacheEntry>)>;

/// Keyed store of fetched data.
pub struct QueryCache {
    entries: HashMap<QueryKey, CacheEntry>,
    clock: Box<dyn Clock>,
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache").field("entries", &self.entries.len()).finish_non_exhaustive()
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(Box::new(SystemClock))
    }
}

impl QueryCache {
    /// Create an empty cache using `clock` for timestamps.
    #[must_use]
    pub fn new(clock: Box<dyn Clock>) -> Self {
        Self { entries: HashMap::new(), clock }
    }

    /// The cache's notion of now.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Read and decode a payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored payload does not decode as `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &QueryKey) -> Result<Option<T>> {
        self.entries
            .get(key)
            .map(|entry| serde_json::from_value(entry.data.clone()))
            .transpose()
            .map_err(Into::into)
    }

    /// Store a payload, marking it fresh.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` cannot be encoded.
    pub fn set<T: Serialize>(&mut self, key: QueryKey, value: &T) -> Result<()> {
        let data = serde_json::to_value(value)?;
        tracing::debug!(%key, "cache set");
        let updated_at = self.now();
        self.entries.insert(key, CacheEntry { data, updated_at, invalidated: false });
        Ok(())
    }

    /// Patch a cached payload in place. Returns `false` if the key is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload does not decode as `T` or cannot be
    /// re-encoded.
    pub fn update<T, F>(&mut self, key: &QueryKey, f: F) -> Result<bool>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut T),
    {
        let Some(mut value) = self.get::<T>(key)? else {
            return Ok(false);
        };
        f(&mut value);
        self.set(key.clone(), &value)?;
        Ok(true)
    }

    /// Patch every payload under `prefix` that decodes as `T`. Entries of a
    /// different shape are left alone. Returns how many entries changed.
    ///
    /// # Errors
    ///
    /// Returns an error if a patched payload cannot be re-encoded.
    pub fn update_all<T, F>(&mut self, prefix: &QueryKey, mut f: F) -> Result<usize>
    where
        T: Serialize + DeserializeOwned,
        F: FnMut(&mut T),
    {
        let now = self.now();
        let mut patched = 0;
        for (key, entry) in self.entries.iter_mut().filter(|(k, _)| k.starts_with(prefix)) {
            let Ok(mut value) = serde_json::from_value::<T>(entry.data.clone()) else {
                tracing::debug!(%key, "cache entry has a different shape, not patched");
                continue;
            };
            f(&mut value);
            entry.data = serde_json::to_value(&value)?;
            entry.updated_at = now;
            patched += 1;
        }
        Ok(patched)
    }

    /// Whether `key` needs a refetch: absent, invalidated, or older than
    /// `stale_time`.
    #[must_use]
    pub fn is_stale(&self, key: &QueryKey, stale_time: Duration) -> bool {
        self.entries.get(key).map_or(true, |entry| {
            entry.invalidated || self.now() - entry.updated_at >= stale_time
        })
    }

    /// Mark every entry under `prefix` stale. Data stays readable until
    /// refetched. Returns how many entries were marked.
    pub fn invalidate(&mut self, prefix: &QueryKey) -> usize {
        let mut count = 0;
        for (_, entry) in self.entries.iter_mut().filter(|(k, _)| k.starts_with(prefix)) {
            entry.invalidated = true;
            count += 1;
        }
        tracing::debug!(%prefix, count, "cache invalidate");
        count
    }

    /// Drop every entry under `prefix`. Returns how many were dropped.
    pub fn remove(&mut self, prefix: &QueryKey) -> usize {
        let before = self.entries.len();
        self.entries.retain(|k, _| !k.starts_with(prefix));
        let count = before - self.entries.len();
        tracing::debug!(%prefix, count, "cache remove");
        count
    }

    /// Capture the raw entries for `keys` and everything under `prefixes`.
    #[must_use]
    pub fn snapshot(&self, keys: &[QueryKey], prefixes: &[QueryKey]) -> Snapshot {
        let mut captured: Snapshot =
            keys.iter().map(|key| (key.clone(), self.entries.get(key).cloned())).collect();
        for (key, entry) in &self.entries {
            if prefixes.iter().any(|p| key.starts_with(p)) && !keys.contains(key) {
                captured.push((key.clone(), Some(entry.clone())));
            }
        }
        captured
    }

    /// Put captured entries back exactly as they were.
    pub fn restore(&mut self, snapshot: Snapshot) {
        for (key, entry) in snapshot {
            match entry {
                Some(entry) => {
                    self.entries.insert(key, entry);
                }
                None => {
                    self.entries.remove(&key);
                }
            }
        }
    }

    /// The raw entry for `key`.
    #[must_use]
    pub fn get_raw(&self, key: &QueryKey) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TaskLookup for QueryCache {
    /// Looks in cached task details first, then in cached task lists.
    fn find_task(&self, task_id: &str) -> Option<TaskSummary> {
        let details = keys::tasks::details();
        let detail = self.entries.iter().find_map(|(key, entry)| {
            if !key.starts_with(&details) || key.segments().last().map(String::as_str) != Some(task_id)
            {
                return None;
            }
            serde_json::from_value::<Task>(entry.data.clone()).ok()
        });
        if let Some(task) = detail {
            return Some(task.summary());
        }

        let lists = keys::tasks::all().with("list");
        self.entries
            .iter()
            .filter(|(key, _)| key.starts_with(&lists))
            .filter_map(|(_, entry)| serde_json::from_value::<Vec<Task>>(entry.data.clone()).ok())
            .find_map(|tasks| tasks.into_iter().find(|t| t.id == task_id))
            .map(|task| task.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_task, ManualClock};
    use crate::tasks::Status;

    fn cache() -> (ManualClock, QueryCache) {
        let clock = ManualClock::default();
        let cache = QueryCache::new(Box::new(clock.clone()));
        (clock, cache)
    }

    #[test]
    fn test_set_and_get() {
        let (_clock, mut cache) = cache();
        let key = keys::tasks::detail("p-1", "t-1");
        cache.set(key.clone(), &sample_task("t-1", "Fix bug")).unwrap();

        let task: Task = cache.get(&key).unwrap().unwrap();
        assert_eq!(task.title, "Fix bug");
        assert!(cache.get::<Task>(&keys::tasks::detail("p-1", "nope")).unwrap().is_none());
    }

    #[test]
    fn test_get_wrong_shape_is_error() {
        let (_clock, mut cache) = cache();
        let key = keys::dashboard::summary();
        cache.set(key.clone(), &"not a task").unwrap();
        assert!(cache.get::<Task>(&key).is_err());
    }

    #[test]
    fn test_staleness_follows_clock() {
        let (clock, mut cache) = cache();
        let key = keys::tasks::detail("p-1", "t-1");
        assert!(cache.is_stale(&key, Duration::minutes(2)));

        cache.set(key.clone(), &sample_task("t-1", "x")).unwrap();
        assert!(!cache.is_stale(&key, Duration::minutes(2)));

        clock.advance(Duration::seconds(119));
        assert!(!cache.is_stale(&key, Duration::minutes(2)));

        clock.advance(Duration::seconds(1));
        assert!(cache.is_stale(&key, Duration::minutes(2)));
    }

    #[test]
    fn test_invalidate_by_prefix() {
        let (_clock, mut cache) = cache();
        let a = keys::tasks::detail("p-1", "t-1");
        let b = keys::tasks::detail("p-1", "t-2");
        let c = keys::comments::list("p-1", "t-1");
        for key in [&a, &b, &c] {
            cache.set(key.clone(), &1).unwrap();
        }

        assert_eq!(cache.invalidate(&keys::tasks::all()), 2);
        assert!(cache.is_stale(&a, Duration::hours(1)));
        assert!(cache.is_stale(&b, Duration::hours(1)));
        assert!(!cache.is_stale(&c, Duration::hours(1)));
        // invalidated data is still readable
        assert_eq!(cache.get::<i32>(&a).unwrap(), Some(1));
    }

    #[test]
    fn test_remove_by_prefix() {
        let (_clock, mut cache) = cache();
        cache.set(keys::tasks::links("t-1"), &1).unwrap();
        cache.set(keys::tasks::hierarchy("t-1"), &2).unwrap();
        assert_eq!(cache.remove(&keys::tasks::links("t-1")), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_update_and_update_all() {
        let (_clock, mut cache) = cache();
        let detail = keys::tasks::detail("p-1", "t-1");
        cache.set(detail.clone(), &sample_task("t-1", "x")).unwrap();
        cache
            .set(keys::tasks::lists("p-1").with(""), &vec![sample_task("t-1", "x")])
            .unwrap();
        cache.set(keys::tasks::lists("p-1").with("odd"), &"string payload").unwrap();

        assert!(cache.update::<Task, _>(&detail, |t| t.status = Status::Done).unwrap());
        assert!(!cache
            .update::<Task, _>(&keys::tasks::detail("p-1", "none"), |t| t.status = Status::Done)
            .unwrap());

        let patched = cache
            .update_all::<Vec<Task>, _>(&keys::tasks::lists("p-1"), |tasks| {
                for t in tasks.iter_mut() {
                    t.status = Status::Done;
                }
            })
            .unwrap();
        assert_eq!(patched, 1);
        let list: Vec<Task> = cache.get(&keys::tasks::lists("p-1").with("")).unwrap().unwrap();
        assert_eq!(list[0].status, Status::Done);
    }

    #[test]
    fn test_snapshot_restore_is_exact() {
        let (clock, mut cache) = cache();
        let present = keys::tasks::detail("p-1", "t-1");
        let absent = keys::tasks::detail("p-1", "t-2");
        cache.set(present.clone(), &sample_task("t-1", "x")).unwrap();
        cache.invalidate(&present);
        let before = cache.get_raw(&present).cloned();

        let snapshot = cache.snapshot(&[present.clone(), absent.clone()], &[]);
        clock.advance(Duration::seconds(5));
        cache.set(present.clone(), &sample_task("t-1", "changed")).unwrap();
        cache.set(absent.clone(), &sample_task("t-2", "new")).unwrap();

        cache.restore(snapshot);
        assert_eq!(cache.get_raw(&present).cloned(), before);
        assert!(cache.get_raw(&absent).is_none());
    }

    #[test]
    fn test_lookup_prefers_details_then_lists() {
        let (_clock, mut cache) = cache();
        assert!(cache.find_task("t-1").is_none());

        cache
            .set(keys::tasks::lists("p-1").with(""), &vec![sample_task("t-1", "From list")])
            .unwrap();
        assert_eq!(cache.find_task("t-1").unwrap().title, "From list");

        cache.set(keys::tasks::detail("p-1", "t-1"), &sample_task("t-1", "From detail")).unwrap();
        assert_eq!(cache.find_task("t-1").unwrap().title, "From detail");
    }

    #[test]
    fn test_clear() {
        let (_clock, mut cache) = cache();
        cache.set(keys::dashboard::summary(), &1).unwrap();
        assert!(!cache.is_empty());
        cache.clear();
        assert!(cache.is_empty());
    }
}
