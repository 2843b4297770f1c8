//! Data access over the task service.
//!
//! [`QueryClient`] serves reads from a [`QueryCache`] while they are fresh
//! and refetches otherwise. Mutations go straight to the service, notify
//! the outcome, and invalidate the cache entries they affect. Task status
//! changes are applied to the cache optimistically and rolled back on
//! failure.
//!
//! # Example
//!
//! ```
//! use taskdeck::config::ClientConfig;
//! use taskdeck::query::{QueryCache, QueryClient};
//! use taskdeck::tasks::Status;
//! use taskdeck::testing::{sample_task, MockTaskApi, RecordingNotifier};
//!
//! let api = MockTaskApi::new().with_task(sample_task("t-1", "Write docs"));
//! let mut client = QueryClient::new(
//!     Box::new(api),
//!     Box::new(RecordingNotifier::default()),
//!     QueryCache::default(),
//!     ClientConfig::default(),
//! );
//!
//! let task = client.update_status("p-1", "t-1", Status::Done).unwrap();
//! assert_eq!(task.status, Status::Done);
//! ```

pub mod cache;
pub mod client;
mod comments;
mod contributors;
pub mod keys;
mod projects;
mod relations;
mod reporting;
mod tasks;

pub use cache::{CacheEntry, QueryCache, Snapshot};
pub use client::{user_message, QueryClient, GENERIC_ERROR_MESSAGE};
pub use keys::QueryKey;
