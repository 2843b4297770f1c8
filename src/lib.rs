//! # `taskdeck`
//!
//! Client-side core of a project and task board: the task domain model,
//! relationship resolution, list view-state, and a cached data-access layer
//! over an injectable task service.

pub mod config;
pub mod error;
pub mod query;
pub mod tasks;
pub mod testing;
pub mod traits;
pub mod view;

#[cfg(feature = "cli")]
pub mod cli;

pub use error::{Error, Result};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }
}
