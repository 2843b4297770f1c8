//! Configuration management for taskdeck.
//!
//! Settings live in a YAML file, either `.taskdeck/config.yaml` under a
//! project directory or `taskdeck/config.yaml` under the user config
//! directory. Every field is optional; missing fields take defaults.

use crate::error::{Error, Result};
use crate::view::{
    create_button_placement, CreateButtonPlacement, Visibility, DEFAULT_SEARCH_DEBOUNCE_MS,
};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file path relative to a base directory.
pub const CONFIG_FILE_PATH: &str = ".taskdeck/config.yaml";

/// How long fetched data is served from cache before a refetch, per entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaleTimes {
    /// Projects, in seconds.
    pub projects_secs: u64,
    /// Tasks, links and hierarchy, in seconds.
    pub tasks_secs: u64,
    /// Comments, in seconds.
    pub comments_secs: u64,
    /// Dashboard summary, in seconds.
    pub dashboard_secs: u64,
    /// Reporting aggregates, in seconds.
    pub reporting_secs: u64,
}

impl Default for StaleTimes {
    fn default() -> Self {
        Self {
            projects_secs: 300,
            tasks_secs: 120,
            comments_secs: 120,
            dashboard_secs: 120,
            reporting_secs: 300,
        }
    }
}

impl StaleTimes {
    /// Projects stale time.
    #[must_use]
    pub fn projects(&self) -> Duration {
        secs(self.projects_secs)
    }

    /// Tasks stale time.
    #[must_use]
    pub fn tasks(&self) -> Duration {
        secs(self.tasks_secs)
    }

    /// Comments stale time.
    #[must_use]
    pub fn comments(&self) -> Duration {
        secs(self.comments_secs)
    }

    /// Dashboard stale time.
    #[must_use]
    pub fn dashboard(&self) -> Duration {
        secs(self.dashboard_secs)
    }

    /// Reporting stale time.
    #[must_use]
    pub fn reporting(&self) -> Duration {
        secs(self.reporting_secs)
    }
}

fn secs(value: u64) -> Duration {
    Duration::seconds(i64::try_from(value).unwrap_or(i64::MAX).min(i64::MAX / 1000))
}

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the task service's REST API.
    ///
    /// The crate does not talk HTTP itself. An embedding application reads
    /// this to build the [`TaskApi`](crate::traits::TaskApi) it hands to
    /// [`QueryClient`](crate::query::QueryClient).
    pub api_base_url: String,

    /// Delay before a typed search query is applied, in milliseconds.
    pub search_debounce_ms: u64,

    /// How many times a failed read is retried. Mutations are never retried.
    pub read_retries: u32,

    /// Whether the floating create button may be shown.
    pub floating_create_button: bool,

    /// Per-entity stale times.
    pub stale_times: StaleTimes,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080/api".to_string(),
            search_debounce_ms: DEFAULT_SEARCH_DEBOUNCE_MS,
            read_retries: 1,
            floating_create_button: true,
            stale_times: StaleTimes::default(),
        }
    }
}

impl ClientConfig {
    /// Load config from a specific base directory, returning None if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, parsed, or
    /// fails validation.
    pub fn load_from(base_dir: &Path) -> Result<Option<Self>> {
        Self::load_file(&Self::config_path(base_dir))
    }

    /// Load config from an explicit file path, returning None if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, parsed, or
    /// fails validation.
    pub fn load_file(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(Some(config))
    }

    /// Load config from `base_dir`, then the user config directory, falling
    /// back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but is invalid.
    pub fn load_or_default(base_dir: &Path) -> Result<Self> {
        if let Some(config) = Self::load_from(base_dir)? {
            return Ok(config);
        }
        if let Some(path) = user_config_path() {
            if let Some(config) = Self::load_file(&path)? {
                return Ok(config);
            }
        }
        Ok(Self::default())
    }

    /// Save config to a specific base directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to(&self, base_dir: &Path) -> Result<()> {
        let config_path = Self::config_path(base_dir);

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    /// Create button placement for `visibility`, honouring
    /// `floating_create_button`.
    #[must_use]
    pub const fn create_button_placement(&self, visibility: Visibility) -> CreateButtonPlacement {
        create_button_placement(visibility, self.floating_create_button)
    }

    /// Get the config file path for a base directory.
    pub fn config_path(base_dir: &Path) -> PathBuf {
        base_dir.join(CONFIG_FILE_PATH)
    }

    /// Reject values the client cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(Error::Config("api_base_url must not be empty".to_string()));
        }
        if self.read_retries > 5 {
            return Err(Error::Config(format!(
                "read_retries must be at most 5, got {}",
                self.read_retries
            )));
        }
        Ok(())
    }
}

/// Path of the per-user config file, if the platform has a config directory.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("taskdeck").join("config.yaml"))
}
