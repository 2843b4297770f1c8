//! Error types for `taskdeck`.

/// Errors that can occur in the task board core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON (de)serialization error occurred.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A YAML parsing error occurred.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The task service rejected a request or could not be reached.
    #[error("API error{}: {}", status.map(|s| format!(" ({s})")).unwrap_or_default(), message.as_deref().unwrap_or("no message"))]
    Api {
        /// HTTP status code, when the request reached the server.
        status: Option<u16>,
        /// Server-provided error message, if any.
        message: Option<String>,
    },

    /// A referenced entity was not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Entity kind (e.g. "task").
        kind: &'static str,
        /// The missing identifier.
        id: String,
    },

    /// The viewer's role does not permit the action.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// An argument was rejected before reaching the service.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Build an API error carrying a server message.
    #[must_use]
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api { status: Some(status), message: Some(message.into()) }
    }

    /// The server-provided message, if this error carries one.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } => message.as_deref().filter(|m| !m.trim().is_empty()),
            _ => None,
        }
    }
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
