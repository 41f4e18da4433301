//! Error types for the push-notification client.

use thiserror::Error;

/// Main error type for client operations.
#[derive(Debug, Error)]
pub enum PushError {
    // --- Validation (raised before any I/O) ---
    #[error("Device token is empty")]
    EmptyDeviceToken,

    #[error("No valid events to send")]
    NoValidEvents,

    #[error("Application name is missing")]
    MissingAppName,

    // --- Transport ---
    #[error("Remote call failed: {message}")]
    Transport {
        /// HTTP status when the server answered, `None` on network failure.
        status: Option<u16>,
        message: String,
    },

    // --- Persistence ---
    #[error("Key-value store error: {0}")]
    Persistence(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PushError {
    /// The message worth surfacing to UI state: the server-provided text for
    /// transport failures, the display form otherwise.
    pub fn detail(&self) -> String {
        match self {
            PushError::Transport { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Whether this error was raised before any I/O happened.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PushError::EmptyDeviceToken | PushError::NoValidEvents | PushError::MissingAppName
        )
    }
}

impl From<reqwest::Error> for PushError {
    fn from(e: reqwest::Error) -> Self {
        PushError::Transport {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for PushError {
    fn from(e: serde_json::Error) -> Self {
        PushError::Serialization(e.to_string())
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, PushError>;
