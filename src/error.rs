//! Error types for rotest-board
//!
//! All modules use `BoardResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for rotest-board operations
pub type BoardResult<T> = Result<T, BoardError>;

/// All errors that can occur in rotest-board
#[derive(Error, Debug)]
pub enum BoardError {
    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Feed errors
    #[error("Invalid feed address {address}: {reason}")]
    FeedAddress { address: String, reason: String },

    #[error("Push feed unreachable after {attempts} attempt(s)")]
    FeedGaveUp { attempts: u32 },

    #[error("Malformed feed frame: {0}")]
    MalformedFrame(String),

    #[error("Unexpected content for event {event_type}: {reason}")]
    PayloadShape { event_type: String, reason: String },

    #[error("Timed out after {secs}s waiting for the initial cache")]
    SnapshotTimeout { secs: u64 },

    // Resource control errors
    #[error("Invalid control URL {url}: {reason}")]
    ControlUrl { url: String, reason: String },

    #[error("{action} {resource} failed: {reason}")]
    ControlRequest {
        action: String,
        resource: String,
        reason: String,
    },

    #[error("{action} {resource} rejected by server with status {status}")]
    ControlStatus {
        action: String,
        resource: String,
        status: u16,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl BoardError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a payload shape error for an event
    pub fn payload_shape(event_type: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PayloadShape {
            event_type: event_type.into(),
            reason: reason.into(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::FeedGaveUp { .. } | Self::SnapshotTimeout { .. } => {
                Some("Is the rotest server running? Check feed.host and feed.port")
            }
            Self::FeedAddress { .. } => Some("Run: rotest-board config set feed.host <host>"),
            Self::ControlRequest { .. } | Self::ControlUrl { .. } => {
                Some("Check control.base_url in the configuration")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = BoardError::FeedGaveUp { attempts: 3 };
        assert!(err.to_string().contains("after 3 attempt"));
    }

    #[test]
    fn error_hint() {
        let err = BoardError::SnapshotTimeout { secs: 5 };
        assert_eq!(
            err.hint(),
            Some("Is the rotest server running? Check feed.host and feed.port")
        );
        assert_eq!(BoardError::Internal("x".to_string()).hint(), None);
    }
}
