//! Error types for resource fetching and CSV export.

use thiserror::Error;

/// Everything that can go wrong between a resource and the backend.
///
/// `Display` is the user-facing message: it is what lands in a resource's
/// `error` field and what the notifier shows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    /// Network failure, timeout, non-2xx without a server message, or an
    /// unreadable body.
    #[error("{0}")]
    Transport(String),

    /// The server answered and explained what went wrong
    /// (`success=false` or an error status carrying `{message}`).
    #[error("{message}")]
    Application {
        status: Option<u16>,
        message: String,
    },

    /// Rejected on the client before any request was made.
    #[error("{0}")]
    Validation(String),
}

impl ResourceError {
    pub fn application(message: impl Into<String>) -> Self {
        ResourceError::Application {
            status: None,
            message: message.into(),
        }
    }

    /// Normalize a reqwest failure into a transport error.
    pub fn from_reqwest(e: &reqwest::Error) -> Self {
        let msg = if e.is_timeout() {
            "Request timed out".to_string()
        } else if e.is_connect() {
            format!("Connection failed: {}", e)
        } else {
            format!("Request failed: {}", e)
        };
        ResourceError::Transport(msg)
    }

    /// HTTP status of the failed response, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ResourceError::Application { status, .. } => *status,
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ResourceError::Validation(_))
    }
}

/// Errors raised while handing a rendered CSV to a download sink.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to serialize row: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("download failed: {0}")]
    Io(#[from] std::io::Error),
}
