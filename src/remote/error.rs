//! Remote store errors.

use thiserror::Error;

/// Result type for remote store operations.
pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Failures talking to the hosted record store.
///
/// Every variant carries a human-readable message suitable for showing to
/// the user.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Network or connection failure before a response arrived.
    #[error("Remote request failed: {0}")]
    Transport(String),

    /// The backend rejected the credentials.
    #[error("Remote authentication failed ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    /// The backend refused the request (constraint violation, bad input).
    #[error("Remote store rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// A response or row could not be decoded.
    #[error("Invalid remote data: {0}")]
    Decode(String),

    /// No remote backend is configured.
    #[error("Remote store is not configured")]
    NotConfigured,
}

impl RemoteError {
    /// Build an error from a non-success HTTP status.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => Self::Unauthorized { status, message },
            _ => Self::Rejected { status, message },
        }
    }

    /// Message without the variant prefix.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Transport(msg) | Self::Decode(msg) => msg.clone(),
            Self::Unauthorized { message, .. } | Self::Rejected { message, .. } => message.clone(),
            Self::NotConfigured => "Remote store is not configured".to_string(),
        }
    }

    /// HTTP status, when the backend answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { status, .. } | Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the same request might succeed if the user tries again.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Rejected { status, .. } => matches!(*status, 408 | 429 | 500..=599),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_classifies_auth() {
        assert!(matches!(
            RemoteError::from_status(401, "expired"),
            RemoteError::Unauthorized { status: 401, .. }
        ));
        assert!(matches!(
            RemoteError::from_status(409, "duplicate key"),
            RemoteError::Rejected { status: 409, .. }
        ));
    }

    #[test]
    fn test_message_strips_prefix() {
        let err = RemoteError::from_status(409, "duplicate key value");
        assert_eq!(err.message(), "duplicate key value");
        assert_eq!(err.status(), Some(409));
        assert!(!err.is_transient());
        assert!(RemoteError::Transport("reset".into()).is_transient());
    }
}
