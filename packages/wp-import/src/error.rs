//! Typed errors for the import pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use std::fmt;

use thiserror::Error;

/// Kinds of remote objects the content store manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Asset,
    Entry,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::Asset => write!(f, "asset"),
            ObjectKind::Entry => write!(f, "entry"),
        }
    }
}

/// Errors surfaced by a remote content store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested object does not exist. Drives the create branch of
    /// get-or-create and is never surfaced to the user.
    #[error("{kind} {id} not found")]
    NotFound { kind: ObjectKind, id: String },

    /// The API rejected the request with a status other than 404.
    #[error("remote API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure before any API answer arrived.
    #[error("transport error: {0}")]
    Transport(String),

    /// A remote object is missing data required for a follow-up call.
    #[error("invalid remote object: {0}")]
    Invalid(String),
}

impl StoreError {
    /// Whether the retry policy may absorb this failure.
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Transport(_) => true,
            StoreError::Api { status, .. } => *status == 429 || *status >= 500,
            StoreError::NotFound { .. } | StoreError::Invalid(_) => false,
        }
    }
}

/// Errors that can occur during an import run.
#[derive(Debug, Error)]
pub enum ImportError {
    /// An item with no registered formatter reached the format dispatch.
    #[error("no formatter registered for post type '{0}'")]
    UnsupportedType(String),

    /// HTML to rich text conversion failed.
    #[error("rich text conversion failed: {0}")]
    RichText(String),

    /// An item lacks a field the current stage cannot proceed without.
    #[error("'{title}' is missing {field}")]
    MissingField { title: String, field: &'static str },

    /// Remote store failure that escaped retry containment.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type alias for import operations.
pub type Result<T> = std::result::Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(StoreError::Transport("connection reset".into()).is_transient());
        assert!(StoreError::Api {
            status: 503,
            message: "unavailable".into()
        }
        .is_transient());
        assert!(StoreError::Api {
            status: 429,
            message: "rate limited".into()
        }
        .is_transient());

        assert!(!StoreError::Api {
            status: 400,
            message: "bad request".into()
        }
        .is_transient());
        assert!(!StoreError::NotFound {
            kind: ObjectKind::Entry,
            id: "abc".into()
        }
        .is_transient());
    }
}
