use thiserror::Error;

/// Errors returned by the Contentful Management API client.
#[derive(Debug, Error)]
pub enum ContentfulError {
    /// Transport-level failure (connection, TLS, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("Contentful API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// A resource was returned without the version the management API
    /// requires for follow-up mutations (publish, process).
    #[error("resource {id} has no sys.version")]
    MissingVersion { id: String },
}

impl ContentfulError {
    /// True when the error is the API's structured "not found" answer.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ContentfulError::Api { status: 404, .. })
    }

    /// HTTP status of the failure, if the API produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ContentfulError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ContentfulError>;
