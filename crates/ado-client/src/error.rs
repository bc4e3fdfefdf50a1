//! Error types for the Azure DevOps client.

use thiserror::Error;

/// Maximum number of characters of a response body kept in [`Error::Api`].
pub const MAX_ERROR_BODY_CHARS: usize = 200;

/// Errors that can occur while talking to Azure DevOps.
#[derive(Debug, Error)]
pub enum Error {
    /// Required configuration is missing or malformed.
    #[error("{0}")]
    Configuration(String),

    /// The HTTP request could not be sent or its body could not be read.
    #[error("Connection error: {0}")]
    Connection(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("Azure DevOps API error {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Truncated response body.
        message: String,
    },

    /// The response body did not have the expected shape.
    #[error("Unexpected response from Azure DevOps: {0}")]
    Decode(#[from] serde_json::Error),

    /// Fetching a work item (fields or comments) failed.
    #[error("Failed to get work item {id}: {source}")]
    ItemFetch {
        /// The work item that was requested.
        id: i64,
        /// The underlying failure.
        #[source]
        source: Box<Error>,
    },

    /// Patching the state of a work item failed.
    #[error("Failed to update work item {id} state to '{state}': {source}")]
    StateUpdate {
        /// The work item that was being updated.
        id: i64,
        /// The state that was requested.
        state: String,
        /// The underlying failure.
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Build an [`Error::Api`] from a status and raw body, truncating the body.
    #[must_use]
    pub fn api(status: u16, body: &str) -> Self {
        Self::Api {
            status,
            message: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
        }
    }

    /// Wrap an error with the context of a work item fetch.
    #[must_use]
    pub fn item_fetch(id: i64, source: Error) -> Self {
        Self::ItemFetch {
            id,
            source: Box::new(source),
        }
    }

    /// Wrap an error with the context of a state update.
    #[must_use]
    pub fn state_update(id: i64, state: impl Into<String>, source: Error) -> Self {
        Self::StateUpdate {
            id,
            state: state.into(),
            source: Box::new(source),
        }
    }

    /// Whether this is a configuration problem rather than a backend failure.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

/// Result type for Azure DevOps client operations.
pub type Result<T> = std::result::Result<T, Error>;
