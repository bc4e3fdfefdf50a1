//! Error types for the Azure DevOps MCP server.

use thiserror::Error;

/// A tool call whose arguments do not match the tool's input schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Required arguments were missing, null, zero or empty.
    #[error("{}", missing_message(.fields))]
    Missing {
        /// The missing argument names, in schema order.
        fields: Vec<&'static str>,
    },

    /// An argument had the wrong JSON type or an out-of-range value.
    #[error("{field} must be {expected}")]
    InvalidType {
        /// The argument name.
        field: &'static str,
        /// What the argument must be.
        expected: &'static str,
    },

    /// An argument the tool does not declare.
    #[error("Unexpected argument '{field}' for {tool}")]
    UnexpectedArgument {
        /// The tool being called.
        tool: &'static str,
        /// The undeclared argument name.
        field: String,
    },
}

fn missing_message(fields: &[&'static str]) -> String {
    match fields {
        [] => "Missing required arguments".to_string(),
        [single] => format!("{single} is required"),
        [init @ .., last] => format!("{} and {last} are required", init.join(", ")),
    }
}

/// Broad category of a failed tool call.
///
/// Reported to MCP clients through the `isError` flag; the category itself
/// shows up in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Credentials or identifiers are missing.
    Configuration,
    /// The tool arguments were rejected before any backend call.
    Validation,
    /// Azure DevOps could not be reached or rejected the request.
    Backend,
    /// The requested tool is not registered.
    UnknownTool,
    /// Transport or protocol failure outside a tool call.
    Internal,
}

/// Errors that can occur in the Azure DevOps MCP server.
#[derive(Debug, Error)]
pub enum Error {
    /// An error from the Azure DevOps adapter.
    #[error("{0}")]
    Client(#[from] ado_client::Error),

    /// The tool arguments were invalid.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// No tool with this name is registered.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// MCP protocol error.
    #[error("MCP error: {0}")]
    Mcp(String),
}

impl Error {
    /// The category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Client(e) if e.is_configuration() => ErrorKind::Configuration,
            Self::Client(_) => ErrorKind::Backend,
            Self::Validation(_) => ErrorKind::Validation,
            Self::UnknownTool(_) => ErrorKind::UnknownTool,
            Self::Mcp(_) => ErrorKind::Internal,
        }
    }
}

/// Result type for Azure DevOps MCP operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::single(vec!["work_item_id"], "work_item_id is required")]
    #[case::pair(vec!["work_item_id", "new_state"], "work_item_id and new_state are required")]
    #[case::three(vec!["a", "b", "c"], "a, b and c are required")]
    fn test_missing_message(#[case] fields: Vec<&'static str>, #[case] expected: &str) {
        assert_eq!(ValidationError::Missing { fields }.to_string(), expected);
    }

    #[test]
    fn test_error_kinds() {
        let config = Error::Client(ado_client::Error::Configuration("missing".to_string()));
        assert_eq!(config.kind(), ErrorKind::Configuration);

        let backend = Error::Client(ado_client::Error::api(401, "unauthorized"));
        assert_eq!(backend.kind(), ErrorKind::Backend);

        let unknown = Error::UnknownTool("delete_everything".to_string());
        assert_eq!(unknown.kind(), ErrorKind::UnknownTool);
        assert_eq!(unknown.to_string(), "Unknown tool: delete_everything");
    }
}
