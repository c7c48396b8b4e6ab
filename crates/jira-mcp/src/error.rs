//! Error types for the Jira MCP server.
//!
//! Tool failures are split in two. Bad input becomes an MCP
//! `invalid_params` protocol error carrying `field_errors`. Jira and
//! transport failures become a tool result flagged as an error whose text is
//! the structured payload from [`jira_client::Error::to_payload`].

use rmcp::ErrorData as McpError;
use rmcp::model::{CallToolResult, Content};
use serde_json::json;
use thiserror::Error;

/// Errors that can occur in the Jira MCP server.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid argument value provided.
    #[error("Invalid {field}: '{value}'. Valid values: {valid_values}")]
    InvalidArgument {
        /// The field name that had an invalid value.
        field: &'static str,
        /// The invalid value that was provided.
        value: String,
        /// Description of valid values.
        valid_values: &'static str,
    },

    /// An error from the Jira client.
    #[error(transparent)]
    Jira(#[from] jira_client::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// MCP protocol or transport error.
    #[error("MCP error: {0}")]
    Mcp(String),
}

impl Error {
    /// Convert into the response for a tool call.
    ///
    /// # Errors
    ///
    /// Returns `invalid_params` for input problems and `internal_error` for
    /// failures that are not about Jira.
    pub fn into_call_result(self) -> std::result::Result<CallToolResult, McpError> {
        match self {
            Self::InvalidArgument { field, .. } => {
                let message = self.to_string();
                Err(McpError::invalid_params(
                    message.clone(),
                    Some(json!({ "field_errors": { field: message } })),
                ))
            }
            Self::Jira(jira_client::Error::Validation(fields)) => Err(McpError::invalid_params(
                format!("Invalid input: {fields}"),
                Some(json!({ "field_errors": fields })),
            )),
            Self::Jira(e) => {
                tracing::warn!(kind = e.kind(), status = ?e.status(), error = %e, "Jira call failed");
                Ok(CallToolResult::error(vec![Content::json(e.to_payload())?]))
            }
            Self::Json(_) | Self::Mcp(_) => Err(McpError::internal_error(self.to_string(), None)),
        }
    }
}

/// Result type for Jira MCP operations.
pub type Result<T> = std::result::Result<T, Error>;
