//! Custom error types for the insights server.

use thiserror::Error;

/// Insights server errors.
#[derive(Debug, Error)]
pub enum McpError {
    #[error("Store error: {0}")]
    Store(#[from] life_store_client::StoreError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Webhook error: {0}")]
    Webhook(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<String> for McpError {
    fn from(err: String) -> Self {
        McpError::Internal(err)
    }
}

impl From<McpError> for String {
    fn from(err: McpError) -> Self {
        err.to_string()
    }
}

/// Result type alias for MCP operations.
pub type McpResult<T> = Result<T, McpError>;
