//! Error kinds surfaced to MCP clients and to the transport loop.

use thiserror::Error;

/// JSON-RPC error codes used by the adapter servers.
pub mod codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// Failure of a single tool invocation.
///
/// Every variant is terminal for the invocation that produced it and is
/// reported back to the caller as a JSON-RPC error, never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// Malformed or insufficiently constrained arguments.
    #[error("{0}")]
    InvalidParams(String),
    /// No tool with the requested name.
    #[error("{0}")]
    MethodNotFound(String),
    /// Remote failure, malformed remote response, or an unexpected fault.
    #[error("{0}")]
    Internal(String),
}

impl ToolError {
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// JSON-RPC error code for this kind.
    pub fn code(&self) -> i32 {
        match self {
            ToolError::InvalidParams(_) => codes::INVALID_PARAMS,
            ToolError::MethodNotFound(_) => codes::METHOD_NOT_FOUND,
            ToolError::Internal(_) => codes::INTERNAL_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ToolError::InvalidParams(m) | ToolError::MethodNotFound(m) | ToolError::Internal(m) => m,
        }
    }
}

/// Errors that end the transport loop.
#[derive(Error, Debug)]
pub enum McpError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
