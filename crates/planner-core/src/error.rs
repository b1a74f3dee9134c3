//! Error Types

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Agent error types
///
/// Every variant ends the current run.
#[derive(Error, Debug)]
pub enum AgentError {
    /// LLM provider error
    #[error("Provider error: {0}")]
    Provider(String),

    /// Rate limited
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Completion carried neither content nor a function call
    #[error("Protocol violation: {0}")]
    Protocol(String),

    /// The model asked for a capability that is not registered
    #[error("Function not registered: {0}")]
    UnknownFunction(String),

    /// A data function with a name the caller does not understand
    #[error("Unknown data name: {0}")]
    UnknownData(String),

    /// A terminal response of the wrong shape for the caller
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Tool not found in registry
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Tool validation failed
    #[error("Tool validation error: {0}")]
    ToolValidation(String),

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
