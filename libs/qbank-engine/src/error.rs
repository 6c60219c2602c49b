//! Request-level errors of the code-test engine
use thiserror::Error;

/// Failures that abort a whole request.
///
/// Per-test-case failures (spawn errors, timeouts, wrong output) never show up
/// here: they are recorded in the corresponding `TestResult`. A failed
/// compilation is not an error either, it is a regular response.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// Missing code, missing test cases or similar caller mistakes
    #[error("{0}")]
    InvalidInput(String),
    /// Language is not known or not configured
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),
    /// A required compiler or interpreter is not installed on the host
    #[error("{0}")]
    ToolchainMissing(String),
    /// Filesystem failure or any other unexpected error
    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ExecutionError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        ExecutionError::InvalidInput(message.into())
    }

    /// Whether the caller, not the host, is responsible for the failure
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ExecutionError::Internal(_))
    }
}
