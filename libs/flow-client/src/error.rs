//! Error types for flow invocation

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, FlowError>;

/// Flow invocation errors
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Flow invocation failed: {0}")]
    Invoke(String),

    #[error("Failed to decode flow response: {0}")]
    Decode(String),
}
