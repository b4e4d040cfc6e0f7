//! Unified error types for kapa

use thiserror::Error;

/// Unified error type for all task lifecycle operations
#[derive(Error, Debug)]
pub enum KapaError {
    // Identity errors
    #[error("Task ID allocation failed: {0}")]
    Allocation(String),

    // Script errors
    #[error("TICKscript generation failed: {0}")]
    Translation(String),

    #[error("TICKscript could not be reversed into a rule: {0}")]
    ReverseTranslation(String),

    // Engine errors
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Kapacitor error: {0}")]
    Engine(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(String),
}

impl KapaError {
    /// Whether this error came back from the remote engine
    pub fn is_engine(&self) -> bool {
        matches!(self, Self::Engine(_))
    }
}

/// Result type alias using KapaError
pub type Result<T> = std::result::Result<T, KapaError>;
