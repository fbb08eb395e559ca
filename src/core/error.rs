use thiserror::Error;

/// Core error types for fwchain
///
/// Rendering and fingerprinting never fail; these errors come from loading
/// chain definitions, validating them, and addressing rules by position.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Input validation failed
    #[error("Validation error in {field}: {message}")]
    Validation { field: String, message: String },

    /// Rule position outside the chain (positions are 1-based)
    #[error("Rule position {position} out of range for chain with {len} rules")]
    InvalidPosition { position: usize, len: usize },
}

impl Error {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
