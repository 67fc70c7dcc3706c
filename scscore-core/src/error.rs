//! Structured error types for the SCScore workspace.

use thiserror::Error;

/// Unified error type for all SCScore operations.
#[derive(Debug, Error)]
pub enum ScscoreError {
    /// I/O error (weight file not found, permission denied, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed SMILES or other textual input
    #[error("parse error: {0}")]
    Parse(String),

    /// Bad arguments, out-of-range values, or inconsistent tensor shapes
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Decompression failure or unrecognised compression format
    #[error("compression error: {0}")]
    Compression(String),

    /// The weight document is not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Inference was requested before any weights were loaded
    #[error("model weights not restored")]
    NotRestored,
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, ScscoreError>;
