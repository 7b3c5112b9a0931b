//! Provider error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading from an external collaborator
#[derive(Error, Debug)]
pub enum ProviderError {
    /// A snapshot file does not exist
    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),

    /// A snapshot file could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// A snapshot file or response body is not valid JSON for its type
    #[error("Invalid data in {origin}: {message}")]
    Parse {
        /// File path or URL
        origin: String,
        /// Parser message
        message: String,
    },

    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from the service
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Source deliberately unavailable (mock failure injection)
    #[error("Source unavailable: {0}")]
    Unavailable(String),
}
