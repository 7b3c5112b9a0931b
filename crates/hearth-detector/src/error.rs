//! Error types for the detectors

use thiserror::Error;

/// Errors that can occur while building the catalog or running detectors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectorError {
    /// Invalid detector configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A rule failed validation
    #[error("Invalid rule '{id}': {reason}")]
    InvalidRule {
        /// Rule identifier
        id: String,
        /// What is wrong with it
        reason: String,
    },

    /// Two rules share an identifier
    #[error("Duplicate rule id: {0}")]
    DuplicateRule(String),
}
