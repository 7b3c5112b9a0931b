//! Error types for enrichment

use thiserror::Error;

/// Errors raised while configuring enrichment
///
/// Enrichment itself never fails: missing inputs degrade to notes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EnrichmentError {
    /// Invalid enrichment configuration
    #[error("Configuration error: {0}")]
    Config(String),
}
