//! Engine error types

use hearth_detector::DetectorError;
use hearth_enrichment::EnrichmentError;
use hearth_gatekeeper::GatekeeperError;
use std::time::Duration;
use thiserror::Error;

/// Fatal errors that abort a run
///
/// Degraded enrichment is not an error; it shows up in the run metadata
/// and on the affected synergies instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The inventory loader failed
    #[error("Inventory load failed: {0}")]
    InventoryLoad(String),

    /// The inventory loader did not answer in time
    #[error("Inventory load timed out after {0:?}")]
    InventoryTimeout(Duration),

    /// The whole run exceeded its deadline
    #[error("Run deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),

    /// A background task panicked or was cancelled
    #[error("Task error: {0}")]
    Task(String),
}

impl From<DetectorError> for EngineError {
    fn from(e: DetectorError) -> Self {
        EngineError::Config(e.to_string())
    }
}

impl From<EnrichmentError> for EngineError {
    fn from(e: EnrichmentError) -> Self {
        EngineError::Config(e.to_string())
    }
}

impl From<GatekeeperError> for EngineError {
    fn from(e: GatekeeperError) -> Self {
        EngineError::Config(e.to_string())
    }
}
