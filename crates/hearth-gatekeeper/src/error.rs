//! Gatekeeper error types

use thiserror::Error;

/// Errors that can occur while configuring the gatekeeper
///
/// Rejected synergies are not errors; they come back as
/// [`Rejection`](crate::Rejection)s.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatekeeperError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
