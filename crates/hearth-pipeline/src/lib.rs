//! Hearth Pipeline
//!
//! Orchestrates a full synergy analysis for one home.
//!
//! # Overview
//!
//! The engine loads the inventory, fetches statistics and external signals,
//! detects candidate synergies, enriches them, passes them through the
//! gatekeeper and attaches an explanation to every accepted one.
//!
//! # Architecture
//!
//! ```text
//! Collaborators → Detector → Enrichment → Gatekeeper → Explanations → SynergyReport
//! ```
//!
//! # Key Features
//!
//! - **Per-call time limits**: every collaborator call runs on the blocking pool under a timeout
//! - **Graceful degradation**: missing statistics, signals or blueprints annotate, never fail
//! - **Run deadline**: a whole run is cancelled as a unit
//! - **Run metadata**: counts by type, tier and rejection reason
//!
//! # Example Usage
//!
//! ```no_run
//! use hearth_pipeline::{EngineConfig, SynergyEngine};
//! use hearth_providers::JsonSnapshot;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let snapshot = JsonSnapshot::new("./snapshot");
//! let engine = SynergyEngine::new(
//!     snapshot.clone(),
//!     snapshot.clone(),
//!     snapshot.clone(),
//!     snapshot,
//!     EngineConfig::default(),
//! )?;
//!
//! let report = engine.run().await?;
//! for synergy in &report.synergies {
//!     println!("{} ({:?})", synergy.description, synergy.quality_tier);
//! }
//! println!("{}", report.metadata.summary());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod engine;
mod error;
pub mod explain;
pub mod metadata;
pub mod report;

pub use config::{EngineConfig, TimeoutConfig};
pub use engine::SynergyEngine;
pub use error::EngineError;
pub use explain::build_explanation;
pub use metadata::{EnrichmentAvailability, RunMetadata};
pub use report::{AnalysisOutcome, ReportStatus, SynergyReport};
