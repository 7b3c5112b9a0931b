//! Hearth Domain Layer
//!
//! This crate contains the data model shared by every stage of the synergy
//! engine. It performs no I/O and defines the trait interfaces that the
//! provider implementations satisfy.
//!
//! ## Key Concepts
//!
//! - **DeviceNode**: An entity-level handle with domain, class and area
//! - **RelationshipRule**: A compatible trigger → action class pair
//! - **SynergyCandidate**: A candidate automation, enriched stage by stage
//! - **CanonicalPairKey**: Sorted bounding identifiers used for deduplication
//! - **Tiers**: Complexity (low/medium/high) and quality (high → poor)
//!
//! ## Architecture
//!
//! - Pure data and invariants only
//! - Scores are always clamped to [0, 1]
//! - Collaborator traits carry an associated `Error` type

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod blueprint;
pub mod device;
pub mod record;
pub mod rule;
pub mod score;
pub mod signals;
pub mod stats;
pub mod synergy;
pub mod tier;
pub mod traits;

// Re-exports for convenience
pub use blueprint::{BlueprintMatch, BlueprintTemplate, DeviceSignature};
pub use device::{Capabilities, Device, DeviceNode, ExistingAutomation, ExistingScene, Inventory, SkippedRecord};
pub use record::{RecordDefect, SynergyRecord};
pub use rule::{EndpointSpec, RelationshipRule, RuleOrigin};
pub use signals::{
    CalendarEvent, CalendarKind, CarbonSignal, EnergySignal, ExternalSignals, Season, SignalLevel, SignalSource,
    WeatherCondition, WeatherSignal,
};
pub use stats::{CoOccurrence, HistoricalStats, TimeWindow, HOURS_PER_DAY};
pub use synergy::{
    CanonicalPairKey, ContextBoost, EnrichmentNote, Explanation, IntegrityError, ScoreTerm, SynergyCandidate,
    SynergyId, SynergyLink, SynergyType, ExternalTrigger,
};
pub use tier::{ComplexityTier, QualityTier};
