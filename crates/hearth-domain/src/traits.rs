//! Trait definitions for external collaborators
//!
//! These traits define the boundaries between the engine and the systems it
//! reads from. Implementations live in hearth-providers; the pipeline runs
//! each call on the blocking pool under a timeout.

use crate::{BlueprintTemplate, DeviceSignature, ExternalSignals, HistoricalStats, Inventory, TimeWindow};

/// Source of the device/entity inventory
///
/// A failure here is fatal for the run.
pub trait InventoryLoader {
    /// Error type for inventory operations
    type Error;

    /// Load a full inventory snapshot
    fn load_inventory(&self) -> Result<Inventory, Self::Error>;
}

/// Historical event store
pub trait StatisticsProvider {
    /// Error type for statistics operations
    type Error;

    /// Fetch co-occurrence counts and activity histograms for a window
    fn fetch_statistics(&self, window: &TimeWindow) -> Result<HistoricalStats, Self::Error>;
}

/// Weather / energy / carbon / calendar feeds
pub trait SignalProvider {
    /// Error type for signal operations
    type Error;

    /// Fetch whatever external signals are currently available
    fn fetch_signals(&self) -> Result<ExternalSignals, Self::Error>;
}

/// Community blueprint corpus
pub trait BlueprintCorpus {
    /// Error type for corpus operations
    type Error;

    /// Find templates relevant to a device signature
    fn find_templates(&self, signature: &DeviceSignature) -> Result<Vec<BlueprintTemplate>, Self::Error>;
}
