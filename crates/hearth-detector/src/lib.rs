//! Hearth Detector
//!
//! Turns an inventory snapshot into raw synergy candidates.
//!
//! # Architecture
//!
//! ```text
//! Statistics → discovery ─┐
//!                         ▼
//! Inventory → Catalog → Pairs → Chains
//!           → Scenes
//!           → Context (external signals)
//! ```
//!
//! Every detector is a pure function that produces candidates of exactly
//! one [`SynergyType`](hearth_domain::SynergyType). [`detect_all`] runs
//! them in order and collects the chain work figures.

#![warn(missing_docs)]

pub mod catalog;
pub mod chain;
mod config;
pub mod context;
pub mod discovery;
mod error;
pub mod pairwise;
pub mod scene;

pub use catalog::RelationshipCatalog;
pub use chain::{build_chains, ChainOutput, ChainStats};
pub use config::{AreaPolicy, DetectorConfig};
pub use context::{detect_context, is_high_power};
pub use discovery::discover_rules;
pub use error::DetectorError;
pub use pairwise::detect_pairs;
pub use scene::detect_scenes;

use hearth_domain::{ExternalSignals, Inventory, SynergyCandidate};
use tracing::info;

/// All raw candidates from one detection pass
#[derive(Debug, Clone, Default)]
pub struct Detection {
    /// Pairs, then chains, then scenes, then context candidates
    pub candidates: Vec<SynergyCandidate>,

    /// Chain cutoff figures
    pub chain_stats: ChainStats,
}

/// Run every enabled detector
pub fn detect_all(
    inventory: &Inventory,
    catalog: &RelationshipCatalog,
    signals: &ExternalSignals,
    config: &DetectorConfig,
) -> Detection {
    let pairs = detect_pairs(inventory, catalog, config);

    let chain_output = if config.enable_chains {
        build_chains(&pairs, inventory, config)
    } else {
        ChainOutput::default()
    };

    let scenes = if config.enable_scenes {
        detect_scenes(inventory, config)
    } else {
        Vec::new()
    };

    let context = if config.enable_context {
        detect_context(inventory, signals, config)
    } else {
        Vec::new()
    };

    info!(
        "Detected {} pairs, {} chains, {} scenes, {} context candidates",
        pairs.len(),
        chain_output.chains.len(),
        scenes.len(),
        context.len()
    );

    let mut candidates = pairs;
    candidates.extend(chain_output.chains);
    candidates.extend(scenes);
    candidates.extend(context);

    Detection {
        candidates,
        chain_stats: chain_output.stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_domain::{DeviceNode, SynergyType};

    fn house() -> Inventory {
        Inventory::from_nodes(vec![
            DeviceNode::new("binary_sensor.office_motion", "binary_sensor", Some("motion"), Some("office")),
            DeviceNode::new("light.office", "light", None, Some("office")),
            DeviceNode::new("media_player.office", "media_player", None, Some("office")),
        ])
    }

    #[test]
    fn test_detect_all_orders_by_type() {
        let detection = detect_all(
            &house(),
            &RelationshipCatalog::default(),
            &ExternalSignals::default(),
            &DetectorConfig::default(),
        );

        let types: Vec<SynergyType> = detection.candidates.iter().map(|c| c.synergy_type).collect();
        assert_eq!(
            types,
            vec![SynergyType::Pair, SynergyType::Pair, SynergyType::Chain, SynergyType::Scene]
        );
        assert_eq!(detection.chain_stats.pairs_available, 2);
    }

    #[test]
    fn test_disabled_detectors() {
        let config = DetectorConfig {
            enable_chains: false,
            enable_scenes: false,
            ..DetectorConfig::default()
        };
        let detection = detect_all(&house(), &RelationshipCatalog::default(), &ExternalSignals::default(), &config);
        assert!(detection.candidates.iter().all(|c| c.synergy_type == SynergyType::Pair));
    }
}
