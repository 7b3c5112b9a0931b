//! Configuration for the detectors

use crate::error::DetectorError;
use serde::{Deserialize, Serialize};

/// Whether a pair must share an area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaPolicy {
    /// Both ends must resolve to the same area
    #[default]
    SameArea,

    /// Any two nodes may be paired
    Any,
}

impl AreaPolicy {
    /// Check whether two effective areas are compatible
    pub fn allows(&self, a: Option<&str>, b: Option<&str>) -> bool {
        match self {
            AreaPolicy::Any => true,
            AreaPolicy::SameArea => matches!((a, b), (Some(x), Some(y)) if x == y),
        }
    }
}

/// Configuration shared by every detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Area constraint for pairs and chains
    pub area_policy: AreaPolicy,

    /// Build chains from pairwise synergies
    pub enable_chains: bool,

    /// Propose area and domain scenes
    pub enable_scenes: bool,

    /// Propose external-signal synergies
    pub enable_context: bool,

    /// Only the N highest-confidence pairs seed chains
    pub chain_candidate_limit: usize,

    /// Stop after emitting this many chains
    pub max_chains: usize,

    /// Longest chain in nodes (3 or 4)
    pub max_chain_depth: usize,

    /// Domains a scene or context synergy may act on
    pub actionable_domains: Vec<String>,

    /// Smallest area scene
    pub min_area_scene_size: usize,

    /// Smallest domain scene
    pub min_domain_scene_size: usize,

    /// Base confidence of an area scene
    pub area_scene_confidence: f64,

    /// Base benefit of an area scene
    pub area_scene_benefit: f64,

    /// Base confidence of a domain scene
    pub domain_scene_confidence: f64,

    /// Base benefit of a domain scene
    pub domain_scene_benefit: f64,

    /// Domains treated as high-power consumers
    pub high_power_domains: Vec<String>,

    /// Device classes treated as high-power consumers
    pub high_power_device_classes: Vec<String>,

    /// Device classes that count as high-power only with the `power_monitoring` feature
    pub power_monitored_classes: Vec<String>,

    /// Mine co-occurrence statistics for extra rules
    pub discovery_enabled: bool,

    /// Minimum directed co-occurrences before a pair counts as evidence
    pub discovery_min_support: u64,

    /// Co-occurrence total at which discovered confidence saturates
    pub discovery_saturation: u64,
}

impl Default for DetectorConfig {
    /// Default configuration: same-area pairs, bounded chains
    fn default() -> Self {
        Self {
            area_policy: AreaPolicy::SameArea,
            enable_chains: true,
            enable_scenes: true,
            enable_context: true,
            chain_candidate_limit: 200,
            max_chains: 500,
            max_chain_depth: 4,
            actionable_domains: to_strings(&["light", "switch", "cover", "fan", "media_player", "climate"]),
            min_area_scene_size: 2,
            min_domain_scene_size: 3,
            area_scene_confidence: 0.60,
            area_scene_benefit: 0.60,
            domain_scene_confidence: 0.50,
            domain_scene_benefit: 0.45,
            high_power_domains: to_strings(&["climate", "water_heater"]),
            high_power_device_classes: to_strings(&["ev_charger", "heater", "dryer", "washer", "dishwasher"]),
            power_monitored_classes: to_strings(&["outlet"]),
            discovery_enabled: false,
            discovery_min_support: 10,
            discovery_saturation: 50,
        }
    }
}

impl DetectorConfig {
    /// Aggressive preset: cross-area pairs, deeper chain search, discovery on
    pub fn aggressive() -> Self {
        Self {
            area_policy: AreaPolicy::Any,
            chain_candidate_limit: 1_000,
            max_chains: 2_000,
            discovery_enabled: true,
            discovery_min_support: 5,
            ..Self::default()
        }
    }

    /// Conservative preset: pairs and short chains only
    pub fn conservative() -> Self {
        Self {
            enable_context: false,
            chain_candidate_limit: 50,
            max_chains: 100,
            max_chain_depth: 3,
            min_area_scene_size: 3,
            ..Self::default()
        }
    }

    /// Whether a domain is actionable
    pub fn is_actionable(&self, domain: &str) -> bool {
        self.actionable_domains.iter().any(|d| d == domain)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), DetectorError> {
        if !(3..=4).contains(&self.max_chain_depth) {
            return Err(DetectorError::Config("max_chain_depth must be 3 or 4".to_string()));
        }
        if self.min_area_scene_size < 2 || self.min_domain_scene_size < 2 {
            return Err(DetectorError::Config("scene sizes must be at least 2".to_string()));
        }
        for (name, value) in [
            ("area_scene_confidence", self.area_scene_confidence),
            ("area_scene_benefit", self.area_scene_benefit),
            ("domain_scene_confidence", self.domain_scene_confidence),
            ("domain_scene_benefit", self.domain_scene_benefit),
        ] {
            if !hearth_domain::score::is_unit(value) {
                return Err(DetectorError::Config(format!("{} must be between 0.0 and 1.0", name)));
            }
        }
        if self.discovery_saturation == 0 {
            return Err(DetectorError::Config("discovery_saturation must be greater than 0".to_string()));
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, DetectorError> {
        toml::from_str(toml_str).map_err(|e| DetectorError::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, DetectorError> {
        toml::to_string_pretty(self).map_err(|e| DetectorError::Config(format!("Failed to serialize to TOML: {}", e)))
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
