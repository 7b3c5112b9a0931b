//! Gatekeeper configuration

use crate::error::GatekeeperError;
use hearth_domain::score::is_unit;
use serde::{Deserialize, Serialize};

/// External sources that are never turned into suggestions
///
/// Matched as prefixes against device and external-trigger identifiers.
pub const DEFAULT_SOURCE_DENYLIST: &[&str] = &[
    "sensor.team_tracker",
    "sensor.nfl_",
    "sensor.nhl_",
    "sensor.nba_",
    "sensor.mlb_",
    "sensor.espn_",
    "sensor.stock_",
];

/// Thresholds and policy for the quality filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Minimum composite quality score
    pub min_quality: f64,

    /// Minimum final confidence
    pub min_confidence: f64,

    /// Minimum final impact
    pub min_impact: f64,

    /// Reject high-complexity synergies that lack pattern validation
    pub strict_mode: bool,

    /// Identifier prefixes of unsupported external sources
    pub source_denylist: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_quality: 0.50,
            min_confidence: 0.50,
            min_impact: 0.30,
            strict_mode: false,
            source_denylist: DEFAULT_SOURCE_DENYLIST.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl FilterConfig {
    /// Create a strict configuration (higher bar, validation required for complex synergies)
    pub fn strict() -> Self {
        Self {
            min_quality: 0.60,
            min_confidence: 0.60,
            min_impact: 0.40,
            strict_mode: true,
            ..Default::default()
        }
    }

    /// Create a permissive configuration (surface nearly everything)
    pub fn permissive() -> Self {
        Self {
            min_quality: 0.30,
            min_confidence: 0.30,
            min_impact: 0.10,
            strict_mode: false,
            ..Default::default()
        }
    }

    /// Whether an identifier belongs to a denylisted source
    pub fn is_denied(&self, id: &str) -> Option<&str> {
        self.source_denylist
            .iter()
            .find(|prefix| id.starts_with(prefix.as_str()))
            .map(String::as_str)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), GatekeeperError> {
        for (name, value) in [
            ("min_quality", self.min_quality),
            ("min_confidence", self.min_confidence),
            ("min_impact", self.min_impact),
        ] {
            if !is_unit(value) {
                return Err(GatekeeperError::Config(format!("{} must be between 0.0 and 1.0", name)));
            }
        }
        if self.source_denylist.iter().any(|p| p.trim().is_empty()) {
            return Err(GatekeeperError::Config("source_denylist entries cannot be blank".to_string()));
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, GatekeeperError> {
        toml::from_str(toml_str).map_err(|e| GatekeeperError::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, GatekeeperError> {
        toml::to_string_pretty(self).map_err(|e| GatekeeperError::Config(format!("Failed to serialize to TOML: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FilterConfig::default();
        assert_eq!(config.min_quality, 0.50);
        assert_eq!(config.min_confidence, 0.50);
        assert_eq!(config.min_impact, 0.30);
        assert!(!config.strict_mode);
        assert_eq!(config.source_denylist.len(), 7);
    }

    #[test]
    fn test_presets() {
        assert!(FilterConfig::strict().strict_mode);
        assert!(FilterConfig::strict().validate().is_ok());
        assert_eq!(FilterConfig::permissive().min_quality, 0.30);
        assert!(FilterConfig::permissive().validate().is_ok());
    }

    #[test]
    fn test_denylist_prefix_match() {
        let config = FilterConfig::default();
        assert_eq!(config.is_denied("sensor.nfl_packers_score"), Some("sensor.nfl_"));
        assert_eq!(config.is_denied("sensor.team_tracker"), Some("sensor.team_tracker"));
        assert_eq!(config.is_denied("sensor.temperature_hall"), None);
    }

    #[test]
    fn test_invalid_threshold() {
        let config = FilterConfig {
            min_impact: -0.1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml() {
        let config = FilterConfig::from_toml("strict_mode = true\nmin_quality = 0.65\n").unwrap();
        assert!(config.strict_mode);
        assert_eq!(config.min_quality, 0.65);
        assert_eq!(config.min_confidence, 0.50);

        let back = FilterConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(back, config);
    }
}
