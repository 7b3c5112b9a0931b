//! Engine configuration
//!
//! One TOML file drives a whole run:
//!
//! ```toml
//! statistics_window_days = 30
//!
//! [timeouts]
//! inventory_ms = 30000
//! run_deadline_ms = 120000
//!
//! [detector]
//! area_policy = "same_area"
//!
//! [filter]
//! min_quality = 0.5
//! ```
//!
//! Every section is optional; missing keys take their defaults.

use crate::error::EngineError;
use hearth_detector::DetectorConfig;
use hearth_domain::TimeWindow;
use hearth_enrichment::EnrichmentConfig;
use hearth_gatekeeper::FilterConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Per-collaborator time limits (milliseconds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Inventory load; exceeding it is fatal
    pub inventory_ms: u64,

    /// Statistics fetch; exceeding it drops pattern validation
    pub statistics_ms: u64,

    /// Signal fetch; exceeding it drops context detection and boosts
    pub signals_ms: u64,

    /// All blueprint lookups together; exceeding it drops blueprint fit
    pub blueprint_ms: u64,

    /// The whole run
    pub run_deadline_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            inventory_ms: 30_000,
            statistics_ms: 15_000,
            signals_ms: 10_000,
            blueprint_ms: 20_000,
            run_deadline_ms: 120_000,
        }
    }
}

impl TimeoutConfig {
    /// Inventory limit as a Duration
    pub fn inventory(&self) -> Duration {
        Duration::from_millis(self.inventory_ms)
    }

    /// Statistics limit as a Duration
    pub fn statistics(&self) -> Duration {
        Duration::from_millis(self.statistics_ms)
    }

    /// Signals limit as a Duration
    pub fn signals(&self) -> Duration {
        Duration::from_millis(self.signals_ms)
    }

    /// Blueprint limit as a Duration
    pub fn blueprint(&self) -> Duration {
        Duration::from_millis(self.blueprint_ms)
    }

    /// Run deadline as a Duration
    pub fn run_deadline(&self) -> Duration {
        Duration::from_millis(self.run_deadline_ms)
    }
}

/// Configuration for a full engine run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Days of history requested from the statistics provider
    pub statistics_window_days: u32,

    /// Collaborator time limits
    pub timeouts: TimeoutConfig,

    /// Detection
    pub detector: DetectorConfig,

    /// Pattern, blueprint and booster stages
    pub enrichment: EnrichmentConfig,

    /// Quality filter
    pub filter: FilterConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            statistics_window_days: 30,
            timeouts: TimeoutConfig::default(),
            detector: DetectorConfig::default(),
            enrichment: EnrichmentConfig::default(),
            filter: FilterConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Fewer, safer suggestions
    pub fn strict() -> Self {
        Self {
            detector: DetectorConfig::conservative(),
            filter: FilterConfig::strict(),
            ..Default::default()
        }
    }

    /// More suggestions, including discovered relationships
    pub fn permissive() -> Self {
        Self {
            detector: DetectorConfig::aggressive(),
            filter: FilterConfig::permissive(),
            ..Default::default()
        }
    }

    /// Statistics window as requested from the provider
    pub fn statistics_window(&self) -> TimeWindow {
        TimeWindow::last_days(self.statistics_window_days)
    }

    /// Validate every section
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.statistics_window_days == 0 {
            return Err(EngineError::Config(
                "statistics_window_days must be greater than 0".to_string(),
            ));
        }
        let t = &self.timeouts;
        for (name, value) in [
            ("inventory_ms", t.inventory_ms),
            ("statistics_ms", t.statistics_ms),
            ("signals_ms", t.signals_ms),
            ("blueprint_ms", t.blueprint_ms),
            ("run_deadline_ms", t.run_deadline_ms),
        ] {
            if value == 0 {
                return Err(EngineError::Config(format!("{} must be greater than 0", name)));
            }
        }
        self.detector.validate()?;
        self.enrichment.validate()?;
        self.filter.validate()?;
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, EngineError> {
        toml::from_str(toml_str).map_err(|e| EngineError::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, EngineError> {
        toml::to_string_pretty(self).map_err(|e| EngineError::Config(format!("Failed to serialize to TOML: {}", e)))
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, EngineError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_detector::AreaPolicy;

    #[test]
    fn test_presets_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
        assert!(EngineConfig::strict().validate().is_ok());
        assert!(EngineConfig::permissive().validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config = EngineConfig::from_toml(
            r#"
            [timeouts]
            inventory_ms = 500

            [detector]
            area_policy = "any"

            [filter]
            strict_mode = true
            "#,
        )
        .unwrap();

        assert_eq!(config.statistics_window_days, 30);
        assert_eq!(config.timeouts.inventory(), Duration::from_millis(500));
        assert_eq!(config.timeouts.signals_ms, 10_000);
        assert_eq!(config.detector.area_policy, AreaPolicy::Any);
        assert!(config.filter.strict_mode);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = EngineConfig::strict();
        let parsed = EngineConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = EngineConfig::default();
        config.timeouts.blueprint_ms = 0;
        assert!(matches!(config.validate(), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "statistics_window_days = 14\n").unwrap();

        let config = EngineConfig::from_file(&path).unwrap();
        assert_eq!(config.statistics_window(), TimeWindow::last_days(14));

        assert!(EngineConfig::from_file(&dir.path().join("missing.toml")).is_err());
    }
}
