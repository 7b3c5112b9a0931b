//! Configuration for enrichment stages

use crate::error::EnrichmentError;
use hearth_domain::score::is_unit;
use serde::{Deserialize, Serialize};

/// Support at or above which a candidate counts as validated
pub const VALIDATION_THRESHOLD: f64 = 0.7;

/// Support tier that earns the moderate boost
pub const MODERATE_SUPPORT: f64 = 0.5;

/// Pattern validator tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Weight of the co-occurrence sub-score
    pub co_occurrence_weight: f64,

    /// Weight of the time-alignment sub-score
    pub time_alignment_weight: f64,

    /// Weight of the activity sub-score
    pub activity_weight: f64,

    /// Co-occurrence count that scores 1.0
    pub co_occurrence_saturation: u64,

    /// Event count that scores 1.0 for activity
    pub activity_saturation: u64,

    /// Support needed to set `validated`
    pub validation_threshold: f64,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            co_occurrence_weight: 0.5,
            time_alignment_weight: 0.3,
            activity_weight: 0.2,
            co_occurrence_saturation: 20,
            activity_saturation: 100,
            validation_threshold: VALIDATION_THRESHOLD,
        }
    }
}

/// Blueprint fit tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlueprintConfig {
    /// Weight of domain Jaccard overlap
    pub domain_weight: f64,

    /// Weight of device-class coverage
    pub device_class_weight: f64,

    /// Weight of corpus popularity/quality
    pub reputation_weight: f64,

    /// Fit that earns the strong boost
    pub strong_fit: f64,

    /// Fit that earns the moderate boost
    pub good_fit: f64,
}

impl Default for BlueprintConfig {
    fn default() -> Self {
        Self {
            domain_weight: 0.5,
            device_class_weight: 0.3,
            reputation_weight: 0.2,
            strong_fit: 0.8,
            good_fit: 0.6,
        }
    }
}

/// Multi-signal booster tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostConfig {
    /// Apply the booster at all
    pub enabled: bool,

    /// Hour from which lighting is most useful
    pub evening_start_hour: u8,

    /// Hour until which lighting is still useful
    pub morning_end_hour: u8,

    /// Start of the bright part of the day
    pub daytime_start_hour: u8,

    /// End of the bright part of the day
    pub daytime_end_hour: u8,

    /// Size of one temporal nudge
    pub temporal_step: f64,

    /// Temporal contributions are capped at ±this
    pub max_temporal: f64,

    /// Boost when a weather trigger's condition currently holds
    pub weather_step: f64,

    /// Boost when an energy/carbon window is currently open
    pub energy_step: f64,

    /// Penalty when an energy/carbon window is currently unfavourable
    pub energy_penalty: f64,

    /// Forecast low at or below this counts as frost (°C)
    pub frost_threshold_c: f64,

    /// Forecast high at or above this counts as heat (°C)
    pub heat_threshold_c: f64,
}

impl Default for BoostConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            evening_start_hour: 17,
            morning_end_hour: 6,
            daytime_start_hour: 10,
            daytime_end_hour: 16,
            temporal_step: 0.05,
            max_temporal: 0.10,
            weather_step: 0.10,
            energy_step: 0.10,
            energy_penalty: 0.05,
            frost_threshold_c: 2.0,
            heat_threshold_c: 28.0,
        }
    }
}

/// Configuration for every enrichment stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// Pattern validator
    pub pattern: PatternConfig,

    /// Blueprint fit
    pub blueprint: BlueprintConfig,

    /// Multi-signal booster
    pub boost: BoostConfig,
}

impl EnrichmentConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), EnrichmentError> {
        let p = &self.pattern;
        let weights = p.co_occurrence_weight + p.time_alignment_weight + p.activity_weight;
        if (weights - 1.0).abs() > 1e-6 {
            return Err(EnrichmentError::Config("pattern weights must sum to 1.0".to_string()));
        }
        if p.co_occurrence_saturation == 0 || p.activity_saturation == 0 {
            return Err(EnrichmentError::Config("saturation values must be greater than 0".to_string()));
        }
        if !is_unit(p.validation_threshold) {
            return Err(EnrichmentError::Config("validation_threshold must be between 0.0 and 1.0".to_string()));
        }

        let b = &self.blueprint;
        let weights = b.domain_weight + b.device_class_weight + b.reputation_weight;
        if (weights - 1.0).abs() > 1e-6 {
            return Err(EnrichmentError::Config("blueprint weights must sum to 1.0".to_string()));
        }
        if b.good_fit > b.strong_fit {
            return Err(EnrichmentError::Config("good_fit cannot exceed strong_fit".to_string()));
        }

        let s = &self.boost;
        if [s.evening_start_hour, s.morning_end_hour, s.daytime_start_hour, s.daytime_end_hour]
            .iter()
            .any(|h| *h > 23)
        {
            return Err(EnrichmentError::Config("hours must be between 0 and 23".to_string()));
        }
        if s.daytime_start_hour > s.daytime_end_hour {
            return Err(EnrichmentError::Config("daytime_start_hour cannot exceed daytime_end_hour".to_string()));
        }
        for (name, value) in [
            ("temporal_step", s.temporal_step),
            ("max_temporal", s.max_temporal),
            ("weather_step", s.weather_step),
            ("energy_step", s.energy_step),
            ("energy_penalty", s.energy_penalty),
        ] {
            if !is_unit(value) {
                return Err(EnrichmentError::Config(format!("{} must be between 0.0 and 1.0", name)));
            }
        }
        Ok(())
    }
}
