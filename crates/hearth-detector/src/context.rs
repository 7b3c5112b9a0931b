//! Context-aware detector - external conditions as triggers
//!
//! Each available signal source contributes its conditions as standing
//! automation opportunities ("when frost is forecast, pre-heat"). Whether a
//! condition holds right now is the booster's concern, not the detector's.
//! A source that is unavailable contributes nothing.

use crate::config::DetectorConfig;
use hearth_domain::signals::conditions;
use hearth_domain::{
    ComplexityTier, DeviceNode, ExternalSignals, ExternalTrigger, Inventory, SignalSource, SynergyCandidate,
    SynergyId, SynergyType,
};
use tracing::debug;

/// Which nodes a context rule acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextTarget {
    /// Nodes of one domain
    Domain(&'static str),

    /// High-power consumers per the detector configuration
    HighPower,
}

/// A condition → action template
#[derive(Debug, Clone, PartialEq)]
pub struct ContextRule {
    /// Rule identifier
    pub id: &'static str,

    /// Signal source
    pub source: SignalSource,

    /// Condition name
    pub condition: &'static str,

    /// Target nodes
    pub target: ContextTarget,

    /// Base confidence
    pub confidence: f64,

    /// Base benefit before the complexity penalty
    pub benefit: f64,

    /// Complexity
    pub complexity: ComplexityTier,

    /// Human description
    pub description: &'static str,
}

macro_rules! context_rule {
    ($id:literal, $source:expr, $condition:expr, $target:expr, $confidence:literal, $benefit:literal, $complexity:expr, $description:literal) => {
        ContextRule {
            id: $id,
            source: $source,
            condition: $condition,
            target: $target,
            confidence: $confidence,
            benefit: $benefit,
            complexity: $complexity,
            description: $description,
        }
    };
}

/// The context rule table
pub const CONTEXT_RULES: &[ContextRule] = &[
    context_rule!("frost_to_climate", SignalSource::Weather, conditions::FROST_FORECAST, ContextTarget::Domain("climate"), 0.70, 0.75, ComplexityTier::Medium, "Pre-heat before frost"),
    context_rule!("heat_to_climate", SignalSource::Weather, conditions::HEAT_FORECAST, ContextTarget::Domain("climate"), 0.70, 0.70, ComplexityTier::Medium, "Pre-cool before a hot day"),
    context_rule!("heat_to_cover", SignalSource::Weather, conditions::HEAT_FORECAST, ContextTarget::Domain("cover"), 0.65, 0.60, ComplexityTier::Low, "Close blinds on hot days"),
    context_rule!("precipitation_to_cover", SignalSource::Weather, conditions::PRECIPITATION, ContextTarget::Domain("cover"), 0.60, 0.55, ComplexityTier::Low, "Close awnings when rain is coming"),
    context_rule!("overcast_to_light", SignalSource::Weather, conditions::OVERCAST, ContextTarget::Domain("light"), 0.55, 0.50, ComplexityTier::Low, "Brighten lights on dark days"),
    context_rule!("low_price_to_load", SignalSource::EnergyPrice, conditions::LOW_PRICE_WINDOW, ContextTarget::HighPower, 0.65, 0.70, ComplexityTier::Medium, "Run heavy loads when energy is cheap"),
    context_rule!("low_carbon_to_load", SignalSource::CarbonIntensity, conditions::LOW_CARBON_WINDOW, ContextTarget::HighPower, 0.60, 0.60, ComplexityTier::Medium, "Run heavy loads when the grid is clean"),
    context_rule!("away_to_climate", SignalSource::Calendar, conditions::AWAY, ContextTarget::Domain("climate"), 0.65, 0.70, ComplexityTier::Medium, "Set back climate while away"),
    context_rule!("away_to_lock", SignalSource::Calendar, conditions::AWAY, ContextTarget::Domain("lock"), 0.60, 0.75, ComplexityTier::High, "Lock up for a trip"),
];

/// Whether a node is a high-power consumer
pub fn is_high_power(node: &DeviceNode, config: &DetectorConfig) -> bool {
    if config.high_power_domains.iter().any(|d| *d == node.domain) {
        return true;
    }
    let Some(class) = node.device_class.as_deref() else {
        return false;
    };
    if config.high_power_device_classes.iter().any(|c| c == class) {
        return true;
    }
    config.power_monitored_classes.iter().any(|c| c == class) && node.capabilities.has_feature("power_monitoring")
}

/// Emit context synergies for every available signal source
pub fn detect_context(
    inventory: &Inventory,
    signals: &ExternalSignals,
    config: &DetectorConfig,
) -> Vec<SynergyCandidate> {
    let mut candidates = Vec::new();

    for rule in CONTEXT_RULES {
        if !signals.has(rule.source) {
            continue;
        }

        let trigger = ExternalTrigger::new(rule.source, rule.condition);
        let trigger_id = trigger.id();

        for node in &inventory.nodes {
            let targeted = match rule.target {
                ContextTarget::Domain(domain) => node.domain == domain,
                ContextTarget::HighPower => is_high_power(node, config),
            };
            if !targeted {
                continue;
            }

            candidates.push(
                SynergyCandidate::new(
                    SynergyId::derive(SynergyType::Context, &[trigger_id.as_str(), node.id.as_str()]),
                    SynergyType::Context,
                    vec![node.id.clone()],
                    rule.confidence,
                    rule.complexity.penalize(rule.benefit),
                    rule.complexity,
                    format!("{}: {} → {}", rule.description, trigger_id, node.id),
                )
                .with_external_trigger(trigger.clone())
                .with_rules(vec![rule.id.to_string()])
                .with_area(inventory.effective_area(node).map(str::to_string)),
            );
        }
    }

    debug!(
        "Context detector: {} candidates from sources {:?}",
        candidates.len(),
        signals.available_sources()
    );

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_domain::{EnergySignal, SignalLevel, WeatherCondition, WeatherSignal};

    fn inventory() -> Inventory {
        let mut outlet = DeviceNode::new("switch.garage_outlet", "switch", Some("outlet"), Some("garage"));
        outlet.capabilities.features.insert("power_monitoring".to_string());

        Inventory::from_nodes(vec![
            DeviceNode::new("climate.living", "climate", None, Some("living")),
            DeviceNode::new("cover.living", "cover", None, Some("living")),
            DeviceNode::new("light.living", "light", None, Some("living")),
            DeviceNode::new("switch.dryer", "switch", Some("dryer"), Some("utility")),
            DeviceNode::new("switch.lamp_outlet", "switch", Some("outlet"), Some("living")),
            outlet,
        ])
    }

    fn weather() -> ExternalSignals {
        ExternalSignals {
            weather: Some(WeatherSignal {
                condition: WeatherCondition::Cloudy,
                temperature_c: 12.0,
                forecast_high_c: Some(14.0),
                forecast_low_c: Some(-1.0),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_no_signals_no_candidates() {
        let candidates = detect_context(&inventory(), &ExternalSignals::default(), &DetectorConfig::default());
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_weather_candidates() {
        let candidates = detect_context(&inventory(), &weather(), &DetectorConfig::default());

        let ids: Vec<String> = candidates
            .iter()
            .map(|c| format!("{}>{}", c.external_trigger.as_ref().unwrap().id(), c.devices[0]))
            .collect();
        assert_eq!(
            ids,
            vec![
                "weather:frost_forecast>climate.living",
                "weather:heat_forecast>climate.living",
                "weather:heat_forecast>cover.living",
                "weather:precipitation>cover.living",
                "weather:overcast>light.living",
            ]
        );
        assert!(candidates.iter().all(|c| c.depth == 1 && c.synergy_type == SynergyType::Context));
    }

    #[test]
    fn test_energy_targets_high_power_devices() {
        let signals = ExternalSignals {
            energy: Some(EnergySignal {
                price_per_kwh: 0.08,
                level: SignalLevel::Low,
            }),
            ..Default::default()
        };
        let candidates = detect_context(&inventory(), &signals, &DetectorConfig::default());
        let devices: Vec<&str> = candidates.iter().map(|c| c.devices[0].as_str()).collect();

        assert_eq!(devices, vec!["climate.living", "switch.dryer", "switch.garage_outlet"]);
    }

    #[test]
    fn test_outlet_requires_power_monitoring() {
        let config = DetectorConfig::default();
        let plain = DeviceNode::new("switch.o", "switch", Some("outlet"), None);
        assert!(!is_high_power(&plain, &config));

        let mut monitored = plain.clone();
        monitored.capabilities.features.insert("power_monitoring".to_string());
        assert!(is_high_power(&monitored, &config));
    }

    #[test]
    fn test_ids_are_stable_per_trigger_and_device() {
        let a = detect_context(&inventory(), &weather(), &DetectorConfig::default());
        let b = detect_context(&inventory(), &weather(), &DetectorConfig::default());
        assert_eq!(a, b);
        let mut ids: Vec<_> = a.iter().map(|c| c.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), a.len());
    }
}
