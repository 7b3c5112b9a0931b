//! Multi-signal context booster
//!
//! Nudges confidence with what is true right now: time of day, season and
//! calendar (temporal), current weather (weather), and tariff or grid
//! carbon (energy). The energy contribution also moves impact.

use crate::config::BoostConfig;
use hearth_domain::score::adjust;
use hearth_domain::signals::conditions;
use hearth_domain::{
    ContextBoost, EnrichmentNote, ExternalSignals, Inventory, Season, SignalLevel, SignalSource, SynergyCandidate,
};
use std::collections::BTreeSet;

fn domains_of<'a>(candidate: &SynergyCandidate, inventory: &'a Inventory) -> BTreeSet<&'a str> {
    candidate
        .devices
        .iter()
        .filter_map(|id| inventory.node(id))
        .map(|n| n.domain.as_str())
        .collect()
}

fn temporal(
    action_domain: Option<&str>,
    domains: &BTreeSet<&str>,
    signals: &ExternalSignals,
    config: &BoostConfig,
) -> (f64, Vec<String>) {
    let mut delta = 0.0;
    let mut evidence = Vec::new();

    if let (Some(hour), Some("light")) = (signals.local_hour, action_domain) {
        if hour >= config.evening_start_hour || hour < config.morning_end_hour {
            delta += config.temporal_step;
            evidence.push(format!("lighting is most useful at hour {}", hour));
        } else if hour >= config.daytime_start_hour && hour < config.daytime_end_hour {
            delta -= config.temporal_step;
        }
    }

    match signals.season {
        Some(Season::Winter) if domains.contains("climate") => {
            delta += config.temporal_step;
            evidence.push("winter favours climate automations".to_string());
        }
        Some(Season::Summer) if domains.contains("cover") || domains.contains("fan") => {
            delta += config.temporal_step;
            evidence.push("summer favours shading and cooling".to_string());
        }
        _ => {}
    }

    if signals.has_absence() && (domains.contains("climate") || domains.contains("lock")) {
        delta += config.temporal_step;
        evidence.push("calendar shows the home will be empty".to_string());
    }

    (delta.clamp(-config.max_temporal, config.max_temporal), evidence)
}

fn weather(candidate: &SynergyCandidate, signals: &ExternalSignals, config: &BoostConfig) -> (f64, Option<String>) {
    let Some(trigger) = candidate.external_trigger.as_ref().filter(|t| t.source == SignalSource::Weather) else {
        return (0.0, None);
    };
    let Some(current) = signals.weather.as_ref() else {
        return (0.0, None);
    };

    let active = match trigger.condition.as_str() {
        conditions::FROST_FORECAST => signals.coldest_c().is_some_and(|t| t <= config.frost_threshold_c),
        conditions::HEAT_FORECAST => signals.warmest_c().is_some_and(|t| t >= config.heat_threshold_c),
        conditions::PRECIPITATION => current.condition.is_precipitation(),
        conditions::OVERCAST => current.condition.is_low_light(),
        _ => false,
    };

    if active {
        (config.weather_step, Some(format!("{} currently holds", trigger.condition)))
    } else {
        (0.0, None)
    }
}

fn energy(candidate: &SynergyCandidate, signals: &ExternalSignals, config: &BoostConfig) -> (f64, Option<String>) {
    let Some(trigger) = candidate.external_trigger.as_ref() else {
        return (0.0, None);
    };

    let level = match trigger.source {
        SignalSource::EnergyPrice => signals.energy.as_ref().map(|e| e.level),
        SignalSource::CarbonIntensity => signals.carbon.as_ref().map(|c| c.level),
        _ => None,
    };

    match level {
        Some(SignalLevel::Low) => (
            config.energy_step,
            Some(format!("{} is low right now", trigger.source)),
        ),
        Some(SignalLevel::High) => (-config.energy_penalty, None),
        _ => (0.0, None),
    }
}

/// Compute the signed contributions for one candidate
pub fn context_boost(
    candidate: &SynergyCandidate,
    inventory: &Inventory,
    signals: &ExternalSignals,
    config: &BoostConfig,
) -> (ContextBoost, Vec<String>) {
    let domains = domains_of(candidate, inventory);
    let action_domain = candidate
        .devices
        .last()
        .and_then(|id| inventory.node(id))
        .map(|n| n.domain.as_str());
    let (temporal, mut evidence) = temporal(action_domain, &domains, signals, config);
    let (weather, weather_evidence) = weather(candidate, signals, config);
    let (energy, energy_evidence) = energy(candidate, signals, config);

    evidence.extend(weather_evidence);
    evidence.extend(energy_evidence);

    (
        ContextBoost {
            temporal,
            weather,
            energy,
        },
        evidence,
    )
}

/// Booster stage for one candidate
///
/// `signals` is None when the provider failed outright.
pub fn apply_boost(
    candidate: &mut SynergyCandidate,
    inventory: &Inventory,
    signals: Option<&ExternalSignals>,
    config: &BoostConfig,
) {
    if !config.enabled {
        return;
    }
    let Some(signals) = signals else {
        candidate.note(EnrichmentNote::SignalsUnavailable);
        return;
    };

    let (boost, evidence) = context_boost(candidate, inventory, signals, config);
    candidate.confidence = adjust(candidate.confidence, boost.total());
    candidate.impact = adjust(candidate.impact, boost.energy);
    candidate.context_boost = boost;
    candidate.evidence.extend(evidence);
}
