//! Explanation builder
//!
//! Turns a scored synergy into a structured justification. Building an
//! explanation never fails: anything that cannot be explained properly
//! falls back to a summary-only explanation.

use hearth_domain::{Explanation, Inventory, SignalSource, SynergyCandidate, SynergyType};

/// One-line summary of a synergy
pub fn summary_line(candidate: &SynergyCandidate) -> String {
    match (candidate.quality_tier, candidate.quality_score) {
        (Some(tier), Some(quality)) if quality.is_finite() => format!(
            "{} quality {}: {} (score {:.2})",
            tier, candidate.synergy_type, candidate.description, quality
        ),
        _ => format!("{}: {}", candidate.synergy_type, candidate.description),
    }
}

fn benefit_for_domain(domain: &str) -> &'static str {
    match domain {
        "light" => "Lights follow occupancy, so fewer rooms are lit for nobody",
        "climate" => "Heating and cooling only run when they are needed",
        "cover" => "Blinds move with conditions instead of by hand",
        "fan" => "Fans only run while the room calls for it",
        "lock" => "Doors secure themselves without a manual check",
        "alarm_control_panel" => "The alarm arms itself when the home is empty",
        "valve" => "Water is shut off as soon as a problem shows up",
        "switch" => "Appliances switch with the activity that uses them",
        "media_player" => "Media reacts to what is happening in the room",
        "notify" => "You hear about it the moment it happens",
        _ => "Removes a manual step from the daily routine",
    }
}

fn benefit_for_source(source: SignalSource) -> &'static str {
    match source {
        SignalSource::Weather => "The home prepares for the weather before it arrives",
        SignalSource::EnergyPrice => "Heavy consumers shift to cheaper hours",
        SignalSource::CarbonIntensity => "Heavy consumers shift to cleaner hours",
        SignalSource::Calendar => "The home follows your plans, not a fixed schedule",
    }
}

/// Benefit description for a synergy
pub fn benefit(candidate: &SynergyCandidate, inventory: &Inventory) -> String {
    if let Some(trigger) = &candidate.external_trigger {
        return benefit_for_source(trigger.source).to_string();
    }
    if candidate.synergy_type == SynergyType::Scene {
        return format!("One action controls {} devices together", candidate.devices.len());
    }

    let action_domain = candidate
        .devices
        .last()
        .and_then(|id| inventory.node(id))
        .map(|node| node.domain.as_str())
        .unwrap_or_default();
    benefit_for_domain(action_domain).to_string()
}

/// Build the explanation for one scored synergy
///
/// Falls back to [`Explanation::minimal`] when the synergy has no quality
/// score or any score term is not a finite number.
pub fn build_explanation(candidate: &SynergyCandidate, inventory: &Inventory) -> Explanation {
    let summary = summary_line(candidate);

    let scored = candidate.quality_score.is_some_and(f64::is_finite);
    let terms_finite = candidate
        .score_breakdown
        .iter()
        .all(|t| t.weight.is_finite() && t.value.is_finite() && t.contribution.is_finite());
    if !scored || !terms_finite || candidate.score_breakdown.is_empty() {
        return Explanation::minimal(summary);
    }

    let mut evidence = candidate.evidence.clone();
    if let Some(blueprint) = &candidate.blueprint {
        let line = format!("matches blueprint '{}' (fit {:.2})", blueprint.name, blueprint.fit_score);
        if !evidence.contains(&line) {
            evidence.push(line);
        }
    }
    if let Some(path) = &candidate.path {
        evidence.push(format!("path: {}", path));
    }

    Explanation {
        summary,
        score_breakdown: candidate.score_breakdown.clone(),
        evidence,
        benefit: benefit(candidate, inventory),
        minimal: false,
    }
}

/// Attach explanations to every synergy in place
pub fn explain_all(candidates: &mut [SynergyCandidate], inventory: &Inventory) {
    for candidate in candidates {
        candidate.explanation = Some(build_explanation(candidate, inventory));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_domain::{ComplexityTier, DeviceNode, ExternalTrigger, QualityTier, ScoreTerm, SynergyId};

    fn inventory() -> Inventory {
        Inventory::from_nodes(vec![
            DeviceNode::new("binary_sensor.m", "binary_sensor", Some("motion"), Some("office")),
            DeviceNode::new("light.desk", "light", None, Some("office")),
            DeviceNode::new("climate.house", "climate", None, None),
        ])
    }

    fn scored_pair() -> SynergyCandidate {
        let devices = vec!["binary_sensor.m".to_string(), "light.desk".to_string()];
        let mut candidate = SynergyCandidate::new(
            SynergyId::derive(SynergyType::Pair, &devices),
            SynergyType::Pair,
            devices,
            0.7,
            0.6,
            ComplexityTier::Low,
            "Motion turns on light",
        );
        candidate.score_breakdown = vec![ScoreTerm::new("impact", 0.25, 0.6), ScoreTerm::new("complexity", 1.0, 0.15)];
        candidate.quality_score = Some(0.72);
        candidate.quality_tier = Some(QualityTier::High);
        candidate.evidence = vec!["co-occurred 40 times".to_string()];
        candidate
    }

    #[test]
    fn test_full_explanation() {
        let explanation = build_explanation(&scored_pair(), &inventory());

        assert!(!explanation.minimal);
        assert!(explanation.summary.contains("Motion turns on light"));
        assert!(explanation.summary.contains("0.72"));
        assert_eq!(explanation.score_breakdown.len(), 2);
        assert_eq!(explanation.evidence, vec!["co-occurred 40 times".to_string()]);
        assert!(explanation.benefit.contains("Lights"));
    }

    #[test]
    fn test_unscored_falls_back_to_minimal() {
        let mut candidate = scored_pair();
        candidate.quality_score = None;

        let explanation = build_explanation(&candidate, &inventory());
        assert!(explanation.minimal);
        assert!(explanation.score_breakdown.is_empty());
        assert!(explanation.summary.contains("Motion turns on light"));
    }

    #[test]
    fn test_non_finite_term_falls_back_to_minimal() {
        let mut candidate = scored_pair();
        candidate.score_breakdown.push(ScoreTerm::new("broken", 0.1, f64::NAN));

        assert!(build_explanation(&candidate, &inventory()).minimal);
    }

    #[test]
    fn test_context_benefit_uses_source() {
        let mut candidate = scored_pair();
        candidate.synergy_type = SynergyType::Context;
        candidate.devices = vec!["climate.house".to_string()];
        candidate.external_trigger = Some(ExternalTrigger::new(SignalSource::Weather, "frost_forecast"));

        let explanation = build_explanation(&candidate, &inventory());
        assert!(explanation.benefit.contains("weather"));
    }

    #[test]
    fn test_explain_all() {
        let mut candidates = vec![scored_pair(), scored_pair()];
        explain_all(&mut candidates, &inventory());
        assert!(candidates.iter().all(|c| c.explanation.is_some()));
    }
}
