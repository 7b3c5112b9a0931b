//! Composite quality score
//!
//! ```text
//! quality = 0.25 * impact + 0.20 * confidence + 0.15 * pattern_support
//!         + 0.10 * validated + 0.10 * all_devices_active
//!         + 0.05 * (blueprint_fit > 0.7) + complexity_adjustment
//! ```
//!
//! The complexity adjustment is +0.15 for low, 0 for medium and -0.15 for
//! high. The sum is clamped to [0, 1].

use hearth_domain::score::clamp_unit;
use hearth_domain::{Inventory, QualityTier, ScoreTerm, SynergyCandidate};

/// Weight of final impact
pub const IMPACT_WEIGHT: f64 = 0.25;
/// Weight of final confidence
pub const CONFIDENCE_WEIGHT: f64 = 0.20;
/// Weight of pattern support
pub const PATTERN_WEIGHT: f64 = 0.15;
/// Weight of the validated flag
pub const VALIDATED_WEIGHT: f64 = 0.10;
/// Weight of the all-devices-active flag
pub const ACTIVE_WEIGHT: f64 = 0.10;
/// Weight of a strong blueprint match
pub const BLUEPRINT_WEIGHT: f64 = 0.05;
/// Fit above which the blueprint term applies
pub const BLUEPRINT_BONUS_FIT: f64 = 0.7;

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// Every weighted term of a candidate's quality score
///
/// Without an inventory the devices cannot be confirmed active, so that
/// term is 0.
pub fn score_breakdown(candidate: &SynergyCandidate, inventory: Option<&Inventory>) -> Vec<ScoreTerm> {
    let active = inventory.is_some_and(|inv| inv.all_available(&candidate.devices));
    let blueprint = candidate
        .blueprint_fit_score()
        .is_some_and(|fit| fit > BLUEPRINT_BONUS_FIT);

    vec![
        ScoreTerm::new("impact", IMPACT_WEIGHT, candidate.impact),
        ScoreTerm::new("confidence", CONFIDENCE_WEIGHT, candidate.confidence),
        ScoreTerm::new("pattern_support", PATTERN_WEIGHT, candidate.pattern_support_score),
        ScoreTerm::new("validated", VALIDATED_WEIGHT, flag(candidate.validated)),
        ScoreTerm::new("devices_active", ACTIVE_WEIGHT, flag(active)),
        ScoreTerm::new("blueprint_match", BLUEPRINT_WEIGHT, flag(blueprint)),
        ScoreTerm::new("complexity", 1.0, candidate.complexity.quality_adjustment()),
    ]
}

/// Sum of the term contributions, clamped to [0, 1]
pub fn quality_from_terms(terms: &[ScoreTerm]) -> f64 {
    clamp_unit(terms.iter().map(|t| t.contribution).sum())
}

/// Score a candidate in place: breakdown, quality and tier
pub fn score_candidate(candidate: &mut SynergyCandidate, inventory: Option<&Inventory>) -> f64 {
    let terms = score_breakdown(candidate, inventory);
    let quality = quality_from_terms(&terms);

    candidate.score_breakdown = terms;
    candidate.quality_score = Some(quality);
    candidate.quality_tier = Some(QualityTier::from_score(quality));
    quality
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_domain::{BlueprintMatch, ComplexityTier, DeviceNode, SynergyId, SynergyType};
    use proptest::prelude::*;

    fn candidate(confidence: f64, impact: f64, complexity: ComplexityTier) -> SynergyCandidate {
        SynergyCandidate::new(
            SynergyId::derive(SynergyType::Pair, &["binary_sensor.m", "light.l"]),
            SynergyType::Pair,
            vec!["binary_sensor.m".to_string(), "light.l".to_string()],
            confidence,
            impact,
            complexity,
            "pair",
        )
    }

    fn inventory(light_available: bool) -> Inventory {
        let mut light = DeviceNode::new("light.l", "light", None, Some("office"));
        light.available = light_available;
        Inventory::from_nodes(vec![
            DeviceNode::new("binary_sensor.m", "binary_sensor", Some("motion"), Some("office")),
            light,
        ])
    }

    #[test]
    fn test_full_marks() {
        let mut c = candidate(1.0, 1.0, ComplexityTier::Low);
        c.pattern_support_score = 1.0;
        c.validated = true;
        c.blueprint = Some(BlueprintMatch {
            template_id: "t".to_string(),
            name: "t".to_string(),
            fit_score: 0.9,
        });

        let quality = score_candidate(&mut c, Some(&inventory(true)));
        assert!((quality - 1.0).abs() < 1e-9);
        assert_eq!(c.quality_tier, Some(QualityTier::High));
        assert_eq!(c.score_breakdown.len(), 7);
    }

    #[test]
    fn test_medium_pair_without_enrichment() {
        let mut c = candidate(0.7, 0.63, ComplexityTier::Medium);
        let quality = score_candidate(&mut c, Some(&inventory(true)));
        // 0.25*0.63 + 0.20*0.7 + 0.10
        assert!((quality - 0.3975).abs() < 1e-9);
        assert_eq!(c.quality_tier, Some(QualityTier::Low));
    }

    #[test]
    fn test_unavailable_device_loses_active_term() {
        let mut a = candidate(0.7, 0.7, ComplexityTier::Low);
        let mut b = a.clone();
        let active = score_candidate(&mut a, Some(&inventory(true)));
        let inactive = score_candidate(&mut b, Some(&inventory(false)));
        assert!((active - inactive - ACTIVE_WEIGHT).abs() < 1e-9);
    }

    #[test]
    fn test_blueprint_term_needs_fit_above_threshold() {
        let mut c = candidate(0.7, 0.7, ComplexityTier::Low);
        c.blueprint = Some(BlueprintMatch {
            template_id: "t".to_string(),
            name: "t".to_string(),
            fit_score: 0.7,
        });
        let terms = score_breakdown(&c, None);
        let blueprint = terms.iter().find(|t| t.name == "blueprint_match").unwrap();
        assert_eq!(blueprint.contribution, 0.0);
    }

    #[test]
    fn test_high_complexity_floor() {
        let mut c = candidate(0.0, 0.0, ComplexityTier::High);
        assert_eq!(score_candidate(&mut c, None), 0.0);
        assert_eq!(c.quality_tier, Some(QualityTier::Poor));
    }

    proptest! {
        #[test]
        fn prop_quality_in_unit_interval(
            confidence in 0.0f64..=1.0,
            impact in 0.0f64..=1.0,
            support in 0.0f64..=1.0,
            validated: bool,
            tier in 0usize..3,
        ) {
            let complexity = [ComplexityTier::Low, ComplexityTier::Medium, ComplexityTier::High][tier];
            let mut c = candidate(confidence, impact, complexity);
            c.pattern_support_score = support;
            c.validated = validated;
            let quality = score_candidate(&mut c, Some(&inventory(true)));
            prop_assert!((0.0..=1.0).contains(&quality));
        }
    }
}
