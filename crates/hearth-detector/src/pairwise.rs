//! Pairwise detector - inventory × catalog → pair synergies

use crate::catalog::RelationshipCatalog;
use crate::config::DetectorConfig;
use hearth_domain::{Inventory, SynergyCandidate, SynergyId, SynergyLink, SynergyType};
use tracing::debug;

/// Produce every pair synergy the catalog allows
///
/// A pair is emitted when a rule matches, the area policy allows it, and no
/// existing automation already references both nodes. Output follows
/// inventory order (trigger, then action).
pub fn detect_pairs(
    inventory: &Inventory,
    catalog: &RelationshipCatalog,
    config: &DetectorConfig,
) -> Vec<SynergyCandidate> {
    let mut pairs = Vec::new();
    let mut already_linked = 0usize;

    for trigger in inventory.nodes.iter().filter(|n| catalog.is_trigger(n)) {
        let trigger_area = inventory.effective_area(trigger);

        for action in &inventory.nodes {
            if action.id == trigger.id {
                continue;
            }
            let Some(rule) = catalog.best_match(trigger, action) else {
                continue;
            };

            let action_area = inventory.effective_area(action);
            if !config.area_policy.allows(trigger_area, action_area) {
                continue;
            }
            if inventory.is_linked(&trigger.id, &action.id) {
                already_linked += 1;
                continue;
            }

            let shared_area = match (trigger_area, action_area) {
                (Some(a), Some(b)) if a == b => Some(a.to_string()),
                _ => None,
            };

            let candidate = SynergyCandidate::new(
                SynergyId::derive(SynergyType::Pair, &[trigger.id.as_str(), action.id.as_str()]),
                SynergyType::Pair,
                vec![trigger.id.clone(), action.id.clone()],
                rule.confidence,
                rule.impact(),
                rule.complexity,
                format!("{}: {} → {}", rule.description, trigger.id, action.id),
            )
            .with_links(vec![SynergyLink {
                trigger: trigger.id.clone(),
                action: action.id.clone(),
                rule_id: rule.id.clone(),
            }])
            .with_area(shared_area);

            pairs.push(candidate);
        }
    }

    debug!(
        "Pairwise detector: {} pairs, {} skipped as already automated",
        pairs.len(),
        already_linked
    );

    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AreaPolicy;
    use hearth_domain::{ComplexityTier, DeviceNode, ExistingAutomation};

    fn office() -> Inventory {
        Inventory::from_nodes(vec![
            DeviceNode::new("binary_sensor.office_motion", "binary_sensor", Some("motion"), Some("office")),
            DeviceNode::new("light.office", "light", None, Some("office")),
        ])
    }

    #[test]
    fn test_motion_and_light_in_office() {
        let pairs = detect_pairs(&office(), &RelationshipCatalog::default(), &DetectorConfig::default());

        assert_eq!(pairs.len(), 1);
        let pair = &pairs[0];
        assert_eq!(pair.synergy_type, SynergyType::Pair);
        assert_eq!(pair.base_confidence, 0.7);
        assert_eq!(pair.complexity, ComplexityTier::Low);
        assert_eq!(pair.devices, vec!["binary_sensor.office_motion", "light.office"]);
        assert_eq!(pair.area_id.as_deref(), Some("office"));
        assert_eq!(pair.rule_ids, vec!["motion_to_light"]);
    }

    #[test]
    fn test_area_policy_controls_cross_area_pairs() {
        let inventory = Inventory::from_nodes(vec![
            DeviceNode::new("binary_sensor.hall_motion", "binary_sensor", Some("motion"), Some("hall")),
            DeviceNode::new("light.office", "light", None, Some("office")),
        ]);

        let same_area = detect_pairs(&inventory, &RelationshipCatalog::default(), &DetectorConfig::default());
        assert!(same_area.is_empty());

        let config = DetectorConfig {
            area_policy: AreaPolicy::Any,
            ..DetectorConfig::default()
        };
        let any = detect_pairs(&inventory, &RelationshipCatalog::default(), &config);
        assert_eq!(any.len(), 1);
        assert_eq!(any[0].area_id, None);
    }

    #[test]
    fn test_existing_automation_excludes_pair() {
        let mut inventory = office();
        inventory.automations.push(ExistingAutomation {
            id: "automation.office_lights".to_string(),
            alias: Some("Office lights".to_string()),
            node_ids: vec!["binary_sensor.office_motion".to_string(), "light.office".to_string()],
        });

        let pairs = detect_pairs(&inventory, &RelationshipCatalog::default(), &DetectorConfig::default());
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_impact_penalized_by_complexity() {
        let inventory = Inventory::from_nodes(vec![
            DeviceNode::new("binary_sensor.front_door", "binary_sensor", Some("door"), Some("entry")),
            DeviceNode::new("lock.front", "lock", None, Some("entry")),
        ]);

        let pairs = detect_pairs(&inventory, &RelationshipCatalog::default(), &DetectorConfig::default());
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].complexity, ComplexityTier::Medium);
        assert!((pairs[0].base_impact - 0.72).abs() < 1e-9);
    }

    #[test]
    fn test_custom_catalog_is_injected() {
        let empty = RelationshipCatalog::new(vec![]).unwrap();
        assert!(detect_pairs(&office(), &empty, &DetectorConfig::default()).is_empty());
    }
}
