//! Relationship discovery - mines co-occurrence statistics for extra rules
//!
//! Discovered rules are appended to the catalog before pair detection. A
//! (trigger class, action class) combination the catalog already covers is
//! never rediscovered.

use crate::catalog::RelationshipCatalog;
use crate::config::DetectorConfig;
use hearth_domain::{ComplexityTier, EndpointSpec, HistoricalStats, Inventory, RelationshipRule};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Confidence ceiling for discovered rules
const DISCOVERED_CONFIDENCE_CEILING: f64 = 0.8;

/// Benefit assigned to discovered rules
const DISCOVERED_BENEFIT: f64 = 0.5;

fn spec_for(domain: &str, device_class: Option<&str>) -> EndpointSpec {
    match device_class {
        Some(class) => EndpointSpec::class(domain, class),
        None => EndpointSpec::domain(domain),
    }
}

/// Labels never contain `:` or `->`, so distinct class pairs get distinct ids
fn rule_id(trigger: &EndpointSpec, action: &EndpointSpec) -> String {
    format!("discovered:{}->{}", trigger.label(), action.label())
}

/// Propose rules for frequently co-occurring, uncatalogued class pairs
pub fn discover_rules(
    stats: &HistoricalStats,
    inventory: &Inventory,
    catalog: &RelationshipCatalog,
    config: &DetectorConfig,
) -> Vec<RelationshipRule> {
    let mut totals: BTreeMap<(EndpointSpec, EndpointSpec), u64> = BTreeMap::new();

    for co in &stats.co_occurrences {
        if co.count < config.discovery_min_support || co.first == co.second {
            continue;
        }
        let (Some(trigger), Some(action)) = (inventory.node(&co.first), inventory.node(&co.second)) else {
            debug!("Skipping co-occurrence for unknown nodes {} → {}", co.first, co.second);
            continue;
        };
        if !config.is_actionable(&action.domain) || catalog.covers(trigger, action) {
            continue;
        }

        let key = (
            spec_for(&trigger.domain, trigger.device_class.as_deref()),
            spec_for(&action.domain, action.device_class.as_deref()),
        );
        let total = totals.entry(key).or_insert(0);
        *total = total.saturating_add(co.count);
    }

    let saturation = config.discovery_saturation.max(1) as f64;
    let rules: Vec<RelationshipRule> = totals
        .into_iter()
        .map(|((trigger, action), total)| {
            let confidence = (total as f64 / saturation).min(1.0) * DISCOVERED_CONFIDENCE_CEILING;
            let description = format!("Observed: {} usually followed by {}", trigger.label(), action.label());
            RelationshipRule::new(
                rule_id(&trigger, &action),
                trigger,
                action,
                confidence,
                DISCOVERED_BENEFIT,
                ComplexityTier::Medium,
                description,
            )
            .discovered()
        })
        .collect();

    if !rules.is_empty() {
        info!("Discovered {} relationship rules from co-occurrence statistics", rules.len());
    }

    rules
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_domain::{CoOccurrence, DeviceNode, RuleOrigin};

    fn inventory() -> Inventory {
        Inventory::from_nodes(vec![
            DeviceNode::new("binary_sensor.bed_vibration", "binary_sensor", Some("vibration"), Some("bedroom")),
            DeviceNode::new("cover.bedroom", "cover", None, Some("bedroom")),
            DeviceNode::new("binary_sensor.hall_motion", "binary_sensor", Some("motion"), Some("hall")),
            DeviceNode::new("light.hall", "light", None, Some("hall")),
            DeviceNode::new("sensor.power", "sensor", Some("power"), Some("hall")),
        ])
    }

    fn co(first: &str, second: &str, count: u64) -> CoOccurrence {
        CoOccurrence {
            first: first.to_string(),
            second: second.to_string(),
            count,
        }
    }

    #[test]
    fn test_discovers_uncatalogued_pair() {
        let stats = HistoricalStats {
            co_occurrences: vec![
                co("binary_sensor.bed_vibration", "cover.bedroom", 25),
                co("binary_sensor.hall_motion", "light.hall", 90),
            ],
            ..Default::default()
        };

        let rules = discover_rules(
            &stats,
            &inventory(),
            &RelationshipCatalog::default(),
            &DetectorConfig::default(),
        );

        assert_eq!(rules.len(), 1);
        let rule = &rules[0];
        assert_eq!(rule.id, "discovered:binary_sensor/vibration->cover");
        assert_eq!(rule.origin, RuleOrigin::Discovered);
        assert!((rule.confidence - 0.4).abs() < 1e-9);
        assert_eq!(rule.complexity, ComplexityTier::Medium);
    }

    #[test]
    fn test_min_support_and_actionable_filters() {
        let stats = HistoricalStats {
            co_occurrences: vec![
                co("binary_sensor.bed_vibration", "cover.bedroom", 9),
                co("light.hall", "sensor.power", 100),
                co("ghost.a", "cover.bedroom", 100),
            ],
            ..Default::default()
        };

        let rules = discover_rules(
            &stats,
            &inventory(),
            &RelationshipCatalog::default(),
            &DetectorConfig::default(),
        );
        assert!(rules.is_empty());
    }

    #[test]
    fn test_confidence_saturates() {
        let stats = HistoricalStats {
            co_occurrences: vec![co("binary_sensor.bed_vibration", "cover.bedroom", 500)],
            ..Default::default()
        };
        let rules = discover_rules(
            &stats,
            &inventory(),
            &RelationshipCatalog::default(),
            &DetectorConfig::default(),
        );
        assert!((rules[0].confidence - 0.8).abs() < 1e-9);

        let catalog = RelationshipCatalog::default().with_additional(rules).unwrap();
        assert_eq!(catalog.len(), 19);
    }

    #[test]
    fn test_ids_distinguish_domain_from_class() {
        let inventory = Inventory::from_nodes(vec![
            DeviceNode::new("a_b.one", "a_b", None, Some("lab")),
            DeviceNode::new("a.two", "a", Some("b"), Some("lab")),
            DeviceNode::new("cover.lab", "cover", None, Some("lab")),
        ]);
        let stats = HistoricalStats {
            co_occurrences: vec![co("a_b.one", "cover.lab", 20), co("a.two", "cover.lab", 20)],
            ..Default::default()
        };

        let rules = discover_rules(&stats, &inventory, &RelationshipCatalog::default(), &DetectorConfig::default());
        assert_eq!(rules.len(), 2);
        assert_ne!(rules[0].id, rules[1].id);
        assert!(RelationshipCatalog::default_catalog().with_additional(rules).is_ok());
    }

    #[test]
    fn test_huge_counts_saturate() {
        let stats = HistoricalStats {
            co_occurrences: vec![
                co("binary_sensor.bed_vibration", "cover.bedroom", u64::MAX),
                co("binary_sensor.bed_vibration", "cover.bedroom", 10),
            ],
            ..Default::default()
        };
        let rules = discover_rules(
            &stats,
            &inventory(),
            &RelationshipCatalog::default(),
            &DetectorConfig::default(),
        );
        assert_eq!(rules.len(), 1);
        assert!((rules[0].confidence - 0.8).abs() < 1e-9);
    }
}
