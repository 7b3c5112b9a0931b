//! Scene detector - area and domain groupings of actionable nodes

use crate::config::DetectorConfig;
use hearth_domain::{ComplexityTier, DeviceNode, Inventory, SynergyCandidate, SynergyId, SynergyType};
use std::collections::BTreeMap;
use tracing::debug;

/// Propose area scenes and domain scenes
///
/// Membership is sorted. Area scenes already covered by an existing scene
/// are skipped.
pub fn detect_scenes(inventory: &Inventory, config: &DetectorConfig) -> Vec<SynergyCandidate> {
    let mut scenes = area_scenes(inventory, config);
    let area_count = scenes.len();
    scenes.extend(domain_scenes(inventory, config));

    debug!(
        "Scene detector: {} area scenes, {} domain scenes",
        area_count,
        scenes.len() - area_count
    );

    scenes
}

fn actionable<'a>(nodes: impl Iterator<Item = &'a DeviceNode>, config: &DetectorConfig) -> Vec<String> {
    let mut ids: Vec<String> = nodes
        .filter(|n| config.is_actionable(&n.domain))
        .map(|n| n.id.clone())
        .collect();
    ids.sort();
    ids.dedup();
    ids
}

fn area_scenes(inventory: &Inventory, config: &DetectorConfig) -> Vec<SynergyCandidate> {
    let mut scenes = Vec::new();

    for (area, nodes) in inventory.nodes_by_area() {
        let members = actionable(nodes.into_iter(), config);
        if members.len() < config.min_area_scene_size {
            continue;
        }
        if inventory.scene_covers(&members) {
            debug!("Area '{}' already covered by an existing scene", area);
            continue;
        }

        let key = format!("area:{}", area);
        let mut parts = vec![key];
        parts.extend(members.iter().cloned());

        let description = format!("{} scene: {} devices", area, members.len());
        scenes.push(
            SynergyCandidate::new(
                SynergyId::derive(SynergyType::Scene, &parts),
                SynergyType::Scene,
                members,
                config.area_scene_confidence,
                config.area_scene_benefit,
                ComplexityTier::Low,
                description,
            )
            .with_rules(vec!["area_scene".to_string()])
            .with_area(Some(area.to_string())),
        );
    }

    scenes
}

fn domain_scenes(inventory: &Inventory, config: &DetectorConfig) -> Vec<SynergyCandidate> {
    let mut by_domain: BTreeMap<&str, Vec<&DeviceNode>> = BTreeMap::new();
    for node in &inventory.nodes {
        by_domain.entry(node.domain.as_str()).or_default().push(node);
    }

    let mut scenes = Vec::new();

    for (domain, nodes) in by_domain {
        let members = actionable(nodes.into_iter(), config);
        if members.len() < config.min_domain_scene_size {
            continue;
        }

        let key = format!("domain:{}", domain);
        let mut parts = vec![key];
        parts.extend(members.iter().cloned());

        let description = format!("All {} devices: {} members", domain, members.len());
        scenes.push(
            SynergyCandidate::new(
                SynergyId::derive(SynergyType::Scene, &parts),
                SynergyType::Scene,
                members,
                config.domain_scene_confidence,
                config.domain_scene_benefit,
                ComplexityTier::Low,
                description,
            )
            .with_rules(vec!["domain_scene".to_string()]),
        );
    }

    scenes
}
