//! Chain builder - composes pair synergies into 3- and 4-node sequences
//!
//! Work is bounded by two tunables: only the `chain_candidate_limit`
//! highest-confidence pairs take part, and emission stops after
//! `max_chains`. Both figures are reported in [`ChainStats`].

use crate::config::DetectorConfig;
use hearth_domain::{ComplexityTier, Inventory, SynergyCandidate, SynergyId, SynergyLink, SynergyType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Work figures for one chain-building pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainStats {
    /// Pair synergies handed to the builder
    pub pairs_available: usize,

    /// Pair synergies that took part after the cutoff
    pub pairs_considered: usize,

    /// The candidate limit dropped some pairs
    pub cutoff_applied: bool,

    /// Emission stopped at `max_chains`
    pub cap_applied: bool,
}

/// Chains plus the work figures that produced them
#[derive(Debug, Clone, Default)]
pub struct ChainOutput {
    /// Emitted chains
    pub chains: Vec<SynergyCandidate>,

    /// Cutoff and cap figures
    pub stats: ChainStats,
}

struct ChainBuilder<'a> {
    inventory: &'a Inventory,
    config: &'a DetectorConfig,
    /// trigger → outgoing pairs, highest confidence first
    adjacency: BTreeMap<&'a str, Vec<&'a SynergyCandidate>>,
    /// every directed pair edge, cutoff or not
    edges: HashSet<(&'a str, &'a str)>,
    chains: Vec<SynergyCandidate>,
    cap_applied: bool,
}

/// Build chains from pair synergies
pub fn build_chains(pairs: &[SynergyCandidate], inventory: &Inventory, config: &DetectorConfig) -> ChainOutput {
    let linked: Vec<&SynergyCandidate> = pairs
        .iter()
        .filter(|p| p.synergy_type == SynergyType::Pair && p.links.len() == 1)
        .collect();

    let mut ranked = linked.clone();
    ranked.sort_by(|a, b| b.confidence.total_cmp(&a.confidence).then_with(|| a.id.cmp(&b.id)));
    ranked.truncate(config.chain_candidate_limit);

    let mut stats = ChainStats {
        pairs_available: linked.len(),
        pairs_considered: ranked.len(),
        cutoff_applied: ranked.len() < linked.len(),
        cap_applied: false,
    };

    let mut adjacency: BTreeMap<&str, Vec<&SynergyCandidate>> = BTreeMap::new();
    for pair in ranked.iter().copied() {
        adjacency.entry(pair.links[0].trigger.as_str()).or_default().push(pair);
    }

    let edges = linked
        .iter()
        .map(|p| (p.links[0].trigger.as_str(), p.links[0].action.as_str()))
        .collect();

    let mut builder = ChainBuilder {
        inventory,
        config,
        adjacency,
        edges,
        chains: Vec::new(),
        cap_applied: false,
    };

    for start in ranked.iter().copied() {
        if builder.cap_applied {
            break;
        }
        builder.extend(&mut vec![start]);
    }

    stats.cap_applied = builder.cap_applied;

    debug!(
        "Chain builder: {} chains from {}/{} pairs (cutoff: {}, cap: {})",
        builder.chains.len(),
        stats.pairs_considered,
        stats.pairs_available,
        stats.cutoff_applied,
        stats.cap_applied
    );

    ChainOutput {
        chains: builder.chains,
        stats,
    }
}

impl<'a> ChainBuilder<'a> {
    fn extend(&mut self, path: &mut Vec<&'a SynergyCandidate>) {
        let nodes = path_nodes(path);

        if self.has_back_edge(&nodes) {
            return;
        }

        if nodes.len() >= 3 {
            if self.chains.len() >= self.config.max_chains {
                self.cap_applied = true;
                return;
            }
            let chain = self.assemble(path, &nodes);
            self.chains.push(chain);
        }

        if nodes.len() >= self.config.max_chain_depth {
            return;
        }

        let Some(last) = nodes.last().copied() else {
            return;
        };
        let next_hops = self.adjacency.get(last).cloned().unwrap_or_default();

        for next in next_hops {
            if self.cap_applied {
                return;
            }
            let action = next.links[0].action.as_str();
            if nodes.contains(&action) {
                continue;
            }
            if !self.areas_compatible(&nodes, action) {
                continue;
            }
            path.push(next);
            self.extend(path);
            path.pop();
        }
    }

    /// A later node that links back to an earlier one would close a loop
    fn has_back_edge(&self, nodes: &[&str]) -> bool {
        nodes
            .iter()
            .enumerate()
            .any(|(i, later)| nodes[..i].iter().any(|earlier| self.edges.contains(&(*later, *earlier))))
    }

    fn areas_compatible(&self, nodes: &[&str], next: &str) -> bool {
        let next_area = self.inventory.area_of(next);
        nodes
            .iter()
            .all(|n| self.config.area_policy.allows(self.inventory.area_of(n), next_area))
    }

    fn assemble(&self, path: &[&SynergyCandidate], nodes: &[&str]) -> SynergyCandidate {
        let depth = nodes.len();
        let confidence = path.iter().map(|p| p.confidence).fold(f64::INFINITY, f64::min);
        let impact = path.iter().map(|p| p.impact).sum::<f64>() / path.len() as f64;

        let floor = if depth >= 4 { ComplexityTier::High } else { ComplexityTier::Medium };
        let complexity = path.iter().map(|p| p.complexity).fold(floor, ComplexityTier::max);

        let links: Vec<SynergyLink> = path.iter().map(|p| p.links[0].clone()).collect();
        let devices: Vec<String> = nodes.iter().map(|n| n.to_string()).collect();
        let description = format!("Chain: {}", nodes.join(" → "));

        let first_area = self.inventory.area_of(nodes[0]);
        let shared_area = first_area
            .filter(|area| nodes.iter().all(|n| self.inventory.area_of(n) == Some(*area)))
            .map(str::to_string);

        SynergyCandidate::new(
            SynergyId::derive(SynergyType::Chain, &devices),
            SynergyType::Chain,
            devices,
            confidence,
            impact,
            complexity,
            description,
        )
        .with_links(links)
        .with_area(shared_area)
        .with_path(nodes.join(" → "))
    }
}

fn path_nodes<'a>(path: &[&'a SynergyCandidate]) -> Vec<&'a str> {
    let mut nodes = Vec::with_capacity(path.len() + 1);
    if let Some(first) = path.first() {
        nodes.push(first.links[0].trigger.as_str());
    }
    nodes.extend(path.iter().map(|p| p.links[0].action.as_str()));
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AreaPolicy;
    use hearth_domain::DeviceNode;

    fn pair(trigger: &str, action: &str, confidence: f64, impact: f64, complexity: ComplexityTier) -> SynergyCandidate {
        SynergyCandidate::new(
            SynergyId::derive(SynergyType::Pair, &[trigger, action]),
            SynergyType::Pair,
            vec![trigger.to_string(), action.to_string()],
            confidence,
            impact,
            complexity,
            format!("{} → {}", trigger, action),
        )
        .with_links(vec![SynergyLink {
            trigger: trigger.to_string(),
            action: action.to_string(),
            rule_id: format!("{}_{}", trigger, action),
        }])
    }

    fn home(ids: &[&str]) -> Inventory {
        Inventory::from_nodes(
            ids.iter()
                .map(|id| DeviceNode::new(*id, "light", None, Some("living")))
                .collect(),
        )
    }

    #[test]
    fn test_three_node_chain() {
        let pairs = vec![
            pair("a", "b", 0.8, 0.6, ComplexityTier::Low),
            pair("b", "c", 0.6, 0.4, ComplexityTier::Low),
        ];
        let output = build_chains(&pairs, &home(&["a", "b", "c"]), &DetectorConfig::default());

        assert_eq!(output.chains.len(), 1);
        let chain = &output.chains[0];
        assert_eq!(chain.devices, vec!["a", "b", "c"]);
        assert_eq!(chain.depth, 3);
        assert_eq!(chain.confidence, 0.6);
        assert!((chain.impact - 0.5).abs() < 1e-9);
        assert_eq!(chain.complexity, ComplexityTier::Medium);
        assert_eq!(chain.path.as_deref(), Some("a → b → c"));
        assert_eq!(chain.area_id.as_deref(), Some("living"));
        assert_eq!(chain.check_integrity(), Ok(()));
    }

    #[test]
    fn test_feedback_loop_yields_no_chain() {
        let pairs = vec![
            pair("a", "b", 0.7, 0.7, ComplexityTier::Low),
            pair("b", "c", 0.7, 0.7, ComplexityTier::Low),
            pair("c", "a", 0.7, 0.7, ComplexityTier::Low),
        ];
        let output = build_chains(&pairs, &home(&["a", "b", "c"]), &DetectorConfig::default());
        assert!(output.chains.is_empty());
    }

    #[test]
    fn test_four_node_chain_is_high_complexity() {
        let pairs = vec![
            pair("a", "b", 0.7, 0.7, ComplexityTier::Low),
            pair("b", "c", 0.7, 0.7, ComplexityTier::Low),
            pair("c", "d", 0.7, 0.7, ComplexityTier::Low),
        ];
        let output = build_chains(&pairs, &home(&["a", "b", "c", "d"]), &DetectorConfig::default());

        let depths: Vec<usize> = output.chains.iter().map(|c| c.depth).collect();
        assert_eq!(output.chains.len(), 3);
        assert_eq!(depths.iter().filter(|d| **d == 4).count(), 1);

        let four = output.chains.iter().find(|c| c.depth == 4).unwrap();
        assert_eq!(four.complexity, ComplexityTier::High);
        assert_eq!(four.links.len(), 3);
        assert_eq!(four.check_integrity(), Ok(()));
    }

    #[test]
    fn test_depth_limit_three() {
        let pairs = vec![
            pair("a", "b", 0.7, 0.7, ComplexityTier::Low),
            pair("b", "c", 0.7, 0.7, ComplexityTier::Low),
            pair("c", "d", 0.7, 0.7, ComplexityTier::Low),
        ];
        let config = DetectorConfig {
            max_chain_depth: 3,
            ..DetectorConfig::default()
        };
        let output = build_chains(&pairs, &home(&["a", "b", "c", "d"]), &config);
        assert!(output.chains.iter().all(|c| c.depth == 3));
        assert_eq!(output.chains.len(), 2);
    }

    #[test]
    fn test_cross_area_join_rejected_under_same_area() {
        let mut inventory = home(&["a", "b"]);
        inventory.nodes.push(DeviceNode::new("c", "light", None, Some("garage")));
        let pairs = vec![
            pair("a", "b", 0.7, 0.7, ComplexityTier::Low),
            pair("b", "c", 0.7, 0.7, ComplexityTier::Low),
        ];

        assert!(build_chains(&pairs, &inventory, &DetectorConfig::default()).chains.is_empty());

        let config = DetectorConfig {
            area_policy: AreaPolicy::Any,
            ..DetectorConfig::default()
        };
        let chains = build_chains(&pairs, &inventory, &config).chains;
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].area_id, None);
    }

    #[test]
    fn test_candidate_cutoff_is_reported() {
        let pairs = vec![
            pair("a", "b", 0.9, 0.7, ComplexityTier::Low),
            pair("b", "c", 0.4, 0.7, ComplexityTier::Low),
        ];
        let under = build_chains(&pairs, &home(&["a", "b", "c"]), &DetectorConfig::default());
        assert!(!under.stats.cutoff_applied);
        assert_eq!(under.chains.len(), 1);

        let config = DetectorConfig {
            chain_candidate_limit: 1,
            ..DetectorConfig::default()
        };
        let over = build_chains(&pairs, &home(&["a", "b", "c"]), &config);
        assert!(over.stats.cutoff_applied);
        assert_eq!(over.stats.pairs_available, 2);
        assert_eq!(over.stats.pairs_considered, 1);
        assert!(over.chains.is_empty());
    }

    #[test]
    fn test_emission_cap() {
        let pairs = vec![
            pair("a", "b", 0.7, 0.7, ComplexityTier::Low),
            pair("b", "c", 0.7, 0.7, ComplexityTier::Low),
            pair("c", "d", 0.7, 0.7, ComplexityTier::Low),
        ];
        let config = DetectorConfig {
            max_chains: 1,
            ..DetectorConfig::default()
        };
        let output = build_chains(&pairs, &home(&["a", "b", "c", "d"]), &config);
        assert_eq!(output.chains.len(), 1);
        assert!(output.stats.cap_applied);
    }

    #[test]
    fn test_forward_shortcut_is_allowed() {
        let pairs = vec![
            pair("a", "b", 0.7, 0.7, ComplexityTier::Low),
            pair("b", "c", 0.7, 0.7, ComplexityTier::Low),
            pair("a", "c", 0.7, 0.7, ComplexityTier::Low),
        ];
        let output = build_chains(&pairs, &home(&["a", "b", "c"]), &DetectorConfig::default());
        assert_eq!(output.chains.len(), 1);
        assert_eq!(output.chains[0].devices, vec!["a", "b", "c"]);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        const NODES: [&str; 5] = ["a", "b", "c", "d", "e"];

        proptest! {
            #[test]
            fn chains_are_valid_and_acyclic(
                edges in proptest::collection::btree_set((0usize..5, 0usize..5), 0..12),
                confidence in 0.1f64..1.0,
            ) {
                let pairs: Vec<SynergyCandidate> = edges
                    .iter()
                    .filter(|(from, to)| from != to)
                    .map(|(from, to)| pair(NODES[*from], NODES[*to], confidence, 0.5, ComplexityTier::Low))
                    .collect();
                let direct: HashSet<(&str, &str)> = pairs
                    .iter()
                    .map(|p| (p.devices[0].as_str(), p.devices[1].as_str()))
                    .collect();

                let output = build_chains(&pairs, &home(&NODES), &DetectorConfig::default());

                for chain in &output.chains {
                    prop_assert_eq!(chain.check_integrity(), Ok(()));
                    prop_assert!(chain.depth == 3 || chain.depth == 4);
                    prop_assert!(chain.confidence <= confidence);
                    for later in 1..chain.devices.len() {
                        for earlier in 0..later {
                            let back = (chain.devices[later].as_str(), chain.devices[earlier].as_str());
                            prop_assert!(!direct.contains(&back));
                        }
                    }
                }
            }
        }
    }
}
