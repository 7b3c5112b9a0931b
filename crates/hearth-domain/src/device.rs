//! Inventory snapshot - devices, nodes, automations and scenes
//!
//! The inventory is read-only for the duration of a run. Nodes are the
//! entity-level handles the detectors match against; physical devices only
//! contribute their area when a node does not declare one.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// A physical device as reported by the inventory provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    /// Device identifier
    pub id: String,

    /// Human-readable name
    #[serde(default)]
    pub name: Option<String>,

    /// Area the device is installed in
    #[serde(default)]
    pub area_id: Option<String>,

    /// Manufacturer, if known
    #[serde(default)]
    pub manufacturer: Option<String>,

    /// Model, if known
    #[serde(default)]
    pub model: Option<String>,
}

/// Feature flags and supported services of a node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Feature flags (e.g. "brightness", "power_monitoring")
    #[serde(default)]
    pub features: BTreeSet<String>,

    /// Supported services (e.g. "turn_on", "set_temperature")
    #[serde(default)]
    pub services: BTreeSet<String>,
}

impl Capabilities {
    /// Check whether a feature flag is present
    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.contains(feature)
    }
}

/// An entity-level node (e.g. `light.office_ceiling`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceNode {
    /// Node identifier
    pub id: String,

    /// Owning physical device
    #[serde(default)]
    pub device_id: Option<String>,

    /// Area override; falls back to the owning device's area
    #[serde(default)]
    pub area_id: Option<String>,

    /// Domain (sensor, binary_sensor, light, climate, ...)
    pub domain: String,

    /// Device class (motion, temperature, door, ...)
    #[serde(default)]
    pub device_class: Option<String>,

    /// Capability set
    #[serde(default)]
    pub capabilities: Capabilities,

    /// Whether the node is currently available
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

impl DeviceNode {
    /// Create an available node with no capabilities
    pub fn new(
        id: impl Into<String>,
        domain: impl Into<String>,
        device_class: Option<&str>,
        area_id: Option<&str>,
    ) -> Self {
        Self {
            id: id.into(),
            device_id: None,
            area_id: area_id.map(str::to_string),
            domain: domain.into(),
            device_class: device_class.map(str::to_string),
            capabilities: Capabilities::default(),
            available: true,
        }
    }
}

/// An automation that already exists in the home
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistingAutomation {
    /// Automation identifier
    pub id: String,

    /// Alias shown to the user
    #[serde(default)]
    pub alias: Option<String>,

    /// Node identifiers referenced as trigger or target
    #[serde(default)]
    pub node_ids: Vec<String>,
}

/// A scene that already exists in the home
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistingScene {
    /// Scene identifier
    pub id: String,

    /// Scene name
    #[serde(default)]
    pub name: Option<String>,

    /// Member node identifiers
    #[serde(default)]
    pub node_ids: Vec<String>,
}

/// A record dropped while sanitizing input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRecord {
    /// Kind of record ("node", "device", ...)
    pub kind: String,

    /// Identifier, if one could be read
    pub id: Option<String>,

    /// Why it was dropped
    pub reason: String,
}

/// Full inventory snapshot for one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    /// Physical devices
    #[serde(default)]
    pub devices: Vec<Device>,

    /// Entity-level nodes
    #[serde(default)]
    pub nodes: Vec<DeviceNode>,

    /// Existing automations
    #[serde(default)]
    pub automations: Vec<ExistingAutomation>,

    /// Existing scenes
    #[serde(default)]
    pub scenes: Vec<ExistingScene>,
}

impl Inventory {
    /// Create an inventory from nodes only
    pub fn from_nodes(nodes: Vec<DeviceNode>) -> Self {
        Self {
            nodes,
            ..Default::default()
        }
    }

    /// Look up a node by identifier
    pub fn node(&self, id: &str) -> Option<&DeviceNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Check whether a node exists
    pub fn contains(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    /// Area of a node, falling back to its owning device
    pub fn effective_area<'a>(&'a self, node: &'a DeviceNode) -> Option<&'a str> {
        if let Some(area) = node.area_id.as_deref() {
            return Some(area);
        }
        let device_id = node.device_id.as_deref()?;
        self.devices
            .iter()
            .find(|d| d.id == device_id)
            .and_then(|d| d.area_id.as_deref())
    }

    /// Area of a node by identifier
    pub fn area_of(&self, id: &str) -> Option<&str> {
        self.node(id).and_then(|n| self.effective_area(n))
    }

    /// Whether all listed nodes exist and are currently available
    pub fn all_available(&self, ids: &[String]) -> bool {
        !ids.is_empty()
            && ids
                .iter()
                .all(|id| self.node(id).map(|n| n.available).unwrap_or(false))
    }

    /// Whether an existing automation already references both nodes
    pub fn is_linked(&self, a: &str, b: &str) -> bool {
        self.automations.iter().any(|auto| {
            auto.node_ids.iter().any(|id| id == a) && auto.node_ids.iter().any(|id| id == b)
        })
    }

    /// Whether an existing scene's members are a superset of `members`
    pub fn scene_covers(&self, members: &[String]) -> bool {
        self.scenes.iter().any(|scene| {
            let scene_members: HashSet<&str> = scene.node_ids.iter().map(String::as_str).collect();
            members.iter().all(|m| scene_members.contains(m.as_str()))
        })
    }

    /// Nodes grouped by effective area (nodes without an area are omitted)
    pub fn nodes_by_area(&self) -> BTreeMap<&str, Vec<&DeviceNode>> {
        let mut grouped: BTreeMap<&str, Vec<&DeviceNode>> = BTreeMap::new();
        for node in &self.nodes {
            if let Some(area) = self.effective_area(node) {
                grouped.entry(area).or_default().push(node);
            }
        }
        grouped
    }

    /// Drop malformed nodes and return what was skipped
    ///
    /// A node is malformed when its identifier or domain is blank, or when
    /// its identifier repeats an earlier node. Node order is preserved.
    pub fn sanitize(&mut self) -> Vec<SkippedRecord> {
        let mut skipped = Vec::new();
        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(self.nodes.len());

        for node in self.nodes.drain(..) {
            if node.id.trim().is_empty() {
                skipped.push(SkippedRecord {
                    kind: "node".to_string(),
                    id: None,
                    reason: "blank identifier".to_string(),
                });
                continue;
            }
            if node.domain.trim().is_empty() {
                skipped.push(SkippedRecord {
                    kind: "node".to_string(),
                    id: Some(node.id.clone()),
                    reason: "blank domain".to_string(),
                });
                continue;
            }
            if !seen.insert(node.id.clone()) {
                skipped.push(SkippedRecord {
                    kind: "node".to_string(),
                    id: Some(node.id.clone()),
                    reason: "duplicate identifier".to_string(),
                });
                continue;
            }
            kept.push(node);
        }

        self.nodes = kept;

        let mut device_ids = HashSet::new();
        self.devices.retain(|device| {
            if device.id.trim().is_empty() || !device_ids.insert(device.id.clone()) {
                skipped.push(SkippedRecord {
                    kind: "device".to_string(),
                    id: Some(device.id.clone()).filter(|id| !id.trim().is_empty()),
                    reason: "blank or duplicate identifier".to_string(),
                });
                false
            } else {
                true
            }
        });

        skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn office_inventory() -> Inventory {
        let mut light = DeviceNode::new("light.office", "light", None, None);
        light.device_id = Some("dev-lamp".to_string());

        Inventory {
            devices: vec![Device {
                id: "dev-lamp".to_string(),
                name: Some("Office lamp".to_string()),
                area_id: Some("office".to_string()),
                manufacturer: None,
                model: None,
            }],
            nodes: vec![
                DeviceNode::new("binary_sensor.office_motion", "binary_sensor", Some("motion"), Some("office")),
                light,
            ],
            automations: vec![],
            scenes: vec![],
        }
    }

    #[test]
    fn test_effective_area_falls_back_to_device() {
        let inventory = office_inventory();
        assert_eq!(inventory.area_of("light.office"), Some("office"));
        assert_eq!(inventory.area_of("binary_sensor.office_motion"), Some("office"));
        assert_eq!(inventory.area_of("missing"), None);
    }

    #[test]
    fn test_is_linked() {
        let mut inventory = office_inventory();
        assert!(!inventory.is_linked("binary_sensor.office_motion", "light.office"));

        inventory.automations.push(ExistingAutomation {
            id: "auto-1".to_string(),
            alias: None,
            node_ids: vec!["light.office".to_string(), "binary_sensor.office_motion".to_string()],
        });
        assert!(inventory.is_linked("binary_sensor.office_motion", "light.office"));
    }

    #[test]
    fn test_scene_covers_superset_only() {
        let mut inventory = office_inventory();
        inventory.scenes.push(ExistingScene {
            id: "scene.office".to_string(),
            name: None,
            node_ids: vec!["light.office".to_string(), "switch.fan".to_string()],
        });

        assert!(inventory.scene_covers(&["light.office".to_string()]));
        assert!(!inventory.scene_covers(&["light.office".to_string(), "light.desk".to_string()]));
    }

    #[test]
    fn test_sanitize_drops_malformed_nodes() {
        let mut inventory = office_inventory();
        inventory.nodes.push(DeviceNode::new("", "light", None, None));
        inventory.nodes.push(DeviceNode::new("light.office", "light", None, None));
        inventory.nodes.push(DeviceNode::new("sensor.x", " ", None, None));

        let skipped = inventory.sanitize();

        assert_eq!(skipped.len(), 3);
        assert_eq!(inventory.nodes.len(), 2);
        assert!(skipped.iter().any(|s| s.reason == "duplicate identifier"));
    }

    #[test]
    fn test_all_available() {
        let mut inventory = office_inventory();
        let ids = vec!["light.office".to_string(), "binary_sensor.office_motion".to_string()];
        assert!(inventory.all_available(&ids));

        inventory.nodes[1].available = false;
        assert!(!inventory.all_available(&ids));
        assert!(!inventory.all_available(&[]));
        assert!(!inventory.all_available(&["ghost".to_string()]));
    }

    #[test]
    fn test_deserialize_defaults() {
        let json = r#"{"nodes": [{"id": "light.kitchen", "domain": "light"}]}"#;
        let inventory: Inventory = serde_json::from_str(json).unwrap();
        assert_eq!(inventory.nodes.len(), 1);
        assert!(inventory.nodes[0].available);
        assert!(inventory.automations.is_empty());
    }
}
