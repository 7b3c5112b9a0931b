//! Relationship catalog - the injected table of compatible trigger/action pairs
//!
//! The catalog is an immutable value. Discovered rules are added by building
//! a new catalog with [`RelationshipCatalog::with_additional`].

use crate::error::DetectorError;
use hearth_domain::score::is_unit;
use hearth_domain::{ComplexityTier, DeviceNode, EndpointSpec, RelationshipRule};
use std::collections::HashSet;

/// Immutable set of relationship rules
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipCatalog {
    rules: Vec<RelationshipRule>,
}

impl RelationshipCatalog {
    /// Build a catalog, rejecting duplicate ids and out-of-range scores
    pub fn new(rules: Vec<RelationshipRule>) -> Result<Self, DetectorError> {
        let mut ids = HashSet::new();
        for rule in &rules {
            if rule.id.trim().is_empty() {
                return Err(DetectorError::InvalidRule {
                    id: rule.id.clone(),
                    reason: "blank identifier".to_string(),
                });
            }
            if !is_unit(rule.confidence) || !is_unit(rule.benefit) {
                return Err(DetectorError::InvalidRule {
                    id: rule.id.clone(),
                    reason: "confidence and benefit must be in [0, 1]".to_string(),
                });
            }
            if !ids.insert(rule.id.as_str()) {
                return Err(DetectorError::DuplicateRule(rule.id.clone()));
            }
        }
        Ok(Self { rules })
    }

    /// The shipped default catalog
    pub fn default_catalog() -> Self {
        Self { rules: default_rules() }
    }

    /// A new catalog with extra rules appended
    pub fn with_additional(&self, extra: Vec<RelationshipRule>) -> Result<Self, DetectorError> {
        let mut rules = self.rules.clone();
        rules.extend(extra);
        Self::new(rules)
    }

    /// All rules in catalog order
    pub fn rules(&self) -> &[RelationshipRule] {
        &self.rules
    }

    /// Look up a rule by identifier
    pub fn get(&self, id: &str) -> Option<&RelationshipRule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Best rule for a trigger/action node pair
    ///
    /// When several rules match, the highest confidence wins; ties go to
    /// the lower rule id.
    pub fn best_match(&self, trigger: &DeviceNode, action: &DeviceNode) -> Option<&RelationshipRule> {
        self.rules
            .iter()
            .filter(|r| r.matches(trigger, action))
            .min_by(|a, b| {
                b.confidence
                    .total_cmp(&a.confidence)
                    .then_with(|| a.id.cmp(&b.id))
            })
    }

    /// Whether any rule already covers this trigger/action pair
    pub fn covers(&self, trigger: &DeviceNode, action: &DeviceNode) -> bool {
        self.rules.iter().any(|r| r.matches(trigger, action))
    }

    /// Whether any rule could use this node as a trigger
    pub fn is_trigger(&self, node: &DeviceNode) -> bool {
        self.rules.iter().any(|r| r.trigger.matches(node))
    }
}

impl Default for RelationshipCatalog {
    fn default() -> Self {
        Self::default_catalog()
    }
}

fn rule(
    id: &str,
    trigger: EndpointSpec,
    action: EndpointSpec,
    confidence: f64,
    benefit: f64,
    complexity: ComplexityTier,
    description: &str,
) -> RelationshipRule {
    RelationshipRule::new(id, trigger, action, confidence, benefit, complexity, description)
}

/// The default rule table
pub fn default_rules() -> Vec<RelationshipRule> {
    use ComplexityTier::{High, Low, Medium};
    use EndpointSpec as E;

    vec![
        rule("motion_to_light", E::class("binary_sensor", "motion"), E::domain("light"), 0.70, 0.70, Low, "Motion-activated lighting"),
        rule("occupancy_to_light", E::class("binary_sensor", "occupancy"), E::domain("light"), 0.70, 0.70, Low, "Occupancy-based lighting"),
        rule("door_to_light", E::class("binary_sensor", "door"), E::domain("light"), 0.60, 0.60, Low, "Light on when a door opens"),
        rule("door_to_lock", E::class("binary_sensor", "door"), E::domain("lock"), 0.65, 0.80, Medium, "Lock after the door closes"),
        rule("motion_to_climate", E::class("binary_sensor", "motion"), E::domain("climate"), 0.55, 0.60, Medium, "Presence-aware climate"),
        rule("window_to_climate", E::class("binary_sensor", "window"), E::domain("climate"), 0.70, 0.80, Medium, "Pause climate while a window is open"),
        rule("temperature_to_climate", E::class("sensor", "temperature"), E::domain("climate"), 0.65, 0.60, Medium, "Temperature-driven climate control"),
        rule("temperature_to_fan", E::class("sensor", "temperature"), E::domain("fan"), 0.60, 0.60, Low, "Fan on when it gets warm"),
        rule("humidity_to_fan", E::class("sensor", "humidity"), E::domain("fan"), 0.60, 0.60, Low, "Extractor fan on high humidity"),
        rule("illuminance_to_light", E::class("sensor", "illuminance"), E::domain("light"), 0.60, 0.55, Low, "Light on when it gets dark"),
        rule("illuminance_to_cover", E::class("sensor", "illuminance"), E::domain("cover"), 0.55, 0.50, Medium, "Blinds follow daylight"),
        rule("presence_to_light", E::domain("device_tracker"), E::domain("light"), 0.60, 0.70, Medium, "Lights on arrival"),
        rule("presence_to_climate", E::domain("device_tracker"), E::domain("climate"), 0.60, 0.70, Medium, "Climate follows presence"),
        rule("presence_to_lock", E::domain("device_tracker"), E::domain("lock"), 0.55, 0.75, High, "Lock when everyone leaves"),
        rule("light_to_media", E::domain("light"), E::domain("media_player"), 0.50, 0.50, Low, "Media follows lighting"),
        rule("light_to_switch", E::domain("light"), E::domain("switch"), 0.50, 0.45, Low, "Switch follows lighting"),
        rule("leak_to_valve", E::class("binary_sensor", "moisture"), E::domain("valve"), 0.75, 0.90, Medium, "Shut the water valve on a leak"),
        rule("smoke_to_light", E::class("binary_sensor", "smoke"), E::domain("light"), 0.70, 0.85, Low, "Lights on when smoke is detected"),
    ]
}
