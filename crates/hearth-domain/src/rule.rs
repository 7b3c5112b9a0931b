//! Relationship rules - compatible trigger/action class pairs

use crate::score::is_unit;
use crate::{ComplexityTier, DeviceNode};
use serde::{Deserialize, Serialize};

/// Where a rule came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleOrigin {
    /// Shipped with the relationship catalog
    #[default]
    Catalog,

    /// Mined from co-occurrence statistics
    Discovered,
}

/// One side of a rule: a domain with an optional device class
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EndpointSpec {
    /// Required domain
    pub domain: String,

    /// Required device class (None matches any class)
    #[serde(default)]
    pub device_class: Option<String>,
}

impl EndpointSpec {
    /// Create an endpoint that matches a domain regardless of device class
    pub fn domain(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            device_class: None,
        }
    }

    /// Create an endpoint that matches a domain and device class
    pub fn class(domain: impl Into<String>, device_class: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            device_class: Some(device_class.into()),
        }
    }

    /// Check whether a node satisfies this endpoint
    pub fn matches(&self, node: &DeviceNode) -> bool {
        if node.domain != self.domain {
            return false;
        }
        match &self.device_class {
            Some(required) => node.device_class.as_deref() == Some(required.as_str()),
            None => true,
        }
    }

    /// Render as `domain/class` or `domain`
    pub fn label(&self) -> String {
        match &self.device_class {
            Some(class) => format!("{}/{}", self.domain, class),
            None => self.domain.clone(),
        }
    }
}

/// A compatible trigger → action relationship
///
/// Rules are immutable catalog entries. Confidence and benefit are the base
/// values given to every pairwise synergy the rule produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipRule {
    /// Stable rule identifier (e.g. "motion_to_light")
    pub id: String,

    /// Trigger side
    pub trigger: EndpointSpec,

    /// Action side
    pub action: EndpointSpec,

    /// Base confidence [0.0, 1.0]
    pub confidence: f64,

    /// Base benefit (impact before complexity penalty) [0.0, 1.0]
    pub benefit: f64,

    /// Implementation complexity
    pub complexity: ComplexityTier,

    /// Human description
    pub description: String,

    /// Catalog or discovered
    #[serde(default)]
    pub origin: RuleOrigin,
}

impl RelationshipRule {
    /// Create a new catalog rule
    ///
    /// # Panics
    /// Panics if confidence or benefit are outside [0, 1]
    pub fn new(
        id: impl Into<String>,
        trigger: EndpointSpec,
        action: EndpointSpec,
        confidence: f64,
        benefit: f64,
        complexity: ComplexityTier,
        description: impl Into<String>,
    ) -> Self {
        assert!(is_unit(confidence), "Confidence must be in [0, 1]");
        assert!(is_unit(benefit), "Benefit must be in [0, 1]");

        Self {
            id: id.into(),
            trigger,
            action,
            confidence,
            benefit,
            complexity,
            description: description.into(),
            origin: RuleOrigin::Catalog,
        }
    }

    /// Mark the rule as discovered
    pub fn discovered(mut self) -> Self {
        self.origin = RuleOrigin::Discovered;
        self
    }

    /// Impact after the complexity penalty
    pub fn impact(&self) -> f64 {
        self.complexity.penalize(self.benefit)
    }

    /// Check whether a trigger/action node pair satisfies this rule
    pub fn matches(&self, trigger: &DeviceNode, action: &DeviceNode) -> bool {
        self.trigger.matches(trigger) && self.action.matches(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn motion_to_light() -> RelationshipRule {
        RelationshipRule::new(
            "motion_to_light",
            EndpointSpec::class("binary_sensor", "motion"),
            EndpointSpec::domain("light"),
            0.7,
            0.7,
            ComplexityTier::Low,
            "Motion-activated lighting",
        )
    }

    #[test]
    fn test_rule_matches() {
        let rule = motion_to_light();
        let motion = DeviceNode::new("binary_sensor.hall", "binary_sensor", Some("motion"), None);
        let door = DeviceNode::new("binary_sensor.door", "binary_sensor", Some("door"), None);
        let light = DeviceNode::new("light.hall", "light", None, None);

        assert!(rule.matches(&motion, &light));
        assert!(!rule.matches(&door, &light));
        assert!(!rule.matches(&light, &motion));
    }

    #[test]
    fn test_impact_uses_complexity_penalty() {
        let mut rule = motion_to_light();
        assert_eq!(rule.impact(), 0.7);

        rule.complexity = ComplexityTier::High;
        assert!((rule.impact() - 0.49).abs() < 1e-9);
    }

    #[test]
    fn test_endpoint_label() {
        assert_eq!(EndpointSpec::class("sensor", "humidity").label(), "sensor/humidity");
        assert_eq!(EndpointSpec::domain("fan").label(), "fan");
    }

    #[test]
    #[should_panic]
    fn test_invalid_confidence() {
        RelationshipRule::new(
            "bad",
            EndpointSpec::domain("light"),
            EndpointSpec::domain("switch"),
            1.5,
            0.5,
            ComplexityTier::Low,
            "bad",
        );
    }
}
