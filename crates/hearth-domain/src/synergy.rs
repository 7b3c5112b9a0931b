//! Synergy module - the candidate automation opportunity
//!
//! A synergy is created fresh on every run and enriched stage by stage.
//! Scores are never mutated outside [0, 1]; see [`crate::score`].

use crate::{BlueprintMatch, ComplexityTier, QualityTier, SignalSource};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Namespace for content-derived synergy identifiers
const SYNERGY_NAMESPACE: uuid::Uuid = uuid::Uuid::from_u128(0x6c1f_52d4_8a3e_4b7a_9d0e_2f61_c3a8_b915);

/// Unique identifier for a synergy, derived from its content (UUIDv5)
///
/// Identical inputs yield identical identifiers, so two runs over the same
/// snapshot produce the same ids and the same ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SynergyId(u128);

impl SynergyId {
    /// Derive an identifier from a synergy type and its identifying parts
    ///
    /// # Examples
    ///
    /// ```
    /// use hearth_domain::{SynergyId, SynergyType};
    ///
    /// let a = SynergyId::derive(SynergyType::Pair, &["binary_sensor.hall", "light.hall"]);
    /// let b = SynergyId::derive(SynergyType::Pair, &["binary_sensor.hall", "light.hall"]);
    /// assert_eq!(a, b);
    /// ```
    pub fn derive<S: AsRef<str>>(synergy_type: SynergyType, parts: &[S]) -> Self {
        let mut name = String::from(synergy_type.as_str());
        for part in parts {
            name.push('|');
            name.push_str(part.as_ref());
        }
        Self(uuid::Uuid::new_v5(&SYNERGY_NAMESPACE, name.as_bytes()).as_u128())
    }

    /// Create a SynergyId from a raw u128 value
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse a SynergyId from its string form
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid synergy id: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl fmt::Display for SynergyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

impl TryFrom<String> for SynergyId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_string(&value)
    }
}

impl From<SynergyId> for String {
    fn from(id: SynergyId) -> Self {
        id.to_string()
    }
}

/// Detector that produced a synergy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynergyType {
    /// Two-device trigger → action
    Pair,

    /// Three- or four-device sequence
    Chain,

    /// Multi-device scene without a trigger
    Scene,

    /// External condition → device
    Context,
}

impl SynergyType {
    /// Get the type name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            SynergyType::Pair => "pair",
            SynergyType::Chain => "chain",
            SynergyType::Scene => "scene",
            SynergyType::Context => "context",
        }
    }

    /// Parse a synergy type from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pair" | "device_pair" => Some(SynergyType::Pair),
            "chain" | "device_chain" => Some(SynergyType::Chain),
            "scene" | "scene_based" => Some(SynergyType::Scene),
            "context" | "context_aware" => Some(SynergyType::Context),
            _ => None,
        }
    }

    /// All types in report order
    pub fn all() -> [SynergyType; 4] {
        [SynergyType::Pair, SynergyType::Chain, SynergyType::Scene, SynergyType::Context]
    }
}

impl fmt::Display for SynergyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One trigger → action hop
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SynergyLink {
    /// Node that fires
    pub trigger: String,

    /// Node that reacts
    pub action: String,

    /// Rule that justified the hop
    pub rule_id: String,
}

/// Named external condition used as a trigger
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalTrigger {
    /// Signal source
    pub source: SignalSource,

    /// Condition name (e.g. "frost_forecast")
    pub condition: String,
}

impl ExternalTrigger {
    /// Create a new external trigger
    pub fn new(source: SignalSource, condition: impl Into<String>) -> Self {
        Self {
            source,
            condition: condition.into(),
        }
    }

    /// Stable identifier (`weather:frost_forecast`)
    pub fn id(&self) -> String {
        format!("{}:{}", self.source.as_str(), self.condition)
    }
}

/// Signed adjustments contributed by the multi-signal booster
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextBoost {
    /// Time-of-day / season / calendar
    pub temporal: f64,

    /// Weather
    pub weather: f64,

    /// Energy price / carbon
    pub energy: f64,
}

impl ContextBoost {
    /// Sum of all contributions
    pub fn total(&self) -> f64 {
        self.temporal + self.weather + self.energy
    }

    /// Whether nothing was contributed
    pub fn is_zero(&self) -> bool {
        self.temporal == 0.0 && self.weather == 0.0 && self.energy == 0.0
    }
}

/// One weighted term of the composite quality score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreTerm {
    /// Term name (e.g. "impact")
    pub name: String,

    /// Weight applied to the value
    pub weight: f64,

    /// Raw value [0.0, 1.0], or the signed adjustment itself
    pub value: f64,

    /// weight × value
    pub contribution: f64,
}

impl ScoreTerm {
    /// Create a weighted term
    pub fn new(name: impl Into<String>, weight: f64, value: f64) -> Self {
        Self {
            name: name.into(),
            weight,
            value,
            contribution: weight * value,
        }
    }
}

/// Structured justification for a synergy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    /// One-line summary
    pub summary: String,

    /// Contributing score terms
    #[serde(default)]
    pub score_breakdown: Vec<ScoreTerm>,

    /// Statistics and signals that fired
    #[serde(default)]
    pub evidence: Vec<String>,

    /// Estimated benefit
    #[serde(default)]
    pub benefit: String,

    /// True when only the summary could be produced
    #[serde(default)]
    pub minimal: bool,
}

impl Explanation {
    /// Summary-only explanation
    pub fn minimal(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            minimal: true,
            ..Default::default()
        }
    }
}

/// Enrichment that could not be applied to a synergy
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum EnrichmentNote {
    /// Historical statistics were not available
    StatisticsUnavailable,

    /// The blueprint corpus could not be queried
    BlueprintCorpusUnavailable,

    /// No external signal source was available
    SignalsUnavailable,

    /// Pattern validation does not apply (single-device synergy)
    PatternNotApplicable,
}

/// Structural defect in a synergy's device list or links
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityError {
    /// No devices listed
    NoDevices,

    /// A device appears more than once
    RepeatedDevice(String),

    /// Link `position` does not continue from the previous hop
    BrokenLink {
        /// Index of the offending link
        position: usize,
    },

    /// Device list and links disagree
    LinkMismatch,
}

impl fmt::Display for IntegrityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityError::NoDevices => write!(f, "no devices listed"),
            IntegrityError::RepeatedDevice(id) => write!(f, "device '{}' appears more than once", id),
            IntegrityError::BrokenLink { position } => {
                write!(f, "link {} does not continue from the previous action", position)
            }
            IntegrityError::LinkMismatch => write!(f, "device list does not match links"),
        }
    }
}

/// A candidate automation opportunity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynergyCandidate {
    /// Content-derived identifier
    pub id: SynergyId,

    /// Producing detector
    pub synergy_type: SynergyType,

    /// Number of nodes involved (1 context, 2 pair, 3-4 chain, N scene)
    pub depth: usize,

    /// Ordered node identifiers
    pub devices: Vec<String>,

    /// Trigger → action hops (pair and chain only)
    #[serde(default)]
    pub links: Vec<SynergyLink>,

    /// External trigger (context only)
    #[serde(default)]
    pub external_trigger: Option<ExternalTrigger>,

    /// Rules that produced this synergy
    #[serde(default)]
    pub rule_ids: Vec<String>,

    /// Shared area, when there is one
    #[serde(default)]
    pub area_id: Option<String>,

    /// Human description
    pub description: String,

    /// Path description for chains (`a → b → c`)
    #[serde(default)]
    pub path: Option<String>,

    /// Confidence as detected
    pub base_confidence: f64,

    /// Impact as detected
    pub base_impact: f64,

    /// Current confidence after enrichment
    pub confidence: f64,

    /// Current impact after enrichment
    pub impact: f64,

    /// Implementation complexity
    pub complexity: ComplexityTier,

    /// Historical pattern support [0.0, 1.0]
    #[serde(default)]
    pub pattern_support_score: f64,

    /// Pattern support reached the validation threshold
    #[serde(default)]
    pub validated: bool,

    /// Best-fitting blueprint
    #[serde(default)]
    pub blueprint: Option<BlueprintMatch>,

    /// Context booster contributions
    #[serde(default)]
    pub context_boost: ContextBoost,

    /// Final composite quality
    #[serde(default)]
    pub quality_score: Option<f64>,

    /// Quality bucket
    #[serde(default)]
    pub quality_tier: Option<QualityTier>,

    /// Composite score terms
    #[serde(default)]
    pub score_breakdown: Vec<ScoreTerm>,

    /// Evidence collected during enrichment
    #[serde(default)]
    pub evidence: Vec<String>,

    /// Enrichment that could not be applied
    #[serde(default)]
    pub notes: Vec<EnrichmentNote>,

    /// Structured justification
    #[serde(default)]
    pub explanation: Option<Explanation>,
}

impl SynergyCandidate {
    /// Create a freshly detected candidate
    pub fn new(
        id: SynergyId,
        synergy_type: SynergyType,
        devices: Vec<String>,
        confidence: f64,
        impact: f64,
        complexity: ComplexityTier,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id,
            synergy_type,
            depth: devices.len(),
            devices,
            links: Vec::new(),
            external_trigger: None,
            rule_ids: Vec::new(),
            area_id: None,
            description: description.into(),
            path: None,
            base_confidence: confidence,
            base_impact: impact,
            confidence,
            impact,
            complexity,
            pattern_support_score: 0.0,
            validated: false,
            blueprint: None,
            context_boost: ContextBoost::default(),
            quality_score: None,
            quality_tier: None,
            score_breakdown: Vec::new(),
            evidence: Vec::new(),
            notes: Vec::new(),
            explanation: None,
        }
    }

    /// Attach trigger → action hops
    pub fn with_links(mut self, links: Vec<SynergyLink>) -> Self {
        self.rule_ids = links.iter().map(|l| l.rule_id.clone()).collect();
        self.links = links;
        self
    }

    /// Attach an external trigger
    pub fn with_external_trigger(mut self, trigger: ExternalTrigger) -> Self {
        self.external_trigger = Some(trigger);
        self
    }

    /// Attach rule identifiers
    pub fn with_rules(mut self, rule_ids: Vec<String>) -> Self {
        self.rule_ids = rule_ids;
        self
    }

    /// Attach a shared area
    pub fn with_area(mut self, area_id: Option<String>) -> Self {
        self.area_id = area_id;
        self
    }

    /// Attach a path description
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Blueprint fit score, if a template matched
    pub fn blueprint_fit_score(&self) -> Option<f64> {
        self.blueprint.as_ref().map(|b| b.fit_score)
    }

    /// Deduplication key
    pub fn pair_key(&self) -> Option<CanonicalPairKey> {
        CanonicalPairKey::for_candidate(self)
    }

    /// Record an enrichment note once
    pub fn note(&mut self, note: EnrichmentNote) {
        if !self.notes.contains(&note) {
            self.notes.push(note);
        }
    }

    /// Check structural invariants
    ///
    /// - At least one device, none repeated
    /// - For linked synergies, `devices = [l0.trigger, l0.action, l1.action, ...]`
    ///   and `links[i].action == links[i + 1].trigger`
    pub fn check_integrity(&self) -> Result<(), IntegrityError> {
        if self.devices.is_empty() {
            return Err(IntegrityError::NoDevices);
        }

        let mut seen = HashSet::new();
        for device in &self.devices {
            if !seen.insert(device.as_str()) {
                return Err(IntegrityError::RepeatedDevice(device.clone()));
            }
        }

        if self.links.is_empty() {
            return Ok(());
        }

        for (position, pair) in self.links.windows(2).enumerate() {
            if pair[0].action != pair[1].trigger {
                return Err(IntegrityError::BrokenLink { position: position + 1 });
            }
        }

        if self.devices.len() != self.links.len() + 1 || self.devices[0] != self.links[0].trigger {
            return Err(IntegrityError::LinkMismatch);
        }
        for (i, link) in self.links.iter().enumerate() {
            if self.devices[i + 1] != link.action {
                return Err(IntegrityError::LinkMismatch);
            }
        }

        Ok(())
    }
}

/// Sorted pair of the two bounding identifiers of a synergy
///
/// Bounds are the first and last devices; for context synergies the external
/// trigger id stands in for the first device. Scenes have no direction, so
/// their key is the whole sorted membership.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CanonicalPairKey(pub String, pub String);

impl CanonicalPairKey {
    /// Build a key from two identifiers in either order
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        let (a, b) = (a.into(), b.into());
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    /// Derive the key for a candidate; None when it lists no devices
    pub fn for_candidate(candidate: &SynergyCandidate) -> Option<Self> {
        let last = candidate.devices.last()?;
        if candidate.synergy_type == SynergyType::Scene {
            let mut members = candidate.devices.clone();
            members.sort();
            return Some(Self("scene".to_string(), members.join(",")));
        }
        let first = match &candidate.external_trigger {
            Some(trigger) => trigger.id(),
            None => candidate.devices.first()?.clone(),
        };
        Some(Self::new(first, last.clone()))
    }
}

impl fmt::Display for CanonicalPairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.0, self.1)
    }
}
