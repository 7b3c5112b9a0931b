//! Loosely typed synergy records
//!
//! Candidates that arrive from outside the engine (a stored batch being
//! re-filtered, another producer) are read as [`SynergyRecord`]s. Converting
//! a record into a [`SynergyCandidate`] is where missing fields and
//! unrecognized values are caught.

use crate::synergy::IntegrityError;
use crate::{
    BlueprintMatch, ComplexityTier, ContextBoost, EnrichmentNote, ExternalTrigger, SynergyCandidate, SynergyId,
    SynergyLink, SynergyType,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Serde-facing form of a synergy with every field optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SynergyRecord {
    /// Identifier; derived from content when absent
    #[serde(default)]
    pub id: Option<String>,

    /// Type name
    #[serde(default)]
    pub synergy_type: Option<String>,

    /// Ordered node identifiers
    #[serde(default)]
    pub devices: Option<Vec<String>>,

    /// Trigger → action hops
    #[serde(default)]
    pub links: Vec<SynergyLink>,

    /// External trigger
    #[serde(default)]
    pub external_trigger: Option<ExternalTrigger>,

    /// Rule identifiers
    #[serde(default)]
    pub rule_ids: Vec<String>,

    /// Shared area
    #[serde(default)]
    pub area_id: Option<String>,

    /// Human description
    #[serde(default)]
    pub description: Option<String>,

    /// Chain path
    #[serde(default)]
    pub path: Option<String>,

    /// Detected confidence
    #[serde(default)]
    pub base_confidence: Option<f64>,

    /// Detected impact
    #[serde(default)]
    pub base_impact: Option<f64>,

    /// Current confidence
    #[serde(default)]
    pub confidence: Option<f64>,

    /// Current impact
    #[serde(default)]
    pub impact: Option<f64>,

    /// Complexity name
    #[serde(default)]
    pub complexity: Option<String>,

    /// Historical pattern support
    #[serde(default)]
    pub pattern_support_score: Option<f64>,

    /// Pattern validated
    #[serde(default)]
    pub validated: bool,

    /// Best-fitting blueprint
    #[serde(default)]
    pub blueprint: Option<BlueprintMatch>,

    /// Context booster contributions
    #[serde(default)]
    pub context_boost: ContextBoost,

    /// Evidence collected during enrichment
    #[serde(default)]
    pub evidence: Vec<String>,

    /// Enrichment notes
    #[serde(default)]
    pub notes: Vec<EnrichmentNote>,
}

/// Why a record could not become a candidate
#[derive(Debug, Clone, PartialEq)]
pub enum RecordDefect {
    /// No device list, or an empty one
    MissingDevices,

    /// A numeric field is absent
    MissingField(&'static str),

    /// A numeric field is NaN or infinite
    NonFinite(&'static str),

    /// Type name not recognized (None when absent)
    UnknownType(Option<String>),

    /// Complexity name not recognized (None when absent)
    UnknownComplexity(Option<String>),

    /// Identifier is present but not a UUID
    InvalidId(String),

    /// Device list or links are inconsistent
    Integrity(IntegrityError),
}

impl fmt::Display for RecordDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordDefect::MissingDevices => write!(f, "missing device list"),
            RecordDefect::MissingField(field) => write!(f, "missing {}", field),
            RecordDefect::NonFinite(field) => write!(f, "{} is not a finite number", field),
            RecordDefect::UnknownType(Some(t)) => write!(f, "unrecognized synergy type '{}'", t),
            RecordDefect::UnknownType(None) => write!(f, "missing synergy type"),
            RecordDefect::UnknownComplexity(Some(c)) => write!(f, "unrecognized complexity '{}'", c),
            RecordDefect::UnknownComplexity(None) => write!(f, "missing complexity"),
            RecordDefect::InvalidId(id) => write!(f, "invalid identifier '{}'", id),
            RecordDefect::Integrity(e) => write!(f, "{}", e),
        }
    }
}

fn required(value: Option<f64>, field: &'static str) -> Result<f64, RecordDefect> {
    match value {
        None => Err(RecordDefect::MissingField(field)),
        Some(v) if !v.is_finite() => Err(RecordDefect::NonFinite(field)),
        Some(v) => Ok(v),
    }
}

fn optional(value: Option<f64>, fallback: f64, field: &'static str) -> Result<f64, RecordDefect> {
    match value {
        None => Ok(fallback),
        Some(v) => required(Some(v), field),
    }
}

impl TryFrom<SynergyRecord> for SynergyCandidate {
    type Error = RecordDefect;

    fn try_from(record: SynergyRecord) -> Result<Self, Self::Error> {
        let devices = match record.devices {
            Some(devices) if !devices.is_empty() => devices,
            _ => return Err(RecordDefect::MissingDevices),
        };

        let synergy_type = record
            .synergy_type
            .as_deref()
            .and_then(SynergyType::parse)
            .ok_or_else(|| RecordDefect::UnknownType(record.synergy_type.clone()))?;

        let complexity = record
            .complexity
            .as_deref()
            .and_then(ComplexityTier::parse)
            .ok_or_else(|| RecordDefect::UnknownComplexity(record.complexity.clone()))?;

        let confidence = required(record.confidence, "confidence")?;
        let impact = required(record.impact, "impact")?;
        let base_confidence = optional(record.base_confidence, confidence, "base_confidence")?;
        let base_impact = optional(record.base_impact, impact, "base_impact")?;
        let pattern_support_score = optional(record.pattern_support_score, 0.0, "pattern_support_score")?;

        let id = match record.id.as_deref() {
            Some(raw) => SynergyId::from_string(raw).map_err(|_| RecordDefect::InvalidId(raw.to_string()))?,
            None => {
                let mut parts: Vec<String> = Vec::new();
                if let Some(trigger) = &record.external_trigger {
                    parts.push(trigger.id());
                }
                parts.extend(devices.iter().cloned());
                SynergyId::derive(synergy_type, &parts)
            }
        };

        let description = record.description.unwrap_or_default();
        let mut candidate =
            SynergyCandidate::new(id, synergy_type, devices, confidence, impact, complexity, description);

        candidate.links = record.links;
        candidate.rule_ids = record.rule_ids;
        candidate.external_trigger = record.external_trigger;
        candidate.area_id = record.area_id;
        candidate.path = record.path;
        candidate.base_confidence = base_confidence;
        candidate.base_impact = base_impact;
        candidate.pattern_support_score = pattern_support_score;
        candidate.validated = record.validated;
        candidate.blueprint = record.blueprint;
        candidate.context_boost = record.context_boost;
        candidate.evidence = record.evidence;
        candidate.notes = record.notes;

        candidate.check_integrity().map_err(RecordDefect::Integrity)?;

        Ok(candidate)
    }
}

impl From<&SynergyCandidate> for SynergyRecord {
    fn from(candidate: &SynergyCandidate) -> Self {
        Self {
            id: Some(candidate.id.to_string()),
            synergy_type: Some(candidate.synergy_type.as_str().to_string()),
            devices: Some(candidate.devices.clone()),
            links: candidate.links.clone(),
            external_trigger: candidate.external_trigger.clone(),
            rule_ids: candidate.rule_ids.clone(),
            area_id: candidate.area_id.clone(),
            description: Some(candidate.description.clone()),
            path: candidate.path.clone(),
            base_confidence: Some(candidate.base_confidence),
            base_impact: Some(candidate.base_impact),
            confidence: Some(candidate.confidence),
            impact: Some(candidate.impact),
            complexity: Some(candidate.complexity.as_str().to_string()),
            pattern_support_score: Some(candidate.pattern_support_score),
            validated: candidate.validated,
            blueprint: candidate.blueprint.clone(),
            context_boost: candidate.context_boost,
            evidence: candidate.evidence.clone(),
            notes: candidate.notes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair_record() -> SynergyRecord {
        SynergyRecord {
            synergy_type: Some("pair".to_string()),
            devices: Some(vec!["binary_sensor.hall".to_string(), "light.hall".to_string()]),
            confidence: Some(0.7),
            impact: Some(0.7),
            complexity: Some("low".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_record_converts() {
        let candidate = SynergyCandidate::try_from(pair_record()).unwrap();
        assert_eq!(candidate.synergy_type, SynergyType::Pair);
        assert_eq!(candidate.base_confidence, 0.7);
        assert_eq!(candidate.depth, 2);
    }

    #[test]
    fn test_missing_devices() {
        let mut record = pair_record();
        record.devices = None;
        assert_eq!(SynergyCandidate::try_from(record), Err(RecordDefect::MissingDevices));

        let mut record = pair_record();
        record.devices = Some(vec![]);
        assert_eq!(SynergyCandidate::try_from(record), Err(RecordDefect::MissingDevices));
    }

    #[test]
    fn test_missing_and_non_finite_scores() {
        let mut record = pair_record();
        record.impact = None;
        assert_eq!(SynergyCandidate::try_from(record), Err(RecordDefect::MissingField("impact")));

        let mut record = pair_record();
        record.confidence = Some(f64::NAN);
        assert_eq!(SynergyCandidate::try_from(record), Err(RecordDefect::NonFinite("confidence")));
    }

    #[test]
    fn test_unknown_type_and_complexity() {
        let mut record = pair_record();
        record.synergy_type = Some("telepathy".to_string());
        assert_eq!(
            SynergyCandidate::try_from(record),
            Err(RecordDefect::UnknownType(Some("telepathy".to_string())))
        );

        let mut record = pair_record();
        record.complexity = None;
        assert_eq!(SynergyCandidate::try_from(record), Err(RecordDefect::UnknownComplexity(None)));
    }

    #[test]
    fn test_candidate_round_trip_keeps_id() {
        let candidate = SynergyCandidate::try_from(pair_record()).unwrap();
        let record = SynergyRecord::from(&candidate);
        let back = SynergyCandidate::try_from(record).unwrap();
        assert_eq!(back, candidate);
    }

    #[test]
    fn test_record_from_json_with_missing_fields() {
        let json = r#"{"synergy_type": "chain", "devices": ["a", "b", "c"], "confidence": 0.6}"#;
        let record: SynergyRecord = serde_json::from_str(json).unwrap();
        assert_eq!(SynergyCandidate::try_from(record), Err(RecordDefect::UnknownComplexity(None)));
    }
}
