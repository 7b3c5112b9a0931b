//! Synergy validation, scoring and filtering

use crate::scorer::score_candidate;
use crate::{FilterConfig, GatekeeperError};
use hearth_domain::{
    CanonicalPairKey, ComplexityTier, IntegrityError, Inventory, RecordDefect, SynergyCandidate, SynergyId,
    SynergyRecord,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::{debug, info};

/// Reasons for rejection
///
/// The first group are hard rejections raised before scoring; the rest are
/// policy decisions taken on the scored synergy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "code")]
pub enum RejectionReason {
    /// No device list, or an empty one
    MissingDevices,

    /// Confidence or impact is absent
    MissingField {
        /// Field name
        field: String,
    },

    /// Confidence or impact is NaN or infinite
    NonFinite {
        /// Field name
        field: String,
    },

    /// Synergy type not recognized
    UnknownType {
        /// The value that was supplied, if any
        value: Option<String>,
    },

    /// Complexity not recognized
    UnknownComplexity {
        /// The value that was supplied, if any
        value: Option<String>,
    },

    /// Identifier is not a UUID
    InvalidId {
        /// The value that was supplied
        value: String,
    },

    /// A device is not in the inventory snapshot
    UnknownDevice {
        /// Device identifier
        device: String,
    },

    /// Broken chain link or repeated device
    Integrity {
        /// What is wrong
        detail: String,
    },

    /// Device or trigger comes from an unsupported external source
    DeniedSource {
        /// Matching identifier
        source: String,
    },

    /// Quality below `min_quality`
    BelowQuality {
        /// Scored quality
        quality: f64,
        /// Configured minimum
        threshold: f64,
    },

    /// Confidence below `min_confidence`
    BelowConfidence {
        /// Final confidence
        confidence: f64,
        /// Configured minimum
        threshold: f64,
    },

    /// Impact below `min_impact`
    BelowImpact {
        /// Final impact
        impact: f64,
        /// Configured minimum
        threshold: f64,
    },

    /// High complexity without pattern validation (strict mode)
    UnvalidatedHighComplexity,

    /// Another synergy with the same bounding pair scored higher
    Duplicate {
        /// Synergy that was kept
        kept: SynergyId,
    },
}

impl RejectionReason {
    /// Stable reason code used for counting
    pub fn code(&self) -> &'static str {
        match self {
            RejectionReason::MissingDevices => "missing_devices",
            RejectionReason::MissingField { .. } => "missing_field",
            RejectionReason::NonFinite { .. } => "non_finite",
            RejectionReason::UnknownType { .. } => "unknown_type",
            RejectionReason::UnknownComplexity { .. } => "unknown_complexity",
            RejectionReason::InvalidId { .. } => "invalid_id",
            RejectionReason::UnknownDevice { .. } => "unknown_device",
            RejectionReason::Integrity { .. } => "integrity",
            RejectionReason::DeniedSource { .. } => "denied_source",
            RejectionReason::BelowQuality { .. } => "below_quality",
            RejectionReason::BelowConfidence { .. } => "below_confidence",
            RejectionReason::BelowImpact { .. } => "below_impact",
            RejectionReason::UnvalidatedHighComplexity => "unvalidated_high_complexity",
            RejectionReason::Duplicate { .. } => "duplicate",
        }
    }

    /// Whether the rejection happened before scoring
    pub fn is_hard(&self) -> bool {
        !matches!(
            self,
            RejectionReason::BelowQuality { .. }
                | RejectionReason::BelowConfidence { .. }
                | RejectionReason::BelowImpact { .. }
                | RejectionReason::UnvalidatedHighComplexity
                | RejectionReason::Duplicate { .. }
        )
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::MissingDevices => write!(f, "missing device list"),
            RejectionReason::MissingField { field } => write!(f, "missing {}", field),
            RejectionReason::NonFinite { field } => write!(f, "{} is not a finite number", field),
            RejectionReason::UnknownType { value: Some(v) } => write!(f, "unrecognized synergy type '{}'", v),
            RejectionReason::UnknownType { value: None } => write!(f, "missing synergy type"),
            RejectionReason::UnknownComplexity { value: Some(v) } => write!(f, "unrecognized complexity '{}'", v),
            RejectionReason::UnknownComplexity { value: None } => write!(f, "missing complexity"),
            RejectionReason::InvalidId { value } => write!(f, "invalid identifier '{}'", value),
            RejectionReason::UnknownDevice { device } => write!(f, "device '{}' is not in the inventory", device),
            RejectionReason::Integrity { detail } => write!(f, "{}", detail),
            RejectionReason::DeniedSource { source } => write!(f, "unsupported external source '{}'", source),
            RejectionReason::BelowQuality { .. } => write!(f, "below quality threshold"),
            RejectionReason::BelowConfidence { .. } => write!(f, "below confidence threshold"),
            RejectionReason::BelowImpact { .. } => write!(f, "below impact threshold"),
            RejectionReason::UnvalidatedHighComplexity => write!(f, "high complexity without pattern validation"),
            RejectionReason::Duplicate { kept } => write!(f, "duplicate of {}", kept),
        }
    }
}

impl From<RecordDefect> for RejectionReason {
    fn from(defect: RecordDefect) -> Self {
        match defect {
            RecordDefect::MissingDevices => RejectionReason::MissingDevices,
            RecordDefect::MissingField(field) => RejectionReason::MissingField {
                field: field.to_string(),
            },
            RecordDefect::NonFinite(field) => RejectionReason::NonFinite {
                field: field.to_string(),
            },
            RecordDefect::UnknownType(value) => RejectionReason::UnknownType { value },
            RecordDefect::UnknownComplexity(value) => RejectionReason::UnknownComplexity { value },
            RecordDefect::InvalidId(value) => RejectionReason::InvalidId { value },
            RecordDefect::Integrity(e) => e.into(),
        }
    }
}

impl From<IntegrityError> for RejectionReason {
    fn from(error: IntegrityError) -> Self {
        match error {
            IntegrityError::NoDevices => RejectionReason::MissingDevices,
            other => RejectionReason::Integrity {
                detail: other.to_string(),
            },
        }
    }
}

/// A synergy that did not make it through the gatekeeper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rejection {
    /// Synergy identifier, when one could be established
    pub id: Option<SynergyId>,

    /// Synergy description, when known
    #[serde(default)]
    pub description: Option<String>,

    /// Quality score, when the synergy got as far as scoring
    #[serde(default)]
    pub quality_score: Option<f64>,

    /// Human-readable reason
    pub message: String,

    /// Structured reason
    pub reason: RejectionReason,
}

impl Rejection {
    fn of(candidate: &SynergyCandidate, reason: RejectionReason) -> Self {
        Self {
            id: Some(candidate.id),
            description: Some(candidate.description.clone()),
            quality_score: candidate.quality_score,
            message: reason.to_string(),
            reason,
        }
    }

    fn unidentified(id: Option<SynergyId>, description: Option<String>, reason: RejectionReason) -> Self {
        Self {
            id,
            description,
            quality_score: None,
            message: reason.to_string(),
            reason,
        }
    }
}

/// Result of a filtering pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterOutcome {
    /// Surviving synergies, by quality descending then identifier
    pub accepted: Vec<SynergyCandidate>,

    /// Everything that was rejected, in input order per stage
    pub rejections: Vec<Rejection>,
}

impl FilterOutcome {
    /// Rejection counts keyed by reason code
    pub fn rejected_by_reason(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for rejection in &self.rejections {
            *counts.entry(rejection.reason.code().to_string()).or_insert(0) += 1;
        }
        counts
    }
}

/// Orders by quality descending, ties by identifier ascending
pub fn rank_order(a: &SynergyCandidate, b: &SynergyCandidate) -> Ordering {
    let qa = a.quality_score.unwrap_or(0.0);
    let qb = b.quality_score.unwrap_or(0.0);
    qb.total_cmp(&qa).then_with(|| a.id.cmp(&b.id))
}

/// The Gatekeeper scores synergies and decides which ones are surfaced
#[derive(Debug, Clone)]
pub struct Gatekeeper {
    config: FilterConfig,
}

impl Gatekeeper {
    /// Create a new Gatekeeper with the given configuration
    pub fn new(config: FilterConfig) -> Result<Self, GatekeeperError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Create a Gatekeeper with default configuration
    pub fn default_config() -> Self {
        Self {
            config: FilterConfig::default(),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Hard checks that run before scoring
    pub fn check(&self, candidate: &SynergyCandidate, inventory: Option<&Inventory>) -> Result<(), RejectionReason> {
        if candidate.devices.is_empty() {
            return Err(RejectionReason::MissingDevices);
        }
        for (field, value) in [("confidence", candidate.confidence), ("impact", candidate.impact)] {
            if !value.is_finite() {
                return Err(RejectionReason::NonFinite {
                    field: field.to_string(),
                });
            }
        }

        candidate.check_integrity()?;

        if let Some(inventory) = inventory {
            if let Some(device) = candidate.devices.iter().find(|d| !inventory.contains(d)) {
                return Err(RejectionReason::UnknownDevice {
                    device: device.clone(),
                });
            }
        }

        let trigger_id = candidate.external_trigger.as_ref().map(|t| t.id());
        let denied = candidate
            .devices
            .iter()
            .chain(trigger_id.iter())
            .find(|id| self.config.is_denied(id).is_some());
        if let Some(source) = denied {
            return Err(RejectionReason::DeniedSource {
                source: source.clone(),
            });
        }

        Ok(())
    }

    /// Policy checks that run on a scored synergy
    pub fn soft_check(&self, candidate: &SynergyCandidate) -> Option<RejectionReason> {
        let quality = candidate.quality_score.unwrap_or(0.0);

        if quality < self.config.min_quality {
            return Some(RejectionReason::BelowQuality {
                quality,
                threshold: self.config.min_quality,
            });
        }
        if candidate.confidence < self.config.min_confidence {
            return Some(RejectionReason::BelowConfidence {
                confidence: candidate.confidence,
                threshold: self.config.min_confidence,
            });
        }
        if candidate.impact < self.config.min_impact {
            return Some(RejectionReason::BelowImpact {
                impact: candidate.impact,
                threshold: self.config.min_impact,
            });
        }
        if self.config.strict_mode && candidate.complexity == ComplexityTier::High && !candidate.validated {
            return Some(RejectionReason::UnvalidatedHighComplexity);
        }
        None
    }

    /// Score, reject, deduplicate and rank a batch of synergies
    ///
    /// Running the accepted list through again with the same inventory and
    /// configuration yields the same list.
    pub fn filter(&self, candidates: Vec<SynergyCandidate>, inventory: Option<&Inventory>) -> FilterOutcome {
        self.filter_with(candidates, Vec::new(), inventory)
    }

    /// Same as [`filter`](Self::filter) for loosely typed records
    ///
    /// Records that cannot be read as synergies are rejected up front.
    pub fn filter_records(&self, records: Vec<SynergyRecord>, inventory: Option<&Inventory>) -> FilterOutcome {
        let mut candidates = Vec::with_capacity(records.len());
        let mut rejections = Vec::new();

        for record in records {
            let id = record.id.as_deref().and_then(|raw| SynergyId::from_string(raw).ok());
            let description = record.description.clone();
            match SynergyCandidate::try_from(record) {
                Ok(candidate) => candidates.push(candidate),
                Err(defect) => {
                    debug!("Rejected record {:?}: {}", id, defect);
                    rejections.push(Rejection::unidentified(id, description, defect.into()));
                }
            }
        }

        self.filter_with(candidates, rejections, inventory)
    }

    fn filter_with(
        &self,
        candidates: Vec<SynergyCandidate>,
        mut rejections: Vec<Rejection>,
        inventory: Option<&Inventory>,
    ) -> FilterOutcome {
        let total = candidates.len() + rejections.len();
        let mut survivors = Vec::with_capacity(candidates.len());

        for mut candidate in candidates {
            if let Err(reason) = self.check(&candidate, inventory) {
                debug!("Rejected {} before scoring: {}", candidate.id, reason);
                rejections.push(Rejection::of(&candidate, reason));
                continue;
            }

            score_candidate(&mut candidate, inventory);

            match self.soft_check(&candidate) {
                Some(reason) => {
                    debug!("Rejected {}: {}", candidate.id, reason);
                    rejections.push(Rejection::of(&candidate, reason));
                }
                None => survivors.push(candidate),
            }
        }

        let (mut accepted, duplicates) = deduplicate(survivors);
        rejections.extend(duplicates);
        accepted.sort_by(rank_order);

        info!(
            "Gatekeeper accepted {} of {} synergies ({} rejected)",
            accepted.len(),
            total,
            rejections.len()
        );

        FilterOutcome { accepted, rejections }
    }
}

/// Keep the best synergy per canonical pair key
///
/// Best is highest quality, ties going to the lower identifier. Input order
/// of the kept synergies is preserved.
fn deduplicate(candidates: Vec<SynergyCandidate>) -> (Vec<SynergyCandidate>, Vec<Rejection>) {
    let mut best: HashMap<CanonicalPairKey, usize> = HashMap::new();
    for (index, candidate) in candidates.iter().enumerate() {
        let Some(key) = candidate.pair_key() else {
            continue;
        };
        match best.get(&key) {
            Some(&current) if rank_order(&candidates[current], candidate) != Ordering::Greater => {}
            _ => {
                best.insert(key, index);
            }
        }
    }

    let mut kept = Vec::with_capacity(best.len());
    let mut rejected = Vec::new();
    for (index, candidate) in candidates.iter().enumerate() {
        let winner = candidate.pair_key().and_then(|key| best.get(&key).copied());
        match winner {
            Some(w) if w != index => {
                let reason = RejectionReason::Duplicate {
                    kept: candidates[w].id,
                };
                rejected.push(Rejection::of(candidate, reason));
            }
            _ => kept.push(index),
        }
    }

    let mut slots: Vec<Option<SynergyCandidate>> = candidates.into_iter().map(Some).collect();
    let accepted = kept.into_iter().filter_map(|i| slots[i].take()).collect();
    (accepted, rejected)
}
