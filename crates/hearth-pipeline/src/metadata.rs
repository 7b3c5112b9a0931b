//! Run metadata collected during an engine run

use hearth_detector::ChainStats;
use hearth_domain::{QualityTier, SkippedRecord, SynergyCandidate, SynergyType};
use hearth_gatekeeper::Rejection;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which enrichment sources answered during the run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentAvailability {
    /// Historical statistics were loaded
    pub statistics: bool,

    /// External signals were loaded
    pub signals: bool,

    /// The blueprint corpus answered every lookup
    pub blueprints: bool,
}

impl EnrichmentAvailability {
    /// Whether every source answered
    pub fn complete(&self) -> bool {
        self.statistics && self.signals && self.blueprints
    }
}

/// Counts and figures for one run
///
/// Type and tier counts are taken twice: over every detected (or scored)
/// synergy, and over the accepted ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Detected synergies per type
    pub detected_by_type: BTreeMap<SynergyType, usize>,

    /// Accepted synergies per type
    pub accepted_by_type: BTreeMap<SynergyType, usize>,

    /// Scored synergies per quality tier
    pub scored_by_tier: BTreeMap<QualityTier, usize>,

    /// Accepted synergies per quality tier
    pub accepted_by_tier: BTreeMap<QualityTier, usize>,

    /// Rejections per reason code
    pub rejected_by_reason: BTreeMap<String, usize>,

    /// Chain cutoff figures
    pub chain_stats: ChainStats,

    /// Relationship rules mined from statistics this run
    pub discovered_rules: usize,

    /// Malformed input records that were skipped
    pub skipped_records: Vec<SkippedRecord>,

    /// Enrichment sources that answered
    pub enrichment: EnrichmentAvailability,

    /// Wall-clock run time in milliseconds
    pub duration_ms: u64,
}

impl RunMetadata {
    /// Create new empty metadata
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the raw detector output
    pub fn record_detected(&mut self, candidates: &[SynergyCandidate]) {
        for candidate in candidates {
            *self.detected_by_type.entry(candidate.synergy_type).or_insert(0) += 1;
        }
    }

    /// Record the gatekeeper's decisions
    pub fn record_filtered(&mut self, accepted: &[SynergyCandidate], rejections: &[Rejection]) {
        for candidate in accepted {
            *self.accepted_by_type.entry(candidate.synergy_type).or_insert(0) += 1;
            if let Some(tier) = candidate.quality_tier {
                *self.accepted_by_tier.entry(tier).or_insert(0) += 1;
                *self.scored_by_tier.entry(tier).or_insert(0) += 1;
            }
        }
        for rejection in rejections {
            *self.rejected_by_reason.entry(rejection.reason.code().to_string()).or_insert(0) += 1;
            if let Some(quality) = rejection.quality_score {
                *self.scored_by_tier.entry(QualityTier::from_score(quality)).or_insert(0) += 1;
            }
        }
    }

    /// Record skipped input records
    pub fn record_skipped(&mut self, skipped: impl IntoIterator<Item = SkippedRecord>) {
        self.skipped_records.extend(skipped);
    }

    /// Total detected synergies
    pub fn total_detected(&self) -> usize {
        self.detected_by_type.values().sum()
    }

    /// Total accepted synergies
    pub fn total_accepted(&self) -> usize {
        self.accepted_by_type.values().sum()
    }

    /// Total rejections
    pub fn total_rejected(&self) -> usize {
        self.rejected_by_reason.values().sum()
    }

    /// Generate a summary report of the run
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Run Summary".to_string(),
            "===========".to_string(),
            format!("Duration: {}ms", self.duration_ms),
            format!(
                "Detected: {}, accepted: {}, rejected: {}",
                self.total_detected(),
                self.total_accepted(),
                self.total_rejected()
            ),
            format!(
                "Chains: {} of {} pairs considered{}{}",
                self.chain_stats.pairs_considered,
                self.chain_stats.pairs_available,
                if self.chain_stats.cutoff_applied { ", cutoff applied" } else { "" },
                if self.chain_stats.cap_applied { ", cap reached" } else { "" },
            ),
            String::new(),
        ];

        if !self.detected_by_type.is_empty() {
            lines.push("By type (detected → accepted):".to_string());
            for (synergy_type, count) in &self.detected_by_type {
                let accepted = self.accepted_by_type.get(synergy_type).copied().unwrap_or(0);
                lines.push(format!("  {}: {} → {}", synergy_type, count, accepted));
            }
            lines.push(String::new());
        }

        if !self.scored_by_tier.is_empty() {
            lines.push("By tier (scored → accepted):".to_string());
            for (tier, count) in &self.scored_by_tier {
                let accepted = self.accepted_by_tier.get(tier).copied().unwrap_or(0);
                lines.push(format!("  {}: {} → {}", tier, count, accepted));
            }
            lines.push(String::new());
        }

        if !self.rejected_by_reason.is_empty() {
            lines.push("Rejections:".to_string());
            for (code, count) in &self.rejected_by_reason {
                lines.push(format!("  {}: {}", code, count));
            }
            lines.push(String::new());
        }

        if !self.enrichment.complete() {
            let missing: Vec<&str> = [
                (!self.enrichment.statistics).then_some("statistics"),
                (!self.enrichment.signals).then_some("signals"),
                (!self.enrichment.blueprints).then_some("blueprints"),
            ]
            .into_iter()
            .flatten()
            .collect();
            lines.push(format!("Enrichment unavailable: {}", missing.join(", ")));
        }
        if !self.skipped_records.is_empty() {
            lines.push(format!("Skipped input records: {}", self.skipped_records.len()));
        }

        lines.join("\n")
    }
}
