//! Pattern validator - historical support for a candidate
//!
//! ```text
//! support = 0.5 * co_occurrence + 0.3 * time_alignment + 0.2 * activity
//! ```
//!
//! Each sub-score lies in [0, 1]. Pairwise sub-scores are averaged over the
//! candidate's device pairs: consecutive pairs for pairs and chains, every
//! pair for scenes.

use crate::config::{PatternConfig, MODERATE_SUPPORT, VALIDATION_THRESHOLD};
use hearth_domain::score::{adjust, clamp_unit};
use hearth_domain::{
    EnrichmentNote, HistoricalStats, SkippedRecord, SynergyCandidate, SynergyType, HOURS_PER_DAY,
};
use std::collections::HashMap;
use tracing::warn;

/// Confidence/impact deltas for a strongly supported candidate
pub const STRONG_ADJUSTMENT: (f64, f64) = (0.20, 0.15);

/// Confidence/impact deltas for a moderately supported candidate
pub const MODERATE_ADJUSTMENT: (f64, f64) = (0.10, 0.05);

/// Confidence/impact deltas for a weakly supported candidate
pub const WEAK_ADJUSTMENT: (f64, f64) = (-0.05, 0.0);

/// Lookup structure built once per run from raw statistics
#[derive(Debug, Clone, Default)]
pub struct StatsIndex {
    co_occurrences: HashMap<(String, String), u64>,
    activity: HashMap<String, [u64; HOURS_PER_DAY]>,
    skipped: Vec<SkippedRecord>,
}

impl StatsIndex {
    /// Index raw statistics, skipping malformed histograms
    pub fn build(stats: &HistoricalStats) -> Self {
        let mut index = Self::default();

        for co in &stats.co_occurrences {
            let total = index
                .co_occurrences
                .entry((co.first.clone(), co.second.clone()))
                .or_insert(0);
            *total = total.saturating_add(co.count);
        }

        for (node, buckets) in &stats.activity {
            match <[u64; HOURS_PER_DAY]>::try_from(buckets.as_slice()) {
                Ok(histogram) => {
                    index.activity.insert(node.clone(), histogram);
                }
                Err(_) => {
                    warn!(
                        "Skipping activity histogram for {}: {} buckets, expected {}",
                        node,
                        buckets.len(),
                        HOURS_PER_DAY
                    );
                    index.skipped.push(SkippedRecord {
                        kind: "activity_histogram".to_string(),
                        id: Some(node.clone()),
                        reason: format!("{} buckets, expected {}", buckets.len(), HOURS_PER_DAY),
                    });
                }
            }
        }

        index
    }

    /// Co-occurrences between two nodes, both directions
    pub fn co_count(&self, a: &str, b: &str) -> u64 {
        let forward = self.co_occurrences.get(&(a.to_string(), b.to_string())).copied().unwrap_or(0);
        let backward = self.co_occurrences.get(&(b.to_string(), a.to_string())).copied().unwrap_or(0);
        forward.saturating_add(backward)
    }

    /// Hour-of-day histogram of a node
    pub fn histogram(&self, node: &str) -> Option<&[u64; HOURS_PER_DAY]> {
        self.activity.get(node)
    }

    /// Total events recorded for a node
    pub fn events(&self, node: &str) -> u64 {
        self.histogram(node).map(saturating_total).unwrap_or(0)
    }

    /// Records dropped while indexing
    pub fn skipped(&self) -> &[SkippedRecord] {
        &self.skipped
    }
}

/// Sub-scores and weighted total
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatternSupport {
    /// Mean saturated co-occurrence
    pub co_occurrence: f64,

    /// Mean histogram intersection
    pub time_alignment: f64,

    /// Mean saturated activity
    pub activity: f64,

    /// Weighted support
    pub score: f64,
}

/// Event total of a histogram; counts near `u64::MAX` saturate
fn saturating_total(histogram: &[u64; HOURS_PER_DAY]) -> u64 {
    histogram.iter().fold(0u64, |total, count| total.saturating_add(*count))
}

/// Histogram intersection of two normalized hour-of-day distributions
pub fn time_alignment(a: &[u64; HOURS_PER_DAY], b: &[u64; HOURS_PER_DAY]) -> f64 {
    let total_a = saturating_total(a);
    let total_b = saturating_total(b);
    if total_a == 0 || total_b == 0 {
        return 0.0;
    }
    let overlap: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (*x as f64 / total_a as f64).min(*y as f64 / total_b as f64))
        .sum();
    clamp_unit(overlap)
}

fn device_pairs(candidate: &SynergyCandidate) -> Vec<(&str, &str)> {
    let devices = &candidate.devices;
    match candidate.synergy_type {
        SynergyType::Scene => {
            let mut pairs = Vec::new();
            for (i, a) in devices.iter().enumerate() {
                for b in &devices[i + 1..] {
                    pairs.push((a.as_str(), b.as_str()));
                }
            }
            pairs
        }
        _ => devices.windows(2).map(|w| (w[0].as_str(), w[1].as_str())).collect(),
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Compute support for a candidate; None for single-device candidates
pub fn pattern_support(candidate: &SynergyCandidate, index: &StatsIndex, config: &PatternConfig) -> Option<PatternSupport> {
    let pairs = device_pairs(candidate);
    if pairs.is_empty() {
        return None;
    }

    let co_saturation = config.co_occurrence_saturation.max(1) as f64;
    let co_occurrence = mean(
        pairs
            .iter()
            .map(|(a, b)| (index.co_count(a, b) as f64 / co_saturation).min(1.0)),
    );

    let time = mean(pairs.iter().map(|(a, b)| match (index.histogram(a), index.histogram(b)) {
        (Some(ha), Some(hb)) => time_alignment(ha, hb),
        _ => 0.0,
    }));

    let activity_saturation = config.activity_saturation.max(1) as f64;
    let activity = mean(
        candidate
            .devices
            .iter()
            .map(|d| (index.events(d) as f64 / activity_saturation).min(1.0)),
    );

    let score = clamp_unit(
        config.co_occurrence_weight * co_occurrence
            + config.time_alignment_weight * time
            + config.activity_weight * activity,
    );

    Some(PatternSupport {
        co_occurrence,
        time_alignment: time,
        activity,
        score,
    })
}

/// Confidence and impact deltas for a support score
pub fn support_adjustment(support: f64) -> (f64, f64) {
    if support >= VALIDATION_THRESHOLD {
        STRONG_ADJUSTMENT
    } else if support >= MODERATE_SUPPORT {
        MODERATE_ADJUSTMENT
    } else {
        WEAK_ADJUSTMENT
    }
}

/// Record a support score on a candidate and apply the adjustment
pub fn apply_support(candidate: &mut SynergyCandidate, support: f64, config: &PatternConfig) {
    let support = clamp_unit(support);
    let (confidence_delta, impact_delta) = support_adjustment(support);

    candidate.pattern_support_score = support;
    candidate.validated = support >= config.validation_threshold;
    candidate.confidence = adjust(candidate.confidence, confidence_delta);
    candidate.impact = adjust(candidate.impact, impact_delta);
}

/// Pattern validation stage for one candidate
pub fn validate_pattern(candidate: &mut SynergyCandidate, index: Option<&StatsIndex>, config: &PatternConfig) {
    let Some(index) = index else {
        candidate.note(EnrichmentNote::StatisticsUnavailable);
        return;
    };

    let Some(support) = pattern_support(candidate, index, config) else {
        candidate.note(EnrichmentNote::PatternNotApplicable);
        return;
    };

    apply_support(candidate, support.score, config);

    let co_total = device_pairs(candidate)
        .iter()
        .fold(0u64, |total, (a, b)| total.saturating_add(index.co_count(a, b)));
    if co_total > 0 {
        candidate
            .evidence
            .push(format!("co-occurred {} times in the statistics window", co_total));
    }
    if support.time_alignment > 0.0 {
        candidate.evidence.push(format!(
            "time-of-day alignment {:.0}%",
            support.time_alignment * 100.0
        ));
    }
    if candidate.validated {
        candidate
            .evidence
            .push(format!("pattern support {:.2} validates this synergy", support.score));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_domain::{CoOccurrence, ComplexityTier, SynergyId};
    use std::collections::BTreeMap;

    fn pair() -> SynergyCandidate {
        SynergyCandidate::new(
            SynergyId::derive(SynergyType::Pair, &["binary_sensor.m", "light.l"]),
            SynergyType::Pair,
            vec!["binary_sensor.m".to_string(), "light.l".to_string()],
            0.7,
            0.7,
            ComplexityTier::Low,
            "pair",
        )
    }

    fn evening(count: u64) -> Vec<u64> {
        let mut buckets = vec![0; HOURS_PER_DAY];
        buckets[19] = count;
        buckets[20] = count;
        buckets
    }

    fn stats() -> HistoricalStats {
        let mut activity = BTreeMap::new();
        activity.insert("binary_sensor.m".to_string(), evening(50));
        activity.insert("light.l".to_string(), evening(50));
        activity.insert("broken".to_string(), vec![1, 2, 3]);
        HistoricalStats {
            co_occurrences: vec![
                CoOccurrence {
                    first: "binary_sensor.m".to_string(),
                    second: "light.l".to_string(),
                    count: 15,
                },
                CoOccurrence {
                    first: "light.l".to_string(),
                    second: "binary_sensor.m".to_string(),
                    count: 5,
                },
            ],
            activity,
        }
    }

    #[test]
    fn test_strong_support_boosts() {
        let mut candidate = pair();
        apply_support(&mut candidate, 0.75, &PatternConfig::default());

        assert!(candidate.validated);
        assert!((candidate.confidence - 0.9).abs() < 1e-9);
        assert!((candidate.impact - 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_moderate_and_weak_support() {
        let mut moderate = pair();
        apply_support(&mut moderate, 0.55, &PatternConfig::default());
        assert!(!moderate.validated);
        assert!((moderate.confidence - 0.8).abs() < 1e-9);
        assert!((moderate.impact - 0.75).abs() < 1e-9);

        let mut weak = pair();
        apply_support(&mut weak, 0.2, &PatternConfig::default());
        assert!((weak.confidence - 0.65).abs() < 1e-9);
        assert_eq!(weak.impact, 0.7);
    }

    #[test]
    fn test_adjustment_clamps() {
        let mut candidate = pair();
        candidate.confidence = 0.95;
        candidate.impact = 0.95;
        apply_support(&mut candidate, 0.9, &PatternConfig::default());
        assert_eq!(candidate.confidence, 1.0);
        assert_eq!(candidate.impact, 1.0);
    }

    #[test]
    fn test_support_from_statistics() {
        let index = StatsIndex::build(&stats());
        let support = pattern_support(&pair(), &index, &PatternConfig::default()).unwrap();

        assert_eq!(index.co_count("light.l", "binary_sensor.m"), 20);
        assert_eq!(support.co_occurrence, 1.0);
        assert!((support.time_alignment - 1.0).abs() < 1e-9);
        assert_eq!(support.activity, 1.0);
        assert!((support.score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_malformed_histogram_skipped() {
        let index = StatsIndex::build(&stats());
        assert_eq!(index.skipped().len(), 1);
        assert!(index.histogram("broken").is_none());
    }

    #[test]
    fn test_time_alignment_disjoint() {
        let mut morning = [0u64; HOURS_PER_DAY];
        morning[7] = 10;
        let mut night = [0u64; HOURS_PER_DAY];
        night[23] = 10;
        assert_eq!(time_alignment(&morning, &night), 0.0);
        assert_eq!(time_alignment(&morning, &[0; HOURS_PER_DAY]), 0.0);
    }

    #[test]
    fn test_statistics_unavailable_note() {
        let mut candidate = pair();
        validate_pattern(&mut candidate, None, &PatternConfig::default());
        assert_eq!(candidate.notes, vec![EnrichmentNote::StatisticsUnavailable]);
        assert_eq!(candidate.confidence, 0.7);
    }

    #[test]
    fn test_single_device_not_adjusted() {
        let mut candidate = pair();
        candidate.devices.truncate(1);
        let index = StatsIndex::build(&stats());
        validate_pattern(&mut candidate, Some(&index), &PatternConfig::default());
        assert_eq!(candidate.notes, vec![EnrichmentNote::PatternNotApplicable]);
        assert_eq!(candidate.confidence, 0.7);
        assert_eq!(candidate.pattern_support_score, 0.0);
    }

    #[test]
    fn test_huge_counts_saturate() {
        let mut activity = BTreeMap::new();
        let mut flooded = vec![u64::MAX; HOURS_PER_DAY];
        flooded[0] = 1;
        activity.insert("binary_sensor.m".to_string(), flooded);
        activity.insert("light.l".to_string(), evening(50));
        let stats = HistoricalStats {
            co_occurrences: vec![
                CoOccurrence {
                    first: "binary_sensor.m".to_string(),
                    second: "light.l".to_string(),
                    count: u64::MAX,
                },
                CoOccurrence {
                    first: "light.l".to_string(),
                    second: "binary_sensor.m".to_string(),
                    count: 1,
                },
                CoOccurrence {
                    first: "binary_sensor.m".to_string(),
                    second: "light.l".to_string(),
                    count: 7,
                },
            ],
            activity,
        };

        let index = StatsIndex::build(&stats);
        assert_eq!(index.co_count("binary_sensor.m", "light.l"), u64::MAX);
        assert_eq!(index.events("binary_sensor.m"), u64::MAX);

        let mut candidate = pair();
        validate_pattern(&mut candidate, Some(&index), &PatternConfig::default());
        assert!(candidate.pattern_support_score > 0.0 && candidate.pattern_support_score <= 1.0);
        assert!(candidate.evidence.iter().any(|e| e.contains(&u64::MAX.to_string())));
    }

    #[test]
    fn test_scene_uses_all_pairs() {
        let mut scene = pair();
        scene.synergy_type = SynergyType::Scene;
        scene.devices.push("light.other".to_string());
        assert_eq!(device_pairs(&scene).len(), 3);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use hearth_domain::score::is_unit;
    use hearth_domain::{ComplexityTier, SynergyId};
    use proptest::prelude::*;

    proptest! {
        /// Property: pattern adjustments keep confidence and impact in [0, 1]
        #[test]
        fn test_apply_support_bounds(confidence in 0.0f64..=1.0, impact in 0.0f64..=1.0, support in -0.5f64..1.5) {
            let mut candidate = SynergyCandidate::new(
                SynergyId::derive(SynergyType::Pair, &["a", "b"]),
                SynergyType::Pair,
                vec!["a".to_string(), "b".to_string()],
                confidence,
                impact,
                ComplexityTier::Medium,
                "p",
            );
            apply_support(&mut candidate, support, &PatternConfig::default());
            prop_assert!(is_unit(candidate.confidence));
            prop_assert!(is_unit(candidate.impact));
            prop_assert!(is_unit(candidate.pattern_support_score));
        }

        /// Property: histogram intersection is a unit score
        #[test]
        fn test_time_alignment_bounds(a in proptest::array::uniform24(0u64..1000), b in proptest::array::uniform24(0u64..1000)) {
            prop_assert!(is_unit(time_alignment(&a, &b)));
        }
    }
}
