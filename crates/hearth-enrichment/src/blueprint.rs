//! Blueprint enrichment - how well a community template fits a candidate
//!
//! ```text
//! fit = 0.5 * domain_jaccard + 0.3 * device_class_coverage + 0.2 * (popularity + quality) / 2
//! ```
//!
//! Templates are looked up per device signature. [`BlueprintCache`] holds
//! the lookups for one run so each signature hits the corpus at most once.

use crate::config::BlueprintConfig;
use hearth_domain::score::{adjust, clamp_unit};
use hearth_domain::{
    BlueprintMatch, BlueprintTemplate, DeviceSignature, EnrichmentNote, Inventory, SynergyCandidate,
};
use std::collections::{BTreeMap, BTreeSet};

/// Confidence/impact deltas for a strong fit
pub const STRONG_FIT_ADJUSTMENT: (f64, f64) = (0.15, 0.10);

/// Confidence/impact deltas for a good fit
pub const GOOD_FIT_ADJUSTMENT: (f64, f64) = (0.10, 0.05);

/// Domain/class signature of a candidate
///
/// Context candidates also carry their external source as a domain so
/// templates keyed on e.g. `weather` can match.
pub fn signature_for(candidate: &SynergyCandidate, inventory: &Inventory) -> DeviceSignature {
    let mut signature = DeviceSignature::default();
    for node in candidate.devices.iter().filter_map(|id| inventory.node(id)) {
        signature.domains.insert(node.domain.clone());
        if let Some(class) = &node.device_class {
            signature.device_classes.insert(class.clone());
        }
    }
    if let Some(trigger) = &candidate.external_trigger {
        signature.domains.insert(trigger.source.as_str().to_string());
    }
    signature
}

fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

fn coverage(required: &BTreeSet<String>, present: &BTreeSet<String>) -> f64 {
    if required.is_empty() {
        return 1.0;
    }
    required.intersection(present).count() as f64 / required.len() as f64
}

/// Fit score of one template against a signature
pub fn fit_score(signature: &DeviceSignature, template: &BlueprintTemplate, config: &BlueprintConfig) -> f64 {
    let domain = jaccard(&signature.domains, &template.required_domains);
    let classes = coverage(&template.required_device_classes, &signature.device_classes);
    let reputation = (clamp_unit(template.popularity) + clamp_unit(template.quality)) / 2.0;

    clamp_unit(config.domain_weight * domain + config.device_class_weight * classes + config.reputation_weight * reputation)
}

/// Best-fitting template; ties go to the lower template id
pub fn best_match(
    signature: &DeviceSignature,
    templates: &[BlueprintTemplate],
    config: &BlueprintConfig,
) -> Option<BlueprintMatch> {
    templates
        .iter()
        .map(|t| (fit_score(signature, t, config), t))
        .min_by(|(fa, ta), (fb, tb)| fb.total_cmp(fa).then_with(|| ta.id.cmp(&tb.id)))
        .map(|(fit_score, template)| BlueprintMatch {
            template_id: template.id.clone(),
            name: template.name.clone(),
            fit_score,
        })
}

/// Confidence and impact deltas for a fit score
pub fn fit_adjustment(fit: f64, config: &BlueprintConfig) -> (f64, f64) {
    if fit >= config.strong_fit {
        STRONG_FIT_ADJUSTMENT
    } else if fit >= config.good_fit {
        GOOD_FIT_ADJUSTMENT
    } else {
        (0.0, 0.0)
    }
}

/// Result of looking up one signature
#[derive(Debug, Clone, PartialEq)]
pub enum CorpusLookup {
    /// The corpus answered (possibly with no templates)
    Templates(Vec<BlueprintTemplate>),

    /// The corpus failed or timed out
    Unavailable,
}

/// Per-run memo of corpus lookups keyed by signature
#[derive(Debug, Clone)]
pub struct BlueprintCache {
    entries: BTreeMap<String, CorpusLookup>,
    corpus_available: bool,
}

impl BlueprintCache {
    /// Empty cache for a run where the corpus is reachable
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            corpus_available: true,
        }
    }

    /// Cache for a run without a corpus
    pub fn unavailable() -> Self {
        Self {
            entries: BTreeMap::new(),
            corpus_available: false,
        }
    }

    /// Whether the corpus is still considered reachable
    pub fn corpus_available(&self) -> bool {
        self.corpus_available
    }

    /// Mark the corpus unreachable for the rest of the run
    pub fn mark_unavailable(&mut self) {
        self.corpus_available = false;
    }

    /// Whether a signature has already been looked up
    pub fn contains(&self, signature: &DeviceSignature) -> bool {
        self.entries.contains_key(&signature.key())
    }

    /// Record a lookup result
    pub fn insert(&mut self, signature: &DeviceSignature, lookup: CorpusLookup) {
        self.entries.insert(signature.key(), lookup);
    }

    /// Get a cached lookup
    pub fn get(&self, signature: &DeviceSignature) -> Option<&CorpusLookup> {
        self.entries.get(&signature.key())
    }

    /// Look up a signature, calling `fetch` only on a miss
    ///
    /// A fetch error marks the corpus unavailable; later misses are not
    /// fetched at all.
    pub fn get_or_fetch<E>(
        &mut self,
        signature: &DeviceSignature,
        fetch: impl FnOnce(&DeviceSignature) -> Result<Vec<BlueprintTemplate>, E>,
    ) -> &CorpusLookup {
        let key = signature.key();
        if !self.entries.contains_key(&key) {
            let lookup = if self.corpus_available {
                match fetch(signature) {
                    Ok(templates) => CorpusLookup::Templates(templates),
                    Err(_) => {
                        self.corpus_available = false;
                        CorpusLookup::Unavailable
                    }
                }
            } else {
                CorpusLookup::Unavailable
            };
            self.entries.insert(key.clone(), lookup);
        }
        &self.entries[&key]
    }

    /// Number of distinct signatures looked up
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been looked up
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for BlueprintCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Blueprint enrichment stage for one candidate
pub fn apply_blueprint(
    candidate: &mut SynergyCandidate,
    inventory: &Inventory,
    cache: &BlueprintCache,
    config: &BlueprintConfig,
) {
    let signature = signature_for(candidate, inventory);
    let templates = match cache.get(&signature) {
        Some(CorpusLookup::Templates(templates)) => templates,
        Some(CorpusLookup::Unavailable) => {
            candidate.note(EnrichmentNote::BlueprintCorpusUnavailable);
            return;
        }
        None if !cache.corpus_available() => {
            candidate.note(EnrichmentNote::BlueprintCorpusUnavailable);
            return;
        }
        None => return,
    };

    let Some(best) = best_match(&signature, templates, config) else {
        return;
    };

    let (confidence_delta, impact_delta) = fit_adjustment(best.fit_score, config);
    candidate.confidence = adjust(candidate.confidence, confidence_delta);
    candidate.impact = adjust(candidate.impact, impact_delta);

    if best.fit_score >= config.good_fit {
        candidate
            .evidence
            .push(format!("matches blueprint '{}' (fit {:.2})", best.name, best.fit_score));
    }
    candidate.blueprint = Some(best);
}
