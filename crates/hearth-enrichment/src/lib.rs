//! Hearth Enrichment
//!
//! Adjusts raw candidates with evidence from outside the inventory.
//!
//! # Stages
//!
//! ```text
//! candidate → pattern validator (statistics)
//!           → blueprint fit (template corpus)
//!           → context booster (weather, energy, calendar, time)
//! ```
//!
//! Each stage only reads the lookups handed to it through
//! [`EnrichmentContext`]. A missing lookup turns into an
//! [`EnrichmentNote`](hearth_domain::EnrichmentNote) on the candidate, never
//! an error. Candidates are independent, so [`enrich`] maps over them in
//! parallel while keeping their order.

#![warn(missing_docs)]

pub mod blueprint;
pub mod booster;
mod config;
mod error;
pub mod pattern;

pub use blueprint::{apply_blueprint, signature_for, BlueprintCache, CorpusLookup};
pub use booster::{apply_boost, context_boost};
pub use config::{BlueprintConfig, BoostConfig, EnrichmentConfig, PatternConfig, MODERATE_SUPPORT, VALIDATION_THRESHOLD};
pub use error::EnrichmentError;
pub use pattern::{validate_pattern, PatternSupport, StatsIndex};

use hearth_domain::{ExternalSignals, Inventory, SynergyCandidate};
use rayon::prelude::*;
use tracing::debug;

/// Read-only lookups shared by every candidate in a run
#[derive(Debug, Clone, Copy)]
pub struct EnrichmentContext<'a> {
    /// Sanitized inventory snapshot
    pub inventory: &'a Inventory,

    /// Indexed statistics, None when the provider failed or timed out
    pub stats: Option<&'a StatsIndex>,

    /// Blueprint lookups gathered before enrichment
    pub blueprints: &'a BlueprintCache,

    /// External signals, None when the provider failed or timed out
    pub signals: Option<&'a ExternalSignals>,
}

/// Run every enrichment stage on one candidate
pub fn enrich_one(candidate: &mut SynergyCandidate, ctx: &EnrichmentContext<'_>, config: &EnrichmentConfig) {
    validate_pattern(candidate, ctx.stats, &config.pattern);
    apply_blueprint(candidate, ctx.inventory, ctx.blueprints, &config.blueprint);
    apply_boost(candidate, ctx.inventory, ctx.signals, &config.boost);
}

/// Enrich a batch of candidates, preserving their order
pub fn enrich(
    candidates: Vec<SynergyCandidate>,
    ctx: &EnrichmentContext<'_>,
    config: &EnrichmentConfig,
) -> Vec<SynergyCandidate> {
    let enriched: Vec<SynergyCandidate> = candidates
        .into_par_iter()
        .map(|mut candidate| {
            enrich_one(&mut candidate, ctx, config);
            candidate
        })
        .collect();

    debug!(
        "Enriched {} candidates (statistics: {}, blueprints: {}, signals: {})",
        enriched.len(),
        ctx.stats.is_some(),
        ctx.blueprints.corpus_available(),
        ctx.signals.is_some()
    );
    enriched
}
