//! The synergy engine
//!
//! Runs one analysis end to end:
//!
//! ```text
//! inventory ──────────────┐ (fatal on failure or timeout)
//! statistics ─┐ (joined)  │
//! signals ────┘           ▼
//!               discovery → detection → blueprint lookups
//!                         → enrichment → gatekeeper → explanations
//! ```
//!
//! Collaborators are synchronous; every call runs on the blocking pool
//! under its own time limit. Statistics, signals and blueprint lookups
//! that fail or time out degrade the run instead of failing it.

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::explain::explain_all;
use crate::metadata::RunMetadata;
use crate::report::{AnalysisOutcome, SynergyReport};
use hearth_detector::{detect_all, discover_rules, Detection, RelationshipCatalog};
use hearth_domain::traits::{BlueprintCorpus, InventoryLoader, SignalProvider, StatisticsProvider};
use hearth_domain::{DeviceSignature, ExternalSignals, HistoricalStats, Inventory, SkippedRecord, SynergyCandidate};
use hearth_enrichment::{enrich, signature_for, BlueprintCache, CorpusLookup, EnrichmentContext, StatsIndex};
use hearth_gatekeeper::{FilterOutcome, Gatekeeper};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Why a blocking collaborator call produced nothing
#[derive(Debug)]
enum CallFailure {
    Failed(String),
    TimedOut,
    Panicked(String),
}

impl Display for CallFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallFailure::Failed(message) => write!(f, "{}", message),
            CallFailure::TimedOut => write!(f, "timed out"),
            CallFailure::Panicked(message) => write!(f, "task failed: {}", message),
        }
    }
}

/// Run a synchronous call on the blocking pool under a time limit
///
/// A call that times out keeps running on its thread; its result is
/// discarded.
async fn call_blocking<T, F>(limit: Duration, call: F) -> Result<T, CallFailure>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, String> + Send + 'static,
{
    match timeout(limit, tokio::task::spawn_blocking(call)).await {
        Err(_) => Err(CallFailure::TimedOut),
        Ok(Err(join)) => Err(CallFailure::Panicked(join.to_string())),
        Ok(Ok(Err(message))) => Err(CallFailure::Failed(message)),
        Ok(Ok(Ok(value))) => Ok(value),
    }
}

/// Keep a successful optional fetch, log the failure otherwise
fn degrade<T>(result: Result<T, CallFailure>, source: &str, consequence: &str) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(failure) => {
            warn!("{} unavailable ({}), {}", source, failure, consequence);
            None
        }
    }
}

/// Run CPU-bound work on the blocking pool
async fn compute<T, F>(work: F) -> Result<T, EngineError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| EngineError::Task(format!("Task join error: {}", e)))
}

/// Everything decided after blueprint lookups
struct Scored {
    outcome: FilterOutcome,
    skipped: Vec<SkippedRecord>,
}

/// Discovers, scores and filters synergies for one home
pub struct SynergyEngine<I, S, G, B> {
    inventory: Arc<I>,
    statistics: Arc<S>,
    signals: Arc<G>,
    corpus: Arc<B>,
    catalog: Arc<RelationshipCatalog>,
    gatekeeper: Gatekeeper,
    config: EngineConfig,
}

impl<I, S, G, B> SynergyEngine<I, S, G, B>
where
    I: InventoryLoader + Send + Sync + 'static,
    S: StatisticsProvider + Send + Sync + 'static,
    G: SignalProvider + Send + Sync + 'static,
    B: BlueprintCorpus + Send + Sync + 'static,
    I::Error: Display,
    S::Error: Display,
    G::Error: Display,
    B::Error: Display,
{
    /// Create an engine with the built-in relationship catalog
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] if the configuration is invalid.
    pub fn new(inventory: I, statistics: S, signals: G, corpus: B, config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let gatekeeper = Gatekeeper::new(config.filter.clone())?;

        Ok(Self {
            inventory: Arc::new(inventory),
            statistics: Arc::new(statistics),
            signals: Arc::new(signals),
            corpus: Arc::new(corpus),
            catalog: Arc::new(RelationshipCatalog::default_catalog()),
            gatekeeper,
            config,
        })
    }

    /// Use a different relationship catalog
    pub fn with_catalog(mut self, catalog: RelationshipCatalog) -> Self {
        self.catalog = Arc::new(catalog);
        self
    }

    /// Active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Relationship catalog in use
    pub fn catalog(&self) -> &RelationshipCatalog {
        &self.catalog
    }

    /// Run under the configured deadline
    pub async fn run(&self) -> Result<SynergyReport, EngineError> {
        self.run_with_deadline(self.config.timeouts.run_deadline()).await
    }

    /// Run under an explicit deadline
    ///
    /// # Errors
    ///
    /// - [`EngineError::InventoryLoad`] / [`EngineError::InventoryTimeout`]
    ///   if the inventory cannot be loaded
    /// - [`EngineError::DeadlineExceeded`] if the run takes longer than
    ///   `deadline`
    /// - [`EngineError::Task`] if a background task panicked
    pub async fn run_with_deadline(&self, deadline: Duration) -> Result<SynergyReport, EngineError> {
        match timeout(deadline, self.execute()).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Run exceeded its deadline of {:?}", deadline);
                Err(EngineError::DeadlineExceeded(deadline))
            }
        }
    }

    /// Run and wrap the result in the serialized contract
    pub async fn analyze(&self) -> AnalysisOutcome {
        let result = self.run().await;
        if let Err(e) = &result {
            warn!("Analysis failed: {}", e);
        }
        result.into()
    }

    async fn execute(&self) -> Result<SynergyReport, EngineError> {
        let started = Instant::now();
        let timeouts = &self.config.timeouts;
        let mut metadata = RunMetadata::new();

        let mut inventory = self.load_inventory().await?;
        let skipped = inventory.sanitize();
        for record in &skipped {
            warn!("Skipping {} {:?}: {}", record.kind, record.id, record.reason);
        }
        metadata.record_skipped(skipped);
        let inventory = Arc::new(inventory);
        info!("Analyzing {} nodes", inventory.nodes.len());

        let window = self.config.statistics_window();
        let statistics = Arc::clone(&self.statistics);
        let signals = Arc::clone(&self.signals);
        let (stats, signals) = tokio::join!(
            call_blocking(timeouts.statistics(), move || {
                statistics.fetch_statistics(&window).map_err(|e| e.to_string())
            }),
            call_blocking(timeouts.signals(), move || signals.fetch_signals().map_err(|e| e.to_string())),
        );
        let stats = degrade(stats, "Statistics", "skipping pattern validation");
        let signals = degrade(signals, "Signals", "skipping context detection and boosts");
        metadata.enrichment.statistics = stats.is_some();
        metadata.enrichment.signals = signals.is_some();

        let (detection, discovered) = self.detect(&inventory, stats.as_ref(), signals.as_ref()).await?;
        metadata.discovered_rules = discovered;
        metadata.chain_stats = detection.chain_stats;
        metadata.record_detected(&detection.candidates);

        let blueprints = self.lookup_blueprints(&inventory, &detection.candidates).await;
        metadata.enrichment.blueprints = blueprints.corpus_available();

        let Scored { mut outcome, skipped } = self
            .score(Arc::clone(&inventory), detection.candidates, stats, signals, blueprints)
            .await?;
        metadata.record_skipped(skipped);
        metadata.record_filtered(&outcome.accepted, &outcome.rejections);

        explain_all(&mut outcome.accepted, &inventory);

        metadata.duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(
            "Run complete: {} accepted, {} rejected in {}ms",
            outcome.accepted.len(),
            outcome.rejections.len(),
            metadata.duration_ms
        );
        debug!("{}", metadata.summary());

        Ok(SynergyReport::new(outcome.accepted, outcome.rejections, metadata))
    }

    async fn load_inventory(&self) -> Result<Inventory, EngineError> {
        let loader = Arc::clone(&self.inventory);
        let limit = self.config.timeouts.inventory();

        call_blocking(limit, move || loader.load_inventory().map_err(|e| e.to_string()))
            .await
            .map_err(|failure| match failure {
                CallFailure::Failed(message) => EngineError::InventoryLoad(message),
                CallFailure::TimedOut => EngineError::InventoryTimeout(limit),
                CallFailure::Panicked(message) => EngineError::Task(message),
            })
    }

    /// Relationship discovery and detection
    async fn detect(
        &self,
        inventory: &Arc<Inventory>,
        stats: Option<&HistoricalStats>,
        signals: Option<&ExternalSignals>,
    ) -> Result<(Detection, usize), EngineError> {
        let inventory = Arc::clone(inventory);
        let catalog = Arc::clone(&self.catalog);
        let stats = stats.filter(|_| self.config.detector.discovery_enabled).cloned();
        let signals = signals.cloned().unwrap_or_default();
        let config = self.config.detector.clone();

        compute(move || {
            let (catalog, discovered) = match stats {
                Some(stats) => {
                    let rules = discover_rules(&stats, &inventory, &catalog, &config);
                    let discovered = rules.len();
                    match catalog.with_additional(rules) {
                        Ok(extended) => (Arc::new(extended), discovered),
                        Err(e) => {
                            warn!("Ignoring discovered rules ({}), using the catalog as is", e);
                            (catalog, 0)
                        }
                    }
                }
                None => (catalog, 0),
            };
            (detect_all(&inventory, &catalog, &signals, &config), discovered)
        })
        .await
    }

    /// Look up every distinct signature once, each call under its own limit
    ///
    /// Lookups that already answered are kept. The first lookup that fails
    /// or times out marks the corpus unavailable, and no further calls are
    /// issued for the rest of the run.
    async fn lookup_blueprints(&self, inventory: &Inventory, candidates: &[SynergyCandidate]) -> BlueprintCache {
        let signatures: Vec<DeviceSignature> = candidates
            .iter()
            .map(|c| signature_for(c, inventory))
            .filter(|s| !s.is_empty())
            .map(|s| (s.key(), s))
            .collect::<BTreeMap<_, _>>()
            .into_values()
            .collect();
        let mut cache = BlueprintCache::new();
        if signatures.is_empty() {
            return cache;
        }
        debug!("Looking up {} blueprint signatures", signatures.len());

        let limit = self.config.timeouts.blueprint();
        for signature in signatures {
            if !cache.corpus_available() {
                cache.insert(&signature, CorpusLookup::Unavailable);
                continue;
            }

            let corpus = Arc::clone(&self.corpus);
            let query = signature.clone();
            let lookup = call_blocking(limit, move || corpus.find_templates(&query).map_err(|e| e.to_string())).await;

            match lookup {
                Ok(templates) => cache.insert(&signature, CorpusLookup::Templates(templates)),
                Err(failure) => {
                    warn!(
                        "Blueprint corpus unavailable for {} ({}), skipping remaining lookups",
                        signature.key(),
                        failure
                    );
                    cache.mark_unavailable();
                    cache.insert(&signature, CorpusLookup::Unavailable);
                }
            }
        }

        cache
    }

    /// Enrichment and filtering
    async fn score(
        &self,
        inventory: Arc<Inventory>,
        candidates: Vec<SynergyCandidate>,
        stats: Option<HistoricalStats>,
        signals: Option<ExternalSignals>,
        blueprints: BlueprintCache,
    ) -> Result<Scored, EngineError> {
        let config = self.config.enrichment.clone();
        let gatekeeper = self.gatekeeper.clone();

        compute(move || {
            let index = stats.as_ref().map(StatsIndex::build);
            let skipped = index.as_ref().map(|i| i.skipped().to_vec()).unwrap_or_default();

            let ctx = EnrichmentContext {
                inventory: &inventory,
                stats: index.as_ref(),
                blueprints: &blueprints,
                signals: signals.as_ref(),
            };
            let enriched = enrich(candidates, &ctx, &config);
            let outcome = gatekeeper.filter(enriched, Some(inventory.as_ref()));

            Scored { outcome, skipped }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_call_blocking_outcomes() {
        let ok = call_blocking(Duration::from_secs(1), || Ok::<_, String>(7)).await;
        assert!(matches!(ok, Ok(7)));

        let failed = call_blocking(Duration::from_secs(1), || Err::<u8, _>("nope".to_string())).await;
        assert!(matches!(failed, Err(CallFailure::Failed(m)) if m == "nope"));

        let slow = call_blocking(Duration::from_millis(20), || {
            std::thread::sleep(Duration::from_millis(200));
            Ok::<_, String>(())
        })
        .await;
        assert!(matches!(slow, Err(CallFailure::TimedOut)));
    }

    #[tokio::test]
    async fn test_call_blocking_panic() {
        let result = call_blocking(Duration::from_secs(1), || -> Result<(), String> { panic!("boom") }).await;
        assert!(matches!(result, Err(CallFailure::Panicked(_))));
    }
}
