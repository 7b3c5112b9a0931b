//! In-memory collaborators for deterministic testing
//!
//! [`MockProvider`] serves a fixed value through whichever collaborator
//! trait matches its type, counts calls, and can be told to fail or to
//! stall. Clones share their call count and failure switch.
//!
//! # Examples
//!
//! ```
//! use hearth_domain::traits::InventoryLoader;
//! use hearth_domain::Inventory;
//! use hearth_providers::MockProvider;
//!
//! let loader = MockProvider::new(Inventory::default());
//! assert!(loader.load_inventory().is_ok());
//! assert_eq!(loader.call_count(), 1);
//!
//! loader.set_failing(true);
//! assert!(loader.load_inventory().is_err());
//! ```

use crate::{relevant_templates, ProviderError};
use hearth_domain::traits::{BlueprintCorpus, InventoryLoader, SignalProvider, StatisticsProvider};
use hearth_domain::{
    BlueprintTemplate, DeviceSignature, ExternalSignals, HistoricalStats, Inventory, TimeWindow,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Fixed-value collaborator
#[derive(Debug, Clone)]
pub struct MockProvider<T> {
    value: T,
    delay: Option<Duration>,
    failing: Arc<Mutex<bool>>,
    call_count: Arc<Mutex<usize>>,
}

impl<T: Clone> MockProvider<T> {
    /// Serve `value` on every call
    pub fn new(value: T) -> Self {
        Self {
            value,
            delay: None,
            failing: Arc::new(Mutex::new(false)),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// A provider whose every call fails
    pub fn failing(value: T) -> Self {
        let provider = Self::new(value);
        provider.set_failing(true);
        provider
    }

    /// Block each call for `delay` before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Switch failure injection on or off
    pub fn set_failing(&self, failing: bool) {
        *guard(&self.failing) = failing;
    }

    /// Get the number of calls so far
    pub fn call_count(&self) -> usize {
        *guard(&self.call_count)
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        *guard(&self.call_count) = 0;
    }

    fn serve(&self, what: &str) -> Result<T, ProviderError> {
        *guard(&self.call_count) += 1;

        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        if *guard(&self.failing) {
            return Err(ProviderError::Unavailable(format!("mock {} failure", what)));
        }
        Ok(self.value.clone())
    }
}

impl Default for MockProvider<Inventory> {
    fn default() -> Self {
        Self::new(Inventory::default())
    }
}

impl InventoryLoader for MockProvider<Inventory> {
    type Error = ProviderError;

    fn load_inventory(&self) -> Result<Inventory, Self::Error> {
        self.serve("inventory")
    }
}

impl StatisticsProvider for MockProvider<HistoricalStats> {
    type Error = ProviderError;

    fn fetch_statistics(&self, _window: &TimeWindow) -> Result<HistoricalStats, Self::Error> {
        self.serve("statistics")
    }
}

impl SignalProvider for MockProvider<ExternalSignals> {
    type Error = ProviderError;

    fn fetch_signals(&self) -> Result<ExternalSignals, Self::Error> {
        self.serve("signals")
    }
}

impl BlueprintCorpus for MockProvider<Vec<BlueprintTemplate>> {
    type Error = ProviderError;

    fn find_templates(&self, signature: &DeviceSignature) -> Result<Vec<BlueprintTemplate>, Self::Error> {
        let templates = self.serve("blueprint corpus")?;
        Ok(relevant_templates(templates, signature))
    }
}

/// Mock inventory loader
pub type MockInventory = MockProvider<Inventory>;

/// Mock statistics provider
pub type MockStatistics = MockProvider<HistoricalStats>;

/// Mock signal provider
pub type MockSignals = MockProvider<ExternalSignals>;

/// Mock blueprint corpus
pub type MockCorpus = MockProvider<Vec<BlueprintTemplate>>;

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_domain::DeviceNode;
    use std::time::Instant;

    fn template(id: &str, domains: &[&str]) -> BlueprintTemplate {
        BlueprintTemplate {
            id: id.to_string(),
            name: id.to_string(),
            popularity: 0.5,
            quality: 0.5,
            required_domains: domains.iter().map(|d| d.to_string()).collect(),
            required_device_classes: Default::default(),
            source_url: None,
        }
    }

    #[test]
    fn test_mock_inventory() {
        let inventory = Inventory::from_nodes(vec![DeviceNode::new("light.a", "light", None, None)]);
        let loader = MockInventory::new(inventory.clone());

        assert_eq!(loader.load_inventory().unwrap(), inventory);
        assert_eq!(loader.call_count(), 1);
    }

    #[test]
    fn test_mock_failure_switch() {
        let signals = MockSignals::failing(ExternalSignals::default());
        assert!(matches!(signals.fetch_signals(), Err(ProviderError::Unavailable(_))));

        signals.set_failing(false);
        assert!(signals.fetch_signals().is_ok());
        assert_eq!(signals.call_count(), 2);
    }

    #[test]
    fn test_mock_clone_shares_state() {
        let stats1 = MockStatistics::new(HistoricalStats::default());
        let stats2 = stats1.clone();

        stats1.fetch_statistics(&TimeWindow::last_days(7)).unwrap();
        assert_eq!(stats2.call_count(), 1);

        stats2.set_failing(true);
        assert!(stats1.fetch_statistics(&TimeWindow::last_days(7)).is_err());

        stats1.reset_call_count();
        assert_eq!(stats2.call_count(), 0);
    }

    #[test]
    fn test_mock_delay() {
        let loader = MockInventory::default().with_delay(Duration::from_millis(20));
        let started = Instant::now();
        loader.load_inventory().unwrap();
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_mock_corpus_filters_by_domain() {
        let corpus = MockCorpus::new(vec![
            template("motion-light", &["binary_sensor", "light"]),
            template("leak-valve", &["binary_sensor", "valve"]),
            template("tv-scene", &["media_player"]),
        ]);
        let signature = DeviceSignature {
            domains: ["light".to_string()].into_iter().collect(),
            device_classes: Default::default(),
        };

        let found = corpus.find_templates(&signature).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "motion-light");
    }
}
