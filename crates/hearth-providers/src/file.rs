//! JSON snapshot directory
//!
//! A snapshot is a directory holding one JSON file per collaborator:
//!
//! | File | Contents |
//! |------|----------|
//! | `inventory.json` | [`Inventory`] |
//! | `statistics.json` | [`HistoricalStats`] |
//! | `signals.json` | [`ExternalSignals`] |
//! | `blueprints.json` | array of [`BlueprintTemplate`] |
//!
//! Only the inventory is required; a missing optional file surfaces as
//! [`ProviderError::NotFound`] and the engine carries on without it.

use crate::{relevant_templates, ProviderError};
use hearth_domain::traits::{BlueprintCorpus, InventoryLoader, SignalProvider, StatisticsProvider};
use hearth_domain::{
    BlueprintTemplate, DeviceSignature, ExternalSignals, HistoricalStats, Inventory, TimeWindow,
};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Inventory file name
pub const INVENTORY_FILE: &str = "inventory.json";
/// Statistics file name
pub const STATISTICS_FILE: &str = "statistics.json";
/// Signals file name
pub const SIGNALS_FILE: &str = "signals.json";
/// Blueprint corpus file name
pub const BLUEPRINTS_FILE: &str = "blueprints.json";

/// Read and parse a JSON file
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ProviderError> {
    if !path.exists() {
        return Err(ProviderError::NotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path).map_err(|source| ProviderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|e| ProviderError::Parse {
        origin: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Collaborators backed by a snapshot directory
#[derive(Debug, Clone)]
pub struct JsonSnapshot {
    dir: PathBuf,
}

impl JsonSnapshot {
    /// Open a snapshot directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Snapshot directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read<T: DeserializeOwned>(&self, file: &str) -> Result<T, ProviderError> {
        let path = self.dir.join(file);
        debug!("Reading {}", path.display());
        read_json(&path)
    }
}

impl InventoryLoader for JsonSnapshot {
    type Error = ProviderError;

    fn load_inventory(&self) -> Result<Inventory, Self::Error> {
        self.read(INVENTORY_FILE)
    }
}

impl StatisticsProvider for JsonSnapshot {
    type Error = ProviderError;

    fn fetch_statistics(&self, _window: &TimeWindow) -> Result<HistoricalStats, Self::Error> {
        // a snapshot is already cut to its window
        self.read(STATISTICS_FILE)
    }
}

impl SignalProvider for JsonSnapshot {
    type Error = ProviderError;

    fn fetch_signals(&self) -> Result<ExternalSignals, Self::Error> {
        self.read(SIGNALS_FILE)
    }
}

impl BlueprintCorpus for JsonSnapshot {
    type Error = ProviderError;

    fn find_templates(&self, signature: &DeviceSignature) -> Result<Vec<BlueprintTemplate>, Self::Error> {
        let templates: Vec<BlueprintTemplate> = self.read(BLUEPRINTS_FILE)?;
        Ok(relevant_templates(templates, signature))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, file: &str, content: &str) {
        std::fs::write(dir.path().join(file), content).unwrap();
    }

    #[test]
    fn test_load_inventory() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            INVENTORY_FILE,
            r#"{
                "nodes": [
                    {"id": "binary_sensor.m", "domain": "binary_sensor", "device_class": "motion", "area_id": "office"},
                    {"id": "light.desk", "domain": "light", "area_id": "office"}
                ]
            }"#,
        );

        let inventory = JsonSnapshot::new(dir.path()).load_inventory().unwrap();
        assert_eq!(inventory.nodes.len(), 2);
        assert!(inventory.nodes[1].available);
        assert_eq!(inventory.area_of("light.desk"), Some("office"));
    }

    #[test]
    fn test_missing_optional_file() {
        let dir = TempDir::new().unwrap();
        let snapshot = JsonSnapshot::new(dir.path());

        assert!(matches!(snapshot.fetch_signals(), Err(ProviderError::NotFound(_))));
        assert!(matches!(
            snapshot.fetch_statistics(&TimeWindow::last_days(30)),
            Err(ProviderError::NotFound(_))
        ));
    }

    #[test]
    fn test_invalid_json() {
        let dir = TempDir::new().unwrap();
        write(&dir, INVENTORY_FILE, "{ not json");

        let err = JsonSnapshot::new(dir.path()).load_inventory().unwrap_err();
        assert!(matches!(err, ProviderError::Parse { .. }));
        assert!(err.to_string().contains("inventory.json"));
    }

    #[test]
    fn test_signals_and_blueprints() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            SIGNALS_FILE,
            r#"{"weather": {"condition": "rainy", "temperature_c": 9.5}, "local_hour": 19}"#,
        );
        write(
            &dir,
            BLUEPRINTS_FILE,
            r#"[
                {"id": "rain-cover", "name": "Close covers on rain", "popularity": 0.6, "quality": 0.7,
                 "required_domains": ["weather", "cover"]},
                {"id": "tv-dim", "name": "Dim for TV", "popularity": 0.4, "quality": 0.5,
                 "required_domains": ["media_player", "light"]}
            ]"#,
        );
        let snapshot = JsonSnapshot::new(dir.path());

        let signals = snapshot.fetch_signals().unwrap();
        assert_eq!(signals.local_hour, Some(19));
        assert!(signals.weather.unwrap().condition.is_precipitation());

        let signature = DeviceSignature {
            domains: ["cover".to_string(), "weather".to_string()].into_iter().collect(),
            device_classes: Default::default(),
        };
        let templates = snapshot.find_templates(&signature).unwrap();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].id, "rain-cover");
    }
}
