//! Blueprint templates and the device signature used to look them up

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A community automation template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlueprintTemplate {
    /// Template identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Normalized popularity [0.0, 1.0]
    #[serde(default)]
    pub popularity: f64,

    /// Corpus-reported quality [0.0, 1.0]
    #[serde(default)]
    pub quality: f64,

    /// Domains the template needs
    #[serde(default)]
    pub required_domains: BTreeSet<String>,

    /// Device classes the template needs
    #[serde(default)]
    pub required_device_classes: BTreeSet<String>,

    /// Where the template lives
    #[serde(default)]
    pub source_url: Option<String>,
}

/// Domain / device-class signature of a synergy
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DeviceSignature {
    /// Domains involved
    pub domains: BTreeSet<String>,

    /// Device classes involved
    pub device_classes: BTreeSet<String>,
}

impl DeviceSignature {
    /// Whether the signature carries no information
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty() && self.device_classes.is_empty()
    }

    /// Stable text form (`light,sensor|motion`), used as a cache key
    pub fn key(&self) -> String {
        let domains: Vec<&str> = self.domains.iter().map(String::as_str).collect();
        let classes: Vec<&str> = self.device_classes.iter().map(String::as_str).collect();
        format!("{}|{}", domains.join(","), classes.join(","))
    }
}

/// Best-fitting template for a synergy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlueprintMatch {
    /// Template identifier
    pub template_id: String,

    /// Template name
    pub name: String,

    /// Fit score [0.0, 1.0]
    pub fit_score: f64,
}
