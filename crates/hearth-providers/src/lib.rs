//! Hearth Provider Layer
//!
//! Implementations of the collaborator traits in `hearth_domain::traits`.
//!
//! # Providers
//!
//! - [`MockProvider`]: fixed values with call counting, failure and delay
//!   injection, for tests
//! - [`JsonSnapshot`]: a directory of JSON files, for the CLI and fixtures
//! - [`HttpBlueprintCorpus`]: a remote template index
//!
//! # Examples
//!
//! ```
//! use hearth_domain::traits::SignalProvider;
//! use hearth_domain::ExternalSignals;
//! use hearth_providers::MockSignals;
//!
//! let provider = MockSignals::new(ExternalSignals::default());
//! assert!(provider.fetch_signals().unwrap().is_empty());
//! ```

#![warn(missing_docs)]

mod error;
pub mod file;
pub mod http;
pub mod mock;

pub use error::ProviderError;
pub use file::{read_json, JsonSnapshot};
pub use http::HttpBlueprintCorpus;
pub use mock::{MockCorpus, MockInventory, MockProvider, MockSignals, MockStatistics};

use hearth_domain::{BlueprintTemplate, DeviceSignature};

/// Templates that share at least one domain with the signature
///
/// Local corpora hold every template; this trims them to the ones worth
/// scoring, in their original order.
pub fn relevant_templates(templates: Vec<BlueprintTemplate>, signature: &DeviceSignature) -> Vec<BlueprintTemplate> {
    templates
        .into_iter()
        .filter(|t| !t.required_domains.is_disjoint(&signature.domains))
        .collect()
}
