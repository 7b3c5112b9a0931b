//! Blueprint corpus over HTTP
//!
//! Queries a template index service:
//!
//! ```text
//! GET {endpoint}/api/blueprints?domains=binary_sensor,light&device_classes=motion
//! → [BlueprintTemplate, ...]
//! ```
//!
//! # Features
//!
//! - Configurable endpoint and per-request timeout
//! - Retry logic with exponential backoff
//! - Usable from the blocking pool through the sync [`BlueprintCorpus`] trait
//!
//! # Examples
//!
//! ```no_run
//! use hearth_providers::HttpBlueprintCorpus;
//!
//! let corpus = HttpBlueprintCorpus::new("http://localhost:8123").unwrap().with_max_retries(2);
//! ```

use crate::ProviderError;
use hearth_domain::traits::BlueprintCorpus;
use hearth_domain::{BlueprintTemplate, DeviceSignature};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Default per-request timeout (10 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default number of attempts
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// HTTP client for a community blueprint index
#[derive(Debug, Clone)]
pub struct HttpBlueprintCorpus {
    endpoint: String,
    client: reqwest::Client,
    max_retries: u32,
}

impl HttpBlueprintCorpus {
    /// Create a corpus client for `endpoint`
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ProviderError> {
        Self::with_timeout(endpoint, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a corpus client with a custom per-request timeout
    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Communication(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            client,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Set the maximum number of attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Endpoint the client talks to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch templates for a signature
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The service is unreachable after all retries
    /// - The service answers with a non-success status
    /// - The response body is not a template list
    pub async fn fetch(&self, signature: &DeviceSignature) -> Result<Vec<BlueprintTemplate>, ProviderError> {
        let url = format!("{}/api/blueprints", self.endpoint);
        let domains: Vec<&str> = signature.domains.iter().map(String::as_str).collect();
        let classes: Vec<&str> = signature.device_classes.iter().map(String::as_str).collect();
        let query = [("domains", domains.join(",")), ("device_classes", classes.join(","))];

        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_retries {
            match self.client.get(&url).query(&query).send().await {
                Ok(response) if response.status().is_success() => {
                    return response
                        .json::<Vec<BlueprintTemplate>>()
                        .await
                        .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse templates: {}", e)));
                }
                Ok(response) if response.status() == reqwest::StatusCode::NOT_FOUND => {
                    // the index has nothing for this signature
                    return Ok(Vec::new());
                }
                Ok(response) => {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
                    last_error = Some(ProviderError::Communication(format!("HTTP {}: {}", status, body)));
                }
                Err(e) => {
                    last_error = Some(ProviderError::Communication(format!("Request failed: {}", e)));
                }
            }

            attempts += 1;
            if attempts < self.max_retries {
                // 250ms, 500ms, 1s, ...
                let delay = Duration::from_millis(250 * 2u64.pow(attempts - 1));
                debug!("Blueprint corpus attempt {} failed, retrying in {:?}", attempts, delay);
                tokio::time::sleep(delay).await;
            }
        }

        let error = last_error.unwrap_or_else(|| ProviderError::Communication("Max retries exceeded".to_string()));
        warn!("Blueprint corpus unreachable: {}", error);
        Err(error)
    }
}

/// Drive a future to completion from synchronous code
///
/// Inside the runtime's blocking pool the current runtime is reused;
/// elsewhere a private current-thread runtime is built.
fn block_on<F: Future>(future: F) -> Result<F::Output, ProviderError> {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => Ok(handle.block_on(future)),
        Err(_) => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| ProviderError::Communication(format!("Failed to start runtime: {}", e)))?;
            Ok(runtime.block_on(future))
        }
    }
}

impl BlueprintCorpus for HttpBlueprintCorpus {
    type Error = ProviderError;

    fn find_templates(&self, signature: &DeviceSignature) -> Result<Vec<BlueprintTemplate>, Self::Error> {
        block_on(self.fetch(signature))?
    }
}
