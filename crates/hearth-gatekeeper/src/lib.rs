//! Hearth Gatekeeper
//!
//! Decides which synergies are worth surfacing.
//!
//! The Gatekeeper provides:
//! - Hard rejection of malformed or unsupported synergies
//! - The composite quality score with a per-term breakdown
//! - Threshold (soft) rejection and strict-mode policy
//! - Deduplication by canonical pair key
//! - Quality tiering and stable ranking
//!
//! # Examples
//!
//! ```no_run
//! use hearth_gatekeeper::{FilterConfig, Gatekeeper};
//!
//! let gatekeeper = Gatekeeper::new(FilterConfig::strict()).unwrap();
//!
//! // let outcome = gatekeeper.filter(candidates, Some(&inventory));
//! // for rejection in &outcome.rejections { println!("{}", rejection.message); }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
pub mod scorer;
mod validator;

pub use config::{FilterConfig, DEFAULT_SOURCE_DENYLIST};
pub use error::GatekeeperError;
pub use scorer::{quality_from_terms, score_breakdown, score_candidate};
pub use validator::{rank_order, FilterOutcome, Gatekeeper, Rejection, RejectionReason};
