//! Run results
//!
//! [`AnalysisOutcome`] is the serialized contract consumers read. A
//! completed run always says whether anything was found; an empty list
//! alone never means "no synergies".

use crate::error::EngineError;
use crate::metadata::RunMetadata;
use hearth_domain::SynergyCandidate;
use hearth_gatekeeper::Rejection;
use serde::{Deserialize, Serialize};

/// Whether a completed run surfaced anything
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// At least one synergy was accepted
    SynergiesFound,

    /// The run completed and accepted nothing
    NoSynergiesFound,
}

/// Output of a completed run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynergyReport {
    /// Found / not found
    pub status: ReportStatus,

    /// Accepted synergies, best first
    pub synergies: Vec<SynergyCandidate>,

    /// Rejected synergies with reasons
    pub rejections: Vec<Rejection>,

    /// Counts and figures for the run
    pub metadata: RunMetadata,
}

impl SynergyReport {
    /// Assemble a report; the status follows from the accepted list
    pub fn new(synergies: Vec<SynergyCandidate>, rejections: Vec<Rejection>, metadata: RunMetadata) -> Self {
        let status = if synergies.is_empty() {
            ReportStatus::NoSynergiesFound
        } else {
            ReportStatus::SynergiesFound
        };
        Self {
            status,
            synergies,
            rejections,
            metadata,
        }
    }

    /// Whether anything was accepted
    pub fn found_any(&self) -> bool {
        self.status == ReportStatus::SynergiesFound
    }
}

/// Completed report or failure, tagged by `status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum AnalysisOutcome {
    /// The run finished
    Completed {
        /// The run's report
        report: SynergyReport,
    },

    /// The run aborted
    Failed {
        /// Error message
        error: String,
    },
}

impl AnalysisOutcome {
    /// Whether the run finished
    pub fn is_completed(&self) -> bool {
        matches!(self, AnalysisOutcome::Completed { .. })
    }

    /// The report, when the run finished
    pub fn report(&self) -> Option<&SynergyReport> {
        match self {
            AnalysisOutcome::Completed { report } => Some(report),
            AnalysisOutcome::Failed { .. } => None,
        }
    }
}

impl From<Result<SynergyReport, EngineError>> for AnalysisOutcome {
    fn from(result: Result<SynergyReport, EngineError>) -> Self {
        match result {
            Ok(report) => AnalysisOutcome::Completed { report },
            Err(e) => AnalysisOutcome::Failed { error: e.to_string() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report_says_nothing_found() {
        let report = SynergyReport::new(Vec::new(), Vec::new(), RunMetadata::default());
        assert_eq!(report.status, ReportStatus::NoSynergiesFound);
        assert!(!report.found_any());
    }

    #[test]
    fn test_outcome_serialization() {
        let completed: AnalysisOutcome = Ok(SynergyReport::new(Vec::new(), Vec::new(), RunMetadata::default())).into();
        let json = serde_json::to_value(&completed).unwrap();
        assert_eq!(json["status"], "completed");
        assert_eq!(json["report"]["status"], "no_synergies_found");

        let failed: AnalysisOutcome = Err(EngineError::InventoryLoad("boom".to_string())).into();
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["error"], "Inventory load failed: boom");
        assert!(failed.report().is_none());
    }

    #[test]
    fn test_outcome_roundtrip() {
        let outcome: AnalysisOutcome = Ok(SynergyReport::new(Vec::new(), Vec::new(), RunMetadata::default())).into();
        let json = serde_json::to_string(&outcome).unwrap();
        let parsed: AnalysisOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, outcome);
    }
}
