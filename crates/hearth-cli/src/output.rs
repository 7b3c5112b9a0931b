//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::{CliError, Result};
use colored::*;
use hearth_domain::{QualityTier, RelationshipRule, RuleOrigin, SynergyCandidate};
use hearth_gatekeeper::{FilterOutcome, Rejection};
use hearth_pipeline::{AnalysisOutcome, SynergyReport};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
    Table,
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn score(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string())
}

fn styled(mut table: Table) -> String {
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));
    table.to_string()
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self { format, color_enabled }
    }

    /// Format the result of a full analysis.
    pub fn format_report(&self, report: &SynergyReport, show_rejected: bool) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let outcome = AnalysisOutcome::Completed { report: report.clone() };
                Ok(serde_json::to_string_pretty(&outcome)?)
            }
            OutputFormat::Quiet => Ok(self.format_ids(&report.synergies)),
            OutputFormat::Table => {
                let mut sections = vec![self.format_synergies_table(&report.synergies)];
                if show_rejected && !report.rejections.is_empty() {
                    sections.push(self.format_rejections_table(&report.rejections));
                }
                sections.push(report.metadata.summary());
                Ok(sections.join("\n\n"))
            }
        }
    }

    /// Format a failed analysis; only JSON output carries the failure on stdout.
    pub fn format_failure(&self, error: &CliError) -> Result<Option<String>> {
        match self.format {
            OutputFormat::Json => {
                let outcome = AnalysisOutcome::Failed { error: error.to_string() };
                Ok(Some(serde_json::to_string_pretty(&outcome)?))
            }
            OutputFormat::Table | OutputFormat::Quiet => Ok(None),
        }
    }

    /// Format the result of a filtering pass.
    pub fn format_filter_outcome(&self, outcome: &FilterOutcome, show_rejected: bool) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(outcome)?),
            OutputFormat::Quiet => Ok(self.format_ids(&outcome.accepted)),
            OutputFormat::Table => {
                let mut sections = vec![self.format_synergies_table(&outcome.accepted)];
                if show_rejected && !outcome.rejections.is_empty() {
                    sections.push(self.format_rejections_table(&outcome.rejections));
                }
                sections.push(self.info(&format!(
                    "{} accepted, {} rejected",
                    outcome.accepted.len(),
                    outcome.rejections.len()
                )));
                Ok(sections.join("\n\n"))
            }
        }
    }

    /// Format the relationship catalog.
    pub fn format_catalog(&self, rules: &[RelationshipRule]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(rules)?),
            OutputFormat::Quiet => Ok(rules.iter().map(|r| r.id.as_str()).collect::<Vec<_>>().join("\n")),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["ID", "Trigger", "Action", "Confidence", "Benefit", "Complexity", "Origin"]);

                for rule in rules {
                    let origin = match rule.origin {
                        RuleOrigin::Catalog => "catalog",
                        RuleOrigin::Discovered => "discovered",
                    };
                    builder.push_record([
                        rule.id.clone(),
                        rule.trigger.label(),
                        rule.action.label(),
                        format!("{:.2}", rule.confidence),
                        format!("{:.2}", rule.benefit),
                        rule.complexity.to_string(),
                        origin.to_string(),
                    ]);
                }

                Ok(styled(builder.build()))
            }
        }
    }

    fn format_ids(&self, synergies: &[SynergyCandidate]) -> String {
        let ids: Vec<String> = synergies.iter().map(|s| s.id.to_string()).collect();
        ids.join("\n")
    }

    fn format_synergies_table(&self, synergies: &[SynergyCandidate]) -> String {
        if synergies.is_empty() {
            return self.colorize("No synergies found.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["ID", "Type", "Tier", "Quality", "Confidence", "Impact", "Description"]);

        for synergy in synergies {
            let id = synergy.id.to_string();
            let tier = synergy.quality_tier.map(|t| self.tier(t)).unwrap_or_else(|| "-".to_string());
            builder.push_record([
                short_id(&id).to_string(),
                synergy.synergy_type.to_string(),
                tier,
                score(synergy.quality_score),
                format!("{:.2}", synergy.confidence),
                format!("{:.2}", synergy.impact),
                synergy.description.clone(),
            ]);
        }

        styled(builder.build())
    }

    fn format_rejections_table(&self, rejections: &[Rejection]) -> String {
        let mut builder = Builder::default();
        builder.push_record(["ID", "Code", "Quality", "Reason", "Description"]);

        for rejection in rejections {
            let id = rejection.id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string());
            builder.push_record([
                short_id(&id).to_string(),
                rejection.reason.code().to_string(),
                score(rejection.quality_score),
                rejection.message.clone(),
                rejection.description.clone().unwrap_or_default(),
            ]);
        }

        styled(builder.build())
    }

    fn tier(&self, tier: QualityTier) -> String {
        let color = match tier {
            QualityTier::High => "green",
            QualityTier::Medium => "cyan",
            QualityTier::Low => "yellow",
            QualityTier::Poor => "red",
        };
        self.colorize(&tier.to_string(), color)
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}
