//! Tier module - complexity and quality buckets for synergies

use serde::{Deserialize, Serialize};

/// Implementation complexity of a synergy
///
/// Complexity drives two adjustments:
/// - Impact penalty at detection time (0% / 10% / 30%)
/// - Quality adjustment at scoring time (+0.15 / 0 / -0.15)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityTier {
    /// Single trigger, single action, no conditions
    Low,

    /// Conditions or multiple services involved
    Medium,

    /// Multi-step or security-sensitive automations
    High,
}

impl ComplexityTier {
    /// Get the tier name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplexityTier::Low => "low",
            ComplexityTier::Medium => "medium",
            ComplexityTier::High => "high",
        }
    }

    /// Parse a complexity tier from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(ComplexityTier::Low),
            "medium" => Some(ComplexityTier::Medium),
            "high" => Some(ComplexityTier::High),
            _ => None,
        }
    }

    /// Fraction removed from the base impact score
    pub fn impact_penalty(&self) -> f64 {
        match self {
            ComplexityTier::Low => 0.0,
            ComplexityTier::Medium => 0.1,
            ComplexityTier::High => 0.3,
        }
    }

    /// Signed term added to the composite quality score
    pub fn quality_adjustment(&self) -> f64 {
        match self {
            ComplexityTier::Low => 0.15,
            ComplexityTier::Medium => 0.0,
            ComplexityTier::High => -0.15,
        }
    }

    /// Apply the impact penalty to a base benefit score
    pub fn penalize(&self, benefit: f64) -> f64 {
        benefit * (1.0 - self.impact_penalty())
    }
}

impl std::str::FromStr for ComplexityTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid complexity: {}", s))
    }
}

impl std::fmt::Display for ComplexityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quality bucket derived from the final composite score
///
/// - High: >= 0.70
/// - Medium: [0.50, 0.70)
/// - Low: [0.30, 0.50)
/// - Poor: < 0.30
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityTier {
    /// Strong recommendation
    High,

    /// Worth suggesting
    Medium,

    /// Marginal
    Low,

    /// Not worth surfacing
    Poor,
}

/// Lower bound of the high tier
pub const HIGH_TIER_MIN: f64 = 0.70;

/// Lower bound of the medium tier
pub const MEDIUM_TIER_MIN: f64 = 0.50;

/// Lower bound of the low tier
pub const LOW_TIER_MIN: f64 = 0.30;

impl QualityTier {
    /// Bucket a quality score
    pub fn from_score(score: f64) -> Self {
        if score >= HIGH_TIER_MIN {
            QualityTier::High
        } else if score >= MEDIUM_TIER_MIN {
            QualityTier::Medium
        } else if score >= LOW_TIER_MIN {
            QualityTier::Low
        } else {
            QualityTier::Poor
        }
    }

    /// Get the tier name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityTier::High => "high",
            QualityTier::Medium => "medium",
            QualityTier::Low => "low",
            QualityTier::Poor => "poor",
        }
    }

    /// Parse a quality tier from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "high" => Some(QualityTier::High),
            "medium" => Some(QualityTier::Medium),
            "low" => Some(QualityTier::Low),
            "poor" => Some(QualityTier::Poor),
            _ => None,
        }
    }
}

impl std::fmt::Display for QualityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
