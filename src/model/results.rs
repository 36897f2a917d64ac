//! Outputs of scoring an assessment: scores, findings and recommendations.

use super::{Dimension, QuestionId};
use crate::error::AssessError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a stored recommendation.
pub type RecommendationId = i64;

/// Aggregated maturity of one dimension of one assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub dimension: Dimension,
    /// Weighted average maturity, capped at 2.0 when a critical blocker fires
    pub maturity_score: f64,
    /// Same value as `maturity_score`; kept separately for reporting
    pub weighted_score: f64,
    /// Sum of weight x 5 over the answered questions
    pub max_possible_score: f64,
    /// `weighted_score` / 5 x 100, capped at 40 when a critical blocker fires
    pub percentage: f64,
}

/// Severity of a finding or anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = AssessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "critical" => Ok(Self::Critical),
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(AssessError::validation(format!("unknown severity '{other}'"))),
        }
    }
}

/// An observed gap derived from a dimension score or a single low answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub dimension: Dimension,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    /// Set for findings raised by a single low-scoring answer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_id: Option<QuestionId>,
}

/// Three-level scale shared by effort and impact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Weight of this level when used as impact: low 1, medium 2, high 3.
    #[must_use]
    pub const fn impact_weight(self) -> f64 {
        match self {
            Self::Low => 1.0,
            Self::Medium => 2.0,
            Self::High => 3.0,
        }
    }

    /// Weight of this level when used as effort: low 3, medium 2, high 1.
    ///
    /// Cheap work weighs more, so it divides impact into a larger gain.
    #[must_use]
    pub const fn effort_weight(self) -> f64 {
        match self {
            Self::Low => 3.0,
            Self::Medium => 2.0,
            Self::High => 1.0,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = AssessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(AssessError::validation(format!("unknown level '{other}'"))),
        }
    }
}

/// Delivery bucket of a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum Timeline {
    Days30,
    Days60,
    Days90,
}

impl Timeline {
    #[must_use]
    pub const fn days(self) -> u16 {
        match self {
            Self::Days30 => 30,
            Self::Days60 => 60,
            Self::Days90 => 90,
        }
    }
}

impl TryFrom<u16> for Timeline {
    type Error = AssessError;

    fn try_from(days: u16) -> Result<Self, Self::Error> {
        match days {
            30 => Ok(Self::Days30),
            60 => Ok(Self::Days60),
            90 => Ok(Self::Days90),
            other => Err(AssessError::validation(format!(
                "timeline must be 30, 60 or 90 days, got {other}"
            ))),
        }
    }
}

impl From<Timeline> for u16 {
    fn from(timeline: Timeline) -> Self {
        timeline.days()
    }
}

impl fmt::Display for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} days", self.days())
    }
}

/// User-tracked progress of a recommendation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Skipped,
}

impl RecommendationStatus {
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::InProgress,
        Self::Completed,
        Self::Skipped,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for RecommendationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecommendationStatus {
    type Err = AssessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| {
                AssessError::validation(format!(
                    "invalid status '{s}': must be one of pending, in_progress, completed, skipped"
                ))
            })
    }
}

/// An actionable improvement item instantiated from a rule template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Assigned once persisted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecommendationId>,
    pub dimension: Dimension,
    pub title: String,
    pub description: String,
    pub effort: Level,
    pub impact: Level,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kpi: Option<String>,
    pub timeline: Timeline,
    /// Lower is more urgent; may be negative after prioritization
    pub priority: i64,
    #[serde(default)]
    pub status: RecommendationStatus,
}

impl Recommendation {
    /// Low effort with high impact.
    #[must_use]
    pub fn is_quick_win(&self) -> bool {
        self.effort == Level::Low && self.impact == Level::High
    }
}
