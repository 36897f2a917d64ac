use crate::error::AssessError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type OrganizationId = i64;
pub type AssessmentId = i64;

/// An organization whose maturity is assessed over time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Lifecycle state of an assessment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    #[default]
    Draft,
    InProgress,
    Completed,
}

impl AssessmentStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for AssessmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssessmentStatus {
    type Err = AssessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "draft" => Ok(Self::Draft),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            other => Err(AssessError::validation(format!(
                "unknown assessment status '{other}'"
            ))),
        }
    }
}

/// One run of the questionnaire for an organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub id: AssessmentId,
    pub organization_id: OrganizationId,
    pub name: String,
    pub status: AssessmentStatus,
    pub version: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Free-form notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Arbitrary JSON attributes attached by the user
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub custom_fields: serde_json::Map<String, serde_json::Value>,
}

impl Assessment {
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == AssessmentStatus::Completed
    }
}

/// Dimension scores of one completed assessment, used as trend history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalAssessment {
    pub assessment_id: AssessmentId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub scores: Vec<super::Score>,
}

impl HistoricalAssessment {
    /// Unweighted mean of the dimension maturity scores, `None` if unscored.
    #[must_use]
    pub fn overall_maturity(&self) -> Option<f64> {
        if self.scores.is_empty() {
            return None;
        }
        let total: f64 = self.scores.iter().map(|s| s.maturity_score).sum();
        Some(total / self.scores.len() as f64)
    }
}

/// In-app notification addressed to an organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub organization_id: OrganizationId,
    /// Event kind, e.g. `assessment_completed`
    pub kind: String,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}
