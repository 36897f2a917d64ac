//! Report type definitions.

use crate::diagnostics::{Anomaly, MaturityProjection};
use crate::scoring::{AssessmentInsights, AssessmentSummary};
use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Output format for reports
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Human-readable summary
    #[default]
    Auto,
    /// Structured JSON output
    Json,
    /// Brief summary output
    Summary,
}

impl ReportFormat {
    /// Resolve `Auto` to a concrete format.
    #[must_use]
    pub const fn resolve(self) -> Self {
        match self {
            Self::Auto => Self::Summary,
            other => other,
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Json => write!(f, "json"),
            Self::Summary => write!(f, "summary"),
        }
    }
}

/// Everything a report renders for one assessment.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentReport {
    #[serde(flatten)]
    pub summary: AssessmentSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insights: Option<AssessmentInsights>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anomalies: Option<Vec<Anomaly>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection: Option<MaturityProjection>,
}

impl AssessmentReport {
    #[must_use]
    pub const fn new(summary: AssessmentSummary) -> Self {
        Self {
            summary,
            insights: None,
            anomalies: None,
            projection: None,
        }
    }

    #[must_use]
    pub fn with_insights(mut self, insights: AssessmentInsights) -> Self {
        self.insights = Some(insights);
        self
    }

    #[must_use]
    pub fn with_anomalies(mut self, anomalies: Vec<Anomaly>) -> Self {
        self.anomalies = Some(anomalies);
        self
    }

    #[must_use]
    pub fn with_projection(mut self, projection: Option<MaturityProjection>) -> Self {
        self.projection = projection;
        self
    }
}
