//! JSON report generator.

use super::{AssessmentReport, ReportError, ReportFormat, ReportGenerator};
use chrono::Utc;
use serde::Serialize;

/// JSON report generator
pub struct JsonReporter {
    /// Pretty print output
    pretty: bool,
}

impl JsonReporter {
    /// Create a new JSON reporter
    #[must_use]
    pub const fn new() -> Self {
        Self { pretty: true }
    }

    /// Set pretty printing
    #[must_use]
    pub const fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct ReportMetadata {
    tool: &'static str,
    version: &'static str,
    generated_at: String,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    metadata: ReportMetadata,
    #[serde(flatten)]
    report: &'a AssessmentReport,
}

impl ReportGenerator for JsonReporter {
    fn generate(&self, report: &AssessmentReport) -> Result<String, ReportError> {
        let document = JsonReport {
            metadata: ReportMetadata {
                tool: env!("CARGO_PKG_NAME"),
                version: env!("CARGO_PKG_VERSION"),
                generated_at: Utc::now().to_rfc3339(),
            },
            report,
        };
        let rendered = if self.pretty {
            serde_json::to_string_pretty(&document)
        } else {
            serde_json::to_string(&document)
        };
        rendered.map_err(|e| ReportError::SerializationError(e.to_string()))
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Json
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Assessment, AssessmentStatus, Dimension, Score};
    use crate::scoring::AssessmentSummary;

    fn report() -> AssessmentReport {
        let assessment = Assessment {
            id: 3,
            organization_id: 1,
            name: "Q3 review".to_string(),
            status: AssessmentStatus::Completed,
            version: 1,
            created_at: Utc::now(),
            completed_at: Some(Utc::now()),
            notes: None,
            tags: vec!["payments".to_string()],
            custom_fields: serde_json::Map::new(),
        };
        let scores = vec![Score {
            dimension: Dimension::FailureResilience,
            maturity_score: 1.5,
            weighted_score: 1.5,
            max_possible_score: 5.0,
            percentage: 30.0,
        }];
        AssessmentReport::new(AssessmentSummary::new(assessment, scores, vec![], vec![]))
    }

    #[test]
    fn test_json_report_shape() {
        let json = JsonReporter::new().generate(&report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["metadata"]["tool"], "maturity-tools");
        assert_eq!(value["assessment"]["status"], "completed");
        assert_eq!(value["assessment"]["tags"][0], "payments");
        assert!(value["assessment"].get("notes").is_none());
        assert_eq!(value["risk_level"], "critical");
        assert_eq!(value["scores"][0]["dimension"], "failure_resilience");
        assert!(value.get("anomalies").is_none());
    }

    #[test]
    fn test_compact_output_is_single_line() {
        let json = JsonReporter::new().pretty(false).generate(&report()).unwrap();
        assert!(!json.contains('\n'));
    }
}
