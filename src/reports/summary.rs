//! Summary report generator for shell output.
//!
//! Provides a compact, human-readable summary for terminal usage.

use super::{AssessmentReport, ReportError, ReportFormat, ReportGenerator};
use crate::model::Severity;
use crate::scoring::RiskLevel;
use std::fmt::Write as _;

/// Recommendations listed before the rest are elided.
const MAX_LISTED_RECOMMENDATIONS: usize = 5;

/// Apply ANSI color formatting if colored output is enabled.
fn ansi_color(text: &str, color: &str, colored: bool) -> String {
    if colored {
        match color {
            "red" => format!("\x1b[31m{text}\x1b[0m"),
            "green" => format!("\x1b[32m{text}\x1b[0m"),
            "yellow" => format!("\x1b[33m{text}\x1b[0m"),
            "cyan" => format!("\x1b[36m{text}\x1b[0m"),
            "bold" => format!("\x1b[1m{text}\x1b[0m"),
            "dim" => format!("\x1b[2m{text}\x1b[0m"),
            _ => text.to_string(),
        }
    } else {
        text.to_string()
    }
}

/// Summary reporter for shell output
pub struct SummaryReporter {
    /// Use colored output
    colored: bool,
}

impl SummaryReporter {
    /// Create a new summary reporter
    #[must_use]
    pub const fn new() -> Self {
        Self { colored: true }
    }

    /// Disable colored output
    #[must_use]
    pub const fn no_color(mut self) -> Self {
        self.colored = false;
        self
    }

    fn color(&self, text: &str, color: &str) -> String {
        ansi_color(text, color, self.colored)
    }

    fn risk_color(risk: RiskLevel) -> &'static str {
        match risk {
            RiskLevel::Critical | RiskLevel::High => "red",
            RiskLevel::Medium => "yellow",
            RiskLevel::Low => "green",
        }
    }

    fn severity_color(severity: Severity) -> &'static str {
        match severity {
            Severity::Critical | Severity::High => "red",
            Severity::Medium => "yellow",
            Severity::Low => "dim",
        }
    }

    /// Five-cell bar for a 0-5 score.
    fn bar(score: f64) -> String {
        let filled = (score.round().clamp(0.0, 5.0)) as usize;
        format!("{}{}", "█".repeat(filled), "░".repeat(5 - filled))
    }
}

impl Default for SummaryReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for SummaryReporter {
    fn generate(&self, report: &AssessmentReport) -> Result<String, ReportError> {
        let summary = &report.summary;
        let mut out = String::new();

        writeln!(out, "{}", self.color("Maturity Assessment Summary", "bold"))?;
        writeln!(out, "{}", self.color("─".repeat(40).as_str(), "dim"))?;
        writeln!(
            out,
            "{}  {} (#{}, {})",
            self.color("Assessment:", "cyan"),
            summary.assessment.name,
            summary.assessment.id,
            summary.assessment.status
        )?;
        writeln!(
            out,
            "{}  {:.2}/5.0  risk {}",
            self.color("Overall:", "cyan"),
            summary.overall_maturity,
            self.color(
                summary.risk_level.as_str(),
                Self::risk_color(summary.risk_level)
            )
        )?;

        writeln!(out)?;
        writeln!(out, "{}", self.color("Dimensions:", "bold"))?;
        if summary.scores.is_empty() {
            writeln!(out, "  {}", self.color("not scored yet", "dim"))?;
        }
        for score in &summary.scores {
            writeln!(
                out,
                "  {:<26} {} {:.2}  ({:.0}%)",
                score.dimension.title(),
                Self::bar(score.maturity_score),
                score.maturity_score,
                score.percentage
            )?;
        }

        if !summary.findings.is_empty() {
            writeln!(out)?;
            writeln!(out, "{}", self.color("Findings:", "bold"))?;
            for finding in &summary.findings {
                writeln!(
                    out,
                    "  [{}] {}",
                    self.color(
                        finding.severity.as_str(),
                        Self::severity_color(finding.severity)
                    ),
                    finding.title
                )?;
            }
        }

        if !summary.recommendations.is_empty() {
            writeln!(out)?;
            writeln!(out, "{}", self.color("Top recommendations:", "bold"))?;
            for rec in summary.recommendations.iter().take(MAX_LISTED_RECOMMENDATIONS) {
                let marker = if rec.is_quick_win() {
                    self.color(" quick win", "green")
                } else {
                    String::new()
                };
                writeln!(
                    out,
                    "  {:>4}  {} ({}, {}){marker}",
                    rec.priority, rec.title, rec.dimension, rec.timeline
                )?;
            }
            let hidden = summary
                .recommendations
                .len()
                .saturating_sub(MAX_LISTED_RECOMMENDATIONS);
            if hidden > 0 {
                writeln!(out, "  {}", self.color(&format!("... and {hidden} more"), "dim"))?;
            }
        }

        if let Some(anomalies) = &report.anomalies {
            writeln!(out)?;
            writeln!(out, "{}", self.color("Anomalies:", "bold"))?;
            if anomalies.is_empty() {
                writeln!(out, "  {}", self.color("none detected", "green"))?;
            }
            for anomaly in anomalies {
                writeln!(
                    out,
                    "  [{}] {}",
                    self.color(
                        anomaly.severity.as_str(),
                        Self::severity_color(anomaly.severity)
                    ),
                    anomaly.message
                )?;
            }
        }

        if let Some(projection) = &report.projection {
            writeln!(out)?;
            writeln!(
                out,
                "{}  {:.2} → {:.2} in 6 months ({}, confidence {:.0}%)",
                self.color("Projection:", "cyan"),
                projection.current,
                projection.projected_6mo,
                projection.trend,
                projection.confidence * 100.0
            )?;
        }

        Ok(out)
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Assessment, AssessmentStatus, Dimension, Finding, Level, Recommendation,
        RecommendationStatus, Score, Timeline,
    };
    use crate::scoring::AssessmentSummary;
    use chrono::Utc;

    fn summary() -> AssessmentSummary {
        let assessment = Assessment {
            id: 1,
            organization_id: 1,
            name: "Baseline".to_string(),
            status: AssessmentStatus::Completed,
            version: 1,
            created_at: Utc::now(),
            completed_at: None,
            notes: None,
            tags: Vec::new(),
            custom_fields: serde_json::Map::new(),
        };
        let scores = vec![Score {
            dimension: Dimension::Performance,
            maturity_score: 3.2,
            weighted_score: 3.2,
            max_possible_score: 10.0,
            percentage: 64.0,
        }];
        let findings = vec![Finding {
            dimension: Dimension::Performance,
            severity: Severity::High,
            title: "Low Score on: Do you load test?...".to_string(),
            description: String::new(),
            question_id: Some("perf-02".to_string()),
        }];
        let recommendations = (0..7)
            .map(|i| Recommendation {
                id: Some(i),
                dimension: Dimension::Performance,
                title: format!("Rec {i}"),
                description: String::new(),
                effort: Level::Low,
                impact: Level::High,
                kpi: None,
                timeline: Timeline::Days30,
                priority: i,
                status: RecommendationStatus::Pending,
            })
            .collect();
        AssessmentSummary::new(assessment, scores, findings, recommendations)
    }

    #[test]
    fn test_plain_summary() {
        let text = SummaryReporter::new()
            .no_color()
            .generate(&AssessmentReport::new(summary()))
            .unwrap();
        assert!(text.contains("Baseline (#1, completed)"));
        assert!(text.contains("3.20/5.0  risk medium"));
        assert!(text.contains("Performance"));
        assert!(text.contains("[high] Low Score on"));
        assert!(text.contains("... and 2 more"));
        assert!(!text.contains("\x1b["));
        assert!(!text.contains("Anomalies:"));
    }

    #[test]
    fn test_empty_anomaly_section() {
        let report = AssessmentReport::new(summary()).with_anomalies(Vec::new());
        let text = SummaryReporter::new().no_color().generate(&report).unwrap();
        assert!(text.contains("none detected"));
    }

    #[test]
    fn test_bar() {
        assert_eq!(SummaryReporter::bar(0.0), "░░░░░");
        assert_eq!(SummaryReporter::bar(3.6), "████░");
    }
}
