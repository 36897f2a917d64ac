//! Assessment-level rollups: overall maturity, risk level and insights.

use crate::model::{
    Assessment, Dimension, Finding, Recommendation, RecommendationStatus, Score, Severity,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Unweighted mean of the dimension maturity scores; 0 when nothing is scored.
#[must_use]
pub fn overall_maturity(scores: &[Score]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().map(|s| s.maturity_score).sum::<f64>() / scores.len() as f64
}

/// Coarse risk classification of an overall maturity value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Critical,
    High,
    Medium,
    Low,
}

impl RiskLevel {
    #[must_use]
    pub fn from_maturity(overall: f64) -> Self {
        if overall < 2.0 {
            Self::Critical
        } else if overall < 3.0 {
            Self::High
        } else if overall < 4.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }

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

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored results of one assessment with its headline figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentSummary {
    pub assessment: Assessment,
    pub overall_maturity: f64,
    pub risk_level: RiskLevel,
    pub scores: Vec<Score>,
    pub findings: Vec<Finding>,
    pub recommendations: Vec<Recommendation>,
}

impl AssessmentSummary {
    #[must_use]
    pub fn new(
        assessment: Assessment,
        scores: Vec<Score>,
        findings: Vec<Finding>,
        recommendations: Vec<Recommendation>,
    ) -> Self {
        let overall = overall_maturity(&scores);
        Self {
            assessment,
            overall_maturity: overall,
            risk_level: RiskLevel::from_maturity(overall),
            scores,
            findings,
            recommendations,
        }
    }
}

/// A dimension together with its maturity score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionHighlight {
    pub dimension: Dimension,
    pub score: f64,
}

/// Headline figures of a scored assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentInsights {
    pub total_findings: usize,
    pub critical_findings: usize,
    pub total_recommendations: usize,
    /// Recommendations the prioritizer pushed below zero
    pub urgent_recommendations: usize,
    /// Titles of low-effort, high-impact recommendations
    pub quick_wins: Vec<String>,
    pub strongest_dimension: Option<DimensionHighlight>,
    pub weakest_dimension: Option<DimensionHighlight>,
    /// Recommendation count per status, every status present
    pub status_breakdown: IndexMap<String, usize>,
}

/// Summarize findings and recommendations of an assessment.
#[must_use]
pub fn build_insights(
    scores: &[Score],
    findings: &[Finding],
    recommendations: &[Recommendation],
) -> AssessmentInsights {
    let mut status_breakdown: IndexMap<String, usize> = RecommendationStatus::ALL
        .iter()
        .map(|s| (s.as_str().to_string(), 0))
        .collect();
    for rec in recommendations {
        *status_breakdown
            .entry(rec.status.as_str().to_string())
            .or_default() += 1;
    }

    AssessmentInsights {
        total_findings: findings.len(),
        critical_findings: findings
            .iter()
            .filter(|f| f.severity == Severity::Critical)
            .count(),
        total_recommendations: recommendations.len(),
        urgent_recommendations: recommendations.iter().filter(|r| r.priority < 0).count(),
        quick_wins: recommendations
            .iter()
            .filter(|r| r.is_quick_win())
            .map(|r| r.title.clone())
            .collect(),
        strongest_dimension: extreme(scores, |candidate, best| candidate > best),
        weakest_dimension: extreme(scores, |candidate, best| candidate < best),
        status_breakdown,
    }
}

/// First score that beats every other under `better`; ties keep the earlier one.
fn extreme(scores: &[Score], better: impl Fn(f64, f64) -> bool) -> Option<DimensionHighlight> {
    scores.iter().fold(None, |best: Option<DimensionHighlight>, s| match best {
        Some(b) if !better(s.maturity_score, b.score) => Some(b),
        _ => Some(DimensionHighlight {
            dimension: s.dimension,
            score: s.maturity_score,
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Level, Timeline};

    fn score(dimension: Dimension, maturity: f64) -> Score {
        Score {
            dimension,
            maturity_score: maturity,
            weighted_score: maturity,
            max_possible_score: 10.0,
            percentage: maturity * 20.0,
        }
    }

    fn rec(title: &str, effort: Level, impact: Level, priority: i64) -> Recommendation {
        Recommendation {
            id: None,
            dimension: Dimension::Performance,
            title: title.to_string(),
            description: String::new(),
            effort,
            impact,
            kpi: None,
            timeline: Timeline::Days30,
            priority,
            status: RecommendationStatus::Pending,
        }
    }

    #[test]
    fn test_overall_maturity_mean() {
        assert_eq!(overall_maturity(&[]), 0.0);
        let scores = [score(Dimension::Performance, 2.0), score(Dimension::FailureResilience, 4.0)];
        assert_eq!(overall_maturity(&scores), 3.0);
    }

    #[test]
    fn test_risk_level_bands() {
        assert_eq!(RiskLevel::from_maturity(1.99), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_maturity(2.0), RiskLevel::High);
        assert_eq!(RiskLevel::from_maturity(3.5), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_maturity(4.0), RiskLevel::Low);
    }

    #[test]
    fn test_insights_counts() {
        let scores = [
            score(Dimension::Performance, 1.5),
            score(Dimension::ProductionReadiness, 4.5),
            score(Dimension::FailureResilience, 1.5),
        ];
        let recs = [
            rec("Runbooks", Level::Low, Level::High, -12),
            rec("HA", Level::High, Level::High, 3),
        ];
        let insights = build_insights(&scores, &[], &recs);

        assert_eq!(insights.total_recommendations, 2);
        assert_eq!(insights.urgent_recommendations, 1);
        assert_eq!(insights.quick_wins, vec!["Runbooks".to_string()]);
        assert_eq!(
            insights.strongest_dimension.unwrap().dimension,
            Dimension::ProductionReadiness
        );
        // Tie on 1.5: the first dimension wins.
        assert_eq!(insights.weakest_dimension.unwrap().dimension, Dimension::Performance);
        assert_eq!(insights.status_breakdown["pending"], 2);
        assert_eq!(insights.status_breakdown["skipped"], 0);
    }
}
