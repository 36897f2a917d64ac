//! Organization-level rollups: aggregate metrics over every completed
//! assessment, and a benchmark of the latest one against a fixed baseline.

use super::summary::overall_maturity;
use crate::model::{
    Assessment, AssessmentId, Dimension, OrganizationId, Recommendation, RecommendationStatus,
    Score,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// A completed assessment with its stored results.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedAssessment {
    pub assessment: Assessment,
    pub scores: Vec<Score>,
    pub recommendations: Vec<Recommendation>,
}

/// Aggregates over an organization's completed assessments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrganizationMetrics {
    pub organization_id: OrganizationId,
    /// Assessments in any state
    pub total_assessments: usize,
    pub completed_assessments: usize,
    /// Mean overall maturity of the scored completed assessments; 0 if none
    pub average_maturity: f64,
    pub total_recommendations: usize,
    pub completed_recommendations: usize,
    /// Completed recommendations in percent; 0 without recommendations
    pub recommendation_completion_rate: f64,
    pub dimension_averages: BTreeMap<Dimension, f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_assessment_date: Option<DateTime<Utc>>,
}

#[must_use]
pub fn organization_metrics(
    organization_id: OrganizationId,
    total_assessments: usize,
    completed: &[CompletedAssessment],
) -> OrganizationMetrics {
    let overall: Vec<f64> = completed
        .iter()
        .filter(|c| !c.scores.is_empty())
        .map(|c| overall_maturity(&c.scores))
        .collect();
    let average_maturity = if overall.is_empty() {
        0.0
    } else {
        overall.iter().sum::<f64>() / overall.len() as f64
    };

    let mut totals: BTreeMap<Dimension, (f64, usize)> = BTreeMap::new();
    for score in completed.iter().flat_map(|c| &c.scores) {
        let entry = totals.entry(score.dimension).or_insert((0.0, 0));
        entry.0 += score.maturity_score;
        entry.1 += 1;
    }
    let dimension_averages = totals
        .into_iter()
        .map(|(dimension, (sum, n))| (dimension, sum / n as f64))
        .collect();

    let recommendations = completed.iter().flat_map(|c| &c.recommendations);
    let total_recommendations = recommendations.clone().count();
    let completed_recommendations = recommendations
        .filter(|r| r.status == RecommendationStatus::Completed)
        .count();
    let recommendation_completion_rate = if total_recommendations > 0 {
        completed_recommendations as f64 / total_recommendations as f64 * 100.0
    } else {
        0.0
    };

    OrganizationMetrics {
        organization_id,
        total_assessments,
        completed_assessments: completed.len(),
        average_maturity,
        total_recommendations,
        completed_recommendations,
        recommendation_completion_rate,
        dimension_averages,
        latest_assessment_date: completed
            .iter()
            .filter_map(|c| c.assessment.completed_at)
            .max(),
    }
}

/// One dimension of the latest assessment against the baseline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionBenchmark {
    pub dimension: Dimension,
    pub score: f64,
    pub industry_average: f64,
    /// `score - industry_average`
    pub gap: f64,
}

/// The latest completed assessment of an organization against a baseline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrganizationBenchmark {
    pub organization_id: OrganizationId,
    pub assessment_id: AssessmentId,
    pub assessment_name: String,
    pub overall_maturity: f64,
    pub industry_average: f64,
    pub vs_industry: f64,
    pub dimensions: Vec<DimensionBenchmark>,
}

/// Benchmark the most recently completed, scored assessment.
///
/// `None` when there is no completed assessment or the latest one has no
/// scores.
#[must_use]
pub fn benchmark(
    organization_id: OrganizationId,
    completed: &[CompletedAssessment],
    baseline: f64,
) -> Option<OrganizationBenchmark> {
    let latest = completed
        .iter()
        .max_by_key(|c| (c.assessment.completed_at, c.assessment.id))?;
    if latest.scores.is_empty() {
        return None;
    }

    let overall = overall_maturity(&latest.scores);
    let mut dimensions: Vec<DimensionBenchmark> = latest
        .scores
        .iter()
        .map(|s| DimensionBenchmark {
            dimension: s.dimension,
            score: s.maturity_score,
            industry_average: baseline,
            gap: s.maturity_score - baseline,
        })
        .collect();
    dimensions.sort_by_key(|d| d.dimension);

    Some(OrganizationBenchmark {
        organization_id,
        assessment_id: latest.assessment.id,
        assessment_name: latest.assessment.name.clone(),
        overall_maturity: overall,
        industry_average: baseline,
        vs_industry: overall - baseline,
        dimensions,
    })
}
