//! Forward-looking capacity, cost and workload insights.

use super::trend::{project_maturity, MaturityProjection};
use crate::model::{Answer, Dimension, HistoricalAssessment, Level, Score};
use crate::scoring::dimension_score;
use serde::Serialize;

/// Answer keywords that indicate distributed data-processing workloads.
pub const DISTRIBUTED_KEYWORDS: [&str; 7] = [
    "spark",
    "emr",
    "eks",
    "kubernetes",
    "distributed",
    "cluster",
    "executor",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    CapacityRisk,
    WorkloadModeling,
    CostOptimization,
    WorkloadOptimization,
    AnomalyDetection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub title: String,
    pub message: String,
    pub recommendation: String,
    pub priority: Level,
    pub applicable_dimensions: Vec<Dimension>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_savings_potential: Option<String>,
}

/// Projection plus capacity and cost outlook of one assessment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictiveInsights {
    pub maturity_projection: Option<MaturityProjection>,
    pub capacity_insights: Vec<Insight>,
    pub cost_insights: Vec<Insight>,
}

/// Build predictive insights. `history` is chronological, as for
/// [`project_maturity`].
#[must_use]
pub fn predictive_insights(current: &[Score], history: &[HistoricalAssessment]) -> PredictiveInsights {
    PredictiveInsights {
        maturity_projection: project_maturity(current, history),
        capacity_insights: capacity_insights(current),
        cost_insights: cost_insights(current),
    }
}

/// Capacity risks from weak infrastructure efficiency or performance.
#[must_use]
pub fn capacity_insights(scores: &[Score]) -> Vec<Insight> {
    let mut insights = Vec::new();

    if dimension_score(scores, Dimension::InfrastructureEfficiency).is_some_and(|s| s < 3.0) {
        insights.push(Insight {
            kind: InsightKind::CapacityRisk,
            title: "Capacity Planning Risk".to_string(),
            message: "Low infrastructure efficiency maturity indicates potential capacity planning challenges. Predictive capacity modeling recommended.".to_string(),
            recommendation: "Implement capacity forecasting to optimize resource allocation and reduce costs.".to_string(),
            priority: Level::High,
            applicable_dimensions: vec![Dimension::InfrastructureEfficiency],
            estimated_savings_potential: None,
        });
    }

    if dimension_score(scores, Dimension::Performance).is_some_and(|s| s < 2.5) {
        insights.push(Insight {
            kind: InsightKind::WorkloadModeling,
            title: "Workload Behavior Modeling".to_string(),
            message: "Performance dimension requires workload behavior modeling to identify optimization opportunities.".to_string(),
            recommendation: "Deploy anomaly detection and workload clustering to understand performance patterns.".to_string(),
            priority: Level::Medium,
            applicable_dimensions: vec![Dimension::Performance],
            estimated_savings_potential: None,
        });
    }

    insights
}

/// Cost optimization outlook from infrastructure efficiency gaps.
#[must_use]
pub fn cost_insights(scores: &[Score]) -> Vec<Insight> {
    if !dimension_score(scores, Dimension::InfrastructureEfficiency).is_some_and(|s| s < 3.0) {
        return Vec::new();
    }
    vec![Insight {
        kind: InsightKind::CostOptimization,
        title: "Cost Optimization Opportunity".to_string(),
        message: "Infrastructure efficiency gaps suggest significant cost optimization opportunities.".to_string(),
        recommendation: "Implement cost modeling and tier multiplier simulations to identify savings.".to_string(),
        priority: Level::High,
        applicable_dimensions: vec![Dimension::InfrastructureEfficiency],
        estimated_savings_potential: Some("15-30%".to_string()),
    }]
}

/// Workload insights from answer content and performance maturity.
#[must_use]
pub fn workload_insights(scores: &[Score], answers: &[Answer]) -> Vec<Insight> {
    let mut insights = Vec::new();

    let distributed = answers.iter().any(|a| {
        let text = a.answer_value.to_lowercase();
        DISTRIBUTED_KEYWORDS.iter().any(|k| text.contains(k))
    });
    if distributed {
        insights.push(Insight {
            kind: InsightKind::WorkloadOptimization,
            title: "Distributed Workload Optimization Opportunity".to_string(),
            message: "Your assessment indicates distributed systems usage (Spark, EMR, EKS). Workload clustering and executor skew detection can significantly improve efficiency.".to_string(),
            recommendation: "Implement workload behavior modeling to identify optimization patterns and reduce resource waste.".to_string(),
            priority: Level::High,
            applicable_dimensions: vec![Dimension::Performance, Dimension::InfrastructureEfficiency],
            estimated_savings_potential: None,
        });
    }

    if dimension_score(scores, Dimension::Performance).is_some_and(|s| s < 3.0) {
        insights.push(Insight {
            kind: InsightKind::AnomalyDetection,
            title: "Automated Anomaly Detection Recommended".to_string(),
            message: "Low performance maturity suggests benefit from automated anomaly detection and regression detection systems.".to_string(),
            recommendation: "Deploy automated performance diagnostics to proactively identify issues before they impact users.".to_string(),
            priority: Level::Medium,
            applicable_dimensions: vec![Dimension::Performance],
            estimated_savings_potential: None,
        });
    }

    insights
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(dimension: Dimension, maturity: f64) -> Score {
        Score {
            dimension,
            maturity_score: maturity,
            weighted_score: maturity,
            max_possible_score: 5.0,
            percentage: maturity * 20.0,
        }
    }

    fn answer(value: &str) -> Answer {
        Answer {
            question_id: "q".to_string(),
            answer_value: value.to_string(),
            maturity_score: None,
        }
    }

    #[test]
    fn test_capacity_and_cost_from_weak_infrastructure() {
        let scores = [
            score(Dimension::InfrastructureEfficiency, 2.9),
            score(Dimension::Performance, 2.4),
        ];
        let insights = predictive_insights(&scores, &[]);
        assert!(insights.maturity_projection.is_none());
        assert_eq!(insights.capacity_insights.len(), 2);
        assert_eq!(insights.capacity_insights[0].kind, InsightKind::CapacityRisk);
        assert_eq!(insights.cost_insights.len(), 1);
        assert_eq!(
            insights.cost_insights[0].estimated_savings_potential.as_deref(),
            Some("15-30%")
        );
    }

    #[test]
    fn test_no_insights_for_mature_scores() {
        let scores = [
            score(Dimension::InfrastructureEfficiency, 3.0),
            score(Dimension::Performance, 3.0),
        ];
        assert!(capacity_insights(&scores).is_empty());
        assert!(cost_insights(&scores).is_empty());
        assert!(workload_insights(&scores, &[answer("We use Lambda")]).is_empty());
    }

    #[test]
    fn test_workload_keywords_case_insensitive() {
        let insights = workload_insights(&[], &[answer("Batch jobs on Amazon EMR with Spark")]);
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].kind, InsightKind::WorkloadOptimization);
    }
}
