//! Answer scoring and dimension aggregation.
//!
//! The scoring pipeline for one assessment:
//!
//! 1. [`score_answer`] turns each raw answer into a 0-5 maturity value.
//! 2. [`aggregate_scores`] combines the answers of each dimension into a
//!    weighted [`Score`](crate::model::Score), capping dimensions that fail a
//!    critical question.
//! 3. [`generate_findings`] derives findings from the dimension scores and
//!    from individual low answers.
//!
//! [`summary`] and [`compare`] provide assessment-level rollups on top;
//! [`organization`] rolls completed assessments up per organization.

mod aggregate;
pub mod compare;
mod findings;
mod maturity;
pub mod organization;
pub mod summary;

pub use aggregate::{
    aggregate_scores, dimension_score, CRITICAL_BLOCKER_THRESHOLD, CRITICAL_PERCENTAGE_CAP,
    CRITICAL_SCORE_CAP,
};
pub use compare::{compare_scores, DimensionDelta};
pub use findings::{
    generate_findings, CRITICAL_GAP_THRESHOLD, LOW_ANSWER_THRESHOLD, SIGNIFICANT_GAP_THRESHOLD,
};
pub use maturity::{score_answer, NUMERIC_FULL_SCALE, UNMATCHED_SELECTION_SCORE};
pub use organization::{
    benchmark, organization_metrics, CompletedAssessment, DimensionBenchmark,
    OrganizationBenchmark, OrganizationMetrics,
};
pub use summary::{
    build_insights, overall_maturity, AssessmentInsights, AssessmentSummary, DimensionHighlight,
    RiskLevel,
};
