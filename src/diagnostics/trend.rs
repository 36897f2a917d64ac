//! Maturity trend projection and organization history.

use crate::model::{AssessmentId, Dimension, HistoricalAssessment, Score};
use crate::scoring::overall_maturity;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

/// Assessment cycles covered by the six-month projection.
pub const PROJECTION_CYCLES: f64 = 3.0;

const MIN_TREND_POINTS: usize = 2;
const BASE_CONFIDENCE: f64 = 0.5;
const CONFIDENCE_PER_POINT: f64 = 0.05;
const MAX_CONFIDENCE: f64 = 0.85;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Improving,
    Declining,
    Stable,
}

impl TrendDirection {
    #[must_use]
    pub fn from_velocity(velocity: f64) -> Self {
        if velocity > 0.0 {
            Self::Improving
        } else if velocity < 0.0 {
            Self::Declining
        } else {
            Self::Stable
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Improving => "improving",
            Self::Declining => "declining",
            Self::Stable => "stable",
        }
    }
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Six-month projection of overall maturity. Values are rounded to two
/// decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaturityProjection {
    pub current: f64,
    pub projected_6mo: f64,
    pub trend: TrendDirection,
    /// Change in overall maturity between the last two historical points
    pub velocity: f64,
    pub confidence: f64,
    pub data_points: usize,
}

/// Project overall maturity six months ahead.
///
/// `history` is the organization's completed assessments in chronological
/// order; unscored entries are ignored. Returns `None` when fewer than two
/// scored points exist.
#[must_use]
pub fn project_maturity(
    current: &[Score],
    history: &[HistoricalAssessment],
) -> Option<MaturityProjection> {
    let overall: Vec<f64> = history
        .iter()
        .filter_map(HistoricalAssessment::overall_maturity)
        .collect();
    if overall.len() < MIN_TREND_POINTS || current.is_empty() {
        return None;
    }

    let velocity = overall[overall.len() - 1] - overall[overall.len() - 2];
    let current_overall = overall_maturity(current);
    let projected = crate::model::clamp_maturity(current_overall + velocity * PROJECTION_CYCLES);
    let confidence =
        (BASE_CONFIDENCE + overall.len() as f64 * CONFIDENCE_PER_POINT).min(MAX_CONFIDENCE);

    Some(MaturityProjection {
        current: round2(current_overall),
        projected_6mo: round2(projected),
        trend: TrendDirection::from_velocity(velocity),
        velocity: round2(velocity),
        confidence,
        data_points: overall.len(),
    })
}

/// One completed assessment on an organization's maturity timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub assessment_id: AssessmentId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub overall_maturity: f64,
    pub dimension_scores: IndexMap<Dimension, f64>,
}

/// Chronological maturity timeline; unscored assessments are skipped.
#[must_use]
pub fn organization_trend(history: &[HistoricalAssessment]) -> Vec<TrendPoint> {
    history
        .iter()
        .filter_map(|h| {
            let overall = h.overall_maturity()?;
            Some(TrendPoint {
                assessment_id: h.assessment_id,
                name: h.name.clone(),
                created_at: h.created_at,
                overall_maturity: round2(overall),
                dimension_scores: h
                    .scores
                    .iter()
                    .map(|s| (s.dimension, round2(s.maturity_score)))
                    .collect(),
            })
        })
        .collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
