//! Side-by-side comparison of two assessments' dimension scores.

use super::aggregate::dimension_score;
use crate::model::{Dimension, Score};
use serde::{Deserialize, Serialize};

/// Score movement of one dimension between a baseline and a later assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionDelta {
    pub dimension: Dimension,
    pub baseline: Option<f64>,
    pub current: Option<f64>,
    /// `current - baseline`, present when both sides are scored
    pub difference: Option<f64>,
    /// Difference relative to the baseline in percent; 0 for a zero baseline
    pub percentage_change: Option<f64>,
}

/// Compare two score sets dimension by dimension.
///
/// Every dimension scored on either side appears, in canonical order.
#[must_use]
pub fn compare_scores(baseline: &[Score], current: &[Score]) -> Vec<DimensionDelta> {
    Dimension::ALL
        .into_iter()
        .filter_map(|dimension| {
            let before = dimension_score(baseline, dimension);
            let after = dimension_score(current, dimension);
            if before.is_none() && after.is_none() {
                return None;
            }
            let difference = before.zip(after).map(|(b, a)| a - b);
            let percentage_change = before.zip(difference).map(|(b, d)| {
                if b > 0.0 {
                    d / b * 100.0
                } else {
                    0.0
                }
            });
            Some(DimensionDelta {
                dimension,
                baseline: before,
                current: after,
                difference,
                percentage_change,
            })
        })
        .collect()
}
