//! Adaptive re-ranking of generated recommendations.
//!
//! A deterministic impact/effort heuristic: recommendations in weak
//! dimensions, and those that buy more impact per unit of effort, move to
//! the front.

use crate::model::{Recommendation, Score};
use crate::scoring::dimension_score;

/// Below this dimension score the base priority drops by
/// [`CRITICAL_DIMENSION_BOOST`].
pub const CRITICAL_DIMENSION_THRESHOLD: f64 = 2.0;

/// Below this dimension score (and at or above the critical threshold) the
/// base priority drops by [`WEAK_DIMENSION_BOOST`].
pub const WEAK_DIMENSION_THRESHOLD: f64 = 2.5;

pub const CRITICAL_DIMENSION_BOOST: i64 = 10;
pub const WEAK_DIMENSION_BOOST: i64 = 5;

/// Dimension score at which the impact/effort gain vanishes.
pub const GAIN_PIVOT: f64 = 3.0;

/// Multiplier applied to the impact/effort gain.
pub const GAIN_FACTOR: f64 = 5.0;

/// Compute the adjusted priority of one recommendation.
///
/// `dimension_score` is the maturity of the recommendation's dimension.
/// Lower results are more urgent and may be negative.
#[must_use]
pub fn adaptive_priority(recommendation: &Recommendation, dimension_score: f64) -> i64 {
    let mut base = recommendation.priority;
    if dimension_score < CRITICAL_DIMENSION_THRESHOLD {
        base -= CRITICAL_DIMENSION_BOOST;
    } else if dimension_score < WEAK_DIMENSION_THRESHOLD {
        base -= WEAK_DIMENSION_BOOST;
    }

    let ratio = recommendation.impact.impact_weight() / recommendation.effort.effort_weight();
    let gain = ratio * (GAIN_PIVOT - dimension_score);

    (base as f64 - gain * GAIN_FACTOR).floor() as i64
}

/// Reassign priorities and sort ascending.
///
/// The sort is stable, so equal priorities keep their template order. A
/// recommendation whose dimension has no score is treated as scoring 0.
#[must_use]
pub fn prioritize(mut recommendations: Vec<Recommendation>, scores: &[Score]) -> Vec<Recommendation> {
    for rec in &mut recommendations {
        let score = dimension_score(scores, rec.dimension).unwrap_or(0.0);
        rec.priority = adaptive_priority(rec, score);
    }
    recommendations.sort_by_key(|r| r.priority);
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Dimension, Level, RecommendationStatus, Timeline};

    fn rec(title: &str, priority: i64, effort: Level, impact: Level) -> Recommendation {
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
    fn test_critical_dimension_formula() {
        // P = 0 - 10; gain = (3/3) * (3.0 - 1.5) = 1.5; floor(-10 - 7.5) = -18
        let r = rec("a", 0, Level::Low, Level::High);
        assert_eq!(adaptive_priority(&r, 1.5), -18);
    }

    #[test]
    fn test_weak_dimension_formula() {
        // P = 1 - 5; gain = (2/2) * (3.0 - 2.2) = 0.8; floor(-4 - 4.0) = -8
        let r = rec("a", 1, Level::Medium, Level::Medium);
        assert_eq!(adaptive_priority(&r, 2.2), -8);
    }

    #[test]
    fn test_strong_dimension_pushes_back() {
        // No boost; gain = (3/1) * (3.0 - 4.0) = -3; floor(0 + 15) = 15
        let r = rec("a", 0, Level::High, Level::High);
        assert_eq!(adaptive_priority(&r, 4.0), 15);
    }

    #[test]
    fn test_floor_rounds_toward_negative_infinity() {
        // gain = (1/2) * (3.0 - 2.7) = 0.15; 2 - 0.75 = 1.25 -> 1
        let r = rec("a", 2, Level::Medium, Level::Low);
        assert_eq!(adaptive_priority(&r, 2.7), 1);
        // gain = (1/1) * 0.3 = 0.3; 0 - 1.5 = -1.5 -> -2
        let r = rec("b", 0, Level::High, Level::Low);
        assert_eq!(adaptive_priority(&r, 2.7), -2);
    }

    #[test]
    fn test_prioritize_sorts_stably() {
        let recs = vec![
            rec("first", 0, Level::High, Level::High),
            rec("second", 0, Level::High, Level::High),
            rec("cheap", 1, Level::Low, Level::High),
        ];
        let scores = [Score {
            dimension: Dimension::Performance,
            maturity_score: 3.0,
            weighted_score: 3.0,
            max_possible_score: 15.0,
            percentage: 60.0,
        }];
        // Score 3.0 zeroes the gain: priorities stay 0, 0, 1.
        let sorted = prioritize(recs, &scores);
        let titles: Vec<_> = sorted.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "second", "cheap"]);
    }

    #[test]
    fn test_missing_dimension_score_treated_as_zero() {
        let recs = vec![rec("a", 0, Level::Low, Level::High)];
        let sorted = prioritize(recs, &[]);
        // P = -10; gain = 1 * 3 = 3; floor(-10 - 15) = -25
        assert_eq!(sorted[0].priority, -25);
    }
}
