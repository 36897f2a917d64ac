//! Weighted aggregation of answer scores into dimension scores.

use crate::model::{clamp_maturity, AnsweredQuestion, Dimension, Score, MAX_MATURITY};
use std::collections::BTreeMap;

/// A critical question scoring below this value blocks its dimension.
pub const CRITICAL_BLOCKER_THRESHOLD: f64 = 2.0;

/// Ceiling applied to the maturity and weighted score of a blocked dimension.
pub const CRITICAL_SCORE_CAP: f64 = 2.0;

/// Ceiling applied to the percentage of a blocked dimension.
pub const CRITICAL_PERCENTAGE_CAP: f64 = 40.0;

#[derive(Debug, Default)]
struct DimensionTotals {
    weighted_sum: f64,
    weight_sum: f64,
    max_possible: f64,
    blocked: bool,
}

impl DimensionTotals {
    fn add(&mut self, score: f64, weight: f64, is_critical: bool) {
        self.weighted_sum += score * weight;
        self.weight_sum += weight;
        self.max_possible += weight * MAX_MATURITY;
        if is_critical && score < CRITICAL_BLOCKER_THRESHOLD {
            self.blocked = true;
        }
    }

    fn finish(self, dimension: Dimension) -> Option<Score> {
        if self.weight_sum <= 0.0 {
            return None;
        }
        let mut weighted_score = clamp_maturity(self.weighted_sum / self.weight_sum);
        let mut maturity_score = weighted_score;
        let mut percentage = weighted_score / MAX_MATURITY * 100.0;

        // Caps combine through min(), so a dimension already below the cap
        // keeps its lower value.
        if self.blocked {
            weighted_score = weighted_score.min(CRITICAL_SCORE_CAP);
            maturity_score = maturity_score.min(CRITICAL_SCORE_CAP);
            percentage = percentage.min(CRITICAL_PERCENTAGE_CAP);
        }

        Some(Score {
            dimension,
            maturity_score,
            weighted_score,
            max_possible_score: self.max_possible,
            percentage,
        })
    }
}

/// Aggregate scored answers into one [`Score`] per dimension.
///
/// Answers without a computed score are skipped. Dimensions with no
/// scored answers produce no entry. The result is in canonical dimension
/// order.
#[must_use]
pub fn aggregate_scores(answers: &[AnsweredQuestion]) -> Vec<Score> {
    let mut totals: BTreeMap<Dimension, DimensionTotals> = BTreeMap::new();

    for answered in answers {
        let Some(score) = answered.maturity_score().filter(|s| s.is_finite()) else {
            continue;
        };
        let question = &answered.question;
        totals
            .entry(question.dimension)
            .or_default()
            .add(score, question.weight, question.is_critical);
    }

    totals
        .into_iter()
        .filter_map(|(dimension, totals)| totals.finish(dimension))
        .collect()
}

/// Look up the maturity score of one dimension.
#[must_use]
pub fn dimension_score(scores: &[Score], dimension: Dimension) -> Option<f64> {
    scores
        .iter()
        .find(|s| s.dimension == dimension)
        .map(|s| s.maturity_score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Answer, Question, QuestionType};

    fn answered(id: &str, dimension: Dimension, score: Option<f64>) -> AnsweredQuestion {
        AnsweredQuestion {
            question: Question::new(id, dimension, QuestionType::Numeric, id),
            answer: Answer {
                question_id: id.to_string(),
                answer_value: String::new(),
                maturity_score: score,
            },
        }
    }

    fn critical(mut a: AnsweredQuestion) -> AnsweredQuestion {
        a.question.is_critical = true;
        a
    }

    #[test]
    fn test_weighted_average() {
        let mut heavy = answered("a", Dimension::Performance, Some(4.0));
        heavy.question.weight = 3.0;
        let light = answered("b", Dimension::Performance, Some(0.0));

        let scores = aggregate_scores(&[heavy, light]);
        assert_eq!(scores.len(), 1);
        let s = &scores[0];
        assert_eq!(s.maturity_score, 3.0);
        assert_eq!(s.weighted_score, 3.0);
        assert_eq!(s.max_possible_score, 20.0);
        assert!((s.percentage - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_critical_blocker_caps_dimension() {
        let answers = vec![
            critical(answered("c", Dimension::FailureResilience, Some(1.0))),
            answered("x", Dimension::FailureResilience, Some(5.0)),
            answered("y", Dimension::FailureResilience, Some(5.0)),
            answered("z", Dimension::FailureResilience, Some(5.0)),
        ];
        let scores = aggregate_scores(&answers);
        let s = &scores[0];
        assert!(s.maturity_score <= 2.0);
        assert!(s.weighted_score <= 2.0);
        assert!(s.percentage <= 40.0);
        assert_eq!(s.maturity_score, 2.0);
    }

    #[test]
    fn test_cap_does_not_raise_lower_scores() {
        let scores = aggregate_scores(&[critical(answered("c", Dimension::Performance, Some(1.0)))]);
        let s = &scores[0];
        assert_eq!(s.weighted_score, 1.0);
        assert_eq!(s.maturity_score, 1.0);
        assert!((s.percentage - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_critical_at_threshold_does_not_block() {
        let answers = vec![
            critical(answered("c", Dimension::Performance, Some(2.0))),
            answered("x", Dimension::Performance, Some(5.0)),
        ];
        let scores = aggregate_scores(&answers);
        assert_eq!(scores[0].maturity_score, 3.5);
    }

    #[test]
    fn test_unscored_answers_and_empty_dimensions_omitted() {
        let answers = vec![
            answered("a", Dimension::Performance, None),
            answered("b", Dimension::FailureResilience, Some(3.0)),
        ];
        let scores = aggregate_scores(&answers);
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].dimension, Dimension::FailureResilience);
        assert!(aggregate_scores(&[]).is_empty());
    }

    #[test]
    fn test_scores_in_canonical_order() {
        let answers = vec![
            answered("r", Dimension::FailureResilience, Some(3.0)),
            answered("p", Dimension::Performance, Some(3.0)),
        ];
        let dims: Vec<_> = aggregate_scores(&answers).iter().map(|s| s.dimension).collect();
        assert_eq!(dims, vec![Dimension::Performance, Dimension::FailureResilience]);
    }
}
