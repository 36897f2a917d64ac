//! Property-based tests for the scorer, aggregator and prioritizer.
//!
//! Ensures scoring handles arbitrary input without panicking and that the
//! 0-5 scale and ordering invariants hold across random inputs.

use maturity_tools::model::{
    Answer, AnsweredQuestion, Dimension, Level, Question, QuestionType, Recommendation,
    RecommendationStatus, Score, Timeline,
};
use maturity_tools::recommend::{prioritize, Band};
use maturity_tools::scoring::{aggregate_scores, score_answer};
use proptest::prelude::*;

fn question_type() -> impl Strategy<Value = QuestionType> {
    prop_oneof![
        Just(QuestionType::SingleSelect),
        Just(QuestionType::MultiSelect),
        Just(QuestionType::Numeric),
        Just(QuestionType::FreeText),
    ]
}

fn level() -> impl Strategy<Value = Level> {
    prop_oneof![Just(Level::Low), Just(Level::Medium), Just(Level::High)]
}

fn recommendation(title: String, priority: i64, effort: Level, impact: Level) -> Recommendation {
    Recommendation {
        id: None,
        dimension: Dimension::Performance,
        title,
        description: String::new(),
        effort,
        impact,
        kpi: None,
        timeline: Timeline::Days30,
        priority,
        status: RecommendationStatus::Pending,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn score_answer_stays_on_scale(
        kind in question_type(),
        options in prop::collection::vec("[A-Za-z ]{1,12}", 0..6),
        raw in "\\PC{0,80}",
    ) {
        let q = Question::new("q", Dimension::Performance, kind, "?").with_options(options);
        let s = score_answer(&q, &raw);
        prop_assert!((0.0..=5.0).contains(&s), "score {} for {:?}", s, raw);
    }

    #[test]
    fn mapped_score_stays_on_scale(
        raw in "\\PC{0,40}",
        value in -10.0f64..10.0,
    ) {
        let q = Question::new("q", Dimension::Performance, QuestionType::SingleSelect, "?")
            .with_mapping([("Yes", value)]);
        let s = score_answer(&q, &raw);
        prop_assert!((0.0..=5.0).contains(&s));
    }

    #[test]
    fn numeric_is_monotonic(a in 0.0f64..200.0, b in 0.0f64..200.0) {
        let q = Question::new("n", Dimension::Performance, QuestionType::Numeric, "?");
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(score_answer(&q, &lo.to_string()) <= score_answer(&q, &hi.to_string()));
    }

    #[test]
    fn aggregate_stays_on_scale(
        entries in prop::collection::vec((0.0f64..=5.0, 0.1f64..3.0, any::<bool>()), 1..20),
    ) {
        let answers: Vec<AnsweredQuestion> = entries
            .iter()
            .enumerate()
            .map(|(i, &(score, weight, critical))| {
                let mut q = Question::new(format!("q{i}"), Dimension::Performance, QuestionType::Numeric, "?")
                    .with_weight(weight);
                q.is_critical = critical;
                AnsweredQuestion {
                    answer: Answer {
                        question_id: q.id.clone(),
                        answer_value: String::new(),
                        maturity_score: Some(score),
                    },
                    question: q,
                }
            })
            .collect();

        let scores = aggregate_scores(&answers);
        prop_assert_eq!(scores.len(), 1);
        let s = &scores[0];
        prop_assert!((0.0..=5.0).contains(&s.maturity_score));
        prop_assert!((0.0..=100.0 + 1e-9).contains(&s.percentage));

        let blocked = entries.iter().any(|&(score, _, critical)| critical && score < 2.0);
        if blocked {
            prop_assert!(s.maturity_score <= 2.0);
            prop_assert!(s.percentage <= 40.0);
        }
    }

    #[test]
    fn band_is_monotonic(a in 0.0f64..=5.0, b in 0.0f64..=5.0) {
        let rank = |band: Band| match band {
            Band::Low => 0,
            Band::Medium => 1,
            Band::High => 2,
        };
        if a <= b {
            prop_assert!(rank(Band::from_score(a)) <= rank(Band::from_score(b)));
        }
    }

    #[test]
    fn prioritize_is_a_stable_sort(
        specs in prop::collection::vec((0i64..6, level(), level()), 0..15),
        dimension_score in 0.0f64..=5.0,
    ) {
        let recs: Vec<Recommendation> = specs
            .iter()
            .enumerate()
            .map(|(i, (p, effort, impact))| recommendation(format!("r{i}"), *p, *effort, *impact))
            .collect();
        let scores = [Score {
            dimension: Dimension::Performance,
            maturity_score: dimension_score,
            weighted_score: dimension_score,
            max_possible_score: 5.0,
            percentage: dimension_score * 20.0,
        }];

        let ranked = prioritize(recs.clone(), &scores);
        prop_assert_eq!(ranked.len(), recs.len());
        for pair in ranked.windows(2) {
            prop_assert!(pair[0].priority <= pair[1].priority);
            if pair[0].priority == pair[1].priority {
                // Titles encode the original position
                let first: usize = pair[0].title[1..].parse().unwrap();
                let second: usize = pair[1].title[1..].parse().unwrap();
                prop_assert!(first < second);
            }
        }
    }
}
