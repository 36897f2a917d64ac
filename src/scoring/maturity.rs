//! Per-answer maturity scoring.
//!
//! An explicit maturity mapping on the question always wins. Without one,
//! the question type decides:
//!
//! | Type | Rule |
//! |------|------|
//! | numeric | `value / 20 * 5`, clamped to 0-5 |
//! | single/multi select | position of the first selected label in the option list, scaled to 0-5 |
//! | free text | 0 |
//!
//! Scoring is total: unparsable input degrades to a default score instead
//! of failing.

use crate::model::{clamp_maturity, Question, QuestionType, MAX_MATURITY};
use indexmap::IndexMap;
use serde_json::Value;

/// Score for a select answer whose label is not among the options.
pub const UNMATCHED_SELECTION_SCORE: f64 = 2.5;

/// Numeric answers reach full maturity at this value.
pub const NUMERIC_FULL_SCALE: f64 = 20.0;

/// Score one raw answer against its question. Always within 0-5.
#[must_use]
pub fn score_answer(question: &Question, answer_value: &str) -> f64 {
    if let Some(mapping) = &question.maturity_mapping {
        if let Some(score) = score_from_mapping(mapping, answer_value) {
            return sanitize(score);
        }
    }

    let score = match question.question_type {
        QuestionType::Numeric => score_numeric(answer_value),
        QuestionType::SingleSelect | QuestionType::MultiSelect => {
            score_selection(&question.options, answer_value)
        }
        QuestionType::FreeText => 0.0,
    };
    sanitize(score)
}

/// Resolve an answer through an explicit mapping.
///
/// Returns `None` only for object-shaped answers that either fail to parse
/// or contain none of the mapping keys; those fall through to the type
/// defaults. Scalar answers that miss the mapping score 0.
fn score_from_mapping(mapping: &IndexMap<String, f64>, answer_value: &str) -> Option<f64> {
    if answer_value.starts_with('{') {
        let parsed: Value = serde_json::from_str(answer_value).ok()?;
        let rendered = parsed.to_string();
        return mapping
            .iter()
            .find(|(label, _)| rendered.contains(label.as_str()))
            .map(|(_, &score)| score);
    }

    if let Some(&score) = mapping.get(answer_value) {
        return Some(score);
    }

    if answer_value.starts_with('[') {
        if let Some(&score) = first_label(answer_value).and_then(|label| mapping.get(&label)) {
            return Some(score);
        }
    }

    Some(0.0)
}

fn score_numeric(answer_value: &str) -> f64 {
    match answer_value.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => clamp_maturity(value / NUMERIC_FULL_SCALE * MAX_MATURITY),
        _ => 0.0,
    }
}

fn score_selection(options: &[String], answer_value: &str) -> f64 {
    if options.is_empty() {
        return UNMATCHED_SELECTION_SCORE;
    }
    let Some(label) = first_label(answer_value) else {
        return UNMATCHED_SELECTION_SCORE;
    };
    options
        .iter()
        .position(|option| *option == label)
        .map_or(UNMATCHED_SELECTION_SCORE, |index| {
            index as f64 / options.len() as f64 * MAX_MATURITY
        })
}

/// First selected label of a select answer.
///
/// Values starting with `[` are decoded as a JSON list; anything else is
/// a single label. Undecodable or empty lists yield `None`.
fn first_label(answer_value: &str) -> Option<String> {
    if !answer_value.starts_with('[') {
        return Some(answer_value.to_string());
    }
    let items: Vec<Value> = serde_json::from_str(answer_value).ok()?;
    match items.into_iter().next()? {
        Value::String(label) => Some(label),
        other => Some(other.to_string()),
    }
}

fn sanitize(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        clamp_maturity(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Dimension;

    fn numeric() -> Question {
        Question::new("n", Dimension::Performance, QuestionType::Numeric, "How many?")
    }

    fn select(options: &[&str]) -> Question {
        Question::new("s", Dimension::Performance, QuestionType::SingleSelect, "Pick one")
            .with_options(options.iter().copied())
    }

    #[test]
    fn test_numeric_scaling() {
        let q = numeric();
        assert_eq!(score_answer(&q, "100"), 5.0);
        assert_eq!(score_answer(&q, "0"), 0.0);
        assert_eq!(score_answer(&q, "200"), 5.0);
        assert_eq!(score_answer(&q, "10"), 2.5);
        assert_eq!(score_answer(&q, " 8 "), 2.0);
    }

    #[test]
    fn test_numeric_unparsable_scores_zero() {
        let q = numeric();
        assert_eq!(score_answer(&q, "fast"), 0.0);
        assert_eq!(score_answer(&q, ""), 0.0);
        assert_eq!(score_answer(&q, "NaN"), 0.0);
        assert_eq!(score_answer(&q, "-50"), 0.0);
    }

    #[test]
    fn test_select_position_scoring() {
        let q = select(&["A", "B", "C", "D"]);
        assert_eq!(score_answer(&q, "A"), 0.0);
        assert_eq!(score_answer(&q, "B"), 1.25);
        assert_eq!(score_answer(&q, "D"), 3.75);
    }

    #[test]
    fn test_select_unknown_label_scores_midpoint() {
        let q = select(&["A", "B"]);
        assert_eq!(score_answer(&q, "Z"), UNMATCHED_SELECTION_SCORE);
        assert_eq!(score_answer(&q, "[not json"), UNMATCHED_SELECTION_SCORE);
        assert_eq!(score_answer(&q, "[]"), UNMATCHED_SELECTION_SCORE);
    }

    #[test]
    fn test_multi_select_uses_first_label() {
        let q = Question::new("m", Dimension::Performance, QuestionType::MultiSelect, "Pick")
            .with_options(["Caching", "CDN", "Sharding"]);
        assert!((score_answer(&q, r#"["CDN","Caching"]"#) - 5.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_mapping_exact_match() {
        let q = select(&["No", "Yes"]).with_mapping([("No", 0.0), ("Yes", 4.0)]);
        assert_eq!(score_answer(&q, "Yes"), 4.0);
        assert_eq!(score_answer(&q, "No"), 0.0);
    }

    #[test]
    fn test_mapping_miss_scores_zero_not_default() {
        let q = select(&["No", "Yes", "Maybe"]).with_mapping([("No", 0.0), ("Yes", 4.0)]);
        // "Maybe" is a valid option but unmapped, so the mapping decides.
        assert_eq!(score_answer(&q, "Maybe"), 0.0);
    }

    #[test]
    fn test_mapping_array_answer_uses_first_label() {
        let q = select(&["No", "Yes"]).with_mapping([("No", 1.0), ("Yes", 4.0)]);
        assert_eq!(score_answer(&q, r#"["Yes"]"#), 4.0);
    }

    #[test]
    fn test_mapping_object_answer_first_key_wins() {
        let q = select(&["basic", "advanced"]).with_mapping([("basic", 1.0), ("advanced", 5.0)]);
        // Both labels appear; mapping order picks "basic".
        let raw = r#"{"tier": "advanced", "fallback": "basic"}"#;
        assert_eq!(score_answer(&q, raw), 1.0);
    }

    #[test]
    fn test_mapping_object_without_match_falls_through() {
        let q = select(&["A", "B"]).with_mapping([("A", 5.0)]);
        // No key matches and the object is not an option label: select default.
        assert_eq!(score_answer(&q, r#"{"other": 1}"#), UNMATCHED_SELECTION_SCORE);
        // Malformed object also falls through.
        assert_eq!(score_answer(&q, "{broken"), UNMATCHED_SELECTION_SCORE);
    }

    #[test]
    fn test_free_text_scores_zero() {
        let q = Question::new("t", Dimension::Performance, QuestionType::FreeText, "Describe");
        assert_eq!(score_answer(&q, "We run everything on Kubernetes"), 0.0);
    }
}
