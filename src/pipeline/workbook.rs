//! Offline scoring of an answer workbook against a catalog, without a database.

use crate::catalog::QuestionCatalog;
use crate::error::{AssessError, Result};
use crate::model::{Answer, AnsweredQuestion, Finding, Recommendation, Score};
use crate::recommend::RecommendationEngine;
use crate::scoring::{aggregate_scores, generate_findings, overall_maturity, score_answer, RiskLevel};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Answers keyed by question id.
///
/// Values may be plain strings, numbers, lists of labels or objects; non-string
/// values are scored in their JSON encoding. `null` leaves a question unanswered.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Workbook {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub answers: IndexMap<String, serde_json::Value>,
}

impl Workbook {
    /// Load a YAML or JSON workbook.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AssessError::io(path, e))?;
        serde_yaml::from_str(&content)
            .map_err(|e| AssessError::validation(format!("invalid workbook {}: {e}", path.display())))
    }
}

/// Scores, findings and recommendations of a workbook.
#[derive(Debug, Clone, Serialize)]
pub struct WorkbookResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub answered: usize,
    pub overall_maturity: f64,
    pub risk_level: RiskLevel,
    pub scores: Vec<Score>,
    pub findings: Vec<Finding>,
    pub recommendations: Vec<Recommendation>,
    /// Workbook keys that match no catalog question
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unknown_questions: Vec<String>,
}

fn raw_value(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Run the scoring pipeline over a workbook.
#[must_use]
pub fn score_workbook(
    catalog: &QuestionCatalog,
    engine: &RecommendationEngine,
    workbook: &Workbook,
) -> WorkbookResult {
    let mut answered = Vec::new();
    let mut unknown_questions = Vec::new();

    for (question_id, value) in &workbook.answers {
        let Some(question) = catalog.get(question_id) else {
            tracing::warn!("workbook answers unknown question '{question_id}'");
            unknown_questions.push(question_id.clone());
            continue;
        };
        let Some(raw) = raw_value(value) else {
            continue;
        };
        let maturity = score_answer(question, &raw);
        answered.push(AnsweredQuestion {
            question: question.clone(),
            answer: Answer {
                question_id: question.id.clone(),
                answer_value: raw,
                maturity_score: Some(maturity),
            },
        });
    }

    let scores = aggregate_scores(&answered);
    let findings = generate_findings(&scores, &answered);
    let recommendations = engine.recommend(&scores);
    let overall = overall_maturity(&scores);

    WorkbookResult {
        name: workbook.name.clone(),
        answered: answered.len(),
        overall_maturity: overall,
        risk_level: RiskLevel::from_maturity(overall),
        scores,
        findings,
        recommendations,
        unknown_questions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Dimension;
    use crate::recommend::RuleTable;

    fn engine() -> RecommendationEngine {
        RecommendationEngine::new(RuleTable::builtin().unwrap())
    }

    #[test]
    fn test_score_workbook() {
        let workbook: Workbook = serde_yaml::from_str(
            "name: pilot\nanswers:\n  perf-01: 100\n  perf-04: null\n  bogus-01: x\n",
        )
        .unwrap();
        let catalog = QuestionCatalog::builtin().unwrap();
        let result = score_workbook(&catalog, &engine(), &workbook);

        assert_eq!(result.answered, 1);
        assert_eq!(result.unknown_questions, vec!["bogus-01".to_string()]);
        assert_eq!(result.scores.len(), 1);
        assert_eq!(result.scores[0].dimension, Dimension::Performance);
        assert_eq!(result.scores[0].maturity_score, 5.0);
        assert_eq!(result.overall_maturity, 5.0);
    }

    #[test]
    fn test_empty_workbook() {
        let catalog = QuestionCatalog::builtin().unwrap();
        let result = score_workbook(&catalog, &engine(), &Workbook::default());
        assert_eq!(result.answered, 0);
        assert!(result.scores.is_empty());
        assert!(result.recommendations.is_empty());
        assert_eq!(result.risk_level, RiskLevel::Critical);
    }

    #[test]
    fn test_workbook_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answers.json");
        std::fs::write(&path, r#"{"answers": {"perf-01": "40"}}"#).unwrap();
        let workbook = Workbook::from_file(&path).unwrap();
        assert_eq!(workbook.answers.len(), 1);
        assert!(workbook.name.is_none());
    }
}
