//! Findings derived from dimension scores and individual low answers.

use crate::model::{AnsweredQuestion, Finding, Score, Severity};

/// Dimension scores below this raise a critical finding.
pub const CRITICAL_GAP_THRESHOLD: f64 = 2.0;

/// Dimension scores below this (and at or above the critical threshold)
/// raise a high finding.
pub const SIGNIFICANT_GAP_THRESHOLD: f64 = 3.0;

/// Answers scoring below this raise their own high finding.
pub const LOW_ANSWER_THRESHOLD: f64 = 2.0;

const QUESTION_TITLE_CHARS: usize = 50;

/// Generate findings for an assessment.
///
/// Dimension findings come first, in score order, followed by one finding
/// per low-scoring answer in answer order.
#[must_use]
pub fn generate_findings(scores: &[Score], answers: &[AnsweredQuestion]) -> Vec<Finding> {
    let mut findings: Vec<Finding> = scores.iter().filter_map(dimension_finding).collect();

    findings.extend(answers.iter().filter_map(answer_finding));

    tracing::debug!(count = findings.len(), "generated findings");
    findings
}

fn dimension_finding(score: &Score) -> Option<Finding> {
    let maturity = score.maturity_score;
    let name = score.dimension.title();

    if maturity < CRITICAL_GAP_THRESHOLD {
        Some(Finding {
            dimension: score.dimension,
            severity: Severity::Critical,
            title: format!("Critical Gap in {name}"),
            description: format!(
                "Maturity score of {maturity:.1}/5.0 indicates critical gaps requiring immediate attention."
            ),
            question_id: None,
        })
    } else if maturity < SIGNIFICANT_GAP_THRESHOLD {
        Some(Finding {
            dimension: score.dimension,
            severity: Severity::High,
            title: format!("Significant Gap in {name}"),
            description: format!(
                "Maturity score of {maturity:.1}/5.0 indicates significant improvement opportunities."
            ),
            question_id: None,
        })
    } else {
        None
    }
}

fn answer_finding(answered: &AnsweredQuestion) -> Option<Finding> {
    let score = answered.maturity_score()?;
    if score >= LOW_ANSWER_THRESHOLD {
        return None;
    }
    let question = &answered.question;
    let snippet: String = question.text.chars().take(QUESTION_TITLE_CHARS).collect();

    Some(Finding {
        dimension: question.dimension,
        severity: Severity::High,
        title: format!("Low Score on: {snippet}..."),
        description: format!(
            "This question received a maturity score of {score:.1}/5.0, indicating areas for improvement."
        ),
        question_id: Some(question.id.clone()),
    })
}
