//! Score command handler.
//!
//! Scores an answer workbook offline against the configured catalog and
//! rules, without touching the database.

use super::assessment::threshold_exit_code;
use super::CliContext;
use crate::catalog::QuestionCatalog;
use crate::pipeline::{score_workbook, Workbook, WorkbookResult};
use crate::recommend::{RecommendationEngine, RuleTable};
use anyhow::Result;
use std::fmt::Write as _;
use std::path::Path;

/// Score a workbook file, returning the desired exit code.
pub fn run_score(ctx: &CliContext, workbook_path: &Path, min_maturity: Option<f64>) -> Result<i32> {
    let scoring = &ctx.config.scoring;
    let catalog = QuestionCatalog::configured(scoring)?;
    let engine = RecommendationEngine::new(RuleTable::load(scoring.rules_file.as_deref())?);
    let workbook = Workbook::from_file(workbook_path)?;

    tracing::info!(
        "Scoring {} answers from {}",
        workbook.answers.len(),
        workbook_path.display()
    );
    let result = score_workbook(&catalog, &engine, &workbook);
    ctx.emit(&result, || format_result(&result))?;
    Ok(threshold_exit_code(result.overall_maturity, min_maturity))
}

fn format_result(result: &WorkbookResult) -> String {
    let mut out = String::new();
    if let Some(name) = &result.name {
        let _ = writeln!(out, "{name}");
    }
    let _ = writeln!(
        out,
        "Overall maturity {:.2}/5.0 (risk {}) from {} answers",
        result.overall_maturity, result.risk_level, result.answered
    );
    for score in &result.scores {
        let _ = writeln!(
            out,
            "  {:<26} {:.2}  ({:.0}%)",
            score.dimension.title(),
            score.maturity_score,
            score.percentage
        );
    }
    if !result.findings.is_empty() {
        let _ = writeln!(out, "\nFindings:");
        for f in &result.findings {
            let _ = writeln!(out, "  [{}] {}", f.severity, f.title);
        }
    }
    if !result.recommendations.is_empty() {
        let _ = writeln!(out, "\nRecommendations:");
        for r in &result.recommendations {
            let _ = writeln!(out, "  {:>4}  {} ({}, {})", r.priority, r.title, r.dimension, r.timeline);
        }
    }
    if !result.unknown_questions.is_empty() {
        let _ = writeln!(
            out,
            "\nIgnored unknown questions: {}",
            result.unknown_questions.join(", ")
        );
    }
    out
}
