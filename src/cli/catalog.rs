//! Catalog command handlers.
//!
//! `init` seeds the question catalog into the database; `questions` lists it.

use super::CliContext;
use crate::catalog::QuestionCatalog;
use crate::model::{Dimension, Question};
use anyhow::Result;
use std::fmt::Write as _;

/// Create the database if needed and (re)write the configured catalog into it.
pub fn run_init(ctx: &CliContext) -> Result<()> {
    let service = ctx.open_service()?;
    let written = service.seed_catalog()?;
    if !ctx.quiet {
        eprintln!(
            "Database {} ready with {written} questions",
            ctx.config.database.path.display()
        );
        eprint!("{}", format_critical_counts(service.catalog()));
    }
    Ok(())
}

fn format_critical_counts(catalog: &QuestionCatalog) -> String {
    let mut out = String::new();
    for (dimension, critical) in catalog.critical_counts() {
        let total = catalog.questions(Some(dimension)).len();
        let _ = writeln!(
            out,
            "  {:<26} {total:>2} questions, {critical} critical",
            dimension.title()
        );
    }
    out
}

/// List catalog questions, optionally for one dimension.
pub fn run_questions(ctx: &CliContext, dimension: Option<Dimension>) -> Result<()> {
    let service = ctx.open_service()?;
    let questions = service.questions(dimension)?;
    ctx.emit(&questions, || format_questions(&questions))
}

fn format_questions(questions: &[Question]) -> String {
    let mut out = String::new();
    let mut current: Option<Dimension> = None;
    for q in questions {
        if current != Some(q.dimension) {
            if current.is_some() {
                out.push('\n');
            }
            let _ = writeln!(out, "{}", q.dimension.title());
            current = Some(q.dimension);
        }
        let marker = if q.is_critical { "*" } else { " " };
        let _ = writeln!(
            out,
            " {marker} {:<10} [{}, weight {}] {}",
            q.id, q.question_type, q.weight, q.text
        );
        if !q.options.is_empty() {
            let _ = writeln!(out, "      options: {}", q.options.join(" | "));
        }
    }
    if questions.is_empty() {
        out.push_str("No questions found\n");
    } else {
        out.push_str("\n* critical question\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionType;

    #[test]
    fn test_format_questions_groups_by_dimension() {
        let questions = vec![
            Question::new("perf-01", Dimension::Performance, QuestionType::Numeric, "Latency?")
                .critical(),
            Question::new("perf-02", Dimension::Performance, QuestionType::SingleSelect, "Load tests?")
                .with_options(["Yes", "No"]),
        ];
        let text = format_questions(&questions);
        assert_eq!(text.matches(Dimension::Performance.title()).count(), 1);
        assert!(text.contains(" * perf-01"));
        assert!(text.contains("options: Yes | No"));
    }

    #[test]
    fn test_critical_counts_per_dimension() {
        let text = format_critical_counts(&QuestionCatalog::builtin().unwrap());
        assert_eq!(text.lines().count(), 4);
        assert!(text.contains("Performance"));
        assert!(text.contains(" 8 questions"));
    }

    #[test]
    fn test_format_no_questions() {
        assert!(format_questions(&[]).contains("No questions found"));
    }
}
