//! Benchmarks for the scoring pipeline.

use criterion::{criterion_group, criterion_main, Criterion};
use maturity_tools::model::QuestionType;
use maturity_tools::pipeline::{score_workbook, Workbook};
use maturity_tools::recommend::{RecommendationEngine, RuleTable};
use maturity_tools::QuestionCatalog;
use std::hint::black_box;

/// A workbook answering every catalog question.
fn full_workbook(catalog: &QuestionCatalog) -> Workbook {
    let answers = catalog
        .as_slice()
        .iter()
        .map(|q| {
            let value = match q.question_type {
                QuestionType::Numeric => serde_json::json!(42),
                QuestionType::MultiSelect => serde_json::json!(q.options.iter().take(2).collect::<Vec<_>>()),
                QuestionType::SingleSelect => q
                    .options
                    .get(q.options.len() / 2)
                    .map_or(serde_json::Value::Null, |o| serde_json::json!(o)),
                QuestionType::FreeText => serde_json::json!("kubernetes cluster"),
            };
            (q.id.clone(), value)
        })
        .collect();
    Workbook {
        name: Some("bench".to_string()),
        answers,
    }
}

fn benchmark_full_catalog(c: &mut Criterion) {
    let catalog = QuestionCatalog::builtin().expect("builtin catalog");
    let engine = RecommendationEngine::new(RuleTable::builtin().expect("builtin rules"));
    let workbook = full_workbook(&catalog);

    c.bench_function("score_full_catalog", |b| {
        b.iter(|| score_workbook(black_box(&catalog), black_box(&engine), black_box(&workbook)));
    });
}

criterion_group!(benches, benchmark_full_catalog);
criterion_main!(benches);
