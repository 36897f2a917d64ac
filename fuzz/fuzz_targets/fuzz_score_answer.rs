#![no_main]
use libfuzzer_sys::fuzz_target;
use maturity_tools::catalog::QuestionCatalog;
use maturity_tools::scoring::score_answer;

/// Fuzz the answer scorer against every built-in question.
///
/// Scoring must never panic and must always land inside the 0-5 range,
/// whatever the raw answer text looks like.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let Ok(catalog) = QuestionCatalog::builtin() else {
            return;
        };
        for question in catalog.questions(None) {
            let score = score_answer(question, s);
            assert!((0.0..=5.0).contains(&score));
        }
    }
});
