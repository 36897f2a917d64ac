//! **Scoring and recommendation engine for operational maturity assessments.**
//!
//! `maturity-tools` turns survey answers into per-dimension maturity scores
//! on a 0–5 scale, derives findings for weak spots, instantiates and
//! prioritizes recommendations from a rule table, and analyzes an
//! organization's history for anomalies and trends.
//!
//! ## Core Concepts & Modules
//!
//! - **[`catalog`]**: The question catalog. Every question belongs to one
//!   [`Dimension`](model::Dimension), carries a weight and optionally a
//!   label→score mapping.
//! - **[`scoring`]**: Answer scoring, weighted dimension aggregation, findings
//!   and assessment summaries.
//! - **[`recommend`]**: Score bands, the rule table and the adaptive prioritizer.
//! - **[`diagnostics`]**: Anomaly detection, trend projection and predictive insights.
//! - **[`store`]**: The [`AssessmentStore`] seam and its SQLite implementation.
//! - **[`pipeline`]**: [`AssessmentService`], which runs the whole pipeline over
//!   a store, and offline workbook scoring.
//! - **[`reports`]**: JSON and terminal summary renderers.
//!
//! ## Getting Started
//!
//! ```no_run
//! use maturity_tools::{AssessmentService, QuestionCatalog, RecommendationEngine, RuleTable, SqliteStore};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = SqliteStore::open_in_memory()?;
//!     let service = AssessmentService::new(
//!         store,
//!         QuestionCatalog::builtin()?,
//!         RecommendationEngine::new(RuleTable::builtin()?),
//!     );
//!     service.seed_catalog()?;
//!
//!     let org = service.create_organization("Acme", Some("acme.io"))?;
//!     let assessment = service.create_assessment(org.id, "Q3 review")?;
//!     service.submit_answer(assessment.id, "perf-01", "150")?;
//!
//!     let outcome = service.complete_assessment(assessment.id)?;
//!     println!(
//!         "Overall maturity {:.2} ({} recommendations)",
//!         outcome.overall_maturity, outcome.recommendations
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `webhooks` (default): Delivers completion events to configured HTTP
//!   endpoints. Adds `reqwest`.

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
// Pedantic lints: allow categories that are design choices for this codebase
#![allow(
    // Score math mixes counts and f64 throughout; values are small and bounded
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::too_many_lines,
    // Variable names like `min`/`mid` or `old`/`new` are clear in context
    clippy::similar_names
)]

pub mod cache;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod model;
pub mod notify;
pub mod pipeline;
pub mod recommend;
pub mod reports;
pub mod scoring;
pub mod store;

// Re-export main types for convenience
pub use cache::TtlCache;
pub use catalog::QuestionCatalog;
pub use config::{AppConfig, AppConfigBuilder, ConfigError, Validatable};
pub use diagnostics::{Anomaly, Insight, MaturityProjection, TrendDirection};
pub use error::{AssessError, ErrorContext, OptionContext, Result};
pub use model::{
    Answer, Assessment, AssessmentStatus, Dimension, Finding, Organization, Question,
    QuestionType, Recommendation, RecommendationStatus, Score, Severity,
};
pub use notify::{CompletionEvent, Notifier};
pub use pipeline::{score_workbook, AssessmentService, CompletionOutcome, Workbook};
pub use recommend::{RecommendationEngine, RuleTable};
pub use reports::{ReportFormat, ReportGenerator};
pub use scoring::{AssessmentSummary, RiskLevel};
pub use store::{AssessmentStore, SqliteStore};
