//! Question catalog.
//!
//! The catalog is the fixed question set an assessment is answered
//! against. A base set of 28 questions across the four dimensions ships
//! embedded in the binary, together with 40 extended questions that can be
//! appended for a more detailed assessment. A replacement set can be loaded
//! from a YAML or JSON file with the same shape:
//!
//! ```yaml
//! questions:
//!   - id: perf-02
//!     dimension: performance
//!     question_type: single_select
//!     text: "How do you monitor application performance?"
//!     weight: 1.0
//!     order: 2
//!     options: ["No monitoring", "Basic logging"]
//!     maturity_mapping:
//!       "No monitoring": 0.0
//!       "Basic logging": 1.0
//! ```

use crate::config::ScoringConfig;
use crate::error::{AssessError, CatalogErrorKind, ErrorContext, Result};
use crate::model::{Dimension, Question, MAX_MATURITY, MIN_MATURITY};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

const BUILTIN_QUESTIONS: &str = include_str!("questions.yaml");
const EXTENDED_QUESTIONS: &str = include_str!("questions_extended.yaml");

#[derive(Debug, Serialize, Deserialize)]
struct CatalogFile {
    questions: Vec<Question>,
}

/// An ordered, validated set of questions.
#[derive(Debug, Clone, Default)]
pub struct QuestionCatalog {
    questions: Vec<Question>,
}

impl QuestionCatalog {
    /// Build a catalog from questions, sorted by dimension then display order.
    #[must_use]
    pub fn new(mut questions: Vec<Question>) -> Self {
        questions.sort_by(|a, b| (a.dimension, a.order).cmp(&(b.dimension, b.order)));
        Self { questions }
    }

    /// The embedded base question set.
    pub fn builtin() -> Result<Self> {
        Self::from_yaml_str(BUILTIN_QUESTIONS).context("loading built-in catalog")
    }

    /// The base set plus the extended questions.
    pub fn extended() -> Result<Self> {
        let mut questions = Self::builtin()?.questions;
        let extra: CatalogFile =
            serde_yaml::from_str(EXTENDED_QUESTIONS).context("loading extended catalog")?;
        questions.extend(extra.questions);
        Ok(Self::new(questions))
    }

    /// Parse a catalog document. JSON documents are accepted too.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let file: CatalogFile = serde_yaml::from_str(content)?;
        Ok(Self::new(file.questions))
    }

    /// Load and validate a catalog file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| AssessError::io(path, e))?;
        let catalog = Self::from_yaml_str(&content)
            .with_context(|| format!("parsing catalog {}", path.display()))?;
        catalog
            .validate()
            .with_context(|| format!("validating catalog {}", path.display()))?;
        tracing::info!(
            "Loaded {} questions from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Load from `path` when given, otherwise use the built-in set.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::builtin(),
        }
    }

    /// The catalog selected by the scoring configuration: an explicit file
    /// wins, then the extended set when enabled, then the base set.
    pub fn configured(scoring: &ScoringConfig) -> Result<Self> {
        match &scoring.catalog_file {
            Some(path) => Self::from_file(path),
            None if scoring.extended_catalog => Self::extended(),
            None => Self::builtin(),
        }
    }

    /// Questions in display order, optionally restricted to one dimension.
    #[must_use]
    pub fn questions(&self, dimension: Option<Dimension>) -> Vec<&Question> {
        self.questions
            .iter()
            .filter(|q| dimension.map_or(true, |d| q.dimension == d))
            .collect()
    }

    /// Every question in display order.
    #[must_use]
    pub fn as_slice(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Number of critical questions per dimension, in canonical order.
    #[must_use]
    pub fn critical_counts(&self) -> Vec<(Dimension, usize)> {
        Dimension::ALL
            .into_iter()
            .map(|d| {
                let count = self
                    .questions
                    .iter()
                    .filter(|q| q.dimension == d && q.is_critical)
                    .count();
                (d, count)
            })
            .collect()
    }

    /// Check structural rules every catalog must satisfy.
    ///
    /// Ids are unique, weights are positive, mapping values lie on the
    /// 0-5 scale and select questions list their options.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for q in &self.questions {
            if !seen.insert(q.id.as_str()) {
                return Err(invalid(CatalogErrorKind::DuplicateId(q.id.clone())));
            }
            if !(q.weight.is_finite() && q.weight > 0.0) {
                return Err(invalid(CatalogErrorKind::InvalidWeight {
                    id: q.id.clone(),
                    weight: q.weight,
                }));
            }
            if q.question_type.is_select() && q.options.is_empty() {
                return Err(invalid(CatalogErrorKind::MissingOptions(q.id.clone())));
            }
            if let Some(mapping) = &q.maturity_mapping {
                for (label, &value) in mapping {
                    if !(MIN_MATURITY..=MAX_MATURITY).contains(&value) {
                        return Err(invalid(CatalogErrorKind::MappingOutOfRange {
                            id: q.id.clone(),
                            label: label.clone(),
                            value,
                        }));
                    }
                }
            }
        }
        Ok(())
    }
}

fn invalid(kind: CatalogErrorKind) -> AssessError {
    AssessError::catalog("validating questions", kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionType;
    use std::io::Write;

    #[test]
    fn test_builtin_catalog_shape() {
        let catalog = QuestionCatalog::builtin().unwrap();
        catalog.validate().unwrap();

        assert_eq!(catalog.len(), 28);
        assert_eq!(catalog.questions(Some(Dimension::Performance)).len(), 7);
        assert_eq!(catalog.questions(Some(Dimension::ProductionReadiness)).len(), 7);
        assert_eq!(
            catalog.questions(Some(Dimension::InfrastructureEfficiency)).len(),
            6
        );
        assert_eq!(catalog.questions(Some(Dimension::FailureResilience)).len(), 8);

        let critical: usize = catalog.critical_counts().iter().map(|(_, n)| n).sum();
        assert_eq!(critical, 8);
    }

    #[test]
    fn test_extended_catalog_appends_to_base() {
        let catalog = QuestionCatalog::extended().unwrap();
        catalog.validate().unwrap();

        assert_eq!(catalog.len(), 68);
        assert_eq!(catalog.questions(Some(Dimension::Performance)).len(), 17);
        assert_eq!(catalog.questions(Some(Dimension::FailureResilience)).len(), 19);
        let critical: usize = catalog.critical_counts().iter().map(|(_, n)| n).sum();
        assert_eq!(critical, 16);

        // Extended questions follow the base ones in display order
        let perf = catalog.questions(Some(Dimension::Performance));
        assert_eq!(perf[6].id, "perf-07");
        assert_eq!(perf[7].id, "perf-08");
    }

    #[test]
    fn test_configured_catalog_selection() {
        let mut scoring = ScoringConfig::default();
        assert_eq!(QuestionCatalog::configured(&scoring).unwrap().len(), 28);
        scoring.extended_catalog = true;
        assert_eq!(QuestionCatalog::configured(&scoring).unwrap().len(), 68);
    }

    #[test]
    fn test_questions_sorted_by_display_order() {
        let catalog = QuestionCatalog::new(vec![
            Question::new("b", Dimension::Performance, QuestionType::FreeText, "B").with_order(2),
            Question::new("a", Dimension::Performance, QuestionType::FreeText, "A").with_order(1),
            Question::new("c", Dimension::FailureResilience, QuestionType::FreeText, "C")
                .with_order(0),
        ]);

        let ids: Vec<_> = catalog.questions(None).iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_mapping_order_preserved() {
        let catalog = QuestionCatalog::builtin().unwrap();
        let q = catalog.get("perf-02").unwrap();
        let labels: Vec<_> = q.maturity_mapping.as_ref().unwrap().keys().collect();
        assert_eq!(labels[0], "No monitoring");
        assert_eq!(labels[3], "Comprehensive observability platform");
    }

    #[test]
    fn test_validate_rejects_duplicates_and_bad_values() {
        let dup = QuestionCatalog::new(vec![
            Question::new("x", Dimension::Performance, QuestionType::Numeric, "X"),
            Question::new("x", Dimension::Performance, QuestionType::Numeric, "X again"),
        ]);
        assert!(dup.validate().is_err());

        let zero_weight = QuestionCatalog::new(vec![Question::new(
            "w",
            Dimension::Performance,
            QuestionType::Numeric,
            "W",
        )
        .with_weight(0.0)]);
        assert!(zero_weight.validate().is_err());

        let out_of_range = QuestionCatalog::new(vec![Question::new(
            "m",
            Dimension::Performance,
            QuestionType::SingleSelect,
            "M",
        )
        .with_options(["Yes"])
        .with_mapping([("Yes", 7.0)])]);
        assert!(out_of_range.validate().is_err());

        let no_options = QuestionCatalog::new(vec![Question::new(
            "s",
            Dimension::Performance,
            QuestionType::SingleSelect,
            "S",
        )]);
        assert!(no_options.validate().is_err());
    }

    #[test]
    fn test_from_file_accepts_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"questions": [{{"id": "q1", "dimension": "performance", "question_type": "numeric", "text": "Latency?"}}]}}"#
        )
        .unwrap();

        let catalog = QuestionCatalog::from_file(file.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("q1").unwrap().weight, 1.0);
    }
}
