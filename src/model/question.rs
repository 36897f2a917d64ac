use super::{Dimension, QuestionType};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Identifier of a catalog question, e.g. `perf-01`.
pub type QuestionId = String;

/// A single survey question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub dimension: Dimension,
    pub question_type: QuestionType,
    pub text: String,
    /// Relative weight inside the dimension; always positive
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Display order inside the dimension
    #[serde(default)]
    pub order: u32,
    /// A low score on a critical question caps the whole dimension
    #[serde(default)]
    pub is_critical: bool,
    /// Ordered option labels for select questions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// Explicit answer label to maturity value table. Iteration order
    /// matters: object-shaped answers resolve to the first key found.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maturity_mapping: Option<IndexMap<String, f64>>,
}

const fn default_weight() -> f64 {
    1.0
}

impl Question {
    /// Create a question with default weight and no options or mapping.
    pub fn new(
        id: impl Into<QuestionId>,
        dimension: Dimension,
        question_type: QuestionType,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            dimension,
            question_type,
            text: text.into(),
            weight: default_weight(),
            order: 0,
            is_critical: false,
            options: Vec::new(),
            maturity_mapping: None,
        }
    }

    #[must_use]
    pub const fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    #[must_use]
    pub const fn with_order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }

    #[must_use]
    pub const fn critical(mut self) -> Self {
        self.is_critical = true;
        self
    }

    #[must_use]
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_mapping<I, S>(mut self, mapping: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        self.maturity_mapping = Some(mapping.into_iter().map(|(k, v)| (k.into(), v)).collect());
        self
    }
}

/// A stored answer to one question of one assessment.
///
/// There is at most one answer per (assessment, question); submitting
/// again overwrites both the raw value and its score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: QuestionId,
    /// Raw answer text as submitted: a number, an option label, a JSON
    /// array of labels, a JSON object, or free text
    pub answer_value: String,
    /// Score on the 0-5 scale, absent when never computed
    pub maturity_score: Option<f64>,
}

/// An answer joined with the question it answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnsweredQuestion {
    pub question: Question,
    pub answer: Answer,
}

impl AnsweredQuestion {
    #[must_use]
    pub const fn dimension(&self) -> Dimension {
        self.question.dimension
    }

    #[must_use]
    pub const fn maturity_score(&self) -> Option<f64> {
        self.answer.maturity_score
    }
}
