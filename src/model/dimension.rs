//! Assessment dimensions and question types.

use crate::error::AssessError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the four areas an assessment measures.
///
/// Variant order is the canonical reporting order and the order in which
/// scores are aggregated and recommendations generated.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Performance,
    ProductionReadiness,
    InfrastructureEfficiency,
    FailureResilience,
}

impl Dimension {
    /// All dimensions in canonical order.
    pub const ALL: [Self; 4] = [
        Self::Performance,
        Self::ProductionReadiness,
        Self::InfrastructureEfficiency,
        Self::FailureResilience,
    ];

    /// Stable identifier used in storage and serialized output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Performance => "performance",
            Self::ProductionReadiness => "production_readiness",
            Self::InfrastructureEfficiency => "infrastructure_efficiency",
            Self::FailureResilience => "failure_resilience",
        }
    }

    /// Human-readable name, e.g. "Production Readiness".
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Performance => "Performance",
            Self::ProductionReadiness => "Production Readiness",
            Self::InfrastructureEfficiency => "Infrastructure Efficiency",
            Self::FailureResilience => "Failure Resilience",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = AssessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AssessError::validation(format!("unknown dimension '{s}'")))
    }
}

/// How a question is answered, which decides its default scoring rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    SingleSelect,
    MultiSelect,
    Numeric,
    FreeText,
}

impl QuestionType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SingleSelect => "single_select",
            Self::MultiSelect => "multi_select",
            Self::Numeric => "numeric",
            Self::FreeText => "free_text",
        }
    }

    /// Whether answers are chosen from a fixed option list.
    #[must_use]
    pub const fn is_select(self) -> bool {
        matches!(self, Self::SingleSelect | Self::MultiSelect)
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = AssessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "single_select" => Ok(Self::SingleSelect),
            "multi_select" => Ok(Self::MultiSelect),
            "numeric" => Ok(Self::Numeric),
            "free_text" => Ok(Self::FreeText),
            other => Err(AssessError::validation(format!(
                "unknown question type '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_roundtrips_through_str() {
        for dim in Dimension::ALL {
            assert_eq!(dim.as_str().parse::<Dimension>().unwrap(), dim);
        }
        assert!("reliability".parse::<Dimension>().is_err());
    }

    #[test]
    fn test_dimension_order_is_canonical() {
        let mut dims = vec![
            Dimension::FailureResilience,
            Dimension::Performance,
            Dimension::InfrastructureEfficiency,
        ];
        dims.sort();
        assert_eq!(dims[0], Dimension::Performance);
        assert_eq!(dims[2], Dimension::FailureResilience);
    }

    #[test]
    fn test_dimension_serde_uses_snake_case() {
        let json = serde_json::to_string(&Dimension::ProductionReadiness).unwrap();
        assert_eq!(json, "\"production_readiness\"");
    }

    #[test]
    fn test_question_type_select() {
        assert!(QuestionType::SingleSelect.is_select());
        assert!(QuestionType::MultiSelect.is_select());
        assert!(!QuestionType::Numeric.is_select());
    }
}
