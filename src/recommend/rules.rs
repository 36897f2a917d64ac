//! Recommendation rule table: (dimension, band) to templates.

use crate::error::{AssessError, ErrorContext, Result};
use crate::model::{Dimension, Level, Timeline};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

const BUILTIN_RULES: &str = include_str!("rules.yaml");

/// Upper bound (exclusive) of the low band.
pub const LOW_BAND_CEILING: f64 = 2.5;

/// Upper bound (exclusive) of the medium band.
pub const MEDIUM_BAND_CEILING: f64 = 3.5;

/// Maturity band of a dimension score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Low,
    Medium,
    High,
}

impl Band {
    /// Classify a score: below 2.5 is low, below 3.5 medium, otherwise high.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score < LOW_BAND_CEILING {
            Self::Low
        } else if score < MEDIUM_BAND_CEILING {
            Self::Medium
        } else {
            Self::High
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// A recommendation before it is bound to an assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationTemplate {
    pub title: String,
    pub description: String,
    pub effort: Level,
    pub impact: Level,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kpi: Option<String>,
    pub timeline: Timeline,
}

/// Templates of one dimension, per band.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandRules {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub low: Vec<RecommendationTemplate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub medium: Vec<RecommendationTemplate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub high: Vec<RecommendationTemplate>,
}

impl BandRules {
    #[must_use]
    pub fn band(&self, band: Band) -> &[RecommendationTemplate] {
        match band {
            Band::Low => &self.low,
            Band::Medium => &self.medium,
            Band::High => &self.high,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
struct RuleFile {
    rules: BTreeMap<Dimension, BandRules>,
}

/// Immutable lookup table of recommendation templates.
///
/// Lookups hand out borrowed templates; generating recommendations never
/// changes the table, so repeated runs over the same scores agree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleTable {
    rules: BTreeMap<Dimension, BandRules>,
}

impl RuleTable {
    #[must_use]
    pub fn new(rules: BTreeMap<Dimension, BandRules>) -> Self {
        Self { rules }
    }

    /// The built-in rule table.
    pub fn builtin() -> Result<Self> {
        Self::from_yaml_str(BUILTIN_RULES).context("loading built-in rules")
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let file: RuleFile = serde_yaml::from_str(content)?;
        Ok(Self::new(file.rules))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| AssessError::io(path, e))?;
        let table = Self::from_yaml_str(&content)
            .with_context(|| format!("parsing rules {}", path.display()))?;
        tracing::info!(
            "Loaded {} recommendation templates from {}",
            table.len(),
            path.display()
        );
        Ok(table)
    }

    /// Load from `path` when given, otherwise use the built-in table.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::builtin(),
        }
    }

    /// Templates registered for exactly this dimension and band.
    #[must_use]
    pub fn templates(&self, dimension: Dimension, band: Band) -> &[RecommendationTemplate] {
        self.rules
            .get(&dimension)
            .map_or(&[][..], |rules| rules.band(band))
    }

    /// Templates that apply to a dimension in `band`, in table order.
    ///
    /// Medium and high bands also receive the low-band templates, after
    /// their own, so foundational gaps stay visible.
    #[must_use]
    pub fn applicable(&self, dimension: Dimension, band: Band) -> Vec<&RecommendationTemplate> {
        let mut templates: Vec<_> = self.templates(dimension, band).iter().collect();
        if band != Band::Low {
            templates.extend(self.templates(dimension, Band::Low));
        }
        templates
    }

    /// Total number of templates across all dimensions and bands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules
            .values()
            .map(|r| r.low.len() + r.medium.len() + r.high.len())
            .sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_boundaries() {
        assert_eq!(Band::from_score(2.49999), Band::Low);
        assert_eq!(Band::from_score(2.5), Band::Medium);
        assert_eq!(Band::from_score(3.49), Band::Medium);
        assert_eq!(Band::from_score(3.5), Band::High);
        assert_eq!(Band::from_score(0.0), Band::Low);
    }

    #[test]
    fn test_builtin_table_contents() {
        let table = RuleTable::builtin().unwrap();
        assert_eq!(table.len(), 11);
        assert_eq!(table.templates(Dimension::Performance, Band::Low).len(), 2);
        assert_eq!(table.templates(Dimension::Performance, Band::Medium).len(), 1);
        assert!(table.templates(Dimension::FailureResilience, Band::High).is_empty());

        let first = &table.templates(Dimension::ProductionReadiness, Band::Low)[0];
        assert_eq!(first.title, "Define and Implement SLOs");
        assert_eq!(first.timeline, Timeline::Days30);
    }

    #[test]
    fn test_applicable_appends_low_band_for_higher_bands() {
        let table = RuleTable::builtin().unwrap();

        let medium: Vec<_> = table
            .applicable(Dimension::Performance, Band::Medium)
            .iter()
            .map(|t| t.title.as_str())
            .collect();
        assert_eq!(
            medium,
            vec![
                "Optimize Critical Paths",
                "Implement Performance Monitoring",
                "Identify and Resolve Bottlenecks",
            ]
        );

        // High band has no own templates but still surfaces the low ones.
        assert_eq!(table.applicable(Dimension::FailureResilience, Band::High).len(), 3);
    }

    #[test]
    fn test_lookup_leaves_table_unchanged() {
        let table = RuleTable::builtin().unwrap();
        let before = table.clone();
        for _ in 0..3 {
            let _ = table.applicable(Dimension::Performance, Band::High);
        }
        assert_eq!(table, before);
        assert_eq!(table.templates(Dimension::Performance, Band::High).len(), 0);
    }

    #[test]
    fn test_custom_table_from_yaml() {
        let yaml = r#"
rules:
  performance:
    high:
      - title: "Keep It Up"
        description: "Maintain current practices."
        effort: low
        impact: low
        timeline: 90
"#;
        let table = RuleTable::from_yaml_str(yaml).unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.templates(Dimension::ProductionReadiness, Band::Low).is_empty());
        assert_eq!(table.templates(Dimension::Performance, Band::High)[0].kpi, None);
    }
}
