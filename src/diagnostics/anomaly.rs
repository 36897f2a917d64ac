//! Statistical anomaly detection over an organization's score history.
//!
//! Three checks run against the current assessment:
//!
//! - **regression**: a dimension fell more than two standard deviations
//!   below its historical mean
//! - **unusual improvement**: a dimension rose more than two standard
//!   deviations above it, which often means inconsistent answering
//! - **dimension imbalance**: the spread between the strongest and weakest
//!   dimension exceeds two maturity points

use crate::model::{Dimension, HistoricalAssessment, Score, Severity};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Deviations (in standard deviations) that make a score anomalous.
pub const ANOMALY_SIGMAS: f64 = 2.0;

/// Deviations below the mean that make a regression high severity.
pub const SEVERE_REGRESSION_SIGMAS: f64 = 3.0;

/// Standard deviation substituted when the history is perfectly flat, so a
/// drop from a constant score still registers. Any nonzero spread is used
/// as measured.
pub const FLAT_HISTORY_STDEV: f64 = 0.1;

/// Maximum allowed spread between dimensions before flagging imbalance.
pub const IMBALANCE_SPREAD: f64 = 2.0;

const MIN_HISTORY_POINTS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    Regression,
    UnusualImprovement,
    DimensionImbalance,
}

/// What an anomaly refers to: one dimension or the assessment as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnomalyScope {
    Dimension(Dimension),
    All,
}

impl Serialize for AnomalyScope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Dimension(d) => serializer.serialize_str(d.as_str()),
            Self::All => serializer.serialize_str("all"),
        }
    }
}

impl std::fmt::Display for AnomalyScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dimension(d) => write!(f, "{d}"),
            Self::All => f.write_str("all"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Anomaly {
    #[serde(rename = "type")]
    pub kind: AnomalyKind,
    #[serde(rename = "dimension")]
    pub scope: AnomalyScope,
    pub severity: Severity,
    pub message: String,
    pub recommendation: String,
    /// Heuristic confidence in 0.0-1.0
    pub confidence: f64,
}

/// Detect anomalies in `current` against prior completed assessments.
///
/// `history` should hold the organization's most recent completed
/// assessments, excluding the current one. Dimensions with fewer than two
/// historical points are not checked for regressions or improvements.
#[must_use]
pub fn detect_anomalies(current: &[Score], history: &[HistoricalAssessment]) -> Vec<Anomaly> {
    if current.is_empty() {
        return Vec::new();
    }

    let mut by_dimension: BTreeMap<Dimension, Vec<f64>> = BTreeMap::new();
    for past in history {
        for score in &past.scores {
            by_dimension
                .entry(score.dimension)
                .or_default()
                .push(score.maturity_score);
        }
    }

    let mut anomalies: Vec<Anomaly> = current
        .iter()
        .filter_map(|score| {
            let values = by_dimension.get(&score.dimension)?;
            check_deviation(score.dimension, score.maturity_score, values)
        })
        .collect();

    anomalies.extend(check_imbalance(current));

    tracing::debug!(
        count = anomalies.len(),
        history = history.len(),
        "anomaly detection finished"
    );
    anomalies
}

fn check_deviation(dimension: Dimension, current: f64, values: &[f64]) -> Option<Anomaly> {
    if values.len() < MIN_HISTORY_POINTS {
        return None;
    }
    let mean = mean(values);
    let stdev = sample_stdev(values, mean);
    let sigma = if stdev == 0.0 { FLAT_HISTORY_STDEV } else { stdev };

    if current < mean - ANOMALY_SIGMAS * sigma {
        let severity = if current < mean - SEVERE_REGRESSION_SIGMAS * sigma {
            Severity::High
        } else {
            Severity::Medium
        };
        let drop_pct = (mean - current) / mean * 100.0;
        Some(Anomaly {
            kind: AnomalyKind::Regression,
            scope: AnomalyScope::Dimension(dimension),
            severity,
            message: format!(
                "Significant regression detected in {dimension}. Current score ({current:.2}) is {drop_pct:.1}% below historical average ({mean:.2})."
            ),
            recommendation:
                "Immediate investigation recommended. Review recent changes and operational incidents."
                    .to_string(),
            confidence: regression_confidence(mean, current, stdev),
        })
    } else if current > mean + ANOMALY_SIGMAS * sigma {
        let relative = if mean > 0.0 {
            format!("{:.1}% above", (current - mean) / mean * 100.0)
        } else {
            "above".to_string()
        };
        Some(Anomaly {
            kind: AnomalyKind::UnusualImprovement,
            scope: AnomalyScope::Dimension(dimension),
            severity: Severity::Low,
            message: format!(
                "Unusually large improvement in {dimension}. Current score ({current:.2}) is {relative} historical average ({mean:.2})."
            ),
            recommendation:
                "Verify assessment accuracy. Such rapid improvements may indicate assessment inconsistencies."
                    .to_string(),
            confidence: 0.6,
        })
    } else {
        None
    }
}

fn check_imbalance(current: &[Score]) -> Option<Anomaly> {
    if current.len() < 2 {
        return None;
    }
    let max = current
        .iter()
        .map(|s| s.maturity_score)
        .fold(f64::NEG_INFINITY, f64::max);
    let min = current
        .iter()
        .map(|s| s.maturity_score)
        .fold(f64::INFINITY, f64::min);
    let spread = max - min;
    if spread <= IMBALANCE_SPREAD {
        return None;
    }

    Some(Anomaly {
        kind: AnomalyKind::DimensionImbalance,
        scope: AnomalyScope::All,
        severity: Severity::Medium,
        message: format!(
            "Significant dimension imbalance detected. Score range: {min:.2} - {max:.2} (difference: {spread:.2})."
        ),
        recommendation: "Focus on bringing weaker dimensions to parity with stronger ones for balanced engineering maturity.".to_string(),
        confidence: 0.85,
    })
}

/// min(0.95, 0.7 + |mean - current| / (stdev + 0.1) x 0.1)
fn regression_confidence(mean: f64, current: f64, stdev: f64) -> f64 {
    (0.7 + (mean - current).abs() / (stdev + 0.1) * 0.1).min(0.95)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
fn sample_stdev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn score(dimension: Dimension, maturity: f64) -> Score {
        Score {
            dimension,
            maturity_score: maturity,
            weighted_score: maturity,
            max_possible_score: 5.0,
            percentage: maturity * 20.0,
        }
    }

    fn history(values: &[f64]) -> Vec<HistoricalAssessment> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| HistoricalAssessment {
                assessment_id: i as i64 + 1,
                name: format!("Q{i}"),
                created_at: Utc::now(),
                scores: vec![score(Dimension::Performance, v)],
            })
            .collect()
    }

    #[test]
    fn test_regression_from_flat_history() {
        let anomalies = detect_anomalies(
            &[score(Dimension::Performance, 1.0)],
            &history(&[4.0, 4.0, 4.0]),
        );
        assert_eq!(anomalies.len(), 1);
        let a = &anomalies[0];
        assert_eq!(a.kind, AnomalyKind::Regression);
        assert_eq!(a.severity, Severity::High);
        assert_eq!(a.scope, AnomalyScope::Dimension(Dimension::Performance));
        assert_eq!(a.confidence, 0.95);
        assert!(a.message.contains("75.0% below"));
    }

    #[test]
    fn test_flat_history_unchanged_score_is_quiet() {
        let anomalies = detect_anomalies(
            &[score(Dimension::Performance, 4.0)],
            &history(&[4.0, 4.0, 4.0]),
        );
        assert!(anomalies.is_empty());
    }

    #[test]
    fn test_near_flat_history_uses_measured_stdev() {
        // mean 4.025, sample stdev ~0.0354: 3 sigma bound ~3.919
        let anomalies = detect_anomalies(
            &[score(Dimension::Performance, 3.9)],
            &history(&[4.0, 4.05]),
        );
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].kind, AnomalyKind::Regression);
        assert_eq!(anomalies[0].severity, Severity::High);
    }

    #[test]
    fn test_medium_regression_and_confidence() {
        // mean 3.0, sample stdev ~0.577: 2 sigma bound ~1.845, 3 sigma ~1.268
        let anomalies = detect_anomalies(
            &[score(Dimension::Performance, 1.7)],
            &history(&[3.5, 2.5, 3.5, 2.5]),
        );
        assert_eq!(anomalies.len(), 1);
        let a = &anomalies[0];
        assert_eq!(a.kind, AnomalyKind::Regression);
        assert_eq!(a.severity, Severity::Medium);

        let stdev = (1.0_f64 / 3.0).sqrt();
        let expected = (0.7 + 1.3 / (stdev + 0.1) * 0.1).min(0.95);
        assert!((a.confidence - expected).abs() < 1e-9);
    }

    #[test]
    fn test_unusual_improvement() {
        let anomalies = detect_anomalies(
            &[score(Dimension::Performance, 4.8)],
            &history(&[2.0, 2.2, 2.1]),
        );
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].kind, AnomalyKind::UnusualImprovement);
        assert_eq!(anomalies[0].severity, Severity::Low);
        assert_eq!(anomalies[0].confidence, 0.6);
    }

    #[test]
    fn test_single_history_point_is_not_enough() {
        let anomalies = detect_anomalies(&[score(Dimension::Performance, 0.5)], &history(&[4.5]));
        assert!(anomalies.is_empty());
    }

    #[test]
    fn test_dimension_imbalance() {
        let current = [
            score(Dimension::Performance, 1.0),
            score(Dimension::FailureResilience, 3.5),
        ];
        let anomalies = detect_anomalies(&current, &[]);
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].kind, AnomalyKind::DimensionImbalance);
        assert_eq!(anomalies[0].scope, AnomalyScope::All);
        assert_eq!(anomalies[0].confidence, 0.85);

        let balanced = [
            score(Dimension::Performance, 1.0),
            score(Dimension::FailureResilience, 3.0),
        ];
        assert!(detect_anomalies(&balanced, &[]).is_empty());
    }

    #[test]
    fn test_scope_serializes_as_string() {
        let json = serde_json::to_value(AnomalyScope::All).unwrap();
        assert_eq!(json, "all");
        let json = serde_json::to_value(AnomalyScope::Dimension(Dimension::Performance)).unwrap();
        assert_eq!(json, "performance");
    }
}
