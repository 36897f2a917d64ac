use super::prioritizer::prioritize;
use super::rules::{Band, RuleTable};
use crate::model::{Recommendation, RecommendationStatus, Score};

/// Turns dimension scores into recommendations using a [`RuleTable`].
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    rules: RuleTable,
}

impl RecommendationEngine {
    #[must_use]
    pub const fn new(rules: RuleTable) -> Self {
        Self { rules }
    }

    #[must_use]
    pub const fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Instantiate templates for every scored dimension.
    ///
    /// Priorities count up from 0 within each dimension in template order.
    /// The result is not yet urgency-ranked; see [`Self::recommend`].
    #[must_use]
    pub fn generate(&self, scores: &[Score]) -> Vec<Recommendation> {
        let mut recommendations = Vec::new();

        for score in scores {
            let band = Band::from_score(score.maturity_score);
            let templates = self.rules.applicable(score.dimension, band);
            tracing::debug!(
                dimension = %score.dimension,
                band = band.as_str(),
                templates = templates.len(),
                "selected recommendation templates"
            );

            recommendations.extend(templates.into_iter().zip(0_i64..).map(|(t, priority)| {
                Recommendation {
                    id: None,
                    dimension: score.dimension,
                    title: t.title.clone(),
                    description: t.description.clone(),
                    effort: t.effort,
                    impact: t.impact,
                    kpi: t.kpi.clone(),
                    timeline: t.timeline,
                    priority,
                    status: RecommendationStatus::Pending,
                }
            }));
        }

        recommendations
    }

    /// Generate and prioritize recommendations, most urgent first.
    #[must_use]
    pub fn recommend(&self, scores: &[Score]) -> Vec<Recommendation> {
        prioritize(self.generate(scores), scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Dimension;

    fn engine() -> RecommendationEngine {
        RecommendationEngine::new(RuleTable::builtin().unwrap())
    }

    fn score(dimension: Dimension, maturity: f64) -> Score {
        Score {
            dimension,
            maturity_score: maturity,
            weighted_score: maturity,
            max_possible_score: 5.0,
            percentage: maturity * 20.0,
        }
    }

    #[test]
    fn test_generate_low_band_template_order() {
        let recs = engine().generate(&[score(Dimension::FailureResilience, 1.0)]);
        let got: Vec<_> = recs.iter().map(|r| (r.title.as_str(), r.priority)).collect();
        assert_eq!(
            got,
            vec![
                ("Implement High Availability Architecture", 0),
                ("Establish Disaster Recovery Plan", 1),
                ("Implement Fault Isolation", 2),
            ]
        );
        assert!(recs.iter().all(|r| r.status == RecommendationStatus::Pending));
    }

    #[test]
    fn test_priorities_restart_per_dimension() {
        let recs = engine().generate(&[
            score(Dimension::Performance, 3.0),
            score(Dimension::InfrastructureEfficiency, 1.0),
        ]);
        assert_eq!(recs.len(), 5);
        assert_eq!(recs[0].title, "Optimize Critical Paths");
        assert_eq!(recs[3].dimension, Dimension::InfrastructureEfficiency);
        assert_eq!(recs[3].priority, 0);
    }

    #[test]
    fn test_generation_is_repeatable() {
        let engine = engine();
        let scores = [score(Dimension::Performance, 3.0)];
        let first = engine.generate(&scores);
        let second = engine.generate(&scores);
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn test_recommend_ranks_weak_dimension_first() {
        let recs = engine().recommend(&[
            score(Dimension::Performance, 4.0),
            score(Dimension::ProductionReadiness, 1.0),
        ]);
        assert_eq!(recs[0].dimension, Dimension::ProductionReadiness);
        assert!(recs.windows(2).all(|w| w[0].priority <= w[1].priority));
    }
}
