//! Recommendation generation and prioritization.
//!
//! Each scored dimension is classified into a [`Band`]; the [`RuleTable`]
//! supplies the templates for that (dimension, band) pair, and the
//! [`prioritizer`] re-ranks the instantiated recommendations.

mod engine;
pub mod prioritizer;
mod rules;

pub use engine::RecommendationEngine;
pub use prioritizer::{adaptive_priority, prioritize};
pub use rules::{
    Band, BandRules, RecommendationTemplate, RuleTable, LOW_BAND_CEILING, MEDIUM_BAND_CEILING,
};
