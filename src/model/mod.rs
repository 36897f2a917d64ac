//! Domain model for maturity assessments.
//!
//! Questions belong to one of four [`Dimension`]s. Answers to those
//! questions are scored on a 0-5 maturity scale, aggregated into one
//! [`Score`] per dimension, and turned into [`Finding`]s and
//! [`Recommendation`]s. Everything here is plain data: the scoring and
//! recommendation logic lives in [`crate::scoring`] and [`crate::recommend`].

mod assessment;
mod dimension;
mod question;
mod results;

pub use assessment::*;
pub use dimension::*;
pub use question::*;
pub use results::*;

/// Lowest value on the maturity scale.
pub const MIN_MATURITY: f64 = 0.0;

/// Highest value on the maturity scale.
pub const MAX_MATURITY: f64 = 5.0;

/// Clamp a value onto the maturity scale.
#[must_use]
pub fn clamp_maturity(value: f64) -> f64 {
    value.clamp(MIN_MATURITY, MAX_MATURITY)
}
