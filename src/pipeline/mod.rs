//! Orchestration of the scoring pipeline.
//!
//! [`AssessmentService`] runs score → findings → recommendations →
//! prioritization over an [`AssessmentStore`](crate::store::AssessmentStore)
//! and exposes the diagnostics on top. [`score_workbook`] runs the same
//! pipeline over an answer file without a database.

mod output;
mod service;
mod workbook;

pub use output::{auto_detect_format, should_use_color, write_output, OutputTarget};
pub use service::{
    AssessmentComparison, AssessmentService, BulkStatusOutcome, CompletionOutcome,
    COMPLETION_NOTIFICATION_KIND,
};
pub use workbook::{score_workbook, Workbook, WorkbookResult};

/// Exit codes for CI/CD integration
pub mod exit_codes {
    /// Success
    pub const SUCCESS: i32 = 0;
    /// Overall maturity is below the requested minimum
    pub const BELOW_THRESHOLD: i32 = 1;
    /// An error occurred
    pub const ERROR: i32 = 3;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_values() {
        assert_eq!(exit_codes::SUCCESS, 0);
        assert_eq!(exit_codes::BELOW_THRESHOLD, 1);
        assert_eq!(exit_codes::ERROR, 3);
    }
}
