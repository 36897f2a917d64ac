//! Report generation for scored assessments.
//!
//! Two output formats are provided:
//! - JSON: Structured data for programmatic integration
//! - Summary: Compact human-readable terminal output

mod json;
mod summary;
mod types;

pub use json::JsonReporter;
pub use summary::SummaryReporter;
pub use types::{AssessmentReport, ReportFormat};

use std::io::Write;
use thiserror::Error;

/// Errors that can occur during report generation
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Format error: {0}")]
    FormatError(#[from] std::fmt::Error),
}

/// Trait for report generators
pub trait ReportGenerator {
    /// Render a report for one assessment
    fn generate(&self, report: &AssessmentReport) -> Result<String, ReportError>;

    /// Write report to a writer
    fn write_report(
        &self,
        report: &AssessmentReport,
        writer: &mut dyn Write,
    ) -> Result<(), ReportError> {
        let rendered = self.generate(report)?;
        writer.write_all(rendered.as_bytes())?;
        Ok(())
    }

    /// Get the format this generator produces
    fn format(&self) -> ReportFormat;
}

/// Create a report generator for the given format
#[must_use]
pub fn create_reporter(format: ReportFormat) -> Box<dyn ReportGenerator> {
    create_reporter_with_options(format, true)
}

/// Create a report generator with color control
#[must_use]
pub fn create_reporter_with_options(format: ReportFormat, colored: bool) -> Box<dyn ReportGenerator> {
    match format.resolve() {
        ReportFormat::Json => Box::new(JsonReporter::new()),
        _ => {
            let reporter = SummaryReporter::new();
            if colored {
                Box::new(reporter)
            } else {
                Box::new(reporter.no_color())
            }
        }
    }
}
