//! CLI command handlers.
//!
//! This module provides testable command handlers that are invoked by main.rs.
//! Each handler implements the business logic for a specific CLI subcommand.

mod assessment;
mod catalog;
mod report;
mod score;

pub use assessment::{
    run_answer, run_assessment_clone, run_assessment_create, run_assessment_fields,
    run_assessment_list, run_assessment_notes, run_assessment_tags, run_complete, run_org_create,
    run_org_list, run_recommendation_bulk_status, run_recommendation_status,
};
pub use catalog::{run_init, run_questions};
pub use report::{
    run_anomalies, run_compare, run_history, run_insights, run_notifications, run_org_benchmark,
    run_org_metrics, run_report, run_trend,
};
pub use score::run_score;

use crate::config::AppConfig;
use crate::pipeline::{
    auto_detect_format, should_use_color, write_output, AssessmentService, OutputTarget,
};
use crate::reports::ReportFormat;
use crate::store::SqliteStore;
use anyhow::{Context, Result};
use serde::Serialize;

/// Settings shared by every handler: the effective configuration plus the
/// global output flags.
#[derive(Debug, Clone, Default)]
pub struct CliContext {
    pub config: AppConfig,
    pub quiet: bool,
}

impl CliContext {
    #[must_use]
    pub fn new(config: AppConfig, quiet: bool) -> Self {
        Self { config, quiet }
    }

    pub(crate) fn target(&self) -> OutputTarget {
        OutputTarget::from_option(self.config.output.file.clone())
    }

    pub(crate) fn format(&self) -> ReportFormat {
        auto_detect_format(self.config.output.format, &self.target())
    }

    pub(crate) fn colored(&self) -> bool {
        should_use_color(self.config.output.no_color, &self.target())
    }

    /// Open the configured database and build the service over it.
    pub(crate) fn open_service(&self) -> Result<AssessmentService<SqliteStore>> {
        let path = &self.config.database.path;
        let store = SqliteStore::open(path)
            .with_context(|| format!("Failed to open database {}", path.display()))?;
        let service = AssessmentService::from_config(store, &self.config)?;
        service.ensure_catalog()?;
        Ok(service)
    }

    /// Write `value` as JSON when JSON output is selected, otherwise the
    /// plain-text rendering.
    pub(crate) fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> Result<()> {
        let content = match self.format() {
            ReportFormat::Json => {
                serde_json::to_string_pretty(value).context("Failed to serialize output")?
            }
            _ => text(),
        };
        write_output(content.trim_end(), &self.target(), self.quiet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_format_follows_output_file() {
        let mut ctx = CliContext::default();
        assert_eq!(ctx.format(), ReportFormat::Summary);

        ctx.config.output.file = Some(PathBuf::from("result.json"));
        assert_eq!(ctx.format(), ReportFormat::Json);
        assert!(!ctx.colored());
    }

    #[test]
    fn test_emit_json_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let mut ctx = CliContext::new(AppConfig::default(), true);
        ctx.config.output.file = Some(path.clone());

        ctx.emit(&serde_json::json!({"ok": true}), || "unused".to_string())
            .unwrap();
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(written["ok"], true);
    }
}
