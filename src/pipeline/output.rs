//! Output handling for reports.
//!
//! Provides utilities for resolving the output format and writing reports.

use crate::reports::ReportFormat;
use anyhow::{Context, Result};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Target for output - either stdout or a file
#[derive(Debug, Clone)]
pub enum OutputTarget {
    /// Write to stdout
    Stdout,
    /// Write to a file
    File(PathBuf),
}

impl OutputTarget {
    /// Create output target from optional path
    pub fn from_option(path: Option<PathBuf>) -> Self {
        match path {
            Some(p) => Self::File(p),
            None => Self::Stdout,
        }
    }

    /// Check if output is to a terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stdout) && std::io::stdout().is_terminal()
    }
}

/// Resolve `Auto` from the output target.
///
/// Files named `*.json` get JSON, everything else the summary.
pub fn auto_detect_format(format: ReportFormat, target: &OutputTarget) -> ReportFormat {
    match (format, target) {
        (ReportFormat::Auto, OutputTarget::File(path))
            if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")) =>
        {
            ReportFormat::Json
        }
        (other, _) => other.resolve(),
    }
}

/// Determine if color should be used based on flags, environment and target
pub fn should_use_color(no_color_flag: bool, target: &OutputTarget) -> bool {
    !no_color_flag && std::env::var("NO_COLOR").is_err() && target.is_terminal()
}

/// Write output to the target (stdout or file)
pub fn write_output(content: &str, target: &OutputTarget, quiet: bool) -> Result<()> {
    match target {
        OutputTarget::Stdout => {
            println!("{content}");
            Ok(())
        }
        OutputTarget::File(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            if !quiet {
                tracing::info!("Report written to {}", path.display());
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_target_from_option() {
        assert!(matches!(OutputTarget::from_option(None), OutputTarget::Stdout));
        let path = PathBuf::from("/tmp/report.json");
        match OutputTarget::from_option(Some(path.clone())) {
            OutputTarget::File(p) => assert_eq!(p, path),
            OutputTarget::Stdout => panic!("Expected File variant"),
        }
    }

    #[test]
    fn test_auto_detect_format() {
        let json_file = OutputTarget::File(PathBuf::from("out/report.JSON"));
        let text_file = OutputTarget::File(PathBuf::from("out/report.txt"));
        assert_eq!(auto_detect_format(ReportFormat::Auto, &json_file), ReportFormat::Json);
        assert_eq!(auto_detect_format(ReportFormat::Auto, &text_file), ReportFormat::Summary);
        assert_eq!(
            auto_detect_format(ReportFormat::Summary, &json_file),
            ReportFormat::Summary
        );
    }

    #[test]
    fn test_no_color_for_files() {
        let target = OutputTarget::File(PathBuf::from("/tmp/x.txt"));
        assert!(!should_use_color(false, &target));
        assert!(!should_use_color(true, &OutputTarget::Stdout));
    }

    #[test]
    fn test_write_output_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");
        write_output("hello", &OutputTarget::File(path.clone()), true).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "hello");
    }
}
