//! Configuration file loading and discovery.
//!
//! Supports loading configuration from YAML files with automatic discovery.

use super::defaults::{DEFAULT_BENCHMARK_BASELINE, DEFAULT_DATABASE_PATH, DEFAULT_HISTORY_LIMIT};
use super::types::AppConfig;
use crate::reports::ReportFormat;
use std::path::{Path, PathBuf};

// ============================================================================
// Configuration File Discovery
// ============================================================================

/// Standard config file names to search for.
pub const CONFIG_FILE_NAMES: &[&str] = &[
    ".maturity-tools.yaml",
    ".maturity-tools.yml",
    "maturity-tools.yaml",
    "maturity-tools.yml",
];

/// Discover a config file by searching standard locations.
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Current directory
/// 3. Git repository root (if in a repo)
/// 4. User config directory (~/.config/maturity-tools/)
/// 5. Home directory
#[must_use]
pub fn discover_config_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        if path.exists() {
            return Some(path.to_path_buf());
        }
    }

    if let Some(path) = std::env::current_dir()
        .ok()
        .and_then(|cwd| find_config_in_dir(&cwd))
    {
        return Some(path);
    }

    if let Some(path) = find_git_root().and_then(|root| find_config_in_dir(&root)) {
        return Some(path);
    }

    if let Some(path) = user_config_dir().and_then(|dir| find_config_in_dir(&dir)) {
        return Some(path);
    }

    dirs::home_dir().and_then(|home| find_config_in_dir(&home))
}

/// Per-user configuration directory.
#[must_use]
pub fn user_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("maturity-tools"))
}

/// Find a config file in a specific directory.
fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Find the git repository root by walking up the directory tree.
fn find_git_root() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    let mut current = cwd.as_path();

    loop {
        if current.join(".git").exists() {
            return Some(current.to_path_buf());
        }
        current = current.parent()?;
    }
}

// ============================================================================
// Configuration File Loading
// ============================================================================

/// Error type for config file operations.
#[derive(Debug)]
pub enum ConfigFileError {
    /// File not found
    NotFound(PathBuf),
    /// IO error reading file
    Io(std::io::Error),
    /// YAML parsing error
    Parse(serde_yaml::Error),
}

impl std::fmt::Display for ConfigFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => {
                write!(f, "Config file not found: {}", path.display())
            }
            Self::Io(e) => write!(f, "Failed to read config file: {e}"),
            Self::Parse(e) => write!(f, "Failed to parse config file: {e}"),
        }
    }
}

impl std::error::Error for ConfigFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigFileError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_yaml::Error> for ConfigFileError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Parse(err)
    }
}

/// Load an `AppConfig` from a YAML file.
pub fn load_config_file(path: &Path) -> Result<AppConfig, ConfigFileError> {
    if !path.exists() {
        return Err(ConfigFileError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    // An empty file deserializes to YAML null, not to an empty mapping.
    if content.trim().is_empty() {
        return Ok(AppConfig::default());
    }
    let config: AppConfig = serde_yaml::from_str(&content)?;
    Ok(config)
}

/// Load config from discovered file, or return default.
#[must_use]
pub fn load_or_default(explicit_path: Option<&Path>) -> (AppConfig, Option<PathBuf>) {
    discover_config_file(explicit_path).map_or_else(
        || (AppConfig::default(), None),
        |path| match load_config_file(&path) {
            Ok(config) => (config, Some(path)),
            Err(e) => {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                (AppConfig::default(), None)
            }
        },
    )
}

// ============================================================================
// Configuration Merging
// ============================================================================

impl AppConfig {
    /// Merge another config into this one, with `other` taking precedence.
    ///
    /// Only values that differ from the defaults override, which is how CLI
    /// flags are layered over file config.
    pub fn merge(&mut self, other: &Self) {
        if other.database.path != Path::new(DEFAULT_DATABASE_PATH) {
            self.database.path.clone_from(&other.database.path);
        }

        if other.scoring.history_limit != DEFAULT_HISTORY_LIMIT {
            self.scoring.history_limit = other.scoring.history_limit;
        }
        if other.scoring.catalog_file.is_some() {
            self.scoring.catalog_file.clone_from(&other.scoring.catalog_file);
        }
        if other.scoring.rules_file.is_some() {
            self.scoring.rules_file.clone_from(&other.scoring.rules_file);
        }
        if other.scoring.extended_catalog {
            self.scoring.extended_catalog = true;
        }
        if (other.scoring.benchmark_baseline - DEFAULT_BENCHMARK_BASELINE).abs() > f64::EPSILON {
            self.scoring.benchmark_baseline = other.scoring.benchmark_baseline;
        }

        if !other.cache.enabled {
            self.cache.enabled = false;
        }

        if other.output.format != ReportFormat::Auto {
            self.output.format = other.output.format;
        }
        if other.output.file.is_some() {
            self.output.file.clone_from(&other.output.file);
        }
        if other.output.no_color {
            self.output.no_color = true;
        }

        self.webhooks.extend(other.webhooks.iter().cloned());
    }

    /// Load from file and merge with CLI overrides.
    #[must_use]
    pub fn from_file_with_overrides(
        config_path: Option<&Path>,
        cli_overrides: &Self,
    ) -> (Self, Option<PathBuf>) {
        let (mut config, loaded_from) = load_or_default(config_path);
        config.merge(cli_overrides);
        (config, loaded_from)
    }
}

// ============================================================================
// Example Config Generation
// ============================================================================

/// Generate an example config file content from the defaults.
#[must_use]
pub fn generate_example_config() -> String {
    let example = AppConfig::default();
    format!(
        r"# maturity-tools configuration
# Place this file at .maturity-tools.yaml in your project root or ~/.config/maturity-tools/

{}
",
        serde_yaml::to_string(&example).unwrap_or_default()
    )
}

/// Generate a commented example config with all options.
#[must_use]
pub fn generate_full_example_config() -> String {
    r"# maturity-tools configuration file
# ==================================
#
# Place it at:
#   - .maturity-tools.yaml in your project root
#   - ~/.config/maturity-tools/maturity-tools.yaml for global config
#
# CLI arguments always override file settings.

database:
  # SQLite database file, created on first use
  path: maturity.db

scoring:
  # Completed assessments compared when detecting anomalies
  history_limit: 5
  # Replace the built-in 28-question catalog
  # catalog_file: ./questions.yaml
  # Append the 40 extended questions to the built-in catalog
  extended_catalog: false
  # Industry maturity used by `org benchmark`
  benchmark_baseline: 3.0
  # Replace the built-in recommendation rules
  # rules_file: ./rules.yaml

cache:
  enabled: true
  ttl_secs: 300

output:
  # Format: auto, json, summary
  format: auto
  # Output file path (omit for stdout)
  # file: report.json
  no_color: false

# Webhooks called after an assessment completes
# webhooks:
#   - url: https://hooks.example.com/maturity
#     events: [assessment.completed]
#     organization_id: 1
#     # Signs deliveries with X-Webhook-Signature: sha256=<hex>
#     secret: change-me
#     active: true
"
    .to_string()
}

// ============================================================================
// Tests
// ============================================================================
