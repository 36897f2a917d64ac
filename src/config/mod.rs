//! Configuration module for maturity-tools.
//!
//! This module provides:
//! - Type-safe configuration structures with defaults
//! - Validation for all configuration values
//! - YAML config file loading and discovery
//! - CLI argument merging
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use maturity_tools::config::AppConfig;
//!
//! let config = AppConfig::builder()
//!     .database_path("assessments.db")
//!     .history_limit(8)
//!     .build();
//!
//! // Load from file
//! use maturity_tools::config::file::load_or_default;
//! let (config, loaded_from) = load_or_default(None);
//! ```
//!
//! # Configuration File
//!
//! Place a `.maturity-tools.yaml` file in your project root or
//! `~/.config/maturity-tools/`:
//!
//! ```yaml
//! database:
//!   path: maturity.db
//! scoring:
//!   history_limit: 5
//! ```

mod defaults;
pub mod file;
mod types;
mod validation;

pub use defaults::{
    DEFAULT_BENCHMARK_BASELINE, DEFAULT_CACHE_TTL_SECS, DEFAULT_DATABASE_PATH, DEFAULT_HISTORY_LIMIT, DEFAULT_WEBHOOK_EVENT,
    DEFAULT_WEBHOOK_TIMEOUT_SECS,
};
pub use types::{
    AppConfig, AppConfigBuilder, CacheConfig, DatabaseConfig, OutputConfig, ScoringConfig,
    WebhookConfig,
};
pub use validation::{ConfigError, Validatable};

pub use file::{
    discover_config_file, generate_example_config, generate_full_example_config, load_config_file,
    load_or_default, user_config_dir, ConfigFileError, CONFIG_FILE_NAMES,
};

/// Generate a JSON Schema for the `AppConfig` configuration format.
///
/// Documents every option of `.maturity-tools.yaml` for editor validation
/// and autocompletion.
pub fn generate_json_schema() -> Result<String, serde_json::Error> {
    let schema = schemars::schema_for!(AppConfig);
    serde_json::to_string_pretty(&schema)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_lists_sections() {
        let schema = generate_json_schema().unwrap();
        for section in ["database", "scoring", "cache", "output", "webhooks"] {
            assert!(schema.contains(section), "schema missing {section}");
        }
    }
}
