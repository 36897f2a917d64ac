//! Configuration validation for maturity-tools.

use super::types::{AppConfig, CacheConfig, OutputConfig, ScoringConfig, WebhookConfig};

// ============================================================================
// Configuration Error
// ============================================================================

/// Error type for configuration validation.
#[derive(Debug, Clone)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for AppConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.scoring.validate());
        errors.extend(self.cache.validate());
        errors.extend(self.output.validate());
        for (i, webhook) in self.webhooks.iter().enumerate() {
            errors.extend(webhook.validate().into_iter().map(|mut e| {
                e.field = format!("webhooks[{i}].{}", e.field);
                e
            }));
        }
        errors
    }
}

impl Validatable for ScoringConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.history_limit == 0 {
            errors.push(ConfigError {
                field: "scoring.history_limit".to_string(),
                message: "History limit must be at least 1".to_string(),
            });
        }

        if !(0.0..=5.0).contains(&self.benchmark_baseline) {
            errors.push(ConfigError {
                field: "scoring.benchmark_baseline".to_string(),
                message: format!(
                    "Benchmark baseline must be between 0.0 and 5.0, got {}",
                    self.benchmark_baseline
                ),
            });
        }

        for (field, file) in [
            ("scoring.catalog_file", &self.catalog_file),
            ("scoring.rules_file", &self.rules_file),
        ] {
            if let Some(path) = file {
                if !path.exists() {
                    errors.push(ConfigError {
                        field: field.to_string(),
                        message: format!("File not found: {}", path.display()),
                    });
                }
            }
        }

        errors
    }
}

impl Validatable for CacheConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.enabled && self.ttl_secs == 0 {
            errors.push(ConfigError {
                field: "cache.ttl_secs".to_string(),
                message: "TTL must be at least 1 second when the cache is enabled".to_string(),
            });
        }
        errors
    }
}

impl Validatable for OutputConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if let Some(ref file_path) = self.file {
            if let Some(parent) = file_path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    errors.push(ConfigError {
                        field: "output.file".to_string(),
                        message: format!("Parent directory does not exist: {}", parent.display()),
                    });
                }
            }
        }

        errors
    }
}

impl Validatable for WebhookConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            errors.push(ConfigError {
                field: "url".to_string(),
                message: format!("Webhook URL must be http(s), got '{}'", self.url),
            });
        }
        if self.events.is_empty() {
            errors.push(ConfigError {
                field: "events".to_string(),
                message: "Webhook subscribes to no events".to_string(),
            });
        }
        if self.secret.as_deref().is_some_and(str::is_empty) {
            errors.push(ConfigError {
                field: "secret".to_string(),
                message: "Webhook secret must not be empty; omit it to disable signing".to_string(),
            });
        }

        errors
    }
}
