//! Configuration types for maturity-tools.

use super::defaults::{
    DEFAULT_BENCHMARK_BASELINE, DEFAULT_CACHE_TTL_SECS, DEFAULT_DATABASE_PATH,
    DEFAULT_HISTORY_LIMIT, DEFAULT_WEBHOOK_EVENT,
};
use crate::model::OrganizationId;
use crate::reports::ReportFormat;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// Unified Application Configuration
// ============================================================================

/// Unified application configuration that can be loaded from CLI args or config files.
///
/// Every section has defaults, so an empty file (or no file) is a valid
/// configuration. CLI arguments override file settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppConfig {
    /// Database location and behavior
    pub database: DatabaseConfig,
    /// Scoring inputs and analysis windows
    pub scoring: ScoringConfig,
    /// Summary cache settings
    pub cache: CacheConfig,
    /// Output configuration (format, file, colors)
    pub output: OutputConfig,
    /// Webhook subscriptions notified on assessment events
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub webhooks: Vec<WebhookConfig>,
}

impl AppConfig {
    /// Create a new `AppConfig` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an `AppConfig` builder.
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }
}

// ============================================================================
// Builder for AppConfig
// ============================================================================

/// Builder for constructing `AppConfig` with fluent API.
#[derive(Debug, Default)]
#[must_use]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    /// Set the database file.
    pub fn database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.database.path = path.into();
        self
    }

    /// Set how many past assessments anomaly detection compares against.
    pub const fn history_limit(mut self, limit: usize) -> Self {
        self.config.scoring.history_limit = limit;
        self
    }

    /// Replace the built-in question catalog.
    pub fn catalog_file(mut self, file: Option<PathBuf>) -> Self {
        self.config.scoring.catalog_file = file;
        self
    }

    /// Append the extended questions to the built-in catalog.
    pub const fn extended_catalog(mut self, enabled: bool) -> Self {
        self.config.scoring.extended_catalog = enabled;
        self
    }

    /// Set the maturity organizations are benchmarked against.
    pub const fn benchmark_baseline(mut self, baseline: f64) -> Self {
        self.config.scoring.benchmark_baseline = baseline;
        self
    }

    /// Replace the built-in recommendation rules.
    pub fn rules_file(mut self, file: Option<PathBuf>) -> Self {
        self.config.scoring.rules_file = file;
        self
    }

    /// Enable or disable the summary cache.
    pub const fn cache_enabled(mut self, enabled: bool) -> Self {
        self.config.cache.enabled = enabled;
        self
    }

    /// Set the summary cache TTL.
    pub const fn cache_ttl_secs(mut self, secs: u64) -> Self {
        self.config.cache.ttl_secs = secs;
        self
    }

    /// Set the output format.
    pub const fn output_format(mut self, format: ReportFormat) -> Self {
        self.config.output.format = format;
        self
    }

    /// Set the output file.
    pub fn output_file(mut self, file: Option<PathBuf>) -> Self {
        self.config.output.file = file;
        self
    }

    /// Disable colored output.
    pub const fn no_color(mut self, no_color: bool) -> Self {
        self.config.output.no_color = no_color;
        self
    }

    /// Add a webhook subscription.
    pub fn webhook(mut self, webhook: WebhookConfig) -> Self {
        self.config.webhooks.push(webhook);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> AppConfig {
        self.config
    }
}

// ============================================================================
// Sub-configuration Types
// ============================================================================

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database file (created on first use)
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DATABASE_PATH),
        }
    }
}

/// Scoring configuration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ScoringConfig {
    /// Number of past completed assessments compared during anomaly detection
    #[schemars(range(min = 1))]
    pub history_limit: usize,
    /// Question catalog YAML/JSON file replacing the built-in catalog
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_file: Option<PathBuf>,
    /// Recommendation rule YAML file replacing the built-in rules
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules_file: Option<PathBuf>,
    /// Append the extended questions to the built-in catalog
    pub extended_catalog: bool,
    /// Industry maturity organizations are benchmarked against
    #[schemars(range(min = 0.0, max = 5.0))]
    pub benchmark_baseline: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            catalog_file: None,
            rules_file: None,
            extended_catalog: false,
            benchmark_baseline: DEFAULT_BENCHMARK_BASELINE,
        }
    }
}

/// Summary cache configuration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache assessment summaries in memory
    pub enabled: bool,
    /// Time-to-live in seconds
    #[schemars(range(min = 1))]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: DEFAULT_CACHE_TTL_SECS,
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Output-related configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format
    pub format: ReportFormat,
    /// Output file path (None for stdout)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Disable colored output
    pub no_color: bool,
}

/// One webhook subscription.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct WebhookConfig {
    /// Endpoint receiving JSON POSTs
    pub url: String,
    /// Event names this endpoint subscribes to
    pub events: Vec<String>,
    /// Only deliver events of this organization
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<OrganizationId>,
    /// Shared secret; when set, deliveries carry an `X-Webhook-Signature`
    /// HMAC-SHA256 header
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    /// Inactive subscriptions are kept but never called
    pub active: bool,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            events: vec![DEFAULT_WEBHOOK_EVENT.to_string()],
            organization_id: None,
            secret: None,
            active: true,
        }
    }
}

impl WebhookConfig {
    /// Subscription to completion events at `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Whether an event should be delivered to this endpoint.
    #[must_use]
    pub fn accepts(&self, event: &str, organization_id: OrganizationId) -> bool {
        self.active
            && self.events.iter().any(|e| e == event)
            && self.organization_id.map_or(true, |id| id == organization_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.database.path, PathBuf::from("maturity.db"));
        assert_eq!(config.scoring.history_limit, 5);
        assert_eq!(config.cache.ttl(), Duration::from_secs(300));
        assert_eq!(config.output.format, ReportFormat::Auto);
        assert_eq!(config.scoring.benchmark_baseline, 3.0);
        assert!(!config.scoring.extended_catalog);
        assert!(config.webhooks.is_empty());
    }

    #[test]
    fn test_builder() {
        let config = AppConfig::builder()
            .database_path("/tmp/x.db")
            .history_limit(3)
            .cache_enabled(false)
            .webhook(WebhookConfig::new("http://localhost/hook"))
            .build();
        assert_eq!(config.database.path, PathBuf::from("/tmp/x.db"));
        assert_eq!(config.scoring.history_limit, 3);
        assert!(!config.cache.enabled);
        assert_eq!(config.webhooks.len(), 1);
    }

    #[test]
    fn test_webhook_filters() {
        let mut hook = WebhookConfig::new("http://localhost/hook");
        assert!(hook.accepts("assessment.completed", 1));
        assert!(!hook.accepts("assessment.created", 1));

        hook.organization_id = Some(2);
        assert!(!hook.accepts("assessment.completed", 1));
        assert!(hook.accepts("assessment.completed", 2));

        hook.active = false;
        assert!(!hook.accepts("assessment.completed", 2));
    }
}
