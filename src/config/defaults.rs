//! Default values for maturity-tools configuration.

/// Database file used when none is configured.
pub const DEFAULT_DATABASE_PATH: &str = "maturity.db";

/// Past completed assessments compared during anomaly detection.
pub const DEFAULT_HISTORY_LIMIT: usize = 5;

/// Maturity an organization is benchmarked against.
pub const DEFAULT_BENCHMARK_BASELINE: f64 = 3.0;

/// Summary cache time-to-live in seconds.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Event a webhook subscribes to when none are listed.
pub const DEFAULT_WEBHOOK_EVENT: &str = "assessment.completed";

/// Webhook request timeout in seconds.
pub const DEFAULT_WEBHOOK_TIMEOUT_SECS: u64 = 10;
