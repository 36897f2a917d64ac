//! Notifications about assessment events.
//!
//! Provides trait-based extensible delivery: a tracing log sink and, with
//! the `webhooks` feature, HTTP POST to configured endpoints. Delivery is
//! best-effort and synchronous; callers log failures and carry on.

#[cfg(feature = "webhooks")]
mod webhook;

#[cfg(feature = "webhooks")]
pub use webhook::WebhookNotifier;

use crate::config::AppConfig;
use crate::model::{AssessmentId, OrganizationId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Event name of a completed assessment.
pub const ASSESSMENT_COMPLETED: &str = "assessment.completed";

/// Payload describing a completed assessment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionEvent {
    pub event: &'static str,
    pub assessment_id: AssessmentId,
    pub organization_id: OrganizationId,
    pub name: String,
    pub overall_maturity: f64,
    pub completed_at: DateTime<Utc>,
}

impl CompletionEvent {
    #[must_use]
    pub fn new(
        assessment_id: AssessmentId,
        organization_id: OrganizationId,
        name: impl Into<String>,
        overall_maturity: f64,
        completed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            event: ASSESSMENT_COMPLETED,
            assessment_id,
            organization_id,
            name: name.into(),
            overall_maturity,
            completed_at,
        }
    }
}

/// Trait for receiving assessment events.
pub trait Notifier: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Called after an assessment completed and its results were committed.
    fn notify(&self, event: &CompletionEvent) -> anyhow::Result<()>;
}

// ============================================================================
// Log notifier
// ============================================================================

/// Writes events to the tracing log.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    fn notify(&self, event: &CompletionEvent) -> anyhow::Result<()> {
        tracing::info!(
            event = event.event,
            assessment_id = event.assessment_id,
            organization_id = event.organization_id,
            overall_maturity = format!("{:.2}", event.overall_maturity),
            "assessment '{}' completed",
            event.name
        );
        Ok(())
    }
}

// ============================================================================
// Notifier builder
// ============================================================================

/// Build notifiers from the application configuration.
#[must_use]
pub fn build_notifiers(config: &AppConfig) -> Vec<Box<dyn Notifier>> {
    let mut notifiers: Vec<Box<dyn Notifier>> = vec![Box::new(LogNotifier)];

    #[cfg(feature = "webhooks")]
    for webhook in config.webhooks.iter().filter(|w| w.active) {
        match WebhookNotifier::new(webhook.clone()) {
            Ok(notifier) => notifiers.push(Box::new(notifier)),
            Err(e) => tracing::warn!("Skipping webhook {}: {e}", webhook.url),
        }
    }

    #[cfg(not(feature = "webhooks"))]
    if !config.webhooks.is_empty() {
        tracing::warn!(
            count = config.webhooks.len(),
            "webhooks configured but the `webhooks` feature is disabled"
        );
    }

    notifiers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WebhookConfig;

    #[test]
    fn test_event_payload() {
        let event = CompletionEvent::new(7, 2, "Q1", 3.25, Utc::now());
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "assessment.completed");
        assert_eq!(value["assessment_id"], 7);
        assert_eq!(value["overall_maturity"], 3.25);
    }

    #[test]
    fn test_log_notifier_never_fails() {
        let event = CompletionEvent::new(1, 1, "Q1", 2.0, Utc::now());
        assert!(LogNotifier.notify(&event).is_ok());
    }

    #[test]
    fn test_inactive_webhooks_are_skipped() {
        let mut hook = WebhookConfig::new("http://127.0.0.1:9/hook");
        hook.active = false;
        let config = AppConfig::builder().webhook(hook).build();
        let notifiers = build_notifiers(&config);
        assert_eq!(notifiers.len(), 1);
        assert_eq!(notifiers[0].name(), "log");
    }
}
