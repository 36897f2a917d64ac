//! Webhook delivery over HTTP POST.

use super::{CompletionEvent, Notifier};
use crate::config::{WebhookConfig, DEFAULT_WEBHOOK_TIMEOUT_SECS};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::Duration;

type HmacSha256 = Hmac<Sha256>;

/// `X-Webhook-Signature` value for a delivery: `sha256=` followed by the
/// hex HMAC-SHA256 of `"{timestamp}.{payload}"` keyed with the secret.
#[must_use]
pub fn signature(secret: &str, timestamp: &str, payload: &str) -> String {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => unreachable!("HMAC key of any length is valid"),
    };
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload.as_bytes());
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}

/// Posts subscribed events as JSON to one endpoint.
///
/// Delivery is synchronous with a 10 second timeout, so it finishes before
/// the completing command returns.
pub struct WebhookNotifier {
    config: WebhookConfig,
    client: reqwest::blocking::Client,
}

impl WebhookNotifier {
    pub fn new(config: WebhookConfig) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_WEBHOOK_TIMEOUT_SECS))
            .build()?;
        Ok(Self { config, client })
    }

    fn post_json(&self, event: &CompletionEvent) -> anyhow::Result<()> {
        let payload = serde_json::to_string(event)?;
        let timestamp = chrono::Utc::now().to_rfc3339();

        let mut request = self
            .client
            .post(&self.config.url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header("X-Webhook-Event", event.event)
            .header("X-Webhook-Timestamp", &timestamp);
        if let Some(secret) = &self.config.secret {
            request = request.header(
                "X-Webhook-Signature",
                signature(secret, &timestamp, &payload),
            );
        }

        let resp = request.body(payload).send()?;
        if !resp.status().is_success() {
            anyhow::bail!("webhook {} returned status {}", self.config.url, resp.status());
        }
        tracing::debug!(url = %self.config.url, status = %resp.status(), "webhook delivered");
        Ok(())
    }
}

impl Notifier for WebhookNotifier {
    fn name(&self) -> &str {
        &self.config.url
    }

    fn notify(&self, event: &CompletionEvent) -> anyhow::Result<()> {
        if !self.config.accepts(event.event, event.organization_id) {
            return Ok(());
        }
        self.post_json(event)
    }
}
