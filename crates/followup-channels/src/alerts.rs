//! Batch-failure alerting via a Slack-style incoming webhook.
//!
//! Best-effort: an alert that fails to send is logged and dropped. Alerts
//! must never change a job's outcome or exit code.

use followup_core::config::AlertConfig;

/// Optional alert channel. Constructed from config; a missing webhook URL
/// disables it.
pub struct AlertWebhook {
    client: reqwest::Client,
    url: Option<String>,
}

impl AlertWebhook {
    pub fn new(config: &AlertConfig) -> Self {
        let url = if config.webhook_url.is_empty() {
            None
        } else {
            Some(config.webhook_url.clone())
        };
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.url.is_some()
    }

    /// Post a one-line alert. Swallows its own failures (with a warn).
    pub async fn post(&self, text: &str) {
        let Some(url) = &self.url else {
            tracing::debug!("Alert webhook not configured, dropping: {text}");
            return;
        };

        let result = self
            .client
            .post(url)
            .json(&serde_json::json!({ "text": text }))
            .timeout(std::time::Duration::from_secs(10))
            .send()
            .await;

        match result {
            Ok(resp) if resp.status().is_success() => {
                tracing::debug!("Alert posted: {text}");
            }
            Ok(resp) => {
                tracing::warn!("⚠️ Alert webhook returned {}: {text}", resp.status());
            }
            Err(e) => {
                tracing::warn!("⚠️ Alert webhook failed: {e}");
            }
        }
    }
}
