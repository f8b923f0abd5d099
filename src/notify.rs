//! Notifiers: Slack incoming webhooks and the console

use crate::error::{Result, ScoutError};
use crate::sync::Notifier;
use reqwest::blocking::Client;
use std::time::Duration;

/// Posts reports to a Slack incoming webhook
pub struct SlackNotifier {
    client: Client,
    webhook_url: String,
}

impl SlackNotifier {
    pub fn new(webhook_url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            webhook_url: webhook_url.into(),
        })
    }
}

impl Notifier for SlackNotifier {
    fn send(&self, text: &str) -> Result<()> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .map_err(|e| ScoutError::notify(format!("webhook request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ScoutError::notify(format!("webhook answered {}: {}", status, body.trim())));
        }

        log::debug!("Webhook accepted report ({} bytes)", text.len());
        Ok(())
    }
}

/// Prints reports to stdout; used when a target has no webhook
pub struct ConsoleNotifier {
    heading: String,
}

impl ConsoleNotifier {
    pub fn new(heading: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
        }
    }
}

impl Notifier for ConsoleNotifier {
    fn send(&self, text: &str) -> Result<()> {
        println!("📣 {}", self.heading);
        for line in text.lines() {
            println!("│  {}", line);
        }
        Ok(())
    }
}
