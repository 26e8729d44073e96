use super::notifier::{AlertEvent, AlertSink};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::Client;
use serde_json::{Value, json};
use url::Url;

const MESSAGE_LIMIT: usize = 4000;

/// Posts alerts as JSON to an operator-supplied webhook (chat bridge, incident tool, ...).
pub(crate) struct WebhookAlertSink {
    webhook_url: Url,
    client: Client,
}

impl WebhookAlertSink {
    pub(crate) fn new(webhook_url: Url) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(3))
            .build()?;

        Ok(Self {
            webhook_url,
            client,
        })
    }
}

pub(crate) fn alert_payload(event: &AlertEvent) -> Value {
    let spans = event
        .spans
        .iter()
        .map(|span| json!({ "name": span.name, "fields": span.fields }))
        .collect::<Vec<_>>();

    json!({
        "service": event.service_name,
        "environment": event.environment,
        "component": event.component,
        "level": event.level.as_str(),
        "timestamp": event.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
        "target": event.target,
        "location": event.location,
        "message": event.message.as_deref().map(truncate),
        "fields": event.fields,
        "spans": spans,
    })
}

fn truncate(message: &str) -> String {
    const SUFFIX: &str = "… (truncated)";

    let message = message.trim();
    if message.chars().count() <= MESSAGE_LIMIT {
        return message.to_string();
    }

    let kept: String = message
        .chars()
        .take(MESSAGE_LIMIT - SUFFIX.chars().count())
        .collect();
    format!("{kept}{SUFFIX}")
}

#[async_trait]
impl AlertSink for WebhookAlertSink {
    async fn deliver(&self, event: &AlertEvent) -> Result<()> {
        let response = self
            .client
            .post(self.webhook_url.clone())
            .json(&alert_payload(event))
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    anyhow!("alert webhook request timed out")
                } else {
                    anyhow!("alert webhook request failed")
                }
            })?;

        if response.status().is_success() {
            return Ok(());
        }

        Err(anyhow!(
            "alert webhook returned non-success status: {}",
            response.status()
        ))
    }

    fn sink_name(&self) -> &'static str {
        "webhook"
    }
}
