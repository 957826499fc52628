//! Audit notifications via an optional chat webhook.
//!
//! Fire-and-forget: a failed or unconfigured webhook only produces a log
//! line, never an error for the command that triggered it.

use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::client::Actor;
use crate::links::NO_IMAGE;

const COLOR_CREATE: u32 = 0x0057_f287;
const COLOR_REMOVE: u32 = 0x00ed_4245;
const COLOR_ROLE: u32 = 0x0058_65f2;
const COLOR_STARTUP: u32 = 0x00ff_a500;

/// Sends embed payloads to a configured webhook URL.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    webhook_url: Option<String>,
}

impl WebhookNotifier {
    #[must_use]
    pub fn new(webhook_url: Option<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            webhook_url,
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.webhook_url.is_some()
    }

    /// Announce that the bot process came up and logging is active.
    pub async fn notify_startup(&self) {
        self.send(json!({
            "title": "Bot started",
            "description": "Audit logging is active.",
            "color": COLOR_STARTUP,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }))
        .await;
    }

    pub async fn notify_topic_created(
        &self,
        topic_id: i64,
        title: &str,
        url: &str,
        image_url: &str,
        actor: &Actor,
    ) {
        self.send(json!({
            "title": "Topic created",
            "color": COLOR_CREATE,
            "fields": [
                { "name": "ID", "value": topic_id.to_string(), "inline": true },
                { "name": "Title", "value": title, "inline": true },
                { "name": "URL", "value": url },
                { "name": "Image", "value": if image_url == NO_IMAGE { NO_IMAGE } else { image_url } },
                { "name": "By", "value": format!("{} ({})", actor.user_id, actor.tag) },
            ],
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }))
        .await;
    }

    pub async fn notify_topic_removed(&self, topic_id: i64, removed: bool, actor: &Actor) {
        self.send(json!({
            "title": "Topic removed",
            "color": COLOR_REMOVE,
            "fields": [
                { "name": "ID", "value": topic_id.to_string(), "inline": true },
                { "name": "By", "value": format!("{} ({})", actor.user_id, actor.tag) },
                { "name": "Result", "value": if removed { "removed" } else { "not found / already removed" } },
            ],
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }))
        .await;
    }

    pub async fn notify_role_set(&self, role_id: &str, durable: bool, actor: &Actor) {
        self.send(json!({
            "title": "Allowed role updated",
            "color": COLOR_ROLE,
            "fields": [
                { "name": "Role", "value": role_id },
                { "name": "By", "value": format!("{} ({})", actor.user_id, actor.tag) },
                { "name": "Persisted", "value": if durable { "yes" } else { "in-memory only" } },
            ],
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }))
        .await;
    }

    async fn send(&self, embed: Value) {
        let Some(url) = &self.webhook_url else {
            debug!("Webhook URL not configured, skipping audit notification");
            return;
        };

        let result = self
            .client
            .post(url)
            .json(&json!({ "embeds": [embed] }))
            .send()
            .await;

        match result {
            Ok(response) if !response.status().is_success() => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                warn!(status = %status, body = %body, "Webhook delivery failed");
            }
            Ok(_) => {}
            Err(e) => warn!("Webhook delivery failed: {e}"),
        }
    }
}
