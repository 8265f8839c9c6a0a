//! Chat notifications via a Slack incoming webhook.

use std::time::Duration;

use serde::Serialize;

use crate::error::Result;

/// HTTP timeout for webhook posts.
const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
struct WebhookPayload<'a> {
    text: &'a str,
}

/// Posts `{"text": ...}` messages to a webhook.
/// Fire-and-forget: errors are logged but never propagated to callers.
#[derive(Clone)]
pub struct SlackNotifier {
    webhook_url: Option<String>,
    client: reqwest::Client,
}

impl SlackNotifier {
    /// Create a notifier. With no URL every notification is a no-op.
    pub fn new(webhook_url: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(WEBHOOK_TIMEOUT).build()?;
        Ok(Self {
            webhook_url,
            client,
        })
    }

    /// A notifier that never sends anything.
    pub fn disabled() -> Self {
        Self {
            webhook_url: None,
            client: reqwest::Client::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.webhook_url.is_some()
    }

    /// Post a message to the webhook.
    pub async fn notify(&self, text: &str) {
        let Some(url) = self.webhook_url.as_deref() else {
            tracing::debug!("no chat webhook configured, skipping notification");
            return;
        };

        match self
            .client
            .post(url)
            .json(&WebhookPayload { text })
            .send()
            .await
        {
            Ok(response) => {
                if response.status().is_success() {
                    tracing::debug!(status = %response.status(), "chat notification sent");
                } else {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    tracing::warn!(%status, body = %body, "chat webhook rejected notification");
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "chat notification failed");
            }
        }
    }
}

impl std::fmt::Debug for SlackNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The webhook URL embeds its credential.
        f.debug_struct("SlackNotifier")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
