use crate::NotifySink;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use soapbox_core::NotifyError;
use std::time::Duration;
use tracing::{debug, warn};

const POST_MESSAGE_URL: &str = "https://slack.com/api/chat.postMessage";

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Slack Web API notification sink posting to a fixed channel.
pub struct SlackNotifier {
    token: String,
    channel_id: String,
    http: reqwest::Client,
}

impl SlackNotifier {
    pub fn new(token: impl Into<String>, channel_id: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            token: token.into(),
            channel_id: channel_id.into(),
            http,
        }
    }

    /// Builds a notifier from `SLACK_TOKEN` and `SLACK_CHANNEL_ID`, or
    /// `None` when either is missing so callers can fall back to
    /// [`crate::NoopNotifier`].
    pub fn from_env() -> Option<Self> {
        let token = std::env::var("SLACK_TOKEN").ok()?;
        let channel_id = std::env::var("SLACK_CHANNEL_ID").ok()?;
        if token.is_empty() || channel_id.is_empty() {
            return None;
        }
        Some(Self::new(token, channel_id))
    }

    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }
}

#[async_trait]
impl NotifySink for SlackNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let payload = json!({
            "channel": self.channel_id,
            "text": text,
            "unfurl_links": false,
        });

        let response = self
            .http
            .post(POST_MESSAGE_URL)
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::SendFailed {
                reason: e.to_string(),
                status_code: e.status().map(|s| s.as_u16()),
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Slack returned non-success status");
            return Err(NotifyError::SendFailed {
                reason: format!("HTTP {status}"),
                status_code: Some(status.as_u16()),
            });
        }

        let body: PostMessageResponse =
            response.json().await.map_err(|e| NotifyError::SendFailed {
                reason: e.to_string(),
                status_code: None,
            })?;

        if !body.ok {
            let reason = body.error.unwrap_or_else(|| "unknown error".to_string());
            warn!(%reason, "Slack rejected message");
            return Err(NotifyError::SendFailed {
                reason,
                status_code: Some(status.as_u16()),
            });
        }

        debug!(channel = %self.channel_id, "Sent Slack notification");
        Ok(())
    }
}
