use crate::config::SlackConfig;
use crate::ports::{SendError, SlackSender};
use crate::types::message::SlackAttachment;
use crate::types::registry::Identity;

use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::sync::Arc;

const POST_MESSAGE_URL: &str = "https://slack.com/api/chat.postMessage";

/// Direct messages through Slack's `chat.postMessage`.
#[derive(Clone)]
pub struct SlackClient {
    config: Option<Arc<SlackConfig>>,
    http: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct PostMessage<'a> {
    channel: String,
    text: &'a str,
    parse: &'static str,
    #[serde(skip_serializing_if = "<[SlackAttachment]>::is_empty")]
    attachments: &'a [SlackAttachment],
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    error: Option<String>,
}

impl SlackClient {
    pub fn new(config: Option<SlackConfig>) -> Self {
        Self {
            config: config.map(Arc::new),
            http: super::provider_http_client(),
        }
    }
}

fn post_message<'a>(
    identity: &Identity,
    headline: &'a str,
    attachments: &'a [SlackAttachment],
) -> PostMessage<'a> {
    PostMessage {
        channel: format!("@{identity}"),
        text: headline,
        parse: "full",
        attachments,
    }
}

impl SlackSender for SlackClient {
    type Fut<'a>
        = Pin<Box<dyn Future<Output = Result<(), SendError>> + Send + 'a>>
    where
        Self: 'a;

    fn send<'a>(
        &'a self,
        identity: &'a Identity,
        headline: &'a str,
        attachments: &'a [SlackAttachment],
    ) -> Self::Fut<'a> {
        Box::pin(async move {
            let config = self.config.as_ref().ok_or(SendError::NotConfigured)?;
            let response = self
                .http
                .post(POST_MESSAGE_URL)
                .bearer_auth(&config.token)
                .json(&post_message(identity, headline, attachments))
                .send()
                .await?;
            if !response.status().is_success() {
                return Err(SendError::Rejected(format!(
                    "slack responded with {}",
                    response.status()
                )));
            }
            let body: PostMessageResponse = response.json().await?;
            if !body.ok {
                return Err(SendError::Rejected(
                    body.error.unwrap_or_else(|| "unknown slack error".to_string()),
                ));
            }
            Ok(())
        })
    }
}
