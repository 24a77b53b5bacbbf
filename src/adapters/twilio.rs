use crate::config::TwilioConfig;
use crate::ports::{BindingError, BindingProvider, DisplaySignaler, NotifySender, SendError};
use crate::types::registry::{Channel, Identity};

use serde::Deserialize;
use std::pin::Pin;
use std::sync::Arc;

const NOTIFY_BASE_URL: &str = "https://notify.twilio.com/v1";
const API_BASE_URL: &str = "https://api.twilio.com/2010-04-01";

type BoxFut<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Twilio Notify bindings and notifications, plus plain messages for
/// display signals. Without credentials every call fails with
/// `NotConfigured`.
#[derive(Clone)]
pub struct TwilioClient {
    config: Option<Arc<TwilioConfig>>,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct BindingResponse {
    sid: String,
}

impl TwilioClient {
    pub fn new(config: Option<TwilioConfig>) -> Self {
        Self {
            config: config.map(Arc::new),
            http: super::provider_http_client(),
        }
    }

    fn notify_url(config: &TwilioConfig, resource: &str) -> String {
        format!(
            "{NOTIFY_BASE_URL}/Services/{}/{resource}",
            config.notify_service_sid
        )
    }
}

fn binding_type(channel: Channel) -> Option<&'static str> {
    match channel {
        Channel::Sms => Some("sms"),
        Channel::Push => Some("fcm"),
        Channel::Slack => None,
    }
}

fn binding_form(
    identity: &Identity,
    channel: Channel,
    binding_type: &str,
    address: &str,
    tags: &[String],
) -> Vec<(&'static str, String)> {
    let mut form = vec![
        ("Endpoint", format!("{identity}:{channel}")),
        ("Identity", identity.to_string()),
        ("BindingType", binding_type.to_string()),
        ("Address", address.to_string()),
    ];
    form.extend(tags.iter().map(|tag| ("Tag", tag.clone())));
    form
}

fn notification_form(
    identity: &Identity,
    channel: Channel,
    message: &str,
    messaging_service_sid: &str,
) -> Vec<(&'static str, String)> {
    vec![
        ("Identity", identity.to_string()),
        ("Tag", channel.as_str().to_string()),
        ("Body", message.to_string()),
        (
            "Sms",
            serde_json::json!({ "from": messaging_service_sid }).to_string(),
        ),
    ]
}

async fn rejection(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    format!("{status}: {body}")
}

impl BindingProvider for TwilioClient {
    type CreateFut<'a>
        = BoxFut<'a, Result<String, BindingError>>
    where
        Self: 'a;
    type DeleteFut<'a>
        = BoxFut<'a, Result<(), BindingError>>
    where
        Self: 'a;

    fn create<'a>(
        &'a self,
        identity: &'a Identity,
        channel: Channel,
        address: &'a str,
        tags: &'a [String],
    ) -> Self::CreateFut<'a> {
        Box::pin(async move {
            let config = self.config.as_ref().ok_or(BindingError::NotConfigured)?;
            let binding_type = binding_type(channel).ok_or_else(|| BindingError::Create {
                channel,
                reason: "channel has no provider binding".to_string(),
            })?;
            let create_error = |reason: String| BindingError::Create { channel, reason };

            let response = self
                .http
                .post(Self::notify_url(config, "Bindings"))
                .basic_auth(&config.account_sid, Some(&config.auth_token))
                .form(&binding_form(identity, channel, binding_type, address, tags))
                .send()
                .await
                .map_err(|err| create_error(err.to_string()))?;
            if !response.status().is_success() {
                return Err(create_error(rejection(response).await));
            }
            let binding: BindingResponse = response
                .json()
                .await
                .map_err(|err| create_error(err.to_string()))?;
            Ok(binding.sid)
        })
    }

    fn delete<'a>(&'a self, binding_id: &'a str) -> Self::DeleteFut<'a> {
        Box::pin(async move {
            let config = self.config.as_ref().ok_or(BindingError::NotConfigured)?;
            let delete_error = |reason: String| BindingError::Delete {
                binding_id: binding_id.to_string(),
                reason,
            };

            let response = self
                .http
                .delete(Self::notify_url(config, &format!("Bindings/{binding_id}")))
                .basic_auth(&config.account_sid, Some(&config.auth_token))
                .send()
                .await
                .map_err(|err| delete_error(err.to_string()))?;
            if !response.status().is_success() {
                return Err(delete_error(rejection(response).await));
            }
            Ok(())
        })
    }
}

impl NotifySender for TwilioClient {
    type Fut<'a>
        = BoxFut<'a, Result<(), SendError>>
    where
        Self: 'a;

    fn send<'a>(
        &'a self,
        identity: &'a Identity,
        channel: Channel,
        message: &'a str,
    ) -> Self::Fut<'a> {
        Box::pin(async move {
            let config = self.config.as_ref().ok_or(SendError::NotConfigured)?;
            let form = notification_form(identity, channel, message, &config.messaging_service_sid);
            let response = self
                .http
                .post(Self::notify_url(config, "Notifications"))
                .basic_auth(&config.account_sid, Some(&config.auth_token))
                .form(&form)
                .send()
                .await?;
            if !response.status().is_success() {
                return Err(SendError::Rejected(rejection(response).await));
            }
            Ok(())
        })
    }
}

impl DisplaySignaler for TwilioClient {
    type Fut<'a>
        = BoxFut<'a, Result<(), SendError>>
    where
        Self: 'a;

    fn signal<'a>(&'a self, room: &'a str) -> Self::Fut<'a> {
        Box::pin(async move {
            let config = self.config.as_ref().ok_or(SendError::NotConfigured)?;
            let to = config
                .display_number
                .as_deref()
                .ok_or(SendError::NotConfigured)?;
            let url = format!(
                "{API_BASE_URL}/Accounts/{}/Messages.json",
                config.account_sid
            );
            let form = [
                ("MessagingServiceSid", config.messaging_service_sid.clone()),
                ("Body", format!("{}:lunch", room.to_lowercase())),
                ("To", to.to_string()),
            ];
            let response = self
                .http
                .post(url)
                .basic_auth(&config.account_sid, Some(&config.auth_token))
                .form(&form)
                .send()
                .await?;
            if !response.status().is_success() {
                return Err(SendError::Rejected(rejection(response).await));
            }
            Ok(())
        })
    }
}
