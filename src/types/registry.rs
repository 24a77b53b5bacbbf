use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Endpoint recorded for slack bindings. Slack needs no provider-side
/// resource, so the binding is the same for every identity.
pub const SLACK_NOTIFY_ENDPOINT: &str = "https://www.slack.com/notifyme";

/// Canonical subscriber key: trimmed and lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Sms,
    Slack,
    Push,
}

impl Channel {
    /// Channels a text command may ask for.
    pub const REGISTRABLE: [Channel; 2] = [Channel::Sms, Channel::Slack];

    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Sms => "sms",
            Channel::Slack => "slack",
            Channel::Push => "push",
        }
    }

    /// Recognises a lower-cased channel token. `android`, `ios` and `chrome`
    /// all name the push channel.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "sms" => Some(Channel::Sms),
            "slack" => Some(Channel::Slack),
            "push" | "android" | "ios" | "chrome" => Some(Channel::Push),
            _ => None,
        }
    }

    pub fn is_registrable(self) -> bool {
        Self::REGISTRABLE.contains(&self)
    }

    /// Whether the binding comes from the channel binding provider rather
    /// than being derived locally.
    pub fn requires_provider_binding(self) -> bool {
        !matches!(self, Channel::Slack)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider-issued binding id, or the local endpoint for slack. Which one it
/// is follows from the channel it is keyed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelBinding(String);

impl ChannelBinding {
    pub fn slack() -> Self {
        Self(SLACK_NOTIFY_ENDPOINT.to_string())
    }

    pub fn provider(binding_id: impl Into<String>) -> Self {
        Self(binding_id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Subscriber {
    channels: BTreeMap<Channel, ChannelBinding>,
}

impl Subscriber {
    pub fn from_bindings(channels: BTreeMap<Channel, ChannelBinding>) -> Self {
        Self { channels }
    }

    pub fn has_channel(&self, channel: Channel) -> bool {
        self.channels.contains_key(&channel)
    }

    pub fn binding(&self, channel: Channel) -> Option<&ChannelBinding> {
        self.channels.get(&channel)
    }

    pub fn channels(&self) -> impl Iterator<Item = Channel> + '_ {
        self.channels.keys().copied()
    }

    pub fn bindings(&self) -> impl Iterator<Item = (Channel, &ChannelBinding)> + '_ {
        self.channels.iter().map(|(channel, binding)| (*channel, binding))
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

/// Presence of a room key is the whole registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Display {}

pub type SubscriberMap = BTreeMap<Identity, Subscriber>;
pub type DisplayMap = BTreeMap<String, Display>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryState {
    pub subscribers: SubscriberMap,
    pub displays: DisplayMap,
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;

    #[test]
    fn identity__should_trim_and_lowercase() {
        assert_eq!(Identity::new("  JDoe \t").as_str(), "jdoe");
    }

    #[test]
    fn channel__should_only_register_sms_and_slack() {
        assert!(Channel::Sms.is_registrable());
        assert!(Channel::Slack.is_registrable());
        assert!(!Channel::Push.is_registrable());
        assert_eq!(Channel::from_token("ios"), Some(Channel::Push));
        assert_eq!(Channel::from_token("fax"), None);
    }

    #[test]
    fn subscriber_map__should_serialize_as_nested_channel_maps() {
        // Given
        let mut bindings = BTreeMap::new();
        bindings.insert(Channel::Sms, ChannelBinding::provider("B123"));
        bindings.insert(Channel::Slack, ChannelBinding::slack());
        let mut map = SubscriberMap::new();
        map.insert(Identity::new("jdoe"), Subscriber::from_bindings(bindings));

        // When
        let json = serde_json::to_value(&map).expect("serialize");

        // Then
        assert_eq!(
            json,
            serde_json::json!({
                "jdoe": { "sms": "B123", "slack": "https://www.slack.com/notifyme" }
            })
        );
    }
}
