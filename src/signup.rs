use crate::command::{self, Command};
use crate::ports::{BindingProvider, SnapshotStore};
use crate::registry::{RegistrationStatus, SubscriberRegistry};
use crate::types::registry::{Channel, SubscriberMap};

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyOutcome {
    Malformed,
    NoValidChannels,
    Unsubscribed,
    RegisteredNew,
    RegisteredUpdated,
    Unbound,
}

/// What to text back, one entry per outgoing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReply {
    pub outcome: ReplyOutcome,
    pub messages: Vec<String>,
}

impl CommandReply {
    fn new(outcome: ReplyOutcome, messages: Vec<String>) -> Self {
        Self { outcome, messages }
    }
}

/// Runs a texted command from `from` against the registry.
pub async fn handle_text_command<B, S>(
    registry: &SubscriberRegistry<B, S>,
    from: &str,
    raw: &str,
) -> CommandReply
where
    B: BindingProvider,
    S: SnapshotStore<SubscriberMap>,
{
    let command = match command::parse(raw) {
        Ok(command) => command,
        Err(err) => {
            debug!(from, raw, error = %err, "malformed command");
            return CommandReply::new(
                ReplyOutcome::Malformed,
                vec![
                    "Register by texting:\n[username]: [comma separated list of channels to be notified on]"
                        .to_string(),
                    supported_channels(),
                    "If you would like to unsubscribe text:\n[username]: stop".to_string(),
                ],
            );
        }
    };

    match command {
        Command::Unsubscribe { identity } => {
            registry.unsubscribe(&identity).await;
            CommandReply::new(
                ReplyOutcome::Unsubscribed,
                vec![format!("You have been unsubscribed, {identity}")],
            )
        }
        Command::Register { channels, .. } if channels.is_empty() => CommandReply::new(
            ReplyOutcome::NoValidChannels,
            vec![
                "You must specify at least one valid channel".to_string(),
                supported_channels(),
            ],
        ),
        Command::Register { identity, channels } => {
            let outcome = registry.register(&identity, &channels, from).await;
            let bound = join_channels(&outcome.channels);
            match outcome.status {
                RegistrationStatus::Created => CommandReply::new(
                    ReplyOutcome::RegisteredNew,
                    vec![format!(
                        "Thanks for signing up {identity}. You're signed up to receive notifications on {bound}.\nWe'll let you know when lunch arrives."
                    )],
                ),
                RegistrationStatus::Updated => CommandReply::new(
                    ReplyOutcome::RegisteredUpdated,
                    vec![format!(
                        "Looks like you are already registered {identity}.\nWe've updated your notification preferences to {bound}.\nWe'll let you know when lunch arrives."
                    )],
                ),
                RegistrationStatus::Unbound => CommandReply::new(
                    ReplyOutcome::Unbound,
                    vec![format!(
                        "Sorry {identity}, we couldn't set up notifications on {}. Please try again later.\nAny notification preferences you already had are unchanged.",
                        join_channels(&channels)
                    )],
                ),
            }
        }
    }
}

fn supported_channels() -> String {
    format!(
        "Supported channels are {}.\nEx: jdoe: sms, slack",
        command::valid_channel_list()
    )
}

fn join_channels(channels: &[Channel]) -> String {
    channels
        .iter()
        .map(|channel| channel.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
