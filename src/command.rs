use crate::types::registry::{Channel, Identity};

const UNSUBSCRIBE_DIRECTIVES: [&str; 2] = ["stop", "unsubscribe"];

/// A text command, as sent by a subscriber:
///
/// ```text
/// {identity}: sms, slack
/// {identity}: stop | unsubscribe
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `channels` holds registrable channels only, deduplicated in order of
    /// first appearance. It may be empty.
    Register {
        identity: Identity,
        channels: Vec<Channel>,
    },
    Unsubscribe {
        identity: Identity,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("expected '<identity>: <channels|stop>'")]
    Malformed,
}

pub fn parse(raw: &str) -> Result<Command, CommandError> {
    let segments: Vec<&str> = raw.split(':').map(str::trim).collect();
    let [identity, directive] = segments.as_slice() else {
        return Err(CommandError::Malformed);
    };

    let identity = Identity::new(identity);
    if identity.is_empty() {
        return Err(CommandError::Malformed);
    }

    let directive = directive.to_lowercase();
    if UNSUBSCRIBE_DIRECTIVES.contains(&directive.as_str()) {
        return Ok(Command::Unsubscribe { identity });
    }

    let mut channels = Vec::new();
    for token in directive.split(',') {
        let Some(channel) = Channel::from_token(token.trim()) else {
            continue;
        };
        if channel.is_registrable() && !channels.contains(&channel) {
            channels.push(channel);
        }
    }

    Ok(Command::Register { identity, channels })
}

/// Comma-separated list of channels a command may ask for.
pub fn valid_channel_list() -> String {
    Channel::REGISTRABLE
        .iter()
        .map(|channel| channel.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
