use crate::types::message::SlackAttachment;
use crate::types::registry::{Channel, Identity};

#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("sender is not configured")]
    NotConfigured,
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("rejected by provider: {0}")]
    Rejected(String),
}

/// Delivers plain text over provider-bound channels (sms, push).
pub trait NotifySender: Clone + Send + Sync + 'static {
    type Fut<'a>: Future<Output = Result<(), SendError>> + Send + 'a
    where
        Self: 'a;

    fn send<'a>(
        &'a self,
        identity: &'a Identity,
        channel: Channel,
        message: &'a str,
    ) -> Self::Fut<'a>;
}

pub trait SlackSender: Clone + Send + Sync + 'static {
    type Fut<'a>: Future<Output = Result<(), SendError>> + Send + 'a
    where
        Self: 'a;

    fn send<'a>(
        &'a self,
        identity: &'a Identity,
        headline: &'a str,
        attachments: &'a [SlackAttachment],
    ) -> Self::Fut<'a>;
}

/// Signals a shared display that lunch is here.
pub trait DisplaySignaler: Clone + Send + Sync + 'static {
    type Fut<'a>: Future<Output = Result<(), SendError>> + Send + 'a
    where
        Self: 'a;

    fn signal<'a>(&'a self, room: &'a str) -> Self::Fut<'a>;
}
