use crate::dispatch::plan::plan_batches;
use crate::ports::{DisplaySignaler, NotifySender, SendError, SlackSender, TimeProvider};
use crate::types::message::LunchMessage;
use crate::types::registry::{Channel, Identity, Subscriber, SubscriberMap};

use rand::Rng;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSettings {
    pub batch_size: NonZeroUsize,
    pub cooldown: Duration,
}

pub struct BatchHandle {
    pub index: usize,
    pub offset: Duration,
    pub members: Vec<Identity>,
    handle: JoinHandle<()>,
}

impl BatchHandle {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    #[cfg(test)]
    pub(crate) async fn join(self) -> Result<(), tokio::task::JoinError> {
        self.handle.await
    }
}

/// One running fan-out. Dropping it does not stop anything; every batch
/// still fires.
pub struct Dispatch {
    pub started_at: OffsetDateTime,
    pub batches: Vec<BatchHandle>,
    signals: JoinHandle<()>,
}

impl Dispatch {
    #[cfg(test)]
    pub(crate) async fn join(self) -> Result<(), tokio::task::JoinError> {
        self.signals.await?;
        for batch in self.batches {
            batch.join().await?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct BatchDispatcher<T, N, K, D> {
    time: T,
    notify: N,
    slack: K,
    displays: D,
    settings: DispatchSettings,
}

impl<T, N, K, D> BatchDispatcher<T, N, K, D>
where
    T: TimeProvider,
    N: NotifySender,
    K: SlackSender,
    D: DisplaySignaler,
{
    pub fn new(time: T, notify: N, slack: K, displays: D, settings: DispatchSettings) -> Self {
        Self {
            time,
            notify,
            slack,
            displays,
            settings,
        }
    }

    pub fn settings(&self) -> DispatchSettings {
        self.settings
    }

    /// Starts a batched fan-out of `message` to `subscribers` and signals
    /// every display. Returns as soon as the batches are scheduled.
    pub fn dispatch(
        &self,
        subscribers: SubscriberMap,
        displays: Vec<String>,
        message: LunchMessage,
    ) -> Dispatch {
        self.dispatch_with_rng(subscribers, displays, message, &mut rand::thread_rng())
    }

    pub(crate) fn dispatch_with_rng<R: Rng + ?Sized>(
        &self,
        subscribers: SubscriberMap,
        displays: Vec<String>,
        message: LunchMessage,
        rng: &mut R,
    ) -> Dispatch {
        let started_at = self.time.now();
        let message = Arc::new(message);
        let members: Vec<(Identity, Subscriber)> = subscribers.into_iter().collect();
        let plans = plan_batches(
            members,
            self.settings.batch_size,
            self.settings.cooldown,
            rng,
        );
        info!(
            subscribers = plans.iter().map(|plan| plan.members.len()).sum::<usize>(),
            batches = plans.len(),
            displays = displays.len(),
            "starting lunch dispatch"
        );

        let signals = tokio::spawn(signal_displays(self.displays.clone(), displays));

        let batches = plans
            .into_iter()
            .map(|plan| {
                let members = plan
                    .members
                    .iter()
                    .map(|(identity, _)| identity.clone())
                    .collect();
                let handle = tokio::spawn(run_batch(
                    self.time.clone(),
                    self.notify.clone(),
                    self.slack.clone(),
                    plan.index,
                    plan.offset,
                    plan.members,
                    Arc::clone(&message),
                ));
                BatchHandle {
                    index: plan.index,
                    offset: plan.offset,
                    members,
                    handle,
                }
            })
            .collect();

        Dispatch {
            started_at,
            batches,
            signals,
        }
    }
}

async fn signal_displays<D: DisplaySignaler>(signaler: D, rooms: Vec<String>) {
    for room in rooms {
        if let Err(err) = signaler.signal(&room).await {
            warn!(room = %room, error = %err, "display signal failed");
        }
    }
}

async fn run_batch<T, N, K>(
    time: T,
    notify: N,
    slack: K,
    index: usize,
    offset: Duration,
    members: Vec<(Identity, Subscriber)>,
    message: Arc<LunchMessage>,
) where
    T: TimeProvider,
    N: NotifySender,
    K: SlackSender,
{
    if !offset.is_zero() {
        time.sleep(offset).await;
    }
    debug!(batch = index, size = members.len(), "delivering batch");

    let mut sends: JoinSet<(Identity, Channel, Result<(), SendError>)> = JoinSet::new();
    for (identity, subscriber) in members {
        for channel in subscriber.channels() {
            let identity = identity.clone();
            let message = Arc::clone(&message);
            match channel {
                Channel::Slack => {
                    let slack = slack.clone();
                    sends.spawn(async move {
                        let result = slack
                            .send(&identity, &message.headline, &message.attachments)
                            .await;
                        (identity, channel, result)
                    });
                }
                Channel::Sms | Channel::Push => {
                    let notify = notify.clone();
                    sends.spawn(async move {
                        let result = notify.send(&identity, channel, &message.text).await;
                        (identity, channel, result)
                    });
                }
            }
        }
    }

    while let Some(joined) = sends.join_next().await {
        match joined {
            Ok((_, _, Ok(()))) => {}
            Ok((identity, channel, Err(err))) => {
                warn!(identity = %identity, %channel, batch = index, error = %err, "lunch notification failed");
            }
            Err(err) => warn!(batch = index, error = %err, "lunch notification task failed"),
        }
    }
}
