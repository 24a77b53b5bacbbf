use crate::ports::{
    BindingError, BindingProvider, DisplaySignaler, NotifySender, SendError, SlackSender,
    SnapshotStore, StoreError, TimeProvider,
};
use crate::types::message::SlackAttachment;
use crate::types::registry::{Channel, Identity};

use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;
use time::OffsetDateTime;
use tokio::sync::oneshot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CreatedBinding {
    pub(crate) identity: String,
    pub(crate) channel: Channel,
    pub(crate) address: String,
    pub(crate) tags: Vec<String>,
}

#[derive(Clone, Default)]
pub(crate) struct TestProvider {
    failing: Vec<Channel>,
    failing_deletes: bool,
    hanging_deletes: bool,
    binding_id: Option<String>,
    created: Arc<Mutex<Vec<CreatedBinding>>>,
    deleted: Arc<Mutex<Vec<String>>>,
}

impl TestProvider {
    pub(crate) fn failing(mut self, channel: Channel) -> Self {
        self.failing.push(channel);
        self
    }

    pub(crate) fn failing_deletes(mut self) -> Self {
        self.failing_deletes = true;
        self
    }

    /// Deletions are recorded and then never resolve.
    pub(crate) fn hanging_deletes(mut self) -> Self {
        self.hanging_deletes = true;
        self
    }

    pub(crate) fn with_binding_id(mut self, binding_id: &str) -> Self {
        self.binding_id = Some(binding_id.to_string());
        self
    }

    pub(crate) fn created(&self) -> Vec<CreatedBinding> {
        self.created.lock().expect("created lock").clone()
    }

    pub(crate) fn deleted(&self) -> Vec<String> {
        self.deleted.lock().expect("deleted lock").clone()
    }
}

impl BindingProvider for TestProvider {
    type CreateFut<'a>
        = Ready<Result<String, BindingError>>
    where
        Self: 'a;
    type DeleteFut<'a>
        = Pin<Box<dyn Future<Output = Result<(), BindingError>> + Send + 'a>>
    where
        Self: 'a;

    fn create<'a>(
        &'a self,
        identity: &'a Identity,
        channel: Channel,
        address: &'a str,
        tags: &'a [String],
    ) -> Self::CreateFut<'a> {
        self.created
            .lock()
            .expect("created lock")
            .push(CreatedBinding {
                identity: identity.to_string(),
                channel,
                address: address.to_string(),
                tags: tags.to_vec(),
            });
        if self.failing.contains(&channel) {
            return ready(Err(BindingError::Create {
                channel,
                reason: "test failure".to_string(),
            }));
        }
        let binding_id = self
            .binding_id
            .clone()
            .unwrap_or_else(|| format!("B-{identity}-{channel}"));
        ready(Ok(binding_id))
    }

    fn delete<'a>(&'a self, binding_id: &'a str) -> Self::DeleteFut<'a> {
        self.deleted
            .lock()
            .expect("deleted lock")
            .push(binding_id.to_string());
        if self.hanging_deletes {
            return Box::pin(std::future::pending::<Result<(), BindingError>>());
        }
        if self.failing_deletes {
            return Box::pin(ready(Err::<(), BindingError>(BindingError::Delete {
                binding_id: binding_id.to_string(),
                reason: "test failure".to_string(),
            })));
        }
        Box::pin(ready(Ok::<(), BindingError>(())))
    }
}

/// Keeps every saved snapshot so tests can count writes.
#[derive(Clone)]
pub(crate) struct MemoryStore<T> {
    initial: Option<T>,
    saves: Arc<Mutex<Vec<T>>>,
    fail: bool,
    save_delay: Option<Duration>,
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self {
            initial: None,
            saves: Arc::new(Mutex::new(Vec::new())),
            fail: false,
            save_delay: None,
        }
    }
}

impl<T: Clone> MemoryStore<T> {
    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Every save blocks its thread for `delay`, like a slow disk.
    pub(crate) fn slow(delay: Duration) -> Self {
        Self {
            save_delay: Some(delay),
            ..Self::default()
        }
    }

    pub(crate) fn with_snapshot(snapshot: T) -> Self {
        Self {
            initial: Some(snapshot),
            ..Self::default()
        }
    }

    pub(crate) fn save_count(&self) -> usize {
        self.saves.lock().expect("saves lock").len()
    }

    pub(crate) fn last(&self) -> Option<T> {
        self.saves.lock().expect("saves lock").last().cloned()
    }
}

impl<T> SnapshotStore<T> for MemoryStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn load(&self) -> Result<Option<T>, StoreError> {
        Ok(self.initial.clone())
    }

    fn save(&self, snapshot: &T) -> Result<(), StoreError> {
        if let Some(delay) = self.save_delay {
            std::thread::sleep(delay);
        }
        if self.fail {
            return Err(StoreError::Io(std::io::Error::other("disk full")));
        }
        self.saves
            .lock()
            .expect("saves lock")
            .push(snapshot.clone());
        Ok(())
    }
}

#[derive(Clone)]
pub(crate) struct TestTime {
    now: OffsetDateTime,
    sleeps: Arc<Mutex<Vec<oneshot::Sender<()>>>>,
    durations: Arc<Mutex<Vec<Duration>>>,
}

impl TestTime {
    pub(crate) fn new(now: OffsetDateTime) -> Self {
        Self {
            now,
            sleeps: Arc::new(Mutex::new(Vec::new())),
            durations: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn sleep_durations(&self) -> Vec<Duration> {
        let mut durations = self.durations.lock().expect("durations lock").clone();
        durations.sort();
        durations
    }

    pub(crate) fn trigger_all(&self) {
        let mut sends = self.sleeps.lock().expect("sleeps lock");
        for sender in sends.drain(..) {
            let _ = sender.send(());
        }
    }

    /// Yields until `count` sleeps have been requested.
    pub(crate) async fn wait_for_sleeps(&self, count: usize) {
        for _ in 0..1000 {
            if self.durations.lock().expect("durations lock").len() >= count {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("expected {count} sleeps");
    }
}

pub(crate) struct ManualSleep {
    receiver: oneshot::Receiver<()>,
}

impl Future for ManualSleep {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(_) => Poll::Ready(()),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl TimeProvider for TestTime {
    type Sleep<'a>
        = ManualSleep
    where
        Self: 'a;

    fn now(&self) -> OffsetDateTime {
        self.now
    }

    fn sleep<'a>(&'a self, duration: Duration) -> Self::Sleep<'a> {
        let (sender, receiver) = oneshot::channel();
        self.durations
            .lock()
            .expect("durations lock")
            .push(duration);
        self.sleeps.lock().expect("sleeps lock").push(sender);
        ManualSleep { receiver }
    }
}

#[derive(Clone, Default)]
pub(crate) struct RecordingNotify {
    failing: Vec<String>,
    sent: Arc<Mutex<Vec<(String, Channel, String)>>>,
}

impl RecordingNotify {
    pub(crate) fn failing_for(mut self, identity: &str) -> Self {
        self.failing.push(identity.to_string());
        self
    }

    pub(crate) fn sent(&self) -> Vec<(String, Channel, String)> {
        self.sent.lock().expect("sent lock").clone()
    }
}

impl NotifySender for RecordingNotify {
    type Fut<'a>
        = Ready<Result<(), SendError>>
    where
        Self: 'a;

    fn send<'a>(
        &'a self,
        identity: &'a Identity,
        channel: Channel,
        message: &'a str,
    ) -> Self::Fut<'a> {
        self.sent.lock().expect("sent lock").push((
            identity.to_string(),
            channel,
            message.to_string(),
        ));
        if self.failing.iter().any(|failing| failing == identity.as_str()) {
            return ready(Err(SendError::Rejected("test failure".to_string())));
        }
        ready(Ok(()))
    }
}

#[derive(Clone, Default)]
pub(crate) struct RecordingSlack {
    sent: Arc<Mutex<Vec<(String, String, usize)>>>,
}

impl RecordingSlack {
    pub(crate) fn sent(&self) -> Vec<(String, String, usize)> {
        self.sent.lock().expect("sent lock").clone()
    }
}

impl SlackSender for RecordingSlack {
    type Fut<'a>
        = Ready<Result<(), SendError>>
    where
        Self: 'a;

    fn send<'a>(
        &'a self,
        identity: &'a Identity,
        headline: &'a str,
        attachments: &'a [SlackAttachment],
    ) -> Self::Fut<'a> {
        self.sent.lock().expect("sent lock").push((
            identity.to_string(),
            headline.to_string(),
            attachments.len(),
        ));
        ready(Ok(()))
    }
}

#[derive(Clone, Default)]
pub(crate) struct RecordingDisplays {
    signalled: Arc<Mutex<Vec<String>>>,
}

impl RecordingDisplays {
    pub(crate) fn signalled(&self) -> Vec<String> {
        self.signalled.lock().expect("signalled lock").clone()
    }
}

impl DisplaySignaler for RecordingDisplays {
    type Fut<'a>
        = Ready<Result<(), SendError>>
    where
        Self: 'a;

    fn signal<'a>(&'a self, room: &'a str) -> Self::Fut<'a> {
        self.signalled
            .lock()
            .expect("signalled lock")
            .push(room.to_string());
        ready(Ok(()))
    }
}
