use crate::ports::{BindingProvider, SnapshotStore, StoreError};
use crate::types::registry::{Channel, ChannelBinding, Identity, Subscriber, SubscriberMap};

use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationStatus {
    Created,
    Updated,
    /// No requested channel could be bound; the registry was left as is.
    Unbound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationOutcome {
    pub status: RegistrationStatus,
    /// Channels that ended up bound, in the order they were requested.
    pub channels: Vec<Channel>,
}

/// Identity -> channel bindings, persisted as a whole after every mutation.
///
/// The map lock is held from the start of a mutation until its snapshot has
/// been written, so concurrent commands never persist a stale map. Provider
/// calls never run under the lock.
pub struct SubscriberRegistry<B, S> {
    provider: B,
    store: Arc<S>,
    subscribers: Mutex<SubscriberMap>,
}

impl<B, S> SubscriberRegistry<B, S>
where
    B: BindingProvider,
    S: SnapshotStore<SubscriberMap>,
{
    pub fn new(provider: B, store: S, subscribers: SubscriberMap) -> Self {
        Self {
            provider,
            store: Arc::new(store),
            subscribers: Mutex::new(subscribers),
        }
    }

    pub fn load(provider: B, store: S) -> Result<Self, StoreError> {
        let mut subscribers = store.load()?.unwrap_or_default();
        subscribers.retain(|identity, subscriber| {
            if subscriber.is_empty() {
                warn!(identity = %identity, "dropping stored subscriber without channels");
            }
            !subscriber.is_empty()
        });
        info!(count = subscribers.len(), "loaded subscribers");
        Ok(Self::new(provider, store, subscribers))
    }

    /// Replaces the identity's channel set with whichever of `channels` bind.
    ///
    /// Provider bindings are requested concurrently and all of them settle
    /// before the map is touched; failed channels are left out.
    pub async fn register(
        &self,
        identity: &Identity,
        channels: &[Channel],
        address: &str,
    ) -> RegistrationOutcome {
        let bindings = self.create_bindings(identity, channels, address).await;
        let bound: Vec<Channel> = channels
            .iter()
            .copied()
            .filter(|channel| bindings.contains_key(channel))
            .collect();

        if bindings.is_empty() {
            warn!(identity = %identity, "no channel could be bound");
            return RegistrationOutcome {
                status: RegistrationStatus::Unbound,
                channels: bound,
            };
        }

        let mut subscribers = self.subscribers.lock().await;
        let previous = subscribers.insert(identity.clone(), Subscriber::from_bindings(bindings));
        self.persist(&subscribers).await;

        let status = match previous {
            Some(_) => RegistrationStatus::Updated,
            None => RegistrationStatus::Created,
        };
        info!(identity = %identity, ?status, channels = ?bound, "registered subscriber");
        RegistrationOutcome {
            status,
            channels: bound,
        }
    }

    /// Drops the subscriber, persists, and only then releases its provider
    /// bindings (best effort) with the map unlocked. Returns false, without
    /// writing, when the identity is unknown.
    pub async fn unsubscribe(&self, identity: &Identity) -> bool {
        let removed = {
            let mut subscribers = self.subscribers.lock().await;
            let Some(removed) = subscribers.remove(identity) else {
                debug!(identity = %identity, "unsubscribe for unknown identity");
                return false;
            };
            self.persist(&subscribers).await;
            removed
        };
        info!(identity = %identity, "unsubscribed");

        let mut releases = JoinSet::new();
        for (_, binding) in removed
            .bindings()
            .filter(|(channel, _)| channel.requires_provider_binding())
        {
            let provider = self.provider.clone();
            let binding_id = binding.as_str().to_string();
            releases.spawn(async move { provider.delete(&binding_id).await });
        }
        while let Some(joined) = releases.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(err)) => warn!(identity = %identity, error = %err, "binding deletion failed"),
                Err(err) => warn!(identity = %identity, error = %err, "binding deletion task failed"),
            }
        }
        true
    }

    pub async fn list_all(&self) -> SubscriberMap {
        self.subscribers.lock().await.clone()
    }

    pub async fn has_channel(&self, identity: &Identity, channel: Channel) -> bool {
        self.subscribers
            .lock()
            .await
            .get(identity)
            .is_some_and(|subscriber| subscriber.has_channel(channel))
    }

    async fn create_bindings(
        &self,
        identity: &Identity,
        channels: &[Channel],
        address: &str,
    ) -> BTreeMap<Channel, ChannelBinding> {
        let mut bindings = BTreeMap::new();
        let mut pending = JoinSet::new();

        for &channel in channels {
            if !channel.requires_provider_binding() {
                bindings.insert(channel, ChannelBinding::slack());
                continue;
            }
            let provider = self.provider.clone();
            let identity = identity.clone();
            let address = address.to_string();
            pending.spawn(async move {
                let tags = vec![channel.as_str().to_string()];
                let result = provider.create(&identity, channel, &address, &tags).await;
                (channel, result)
            });
        }

        while let Some(joined) = pending.join_next().await {
            match joined {
                Ok((channel, Ok(binding_id))) => {
                    bindings.insert(channel, ChannelBinding::provider(binding_id));
                }
                Ok((channel, Err(err))) => {
                    warn!(identity = %identity, %channel, error = %err, "channel binding failed");
                }
                Err(err) => {
                    warn!(identity = %identity, error = %err, "channel binding task failed");
                }
            }
        }

        bindings
    }

    /// Writes on the blocking pool while the caller still holds the map
    /// lock, so snapshots land in mutation order.
    async fn persist(&self, subscribers: &SubscriberMap) {
        let store = Arc::clone(&self.store);
        let snapshot = subscribers.clone();
        match tokio::task::spawn_blocking(move || store.save(&snapshot)).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!(error = %err, "unable to persist subscribers"),
            Err(err) => warn!(error = %err, "subscriber persist task failed"),
        }
    }
}
