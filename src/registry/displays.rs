use crate::ports::{SnapshotStore, StoreError};
use crate::types::registry::{Display, DisplayMap};

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DisplayError {
    #[error("a room name is required")]
    MissingRoom,
}

/// Room names of shared displays that get signalled on dispatch.
pub struct DisplayRegistry<S> {
    store: Arc<S>,
    displays: Mutex<DisplayMap>,
}

impl<S> DisplayRegistry<S>
where
    S: SnapshotStore<DisplayMap>,
{
    pub fn new(store: S, displays: DisplayMap) -> Self {
        Self {
            store: Arc::new(store),
            displays: Mutex::new(displays),
        }
    }

    pub fn load(store: S) -> Result<Self, StoreError> {
        let displays = store.load()?.unwrap_or_default();
        info!(count = displays.len(), "loaded displays");
        Ok(Self::new(store, displays))
    }

    pub async fn add(&self, room: &str) -> Result<(), DisplayError> {
        let room = room_name(Some(room)).ok_or(DisplayError::MissingRoom)?;
        let mut displays = self.displays.lock().await;
        displays.insert(room.to_string(), Display::default());
        self.persist(&displays).await;
        info!(room, "display registered");
        Ok(())
    }

    /// Returns false, without writing, when the room is not registered.
    pub async fn remove(&self, room: &str) -> bool {
        let mut displays = self.displays.lock().await;
        if displays.remove(room.trim()).is_none() {
            return false;
        }
        self.persist(&displays).await;
        info!(room = room.trim(), "display removed");
        true
    }

    /// Registers `new_room`, then drops `old_room` when one is given. Both
    /// happen under one lock and one write.
    pub async fn rename(
        &self,
        new_room: Option<&str>,
        old_room: Option<&str>,
    ) -> Result<(), DisplayError> {
        let new_room = room_name(new_room).ok_or(DisplayError::MissingRoom)?;
        let old_room = room_name(old_room);

        let mut displays = self.displays.lock().await;
        displays.insert(new_room.to_string(), Display::default());
        if let Some(old_room) = old_room
            && old_room != new_room
        {
            displays.remove(old_room);
        }
        self.persist(&displays).await;
        info!(new_room, ?old_room, "display renamed");
        Ok(())
    }

    pub async fn list_all(&self) -> DisplayMap {
        self.displays.lock().await.clone()
    }

    /// Runs the blocking file write off the async workers. Callers hold the
    /// map lock until it returns, so snapshots land in mutation order.
    async fn persist(&self, displays: &DisplayMap) {
        let store = Arc::clone(&self.store);
        let snapshot = displays.clone();
        match tokio::task::spawn_blocking(move || store.save(&snapshot)).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!(error = %err, "unable to persist displays"),
            Err(err) => warn!(error = %err, "display persist task failed"),
        }
    }
}

fn room_name(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|room| !room.is_empty())
}
