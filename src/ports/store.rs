#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot encode error: {0}")]
    Encode(serde_json::Error),
    #[error("snapshot decode error: {0}")]
    Decode(serde_json::Error),
}

/// Whole-snapshot persistence. `save` replaces the previous snapshot; a
/// reader never sees a partially written one.
pub trait SnapshotStore<T>: Send + Sync + 'static {
    fn load(&self) -> Result<Option<T>, StoreError>;
    fn save(&self, snapshot: &T) -> Result<(), StoreError>;
}
