use crate::types::registry::{Channel, Identity};

#[derive(Debug, thiserror::Error)]
pub enum BindingError {
    #[error("binding provider is not configured")]
    NotConfigured,
    #[error("failed to create {channel} binding: {reason}")]
    Create { channel: Channel, reason: String },
    #[error("failed to delete binding {binding_id}: {reason}")]
    Delete { binding_id: String, reason: String },
}

/// Creates and releases provider-side bindings for channels that need one.
pub trait BindingProvider: Clone + Send + Sync + 'static {
    type CreateFut<'a>: Future<Output = Result<String, BindingError>> + Send + 'a
    where
        Self: 'a;
    type DeleteFut<'a>: Future<Output = Result<(), BindingError>> + Send + 'a
    where
        Self: 'a;

    /// Returns the provider-assigned binding id.
    fn create<'a>(
        &'a self,
        identity: &'a Identity,
        channel: Channel,
        address: &'a str,
        tags: &'a [String],
    ) -> Self::CreateFut<'a>;

    fn delete<'a>(&'a self, binding_id: &'a str) -> Self::DeleteFut<'a>;
}
