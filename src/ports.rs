pub mod binding;
pub mod menu;
pub mod sender;
pub mod store;
pub mod time;

pub use binding::{BindingError, BindingProvider};
pub use menu::{MenuError, MenuSource};
pub use sender::{DisplaySignaler, NotifySender, SendError, SlackSender};
pub use store::{SnapshotStore, StoreError};
pub use time::TimeProvider;
