mod displays;
mod subscribers;

pub use displays::{DisplayError, DisplayRegistry};
pub use subscribers::{RegistrationOutcome, RegistrationStatus, SubscriberRegistry};
